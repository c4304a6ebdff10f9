pub mod backup;
pub mod demo;
pub mod flats;
pub mod import;
pub mod init;
pub mod password;
pub mod report;
pub mod status;

use clap::{Args, Parser, Subcommand};
use rusqlite::Connection;

use crate::db::get_connection;
use crate::error::{LedgerError, Result};
use crate::settings::Settings;

pub(crate) fn open_db(settings: &Settings) -> Result<Connection> {
    let path = settings.db_path();
    if !path.exists() {
        return Err(LedgerError::Settings(format!(
            "No database found at {}\nRun `society-ledger init` to create one.",
            path.display()
        )));
    }
    get_connection(&path)
}

#[derive(Parser)]
#[command(
    name = "society-ledger",
    version,
    about = "Fund-wise outstanding and ledger statements for housing societies."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Reporting period. Defaults to the current financial year up to today.
#[derive(Args, Debug, Clone, Default)]
pub struct RangeArgs {
    /// Start date: YYYY-MM-DD
    #[arg(long = "from")]
    pub from_date: Option<String>,
    /// End date: YYYY-MM-DD
    #[arg(long = "to")]
    pub to_date: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create settings, the data directory and the database.
    Init {
        /// Path for data (default: ~/Documents/society-ledger)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
        /// Society name printed above reports
        #[arg(long = "society-name")]
        society_name: Option<String>,
    },
    /// Manage the report password.
    Password {
        #[command(subcommand)]
        command: PasswordCommands,
    },
    /// Import ledger transactions from a CSV file.
    Import {
        /// CSV with columns date, voucher_type, voucher_no, flat_code, ledger_name, fund_type, amount
        file: String,
    },
    /// List flats and wings, record owners.
    Flats {
        #[command(subcommand)]
        command: FlatsCommands,
    },
    /// Outstanding summaries and ledger statements (password required).
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// Load a sample society to explore the reports.
    Demo,
    /// Back up the database.
    Backup {
        /// Output path (default: <data_dir>/backups/society-YYYYMMDD-HHMMSS.db)
        #[arg(long)]
        output: Option<String>,
    },
    /// Show current database and summary statistics.
    Status,
    /// Print shell completions.
    Completions {
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum PasswordCommands {
    /// Set or replace the report password.
    Set,
}

#[derive(Subcommand)]
pub enum FlatsCommands {
    /// List flats with their wing and owner.
    List {
        /// Only flats in this wing
        #[arg(long)]
        wing: Option<String>,
    },
    /// List wings.
    Wings,
    /// Record the owner name used to match ledger names.
    Owner {
        /// Flat code, e.g. 'A 101'
        flat: String,
        /// Owner name exactly as it appears in ledger names
        owner: String,
    },
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Flat-wise outstanding across the four funds.
    Summary {
        #[command(flatten)]
        range: RangeArgs,
        /// Only flats in this wing
        #[arg(long)]
        wing: Option<String>,
        /// Classifier: tag, pattern, tag-then-pattern (default from settings)
        #[arg(long)]
        strategy: Option<String>,
    },
    /// Running-balance ledger statement for one flat.
    Statement {
        /// Flat code, e.g. 'A 101'
        flat: String,
        /// Fund: maintenance, maintenance_interest, mrf, mrf_interest (default: all)
        #[arg(long)]
        fund: Option<String>,
        #[command(flatten)]
        range: RangeArgs,
        /// Classifier: tag, pattern, tag-then-pattern (default from settings)
        #[arg(long)]
        strategy: Option<String>,
    },
    /// Owner-ledger balance alongside the whole-voucher balance.
    Owner {
        /// Flat code, e.g. 'A 101'
        flat: String,
        #[command(flatten)]
        range: RangeArgs,
    },
}
