use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::auth::Session;
use crate::classifier::FundClassifier;
use crate::error::{LedgerError, Result};
use crate::fmt::balance_label;
use crate::ledger::{accumulate, accumulate_dual};
use crate::models::{DualLedgerRow, FundBucket, LedgerRow};
use crate::store::{self, DateRange, TransactionFilter};
use crate::summary::{summarize, PeriodSummary};

// ---------------------------------------------------------------------------
// Flat-wise outstanding
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct OutstandingReport {
    pub range: DateRange,
    pub wing: Option<String>,
    pub summary: PeriodSummary,
    /// Unreadable rows plus rows without a flat code.
    pub skipped: usize,
}

pub fn outstanding_summary(
    session: &Session,
    conn: &Connection,
    range: DateRange,
    wing: Option<&str>,
    classifier: &FundClassifier,
) -> Result<OutstandingReport> {
    session.check()?;

    let fetched = store::fetch_transactions(
        conn,
        &TransactionFilter {
            range: Some(range),
            wing: wing.map(String::from),
            ..Default::default()
        },
    )?;
    let owners = store::owner_directory(conn)?;
    let summary = summarize(&fetched.transactions, classifier, &owners);
    let skipped = fetched.skipped + summary.skipped;

    tracing::info!(
        flats = summary.flats.len(),
        strategy = %classifier.strategy(),
        skipped,
        "outstanding summary built"
    );
    Ok(OutstandingReport {
        range,
        wing: wing.map(String::from),
        summary,
        skipped,
    })
}

// ---------------------------------------------------------------------------
// Ledger statement
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct LedgerStatement {
    pub flat_code: String,
    pub owner_name: Option<String>,
    pub fund: Option<FundBucket>,
    pub range: DateRange,
    pub rows: Vec<LedgerRow>,
    pub total_debit: Decimal,
    pub total_credit: Decimal,
    pub closing_balance: Decimal,
    pub skipped: usize,
}

impl LedgerStatement {
    pub fn closing_label(&self) -> String {
        balance_label(self.closing_balance)
    }
}

/// Running-balance statement for one flat, optionally limited to one fund.
pub fn ledger_statement(
    session: &Session,
    conn: &Connection,
    flat_code: &str,
    fund: Option<FundBucket>,
    range: DateRange,
    classifier: &FundClassifier,
) -> Result<LedgerStatement> {
    session.check()?;

    let fetched = store::fetch_transactions(
        conn,
        &TransactionFilter {
            range: Some(range),
            flat_code: Some(flat_code.to_string()),
            ..Default::default()
        },
    )?;
    let owner_name = store::owner_of(conn, flat_code)?;
    let txns: Vec<_> = match fund {
        Some(bucket) => fetched
            .transactions
            .into_iter()
            .filter(|t| classifier.classify(t, owner_name.as_deref()) == Some(bucket))
            .collect(),
        None => fetched.transactions,
    };

    let rows = accumulate(&txns)?;
    let total_debit: Decimal = rows.iter().map(|r| r.debit).sum();
    let total_credit: Decimal = rows.iter().map(|r| r.credit).sum();
    let closing_balance = rows.last().map(|r| r.running_balance).unwrap_or(Decimal::ZERO);

    Ok(LedgerStatement {
        flat_code: flat_code.to_string(),
        owner_name,
        fund,
        range,
        rows,
        total_debit,
        total_credit,
        closing_balance,
        skipped: fetched.skipped,
    })
}

// ---------------------------------------------------------------------------
// Owner statement (owner ledger vs whole voucher)
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct OwnerStatement {
    pub flat_code: String,
    pub owner_name: String,
    pub range: DateRange,
    pub rows: Vec<DualLedgerRow>,
    pub skipped: usize,
}

pub fn owner_statement(
    session: &Session,
    conn: &Connection,
    flat_code: &str,
    range: DateRange,
) -> Result<OwnerStatement> {
    session.check()?;

    let owner_name = store::owner_of(conn, flat_code)?
        .ok_or_else(|| LedgerError::UnknownOwner(flat_code.to_string()))?;
    let fetched = store::fetch_transactions(
        conn,
        &TransactionFilter {
            range: Some(range),
            flat_code: Some(flat_code.to_string()),
            ..Default::default()
        },
    )?;
    let rows = accumulate_dual(&fetched.transactions, &owner_name)?;

    Ok(OwnerStatement {
        flat_code: flat_code.to_string(),
        owner_name,
        range,
        rows,
        skipped: fetched.skipped,
    })
}
