//! Fund-wise outstanding balances and running-balance ledger statements for
//! housing societies.
//!
//! The accounting core ([`classifier`], [`ledger`], [`summary`]) is pure and
//! works on already-fetched [`models::Transaction`]s. [`store`] and
//! [`reports`] put a SQLite database and the password gate in front of it.

pub mod auth;
pub mod classifier;
pub mod cli;
pub mod db;
pub mod error;
pub mod fmt;
pub mod importer;
pub mod ledger;
pub mod models;
pub mod reports;
pub mod settings;
pub mod store;
pub mod summary;

pub use classifier::{ClassifierStrategy, FundClassifier};
pub use error::{LedgerError, Result};
pub use ledger::{accumulate, accumulate_dual, sort_chronologically};
pub use models::{FundBucket, FundTotals, LedgerRow, Transaction};
pub use summary::{summarize, PeriodSummary};
