use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Unknown fund: {0} (expected maintenance, maintenance_interest, mrf or mrf_interest)")]
    UnknownFund(String),

    #[error("Unknown classifier strategy: {0} (expected tag, pattern or tag-then-pattern)")]
    UnknownStrategy(String),

    #[error("No owner recorded for flat {0}. Run `society-ledger flats owner {0} <name>`")]
    UnknownOwner(String),

    #[error("Invalid date range: {from} is after {to}")]
    InvalidRange { from: String, to: String },

    #[error("Invalid date: {0} (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("Transactions out of order at row {index}: {date} follows {previous}")]
    OutOfOrder {
        index: usize,
        date: String,
        previous: String,
    },

    #[error("Missing column in import header: {0}")]
    MissingColumn(String),

    #[error("No report password set. Run `society-ledger password set`")]
    PasswordNotSet,

    #[error("Password hash error: {0}")]
    PasswordHash(String),

    #[error("Incorrect password")]
    BadPassword,

    #[error("Session expired or invalid, authenticate again")]
    InvalidToken,

    #[error("{0}")]
    Other(String),
}

impl From<argon2::password_hash::Error> for LedgerError {
    fn from(e: argon2::password_hash::Error) -> Self {
        LedgerError::PasswordHash(e.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(e: serde_json::Error) -> Self {
        LedgerError::Settings(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
