use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::{LedgerError, Result};

/// One posted voucher line against a flat.
///
/// Negative amounts are debits (receivable from the flat), positive amounts
/// are credits (owed to the flat or paid in advance).
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: Option<i64>,
    pub date: NaiveDate,
    pub voucher_type: String,
    pub voucher_no: String,
    pub flat_code: String,
    pub ledger_name: Option<String>,
    pub fund_tag: Option<String>,
    pub amount: Option<Decimal>,
}

impl Transaction {
    /// Amount used for arithmetic; a missing amount counts as zero.
    pub fn amount_or_zero(&self) -> Decimal {
        self.amount.unwrap_or(Decimal::ZERO)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FundBucket {
    Maintenance,
    MaintenanceInterest,
    MajorRepairFund,
    MajorRepairFundInterest,
}

impl FundBucket {
    pub const ALL: [FundBucket; 4] = [
        FundBucket::Maintenance,
        FundBucket::MaintenanceInterest,
        FundBucket::MajorRepairFund,
        FundBucket::MajorRepairFundInterest,
    ];

    /// Value stored in the `fund_type` column.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Maintenance => "maintenance",
            Self::MaintenanceInterest => "maintenance_interest",
            Self::MajorRepairFund => "mrf",
            Self::MajorRepairFundInterest => "mrf_interest",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Maintenance => "Maintenance",
            Self::MaintenanceInterest => "Maintenance Interest",
            Self::MajorRepairFund => "Major Repair Fund",
            Self::MajorRepairFundInterest => "Major Repair Fund Interest",
        }
    }

    pub fn from_tag(tag: &str) -> Option<FundBucket> {
        let tag = tag.trim().to_ascii_lowercase();
        Self::ALL.iter().copied().find(|b| b.tag() == tag)
    }

    /// Parse a user-supplied fund name: a tag or a display label.
    pub fn parse(raw: &str) -> Result<FundBucket> {
        if let Some(bucket) = Self::from_tag(raw) {
            return Ok(bucket);
        }
        Self::ALL
            .iter()
            .copied()
            .find(|b| b.label().eq_ignore_ascii_case(raw.trim()))
            .ok_or_else(|| LedgerError::UnknownFund(raw.to_string()))
    }
}

impl fmt::Display for FundBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Signed total per fund bucket. Buckets that never matched stay at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FundTotals {
    pub maintenance: Decimal,
    pub maintenance_interest: Decimal,
    pub mrf: Decimal,
    pub mrf_interest: Decimal,
}

impl FundTotals {
    pub fn get(&self, bucket: FundBucket) -> Decimal {
        match bucket {
            FundBucket::Maintenance => self.maintenance,
            FundBucket::MaintenanceInterest => self.maintenance_interest,
            FundBucket::MajorRepairFund => self.mrf,
            FundBucket::MajorRepairFundInterest => self.mrf_interest,
        }
    }

    pub fn add(&mut self, bucket: FundBucket, amount: Decimal) {
        let slot = match bucket {
            FundBucket::Maintenance => &mut self.maintenance,
            FundBucket::MaintenanceInterest => &mut self.maintenance_interest,
            FundBucket::MajorRepairFund => &mut self.mrf,
            FundBucket::MajorRepairFundInterest => &mut self.mrf_interest,
        };
        *slot += amount;
    }

    pub fn merge(&mut self, other: &FundTotals) {
        for bucket in FundBucket::ALL {
            self.add(bucket, other.get(bucket));
        }
    }

    pub fn total(&self) -> Decimal {
        FundBucket::ALL.iter().map(|b| self.get(*b)).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlatBalanceSummary {
    pub flat_code: String,
    pub owner_name: Option<String>,
    pub totals: FundTotals,
    /// Amounts that matched no fund bucket.
    pub unclassified: Decimal,
}

impl FlatBalanceSummary {
    pub fn new(flat_code: &str, owner_name: Option<String>) -> Self {
        Self {
            flat_code: flat_code.to_string(),
            owner_name,
            totals: FundTotals::default(),
            unclassified: Decimal::ZERO,
        }
    }

    /// Whole-ledger total: all buckets plus unclassified amounts.
    pub fn overall(&self) -> Decimal {
        self.totals.total() + self.unclassified
    }
}

/// One statement line.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerRow {
    pub date: NaiveDate,
    pub voucher_type: String,
    pub voucher_no: String,
    pub debit: Decimal,
    pub credit: Decimal,
    pub running_balance: Decimal,
    pub balance_label: String,
}

/// Statement line carrying the owner-ledger and whole-voucher balances.
#[derive(Debug, Clone, PartialEq)]
pub struct DualLedgerRow {
    pub date: NaiveDate,
    pub voucher_type: String,
    pub voucher_no: String,
    pub ledger_name: Option<String>,
    pub debit: Decimal,
    pub credit: Decimal,
    /// Whether this row counted toward the owner-ledger balance.
    pub in_owner_ledger: bool,
    pub owner_balance: Decimal,
    pub owner_label: String,
    pub voucher_balance: Decimal,
    pub voucher_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flat {
    pub flat_code: String,
    pub wing: String,
    pub owner_name: Option<String>,
}

/// Wing of a flat code: its first whitespace-separated token ("A 101" → "A").
pub fn wing_of(flat_code: &str) -> String {
    flat_code
        .split_whitespace()
        .next()
        .unwrap_or("")
        .to_string()
}
