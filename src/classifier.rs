use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::models::{FundBucket, Transaction};

const MRF_INTEREST_SUFFIX: &str = " (Major Repair Fund - Int.";
const MRF_SUFFIX: &str = " (Major Repair Fund)";
const MAINTENANCE_INTEREST_SUFFIX: &str = " - Interest";
const INTEREST_MARKER: &str = "Int.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClassifierStrategy {
    /// Read the explicit `fund_type` tag only.
    Tag,
    /// Match the ledger name against the owner-name patterns only.
    Pattern,
    /// Use the tag when it is recognized, otherwise fall back to patterns.
    #[default]
    TagThenPattern,
}

impl ClassifierStrategy {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Tag => "tag",
            Self::Pattern => "pattern",
            Self::TagThenPattern => "tag-then-pattern",
        }
    }
}

impl fmt::Display for ClassifierStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ClassifierStrategy {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tag" => Ok(Self::Tag),
            "pattern" => Ok(Self::Pattern),
            "tag-then-pattern" => Ok(Self::TagThenPattern),
            other => Err(LedgerError::UnknownStrategy(other.to_string())),
        }
    }
}

/// Assigns transactions to fund buckets. Stateless: the same input always
/// yields the same bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FundClassifier {
    strategy: ClassifierStrategy,
}

impl FundClassifier {
    pub fn new(strategy: ClassifierStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> ClassifierStrategy {
        self.strategy
    }

    pub fn classify(&self, txn: &Transaction, owner_name: Option<&str>) -> Option<FundBucket> {
        let by_tag = || txn.fund_tag.as_deref().and_then(FundBucket::from_tag);
        let by_pattern = || {
            let ledger = txn.ledger_name.as_deref()?;
            classify_ledger_name(ledger, owner_name?)
        };
        match self.strategy {
            ClassifierStrategy::Tag => by_tag(),
            ClassifierStrategy::Pattern => by_pattern(),
            ClassifierStrategy::TagThenPattern => by_tag().or_else(by_pattern),
        }
    }
}

/// Legacy classification of a free-text ledger name against the owner's name.
///
/// Interest variants are checked before their base variant so an
/// interest-bearing MRF entry never lands in the plain MRF bucket. The owner
/// name is matched as a literal prefix. The plain MRF rule rejects any ledger
/// name containing "Int.", the owner's own name included.
pub fn classify_ledger_name(ledger_name: &str, owner_name: &str) -> Option<FundBucket> {
    if owner_name.is_empty() {
        return None;
    }
    if ledger_name == owner_name {
        return Some(FundBucket::Maintenance);
    }
    let rest = ledger_name.strip_prefix(owner_name)?;

    if rest.starts_with(MRF_INTEREST_SUFFIX) {
        Some(FundBucket::MajorRepairFundInterest)
    } else if rest.starts_with(MRF_SUFFIX) && !ledger_name.contains(INTEREST_MARKER) {
        Some(FundBucket::MajorRepairFund)
    } else if rest.starts_with(MAINTENANCE_INTEREST_SUFFIX) {
        Some(FundBucket::MaintenanceInterest)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn txn(ledger_name: Option<&str>, fund_tag: Option<&str>) -> Transaction {
        Transaction {
            id: Some(1),
            date: NaiveDate::from_ymd_opt(2025, 4, 10).unwrap(),
            voucher_type: "Journal".into(),
            voucher_no: "J-1".into(),
            flat_code: "A 101".into(),
            ledger_name: ledger_name.map(String::from),
            fund_tag: fund_tag.map(String::from),
            amount: Some(dec!(-500)),
        }
    }

    #[test]
    fn test_tag_strategy_maps_all_tags() {
        let c = FundClassifier::new(ClassifierStrategy::Tag);
        assert_eq!(c.classify(&txn(None, Some("maintenance")), None), Some(FundBucket::Maintenance));
        assert_eq!(
            c.classify(&txn(None, Some("maintenance_interest")), None),
            Some(FundBucket::MaintenanceInterest)
        );
        assert_eq!(c.classify(&txn(None, Some("mrf")), None), Some(FundBucket::MajorRepairFund));
        assert_eq!(
            c.classify(&txn(None, Some("mrf_interest")), None),
            Some(FundBucket::MajorRepairFundInterest)
        );
    }

    #[test]
    fn test_tag_strategy_unknown_or_missing_tag() {
        let c = FundClassifier::new(ClassifierStrategy::Tag);
        assert_eq!(c.classify(&txn(Some("Smith"), Some("parking")), Some("Smith")), None);
        assert_eq!(c.classify(&txn(Some("Smith"), None), Some("Smith")), None);
    }

    #[test]
    fn test_pattern_rules() {
        assert_eq!(classify_ledger_name("Smith", "Smith"), Some(FundBucket::Maintenance));
        assert_eq!(
            classify_ledger_name("Smith - Interest", "Smith"),
            Some(FundBucket::MaintenanceInterest)
        );
        assert_eq!(
            classify_ledger_name("Smith (Major Repair Fund)", "Smith"),
            Some(FundBucket::MajorRepairFund)
        );
        assert_eq!(
            classify_ledger_name("Smith (Major Repair Fund - Int.)", "Smith"),
            Some(FundBucket::MajorRepairFundInterest)
        );
        assert_eq!(classify_ledger_name("Smith Jr", "Smith"), None);
        assert_eq!(classify_ledger_name("Jones", "Smith"), None);
    }

    #[test]
    fn test_interest_variant_wins_over_base() {
        let c = FundClassifier::new(ClassifierStrategy::Pattern);
        let t = txn(Some("Smith (Major Repair Fund - Int.) FY25"), None);
        assert_eq!(c.classify(&t, Some("Smith")), Some(FundBucket::MajorRepairFundInterest));
    }

    #[test]
    fn test_base_mrf_excludes_interest_entries() {
        // Starts like the base MRF ledger but carries an interest marker.
        assert_eq!(classify_ledger_name("Smith (Major Repair Fund) Int. FY25", "Smith"), None);
        assert_eq!(
            classify_ledger_name("Smith (Major Repair Fund) FY25", "Smith"),
            Some(FundBucket::MajorRepairFund)
        );
    }

    #[test]
    fn test_adversarial_owner_names() {
        let owner = "Interest Holdings";
        assert_eq!(classify_ledger_name(owner, owner), Some(FundBucket::Maintenance));
        assert_eq!(
            classify_ledger_name("Interest Holdings - Interest", owner),
            Some(FundBucket::MaintenanceInterest)
        );

        let owner = "Rao (HUF)";
        assert_eq!(classify_ledger_name("Rao (HUF)", owner), Some(FundBucket::Maintenance));
        assert_eq!(
            classify_ledger_name("Rao (HUF) (Major Repair Fund)", owner),
            Some(FundBucket::MajorRepairFund)
        );
        assert_eq!(classify_ledger_name("Rao", owner), None);

        let owner = "Int. Traders";
        assert_eq!(classify_ledger_name("Int. Traders (Major Repair Fund)", owner), None);
        assert_eq!(
            classify_ledger_name("Int. Traders (Major Repair Fund - Int.)", owner),
            Some(FundBucket::MajorRepairFundInterest)
        );

        let owner = "Smith (Major Repair Fund)";
        assert_eq!(classify_ledger_name(owner, owner), Some(FundBucket::Maintenance));
    }

    #[test]
    fn test_pattern_needs_owner_and_ledger() {
        let c = FundClassifier::new(ClassifierStrategy::Pattern);
        assert_eq!(c.classify(&txn(Some("Smith"), None), None), None);
        assert_eq!(c.classify(&txn(None, None), Some("Smith")), None);
        assert_eq!(c.classify(&txn(Some(""), None), Some("")), None);
    }

    #[test]
    fn test_tag_then_pattern_falls_back() {
        let c = FundClassifier::default();
        assert_eq!(c.strategy(), ClassifierStrategy::TagThenPattern);
        // Tag wins when recognized.
        let t = txn(Some("Smith - Interest"), Some("mrf"));
        assert_eq!(c.classify(&t, Some("Smith")), Some(FundBucket::MajorRepairFund));
        // Unknown tag falls back to the ledger name.
        let t = txn(Some("Smith - Interest"), Some("legacy"));
        assert_eq!(c.classify(&t, Some("Smith")), Some(FundBucket::MaintenanceInterest));
    }

    #[test]
    fn test_classification_is_idempotent() {
        let c = FundClassifier::default();
        let t = txn(Some("Smith (Major Repair Fund)"), None);
        let first = c.classify(&t, Some("Smith"));
        let second = c.classify(&t, Some("Smith"));
        assert_eq!(first, second);
        assert_eq!(first, Some(FundBucket::MajorRepairFund));
    }

    #[test]
    fn test_strategy_parse_and_display() {
        assert_eq!("tag".parse::<ClassifierStrategy>().unwrap(), ClassifierStrategy::Tag);
        assert_eq!("Pattern".parse::<ClassifierStrategy>().unwrap(), ClassifierStrategy::Pattern);
        assert_eq!(
            "tag-then-pattern".parse::<ClassifierStrategy>().unwrap(),
            ClassifierStrategy::TagThenPattern
        );
        assert!("regex".parse::<ClassifierStrategy>().is_err());
        assert!("auto".parse::<ClassifierStrategy>().is_err());
        assert_eq!(ClassifierStrategy::TagThenPattern.to_string(), "tag-then-pattern");
    }
}
