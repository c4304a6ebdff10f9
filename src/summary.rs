use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::classifier::FundClassifier;
use crate::models::{FlatBalanceSummary, FundTotals, Transaction};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeriodSummary {
    pub flats: BTreeMap<String, FlatBalanceSummary>,
    /// Records dropped because they carried no flat code.
    pub skipped: usize,
}

impl PeriodSummary {
    pub fn grand_totals(&self) -> FundTotals {
        let mut totals = FundTotals::default();
        for flat in self.flats.values() {
            totals.merge(&flat.totals);
        }
        totals
    }

    pub fn unclassified_total(&self) -> Decimal {
        self.flats.values().map(|f| f.unclassified).sum()
    }
}

/// Per-flat fund totals for a period. Every flat that appears in `txns` gets
/// a row, with buckets it never touched left at zero.
pub fn summarize(
    txns: &[Transaction],
    classifier: &FundClassifier,
    owners: &BTreeMap<String, String>,
) -> PeriodSummary {
    let mut summary = PeriodSummary::default();

    for txn in txns {
        let flat_code = txn.flat_code.trim();
        if flat_code.is_empty() {
            summary.skipped += 1;
            continue;
        }
        let owner = owners.get(flat_code);
        let entry = summary
            .flats
            .entry(flat_code.to_string())
            .or_insert_with(|| FlatBalanceSummary::new(flat_code, owner.cloned()));

        let amount = txn.amount_or_zero();
        match classifier.classify(txn, owner.map(String::as_str)) {
            Some(bucket) => entry.totals.add(bucket, amount),
            None => entry.unclassified += amount,
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ClassifierStrategy;
    use crate::models::FundBucket;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn txn(flat: &str, tag: Option<&str>, ledger: Option<&str>, amount: Decimal) -> Transaction {
        Transaction {
            id: None,
            date: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            voucher_type: "Bill".into(),
            voucher_no: "B-1".into(),
            flat_code: flat.into(),
            ledger_name: ledger.map(String::from),
            fund_tag: tag.map(String::from),
            amount: Some(amount),
        }
    }

    #[test]
    fn test_empty_input_is_empty_summary() {
        let summary = summarize(&[], &FundClassifier::default(), &BTreeMap::new());
        assert!(summary.flats.is_empty());
        assert_eq!(summary.skipped, 0);
    }

    #[test]
    fn test_zero_fills_untouched_buckets() {
        let txns = vec![
            txn("A 101", Some("maintenance"), None, dec!(-500)),
            txn("A 101", Some("maintenance"), None, dec!(-1000)),
        ];
        let summary = summarize(&txns, &FundClassifier::new(ClassifierStrategy::Tag), &BTreeMap::new());
        let flat = &summary.flats["A 101"];
        assert_eq!(flat.totals.get(FundBucket::Maintenance), dec!(-1500));
        assert_eq!(flat.totals.get(FundBucket::MaintenanceInterest), Decimal::ZERO);
        assert_eq!(flat.totals.get(FundBucket::MajorRepairFund), Decimal::ZERO);
        assert_eq!(flat.totals.get(FundBucket::MajorRepairFundInterest), Decimal::ZERO);
    }

    #[test]
    fn test_unclassified_kept_out_of_buckets() {
        let txns = vec![
            txn("A 101", Some("mrf"), None, dec!(-2000)),
            txn("A 101", Some("parking"), None, dec!(-300)),
        ];
        let summary = summarize(&txns, &FundClassifier::new(ClassifierStrategy::Tag), &BTreeMap::new());
        let flat = &summary.flats["A 101"];
        assert_eq!(flat.totals.total(), dec!(-2000));
        assert_eq!(flat.unclassified, dec!(-300));
        assert_eq!(flat.overall(), dec!(-2300));
    }

    #[test]
    fn test_pattern_strategy_uses_owner_directory() {
        let owners = BTreeMap::from([
            ("A 101".to_string(), "Smith".to_string()),
            ("B 202".to_string(), "Rao (HUF)".to_string()),
        ]);
        let txns = vec![
            txn("A 101", None, Some("Smith"), dec!(-500)),
            txn("A 101", None, Some("Smith (Major Repair Fund - Int.) FY25"), dec!(-40)),
            txn("B 202", None, Some("Rao (HUF) - Interest"), dec!(-12.5)),
            txn("C 303", None, Some("Nobody"), dec!(-99)),
        ];
        let summary = summarize(&txns, &FundClassifier::new(ClassifierStrategy::Pattern), &owners);
        assert_eq!(summary.flats.len(), 3);

        let a = &summary.flats["A 101"];
        assert_eq!(a.owner_name.as_deref(), Some("Smith"));
        assert_eq!(a.totals.get(FundBucket::Maintenance), dec!(-500));
        assert_eq!(a.totals.get(FundBucket::MajorRepairFundInterest), dec!(-40));
        assert_eq!(a.totals.get(FundBucket::MajorRepairFund), Decimal::ZERO);

        let b = &summary.flats["B 202"];
        assert_eq!(b.totals.get(FundBucket::MaintenanceInterest), dec!(-12.5));

        let c = &summary.flats["C 303"];
        assert_eq!(c.owner_name, None);
        assert_eq!(c.totals.total(), Decimal::ZERO);
        assert_eq!(c.unclassified, dec!(-99));
    }

    #[test]
    fn test_blank_flat_codes_are_counted_as_skipped() {
        let txns = vec![
            txn("", Some("maintenance"), None, dec!(-10)),
            txn("   ", Some("maintenance"), None, dec!(-10)),
            txn("A 101", Some("maintenance"), None, dec!(-10)),
        ];
        let summary = summarize(&txns, &FundClassifier::default(), &BTreeMap::new());
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.flats.len(), 1);
    }

    #[test]
    fn test_grand_totals() {
        let txns = vec![
            txn("A 101", Some("maintenance"), None, dec!(-500)),
            txn("A 102", Some("maintenance"), None, dec!(250)),
            txn("A 102", Some("mrf_interest"), None, dec!(-30)),
            txn("A 102", None, None, dec!(-5)),
        ];
        let summary = summarize(&txns, &FundClassifier::new(ClassifierStrategy::Tag), &BTreeMap::new());
        let totals = summary.grand_totals();
        assert_eq!(totals.get(FundBucket::Maintenance), dec!(-250));
        assert_eq!(totals.get(FundBucket::MajorRepairFundInterest), dec!(-30));
        assert_eq!(summary.unclassified_total(), dec!(-5));
    }
}
