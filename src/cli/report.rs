use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};
use rust_decimal::Decimal;

use crate::classifier::{ClassifierStrategy, FundClassifier};
use crate::cli::password::open_session;
use crate::cli::{open_db, RangeArgs};
use crate::db::get_metadata;
use crate::error::Result;
use crate::fmt::{amount_or_blank, balance_label};
use crate::models::FundBucket;
use crate::reports::{self, LedgerStatement, OutstandingReport, OwnerStatement};
use crate::settings::{load_settings, Settings};
use crate::store::DateRange;

/// Prepend society name as a header line if non-empty.
fn with_header(society_name: &str, body: String) -> String {
    if society_name.is_empty() {
        body
    } else {
        format!("{society_name}\n{body}")
    }
}

fn resolve_range(settings: &Settings, range: &RangeArgs) -> Result<DateRange> {
    DateRange::resolve(
        range.from_date.as_deref(),
        range.to_date.as_deref(),
        settings.fiscal_start_month(),
        chrono::Local::now().date_naive(),
    )
}

fn resolve_classifier(settings: &Settings, strategy: Option<String>) -> Result<FundClassifier> {
    let strategy = match strategy {
        Some(s) => s.parse::<ClassifierStrategy>()?,
        None => settings.classifier,
    };
    Ok(FundClassifier::new(strategy))
}

fn tinted(balance: Decimal) -> String {
    let label = balance_label(balance);
    if balance.is_sign_negative() && !balance.is_zero() {
        label.red().to_string()
    } else {
        label
    }
}

fn right(text: String) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

// ---------------------------------------------------------------------------
// Data-fetching wrappers (used by main)
// ---------------------------------------------------------------------------

pub fn summary(range: RangeArgs, wing: Option<String>, strategy: Option<String>) -> Result<()> {
    let settings = load_settings();
    let range = resolve_range(&settings, &range)?;
    let classifier = resolve_classifier(&settings, strategy)?;
    let conn = open_db(&settings)?;
    let session = open_session(&settings)?;

    let society = get_metadata(&conn, "society_name").unwrap_or_default();
    let data = reports::outstanding_summary(&session, &conn, range, wing.as_deref(), &classifier)?;
    println!("{}", with_header(&society, format_summary(&data)));
    Ok(())
}

pub fn statement(
    flat: &str,
    fund: Option<String>,
    range: RangeArgs,
    strategy: Option<String>,
) -> Result<()> {
    let settings = load_settings();
    let range = resolve_range(&settings, &range)?;
    let classifier = resolve_classifier(&settings, strategy)?;
    let fund = fund.as_deref().map(FundBucket::parse).transpose()?;
    let conn = open_db(&settings)?;
    let session = open_session(&settings)?;

    let society = get_metadata(&conn, "society_name").unwrap_or_default();
    let data = reports::ledger_statement(&session, &conn, flat, fund, range, &classifier)?;
    println!("{}", with_header(&society, format_statement(&data)));
    Ok(())
}

pub fn owner(flat: &str, range: RangeArgs) -> Result<()> {
    let settings = load_settings();
    let range = resolve_range(&settings, &range)?;
    let conn = open_db(&settings)?;
    let session = open_session(&settings)?;

    let society = get_metadata(&conn, "society_name").unwrap_or_default();
    let data = reports::owner_statement(&session, &conn, flat, range)?;
    println!("{}", with_header(&society, format_owner_statement(&data)));
    Ok(())
}

// ---------------------------------------------------------------------------
// Pure formatting functions (report data → String)
// ---------------------------------------------------------------------------

pub fn format_summary(report: &OutstandingReport) -> String {
    let title = format!(
        "Flat-wise Outstanding ({} to {}{})",
        report.range.from,
        report.range.to,
        report
            .wing
            .as_deref()
            .map(|w| format!(", wing {w}"))
            .unwrap_or_default()
    );

    if report.summary.flats.is_empty() {
        return format!("{title}\nNo data for selected date range.");
    }

    let mut table = Table::new();
    let mut header = vec!["Flat".to_string(), "Owner".to_string()];
    header.extend(FundBucket::ALL.iter().map(|b| b.label().to_string()));
    table.set_header(header);

    for flat in report.summary.flats.values() {
        let mut row = vec![
            Cell::new(&flat.flat_code),
            Cell::new(flat.owner_name.as_deref().unwrap_or("")),
        ];
        row.extend(FundBucket::ALL.iter().map(|b| right(tinted(flat.totals.get(*b)))));
        table.add_row(row);
    }

    let totals = report.summary.grand_totals();
    let mut total_row = vec![Cell::new("Total".bold()), Cell::new("")];
    total_row.extend(FundBucket::ALL.iter().map(|b| right(tinted(totals.get(*b)))));
    table.add_row(total_row);

    let mut out = format!("{title}\n{table}");
    let unclassified = report.summary.unclassified_total();
    if !unclassified.is_zero() {
        out.push_str(&format!("\nUnclassified: {}", balance_label(unclassified)));
    }
    if report.skipped > 0 {
        out.push_str(&format!(
            "\n{}",
            format!("Warning: {} records skipped (unreadable or missing flat)", report.skipped).yellow()
        ));
    }
    out
}

pub fn format_statement(stmt: &LedgerStatement) -> String {
    let fund = stmt.fund.map(|f| f.label()).unwrap_or("All Funds");
    let owner = stmt
        .owner_name
        .as_deref()
        .map(|o| format!(" - {o}"))
        .unwrap_or_default();
    let title = format!(
        "Ledger Statement: {}{owner} ({fund}, {} to {})",
        stmt.flat_code, stmt.range.from, stmt.range.to
    );

    if stmt.rows.is_empty() {
        return format!("{title}\nNo transactions found for selected period.");
    }

    let mut table = Table::new();
    table.set_header(vec!["Date", "Voucher Type", "Voucher No", "Debit", "Credit", "Balance"]);
    for r in &stmt.rows {
        table.add_row(vec![
            Cell::new(r.date),
            Cell::new(&r.voucher_type),
            Cell::new(&r.voucher_no),
            right(amount_or_blank(r.debit)),
            right(amount_or_blank(r.credit)),
            right(r.balance_label.clone()),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total".bold()),
        Cell::new(""),
        Cell::new(""),
        right(amount_or_blank(stmt.total_debit)),
        right(amount_or_blank(stmt.total_credit)),
        right(stmt.closing_label()),
    ]);

    let mut out = format!("{title}\n{table}");
    if stmt.skipped > 0 {
        out.push_str(&format!(
            "\n{}",
            format!("Warning: {} unreadable records skipped", stmt.skipped).yellow()
        ));
    }
    out
}

pub fn format_owner_statement(stmt: &OwnerStatement) -> String {
    let title = format!(
        "Owner Statement: {} - {} ({} to {})",
        stmt.flat_code, stmt.owner_name, stmt.range.from, stmt.range.to
    );

    if stmt.rows.is_empty() {
        return format!("{title}\nNo transactions found for selected period.");
    }

    let mut table = Table::new();
    table.set_header(vec![
        "Date",
        "Voucher Type",
        "Voucher No",
        "Ledger",
        "Debit",
        "Credit",
        "Owner Balance",
        "Voucher Balance",
    ]);
    for r in &stmt.rows {
        let ledger = r.ledger_name.as_deref().unwrap_or("");
        let ledger = if r.in_owner_ledger {
            ledger.bold().to_string()
        } else {
            ledger.to_string()
        };
        table.add_row(vec![
            Cell::new(r.date),
            Cell::new(&r.voucher_type),
            Cell::new(&r.voucher_no),
            Cell::new(ledger),
            right(amount_or_blank(r.debit)),
            right(amount_or_blank(r.credit)),
            right(r.owner_label.clone()),
            right(r.voucher_label.clone()),
        ]);
    }

    let mut out = format!("{title}\n{table}");
    if stmt.skipped > 0 {
        out.push_str(&format!(
            "\n{}",
            format!("Warning: {} unreadable records skipped", stmt.skipped).yellow()
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FlatBalanceSummary, LedgerRow};
    use crate::store::parse_iso_date;
    use crate::summary::PeriodSummary;
    use rust_decimal_macros::dec;

    fn april() -> DateRange {
        DateRange::new(parse_iso_date("2025-04-01").unwrap(), parse_iso_date("2025-04-30").unwrap())
            .unwrap()
    }

    #[test]
    fn test_format_summary_lists_flats_and_totals() {
        colored::control::set_override(false);
        let mut flat = FlatBalanceSummary::new("A 101", Some("Smith".into()));
        flat.totals.add(FundBucket::Maintenance, dec!(-1300));
        flat.unclassified = dec!(-5);
        let mut summary = PeriodSummary::default();
        summary.flats.insert("A 101".into(), flat);
        let report = OutstandingReport {
            range: april(),
            wing: Some("A".into()),
            summary,
            skipped: 1,
        };
        let text = format_summary(&report);
        assert!(text.contains("wing A"), "got: {text}");
        assert!(text.contains("Smith"));
        assert!(text.contains("1,300.00 Dr"));
        assert!(text.contains("0.00"));
        assert!(text.contains("Unclassified: 5.00 Dr"));
        assert!(text.contains("1 records skipped"));
    }

    #[test]
    fn test_format_summary_empty() {
        let report = OutstandingReport {
            range: april(),
            wing: None,
            summary: PeriodSummary::default(),
            skipped: 0,
        };
        assert!(format_summary(&report).contains("No data for selected date range."));
    }

    #[test]
    fn test_format_statement() {
        colored::control::set_override(false);
        let row = LedgerRow {
            date: parse_iso_date("2025-04-01").unwrap(),
            voucher_type: "Bill".into(),
            voucher_no: "B-1".into(),
            debit: dec!(500),
            credit: Decimal::ZERO,
            running_balance: dec!(-500),
            balance_label: "500.00 Dr".into(),
        };
        let stmt = LedgerStatement {
            flat_code: "A 101".into(),
            owner_name: Some("Smith".into()),
            fund: Some(FundBucket::Maintenance),
            range: april(),
            rows: vec![row],
            total_debit: dec!(500),
            total_credit: Decimal::ZERO,
            closing_balance: dec!(-500),
            skipped: 0,
        };
        let text = format_statement(&stmt);
        assert!(text.contains("Ledger Statement: A 101 - Smith (Maintenance"), "got: {text}");
        assert!(text.contains("B-1"));
        assert!(text.contains("500.00 Dr"));
        assert!(!text.contains("skipped"));
    }

    #[test]
    fn test_resolve_classifier_override() {
        let settings = Settings::default();
        assert_eq!(
            resolve_classifier(&settings, None).unwrap().strategy(),
            ClassifierStrategy::TagThenPattern
        );
        assert_eq!(
            resolve_classifier(&settings, Some("pattern".into())).unwrap().strategy(),
            ClassifierStrategy::Pattern
        );
        assert!(resolve_classifier(&settings, Some("fuzzy".into())).is_err());
    }
}
