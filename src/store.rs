use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use rusqlite::types::Value;
use rusqlite::Connection;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use crate::error::{LedgerError, Result};
use crate::models::{wing_of, Flat, Transaction};

// ---------------------------------------------------------------------------
// Date range
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self> {
        if from > to {
            return Err(LedgerError::InvalidRange {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        Ok(Self { from, to })
    }

    /// Resolve optional `--from`/`--to` arguments. A missing start defaults
    /// to the first day of the current financial year, a missing end to
    /// `today`.
    pub fn resolve(
        from: Option<&str>,
        to: Option<&str>,
        fiscal_start_month: u32,
        today: NaiveDate,
    ) -> Result<Self> {
        let from = match from {
            Some(raw) => parse_iso_date(raw)?,
            None => fiscal_year_start(today, fiscal_start_month),
        };
        let to = match to {
            Some(raw) => parse_iso_date(raw)?,
            None => today,
        };
        Self::new(from, to)
    }
}

pub fn parse_iso_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| LedgerError::InvalidDate(raw.to_string()))
}

/// First day of the financial year containing `today`.
pub fn fiscal_year_start(today: NaiveDate, start_month: u32) -> NaiveDate {
    let year = if today.month() >= start_month {
        today.year()
    } else {
        today.year() - 1
    };
    NaiveDate::from_ymd_opt(year, start_month, 1).unwrap_or(today)
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub range: Option<DateRange>,
    pub flat_code: Option<String>,
    pub wing: Option<String>,
    pub fund_tag: Option<String>,
}

const ISO_DATE_GLOB: &str = "[0-9][0-9][0-9][0-9]-[0-9][0-9]-[0-9][0-9]";

/// A stored date is readable only in its canonical `YYYY-MM-DD` form, the
/// form that orders correctly as text.
fn parse_stored_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .filter(|d| d.format("%Y-%m-%d").to_string() == raw)
}

pub struct FetchResult {
    /// Ordered by transaction date, then id.
    pub transactions: Vec<Transaction>,
    /// Rows whose date or amount could not be read.
    pub skipped: usize,
}

fn parse_amount_value(value: Value) -> std::result::Result<Option<Decimal>, String> {
    match value {
        Value::Null => Ok(None),
        Value::Integer(i) => Ok(Some(Decimal::from(i))),
        Value::Real(r) => Decimal::from_f64(r)
            .map(Some)
            .ok_or_else(|| format!("non-finite amount {r}")),
        Value::Text(s) if s.trim().is_empty() => Ok(None),
        Value::Text(s) => Decimal::from_str(s.trim())
            .map(Some)
            .map_err(|_| format!("unparseable amount {s:?}")),
        Value::Blob(_) => Err("binary amount".to_string()),
    }
}

pub fn fetch_transactions(conn: &Connection, filter: &TransactionFilter) -> Result<FetchResult> {
    let mut clauses = Vec::new();
    let mut params: Vec<String> = Vec::new();

    if let Some(range) = &filter.range {
        params.push(range.from.to_string());
        params.push(range.to.to_string());
        // Dates not stored as YYYY-MM-DD neither compare nor sort as text;
        // fetch them regardless so they are counted as skipped below.
        clauses.push(format!(
            "(transaction_date BETWEEN ?{} AND ?{} OR transaction_date NOT GLOB '{ISO_DATE_GLOB}')",
            params.len() - 1,
            params.len()
        ));
    }
    if let Some(flat) = &filter.flat_code {
        params.push(flat.clone());
        clauses.push(format!("flat_code = ?{}", params.len()));
    }
    if let Some(tag) = &filter.fund_tag {
        params.push(tag.clone());
        clauses.push(format!("fund_type = ?{}", params.len()));
    }
    let where_clause = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };

    let sql = format!(
        "SELECT id, transaction_date, voucher_type, voucher_no, COALESCE(flat_code, ''), \
         ledger_name, fund_type, amount \
         FROM ledger_transactions {where_clause} \
         ORDER BY transaction_date, id"
    );
    tracing::debug!(%sql, ?params, "fetching transactions");

    let mut stmt = conn.prepare(&sql)?;
    let param_values: Vec<&dyn rusqlite::types::ToSql> = params
        .iter()
        .map(|p| p as &dyn rusqlite::types::ToSql)
        .collect();
    #[allow(clippy::type_complexity)]
    let raw: Vec<(i64, String, String, String, String, Option<String>, Option<String>, Value)> = stmt
        .query_map(param_values.as_slice(), |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
                row.get(6)?,
                row.get(7)?,
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut transactions = Vec::with_capacity(raw.len());
    let mut skipped = 0usize;
    for (id, date, voucher_type, voucher_no, flat_code, ledger_name, fund_tag, amount) in raw {
        if let Some(wing) = &filter.wing {
            if &wing_of(&flat_code) != wing {
                continue;
            }
        }
        let Some(date) = parse_stored_date(&date) else {
            tracing::warn!(id, date = %date, "skipping transaction with unreadable date");
            skipped += 1;
            continue;
        };
        let amount = match parse_amount_value(amount) {
            Ok(a) => a,
            Err(reason) => {
                tracing::warn!(id, %reason, "skipping transaction with unreadable amount");
                skipped += 1;
                continue;
            }
        };
        transactions.push(Transaction {
            id: Some(id),
            date,
            voucher_type,
            voucher_no,
            flat_code,
            ledger_name,
            fund_tag,
            amount,
        });
    }

    if skipped > 0 {
        tracing::warn!(skipped, "some transactions could not be read");
    }
    Ok(FetchResult {
        transactions,
        skipped,
    })
}

// ---------------------------------------------------------------------------
// Flats and owners
// ---------------------------------------------------------------------------

/// Every known flat (from transactions or the owner directory), ordered by
/// flat code, optionally restricted to one wing.
pub fn list_flats(conn: &Connection, wing: Option<&str>) -> Result<Vec<Flat>> {
    let mut stmt = conn.prepare(
        "SELECT codes.flat_code, f.owner_name FROM ( \
             SELECT DISTINCT flat_code FROM ledger_transactions WHERE flat_code IS NOT NULL AND flat_code <> '' \
             UNION SELECT flat_code FROM flats \
         ) codes LEFT JOIN flats f ON f.flat_code = codes.flat_code \
         ORDER BY codes.flat_code",
    )?;
    let flats: Vec<Flat> = stmt
        .query_map([], |row| {
            let flat_code: String = row.get(0)?;
            Ok(Flat {
                wing: wing_of(&flat_code),
                flat_code,
                owner_name: row.get(1)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(match wing {
        Some(w) => flats.into_iter().filter(|f| f.wing == w).collect(),
        None => flats,
    })
}

pub fn list_wings(conn: &Connection) -> Result<Vec<String>> {
    let mut wings: Vec<String> = list_flats(conn, None)?
        .into_iter()
        .map(|f| f.wing)
        .filter(|w| !w.is_empty())
        .collect();
    wings.sort();
    wings.dedup();
    Ok(wings)
}

pub fn owner_directory(conn: &Connection) -> Result<BTreeMap<String, String>> {
    let mut stmt = conn.prepare(
        "SELECT flat_code, owner_name FROM flats WHERE owner_name IS NOT NULL AND owner_name <> ''",
    )?;
    let owners = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<std::result::Result<BTreeMap<String, String>, _>>()?;
    Ok(owners)
}

pub fn owner_of(conn: &Connection, flat_code: &str) -> Result<Option<String>> {
    let mut stmt = conn.prepare("SELECT owner_name FROM flats WHERE flat_code = ?1")?;
    let mut rows = stmt.query([flat_code])?;
    match rows.next()? {
        Some(row) => Ok(row.get::<_, Option<String>>(0)?.filter(|o| !o.is_empty())),
        None => Ok(None),
    }
}

pub fn set_owner(conn: &Connection, flat_code: &str, owner_name: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO flats (flat_code, owner_name) VALUES (?1, ?2) \
         ON CONFLICT(flat_code) DO UPDATE SET owner_name = excluded.owner_name, updated_at = datetime('now')",
        [flat_code.trim(), owner_name.trim()],
    )?;
    tracing::info!(flat_code, owner_name, "owner recorded");
    Ok(())
}
