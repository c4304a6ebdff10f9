use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use rusqlite::Connection;
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};

use crate::error::{LedgerError, Result};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse an amount as exported by accounting packages: thousands separators,
/// currency symbols, parenthesized negatives and trailing Dr/Cr markers.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let mut s: String = raw
        .chars()
        .filter(|c| !matches!(c, ',' | '"' | '₹' | '$') && !c.is_whitespace())
        .collect();
    if s.is_empty() {
        return None;
    }

    let mut debit = false;
    let upper = s.to_ascii_uppercase();
    if let Some(stripped) = upper.strip_suffix("DR") {
        debit = true;
        s = stripped.to_string();
    } else if let Some(stripped) = upper.strip_suffix("CR") {
        s = stripped.to_string();
    }
    if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        return Decimal::from_str(inner).ok().map(|d| -d.abs());
    }
    Decimal::from_str(&s)
        .ok()
        .map(|d| if debit { -d.abs() } else { d })
}

fn dmy_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{1,2})[/.-](\d{1,2})[/.-](\d{4})$").expect("valid regex"))
}

/// Accepts `YYYY-MM-DD` or day-first `DD/MM/YYYY` (also `-` or `.` separated).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(d);
    }
    let caps = dmy_pattern().captures(raw)?;
    let d: u32 = caps[1].parse().ok()?;
    let m: u32 = caps[2].parse().ok()?;
    let y: i32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(y, m, d)
}

fn compute_checksum(file_path: &Path) -> Result<String> {
    let data = std::fs::read(file_path)?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(hex::encode(hasher.finalize()))
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Intermediate representation of one CSV line before DB insert.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    pub date: NaiveDate,
    pub voucher_type: String,
    pub voucher_no: String,
    pub flat_code: String,
    pub ledger_name: Option<String>,
    pub fund_type: Option<String>,
    pub amount: Decimal,
}

#[derive(Debug)]
pub struct ParsedFile {
    pub rows: Vec<ParsedRow>,
    pub malformed: usize,
}

const REQUIRED_COLUMNS: &[&str] = &["date", "voucher_type", "voucher_no", "flat_code", "amount"];

fn column_index(headers: &csv::StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim().to_ascii_lowercase().replace(' ', "_"), i))
        .collect()
}

fn optional_field(record: &csv::StringRecord, idx: Option<usize>) -> Option<String> {
    idx.and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

pub fn parse_csv<R: std::io::Read>(reader: R) -> Result<ParsedFile> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let columns = column_index(rdr.headers()?);
    for required in REQUIRED_COLUMNS {
        if !columns.contains_key(*required) {
            return Err(LedgerError::MissingColumn(required.to_string()));
        }
    }
    let col = |name: &str| columns.get(name).copied();

    let mut rows = Vec::new();
    let mut malformed = 0usize;
    for (line, result) in rdr.records().enumerate() {
        let Ok(record) = result else {
            malformed += 1;
            continue;
        };
        let field = |name: &str| optional_field(&record, col(name));

        let date = field("date").as_deref().and_then(parse_date);
        let amount = field("amount").as_deref().and_then(parse_amount);
        let flat_code = field("flat_code");
        let (Some(date), Some(amount), Some(flat_code)) = (date, amount, flat_code) else {
            tracing::warn!(line = line + 2, "skipping malformed import row");
            malformed += 1;
            continue;
        };

        rows.push(ParsedRow {
            date,
            voucher_type: field("voucher_type").unwrap_or_default(),
            voucher_no: field("voucher_no").unwrap_or_default(),
            flat_code,
            ledger_name: field("ledger_name"),
            fund_type: field("fund_type").map(|f| f.to_ascii_lowercase()),
            amount,
        });
    }
    Ok(ParsedFile { rows, malformed })
}

// ---------------------------------------------------------------------------
// import_file
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct ImportResult {
    pub imported: usize,
    pub malformed: usize,
    pub duplicate_file: bool,
}

pub fn import_file(conn: &Connection, file_path: &Path) -> Result<ImportResult> {
    let checksum = compute_checksum(file_path)?;
    {
        let mut stmt = conn.prepare("SELECT 1 FROM imports WHERE checksum = ?1")?;
        if stmt.exists([&checksum])? {
            tracing::info!(file = %file_path.display(), "file already imported");
            return Ok(ImportResult {
                imported: 0,
                malformed: 0,
                duplicate_file: true,
            });
        }
    }

    let file = std::fs::File::open(file_path)?;
    let parsed = parse_csv(std::io::BufReader::new(file))?;

    let tx = conn.unchecked_transaction()?;
    let min_date = parsed.rows.iter().map(|r| r.date).min();
    let max_date = parsed.rows.iter().map(|r| r.date).max();
    tx.execute(
        "INSERT INTO imports (filename, record_count, date_range_start, date_range_end, checksum) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![
            file_path.file_name().and_then(|n| n.to_str()).unwrap_or(""),
            parsed.rows.len() as i64,
            min_date.map(|d| d.to_string()),
            max_date.map(|d| d.to_string()),
            checksum,
        ],
    )?;
    let import_id = tx.last_insert_rowid();

    {
        let mut insert = tx.prepare(
            "INSERT INTO ledger_transactions \
             (transaction_date, voucher_type, voucher_no, flat_code, ledger_name, fund_type, amount, import_id) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?;
        for row in &parsed.rows {
            insert.execute(rusqlite::params![
                row.date.to_string(),
                row.voucher_type,
                row.voucher_no,
                row.flat_code,
                row.ledger_name,
                row.fund_type,
                row.amount.to_string(),
                import_id,
            ])?;
        }
    }
    tx.commit()?;

    tracing::info!(
        imported = parsed.rows.len(),
        malformed = parsed.malformed,
        "import complete"
    );
    Ok(ImportResult {
        imported: parsed.rows.len(),
        malformed: parsed.malformed,
        duplicate_file: false,
    })
}
