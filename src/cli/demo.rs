use chrono::{Datelike, Local, Months, NaiveDate};
use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::cli::open_db;
use crate::db::{get_metadata, init_db, set_metadata};
use crate::error::Result;
use crate::models::FundBucket;
use crate::settings::load_settings;
use crate::store::set_owner;

const DEMO_MARKER: &str = "demo_loaded";

struct DemoFlat {
    flat_code: &'static str,
    owner: &'static str,
    /// Monthly maintenance in whole rupees.
    maintenance: i64,
    /// Pays every `pays_every` months; 1 means always on time.
    pays_every: usize,
    /// Older flats whose entries carry no fund tag.
    legacy: bool,
}

const FLATS: &[DemoFlat] = &[
    DemoFlat { flat_code: "A 101", owner: "R. Sharma", maintenance: 2500, pays_every: 1, legacy: false },
    DemoFlat { flat_code: "A 102", owner: "Mehta (HUF)", maintenance: 2500, pays_every: 2, legacy: false },
    DemoFlat { flat_code: "A 103", owner: "S. Iyer", maintenance: 3200, pays_every: 1, legacy: false },
    DemoFlat { flat_code: "A 104", owner: "Interest Holdings LLP", maintenance: 3200, pays_every: 3, legacy: false },
    DemoFlat { flat_code: "B 201", owner: "K. D'Souza", maintenance: 2800, pays_every: 1, legacy: false },
    DemoFlat { flat_code: "B 202", owner: "P. Nair", maintenance: 2800, pays_every: 4, legacy: true },
    DemoFlat { flat_code: "B 203", owner: "A. Khan", maintenance: 2800, pays_every: 1, legacy: true },
];

const MRF_QUARTERLY: i64 = 1500;

struct DemoTxn {
    date: NaiveDate,
    voucher_type: &'static str,
    voucher_no: String,
    flat_code: &'static str,
    ledger_name: String,
    fund: Option<FundBucket>,
    amount: Decimal,
}

fn month_start(today: NaiveDate, months_ago: u32) -> NaiveDate {
    let first = today.with_day(1).unwrap_or(today);
    first - Months::new(months_ago)
}

fn last_day(first: NaiveDate) -> NaiveDate {
    (first + Months::new(1)).pred_opt().unwrap_or(first)
}

/// Build 12 months of bills, receipts and interest ending at the current month.
fn generate_transactions(today: NaiveDate) -> Vec<DemoTxn> {
    let mut txns = Vec::new();
    let mut voucher = 0u32;
    let mut next_no = |prefix: &str| {
        voucher += 1;
        format!("{prefix}-{voucher:04}")
    };

    for i in 0..12u32 {
        let first = month_start(today, 11 - i);
        let idx = i as usize;

        for flat in FLATS {
            let tag = |bucket: FundBucket| if flat.legacy { None } else { Some(bucket) };
            let maintenance = Decimal::from(flat.maintenance);

            txns.push(DemoTxn {
                date: first,
                voucher_type: "Bill",
                voucher_no: next_no("BL"),
                flat_code: flat.flat_code,
                ledger_name: flat.owner.to_string(),
                fund: tag(FundBucket::Maintenance),
                amount: -maintenance,
            });

            let quarter = idx % 3 == 0;
            if quarter {
                txns.push(DemoTxn {
                    date: first,
                    voucher_type: "Bill",
                    voucher_no: next_no("BL"),
                    flat_code: flat.flat_code,
                    ledger_name: format!("{} (Major Repair Fund)", flat.owner),
                    fund: tag(FundBucket::MajorRepairFund),
                    amount: -Decimal::from(MRF_QUARTERLY),
                });
            }

            let pays = (idx + 1) % flat.pays_every == 0;
            if pays {
                let months_covered = Decimal::from(flat.pays_every as i64);
                txns.push(DemoTxn {
                    date: first + chrono::Days::new(9),
                    voucher_type: "Receipt",
                    voucher_no: next_no("RC"),
                    flat_code: flat.flat_code,
                    ledger_name: flat.owner.to_string(),
                    fund: tag(FundBucket::Maintenance),
                    amount: maintenance * months_covered,
                });
            } else {
                // 21% p.a. simple interest on the overdue month, rounded to paise.
                let interest = (maintenance * Decimal::new(175, 4)).round_dp(2);
                txns.push(DemoTxn {
                    date: last_day(first),
                    voucher_type: "Journal",
                    voucher_no: next_no("JV"),
                    flat_code: flat.flat_code,
                    ledger_name: format!("{} - Interest", flat.owner),
                    fund: tag(FundBucket::MaintenanceInterest),
                    amount: -interest,
                });
                if quarter {
                    let mrf_interest = (Decimal::from(MRF_QUARTERLY) * Decimal::new(175, 4)).round_dp(2);
                    txns.push(DemoTxn {
                        date: last_day(first),
                        voucher_type: "Journal",
                        voucher_no: next_no("JV"),
                        flat_code: flat.flat_code,
                        ledger_name: format!("{} (Major Repair Fund - Int.) FY{}", flat.owner, first.year() % 100),
                        fund: tag(FundBucket::MajorRepairFundInterest),
                        amount: -mrf_interest,
                    });
                }
            }
        }
    }

    txns.sort_by_key(|t| t.date);
    txns
}

fn insert_demo_data(conn: &Connection, today: NaiveDate) -> Result<usize> {
    let txns = generate_transactions(today);

    let tx = conn.unchecked_transaction()?;
    for flat in FLATS {
        set_owner(&tx, flat.flat_code, flat.owner)?;
    }
    for t in &txns {
        tx.execute(
            "INSERT INTO ledger_transactions \
             (transaction_date, voucher_type, voucher_no, flat_code, ledger_name, fund_type, amount) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                t.date.to_string(),
                t.voucher_type,
                t.voucher_no,
                t.flat_code,
                t.ledger_name,
                t.fund.map(|f| f.tag()),
                t.amount.to_string(),
            ],
        )?;
    }
    set_metadata(&tx, DEMO_MARKER, "1")?;
    tx.commit()?;

    Ok(txns.len())
}

pub fn run() -> Result<()> {
    let settings = load_settings();
    let conn = open_db(&settings)?;
    init_db(&conn)?;

    if get_metadata(&conn, DEMO_MARKER).is_some() {
        println!("Demo data already loaded.");
        return Ok(());
    }

    let txn_count = insert_demo_data(&conn, Local::now().date_naive())?;

    println!("Demo data loaded!");
    println!("  Flats:        {}", FLATS.len());
    println!("  Transactions: {txn_count}");
    println!();
    println!("Try these next:");
    println!("  society-ledger flats list");
    println!("  society-ledger report summary");
    println!("  society-ledger report statement 'A 102' --fund maintenance");
    println!("  society-ledger report summary --strategy pattern --wing B");

    Ok(())
}
