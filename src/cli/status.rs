use crate::db::{get_connection, get_metadata};
use crate::error::Result;
use crate::fmt::format_bytes;
use crate::settings::load_settings;

pub fn run() -> Result<()> {
    let settings = load_settings();
    let db_path = settings.db_path();

    println!("Data dir:   {}", settings.data_dir);
    println!("Database:   {}", db_path.display());
    println!("Classifier: {}", settings.classifier);
    println!(
        "Password:   {}",
        if settings.password_hash.is_some() { "set" } else { "(not set)" }
    );

    if db_path.exists() {
        let size = std::fs::metadata(&db_path)?.len();
        println!("DB size:    {}", format_bytes(size));

        let conn = get_connection(&db_path)?;

        let society = get_metadata(&conn, "society_name");
        println!("Society:    {}", society.as_deref().unwrap_or("(not set)"));

        let transactions: i64 =
            conn.query_row("SELECT count(*) FROM ledger_transactions", [], |r| r.get(0))?;
        let flats: i64 = conn.query_row(
            "SELECT count(DISTINCT flat_code) FROM ledger_transactions WHERE flat_code IS NOT NULL",
            [],
            |r| r.get(0),
        )?;
        let owners: i64 = conn.query_row(
            "SELECT count(*) FROM flats WHERE owner_name IS NOT NULL AND owner_name <> ''",
            [],
            |r| r.get(0),
        )?;
        let untagged: i64 = conn.query_row(
            "SELECT count(*) FROM ledger_transactions WHERE fund_type IS NULL OR fund_type = ''",
            [],
            |r| r.get(0),
        )?;
        let imports: i64 = conn.query_row("SELECT count(*) FROM imports", [], |r| r.get(0))?;

        println!();
        println!("Transactions:  {transactions}");
        println!("Untagged:      {untagged}");
        println!("Flats:         {flats}");
        println!("Owners:        {owners}");
        println!("Imports:       {imports}");
    } else {
        println!();
        println!("Database not found. Run `society-ledger init` to set up.");
    }

    Ok(())
}
