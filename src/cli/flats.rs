use comfy_table::{Cell, Table};

use crate::cli::open_db;
use crate::error::Result;
use crate::settings::load_settings;
use crate::store;

pub fn list(wing: Option<&str>) -> Result<()> {
    let conn = open_db(&load_settings())?;
    let flats = store::list_flats(&conn, wing)?;

    if flats.is_empty() {
        println!("No flats found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Flat", "Wing", "Owner"]);
    for f in &flats {
        table.add_row(vec![
            Cell::new(&f.flat_code),
            Cell::new(&f.wing),
            Cell::new(f.owner_name.as_deref().unwrap_or("-")),
        ]);
    }
    println!("Flats ({})\n{table}", flats.len());
    Ok(())
}

pub fn wings() -> Result<()> {
    let conn = open_db(&load_settings())?;
    for wing in store::list_wings(&conn)? {
        println!("{wing}");
    }
    Ok(())
}

pub fn owner(flat: &str, owner: &str) -> Result<()> {
    let conn = open_db(&load_settings())?;
    store::set_owner(&conn, flat, owner)?;
    println!("Owner of {flat}: {owner}");
    Ok(())
}
