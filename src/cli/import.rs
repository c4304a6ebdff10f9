use std::path::PathBuf;

use crate::cli::open_db;
use crate::error::Result;
use crate::importer::import_file;
use crate::settings::load_settings;

pub fn run(file: &str) -> Result<()> {
    let file_path = PathBuf::from(file);
    let conn = open_db(&load_settings())?;

    let result = import_file(&conn, &file_path)?;

    if result.duplicate_file {
        println!("This file has already been imported (duplicate checksum).");
        return Ok(());
    }

    println!("{} imported, {} skipped (malformed)", result.imported, result.malformed);
    Ok(())
}
