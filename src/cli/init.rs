use std::path::PathBuf;

use crate::db::{get_connection, init_db, set_metadata};
use crate::error::Result;
use crate::settings::{load_settings, save_settings, settings_file_exists, shellexpand_path};

pub fn run(data_dir: Option<String>, society_name: Option<String>) -> Result<()> {
    let mut settings = load_settings();

    if let Some(dir) = data_dir {
        settings.data_dir = shellexpand_path(&dir);
    } else if !settings_file_exists() {
        // First run: prompt for data dir
        println!("Data directory [{}]: ", settings.data_dir);
        let mut input = String::new();
        std::io::stdin().read_line(&mut input).ok();
        let chosen = input.trim();
        if !chosen.is_empty() {
            settings.data_dir = shellexpand_path(chosen);
        }
    }
    if let Some(name) = society_name {
        settings.society_name = name;
    }

    save_settings(&settings)?;

    let resolved = PathBuf::from(&settings.data_dir);
    std::fs::create_dir_all(&resolved)?;
    std::fs::create_dir_all(resolved.join("imports"))?;

    let conn = get_connection(&settings.db_path())?;
    init_db(&conn)?;
    if !settings.society_name.is_empty() {
        set_metadata(&conn, "society_name", &settings.society_name)?;
    }

    println!("Initialized society-ledger at {}", resolved.display());
    if settings.password_hash.is_none() {
        println!("Run `society-ledger password set` before viewing reports.");
    }
    Ok(())
}
