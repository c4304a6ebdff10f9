use zeroize::Zeroize;

use crate::auth::{self, Gate, Session};
use crate::error::{LedgerError, Result};
use crate::settings::{load_settings, save_settings, Settings};

pub const PASSWORD_ENV: &str = "SOCIETY_LEDGER_PASSWORD";
pub const NEW_PASSWORD_ENV: &str = "SOCIETY_LEDGER_NEW_PASSWORD";

/// Password from the environment, or prompted without echo.
fn read_password(prompt: &str) -> Result<String> {
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        return Ok(pw);
    }
    Ok(rpassword::prompt_password(prompt)?)
}

/// Authenticate for one report invocation.
pub(crate) fn open_session(settings: &Settings) -> Result<Session> {
    let gate = Gate::from_settings(settings)?;
    let mut password = read_password("Password: ")?;
    let token = gate.authenticate(password.trim());
    password.zeroize();
    Ok(Session::new(gate, token?))
}

/// New password from the environment, or prompted twice.
fn read_new_password(first_time: bool) -> Result<(String, String)> {
    if let Ok(pw) = std::env::var(NEW_PASSWORD_ENV) {
        return Ok((pw.clone(), pw));
    }
    if first_time {
        if let Ok(pw) = std::env::var(PASSWORD_ENV) {
            return Ok((pw.clone(), pw));
        }
    }
    Ok((
        rpassword::prompt_password("New password: ")?,
        rpassword::prompt_password("Confirm password: ")?,
    ))
}

/// Set the report password. Replacing an existing one requires the current
/// password first.
pub fn set() -> Result<()> {
    let mut settings = load_settings();

    let first_time = settings.password_hash.as_deref().map_or(true, str::is_empty);
    if !first_time {
        let gate = Gate::from_settings(&settings)?;
        let mut current = read_password("Current password: ")?;
        let verified = gate.authenticate(current.trim());
        current.zeroize();
        verified?;
    }

    let (mut password, mut confirm) = read_new_password(first_time)?;
    let outcome = if password.trim() != confirm.trim() {
        Err(LedgerError::Other("Passwords do not match".into()))
    } else {
        auth::set_password(&mut settings, password.trim())
    };
    password.zeroize();
    confirm.zeroize();
    outcome?;

    save_settings(&settings)?;
    tracing::info!(replaced = !first_time, "report password updated");
    println!("Report password updated.");
    Ok(())
}
