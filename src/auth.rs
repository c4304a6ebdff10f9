//! Password gate for the report commands.
//!
//! There is no process-wide "logged in" flag. A [`Gate`] is built from the
//! stored argon2 hash, [`Gate::authenticate`] exchanges the password for a
//! signed, expiring [`AuthToken`], and every report call validates that
//! token again through [`Session::check`].

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};
use crate::settings::Settings;

const TOKEN_SUBJECT: &str = "reports";

/// Argon2 PHC string for `password`, with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored_hash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Store a new password hash in `settings`.
pub fn set_password(settings: &mut Settings, password: &str) -> Result<()> {
    if password.trim().is_empty() {
        return Err(LedgerError::Other("Password must not be empty".into()));
    }
    settings.password_hash = Some(hash_password(password)?);
    Ok(())
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: usize,
    exp: usize,
}

#[derive(Debug, Clone)]
pub struct AuthToken {
    issued_at: DateTime<Utc>,
    jwt: String,
}

impl AuthToken {
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }
}

#[derive(Debug, Clone)]
pub struct Gate {
    hash: String,
    lifetime: Duration,
}

impl Gate {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        match settings.password_hash.as_deref() {
            Some(hash) if !hash.is_empty() => Ok(Self {
                hash: hash.to_string(),
                lifetime: Duration::minutes(settings.session_minutes.max(1)),
            }),
            _ => Err(LedgerError::PasswordNotSet),
        }
    }

    /// Tokens are signed with the stored hash, so replacing the password
    /// invalidates every token issued before.
    fn key(&self) -> &[u8] {
        self.hash.as_bytes()
    }

    pub fn authenticate(&self, password: &str) -> Result<AuthToken> {
        self.authenticate_at(password, Utc::now())
    }

    fn authenticate_at(&self, password: &str, now: DateTime<Utc>) -> Result<AuthToken> {
        if !verify_password(password, &self.hash)? {
            tracing::warn!("rejected report password");
            return Err(LedgerError::BadPassword);
        }
        let claims = Claims {
            sub: TOKEN_SUBJECT.to_string(),
            iat: now.timestamp() as usize,
            exp: (now + self.lifetime).timestamp() as usize,
        };
        let jwt = encode(&Header::default(), &claims, &EncodingKey::from_secret(self.key()))
            .map_err(|e| LedgerError::Other(format!("token encode error: {e}")))?;
        Ok(AuthToken { issued_at: now, jwt })
    }

    pub fn validate(&self, token: &AuthToken) -> Result<()> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.sub = Some(TOKEN_SUBJECT.to_string());
        decode::<Claims>(&token.jwt, &DecodingKey::from_secret(self.key()), &validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "token rejected");
                LedgerError::InvalidToken
            })?;
        Ok(())
    }
}

/// A gate paired with the token issued for the current request.
pub struct Session {
    gate: Gate,
    token: AuthToken,
}

impl Session {
    pub fn new(gate: Gate, token: AuthToken) -> Self {
        Self { gate, token }
    }

    pub fn check(&self) -> Result<()> {
        self.gate.validate(&self.token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate_with(password: &str) -> Gate {
        let mut settings = Settings::default();
        set_password(&mut settings, password).unwrap();
        Gate::from_settings(&settings).unwrap()
    }

    #[test]
    fn test_gate_requires_password() {
        let err = Gate::from_settings(&Settings::default()).unwrap_err();
        assert!(matches!(err, LedgerError::PasswordNotSet));
    }

    #[test]
    fn test_hash_is_argon2_phc() {
        let hash = hash_password("s3cret").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("s3cret", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn test_unreadable_stored_hash_is_an_error() {
        let settings = Settings {
            password_hash: Some("not-a-phc-string".into()),
            ..Settings::default()
        };
        let gate = Gate::from_settings(&settings).unwrap();
        assert!(matches!(gate.authenticate("pw"), Err(LedgerError::PasswordHash(_))));
    }

    #[test]
    fn test_authenticate_and_validate() {
        let gate = gate_with("s3cret");
        let token = gate.authenticate("s3cret").unwrap();
        gate.validate(&token).unwrap();
        assert!(matches!(gate.authenticate("wrong"), Err(LedgerError::BadPassword)));
    }

    #[test]
    fn test_token_expires() {
        let gate = gate_with("s3cret");
        let stale = gate.authenticate_at("s3cret", Utc::now() - Duration::minutes(60)).unwrap();
        assert!(matches!(gate.validate(&stale), Err(LedgerError::InvalidToken)));
        let recent = gate.authenticate_at("s3cret", Utc::now() - Duration::minutes(5)).unwrap();
        gate.validate(&recent).unwrap();
    }

    #[test]
    fn test_token_from_other_gate_is_rejected() {
        let a = gate_with("same");
        let b = gate_with("same");
        let token = a.authenticate("same").unwrap();
        assert!(matches!(b.validate(&token), Err(LedgerError::InvalidToken)));
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let gate = gate_with("s3cret");
        let mut token = gate.authenticate("s3cret").unwrap();
        token.jwt.push('x');
        assert!(matches!(gate.validate(&token), Err(LedgerError::InvalidToken)));
    }

    #[test]
    fn test_salts_differ() {
        let mut a = Settings::default();
        let mut b = Settings::default();
        set_password(&mut a, "pw").unwrap();
        set_password(&mut b, "pw").unwrap();
        assert_ne!(a.password_hash, b.password_hash);
        assert!(set_password(&mut a, "  ").is_err());
    }

    #[test]
    fn test_session_check() {
        let gate = gate_with("pw");
        let token = gate.authenticate("pw").unwrap();
        Session::new(gate, token).check().unwrap();
    }
}
