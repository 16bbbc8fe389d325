//! Local login session.
//!
//! The backend issues access tokens; this module only remembers one between
//! commands and decides when it is too old to use.

pub mod prompt;
pub mod storage;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::AppError;

pub use prompt::prompt_for_token;
pub use storage::{clear_session, get_session_path, load_session, save_session};

/// Environment variable name for providing an access token without logging in
pub const ENV_TOKEN_VAR: &str = "PSIKOTES_ACCESS_TOKEN";

pub const SESSION_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub version: u32,
    pub access_token: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(access_token: String, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            version: SESSION_VERSION,
            access_token,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Check for an access token in the PSIKOTES_ACCESS_TOKEN environment variable.
/// Returns Some(token) if the env var is set and non-empty, None otherwise.
pub fn get_token_from_env() -> Option<String> {
    std::env::var(ENV_TOKEN_VAR)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Access token for the current command.
///
/// The environment variable wins. Otherwise the saved session must exist
/// and be unexpired; anything else means the user has to log in again.
pub fn require_session(path: &Path, now: DateTime<Utc>) -> Result<String, AppError> {
    if let Some(token) = get_token_from_env() {
        tracing::debug!("using access token from {}", ENV_TOKEN_VAR);
        return Ok(token);
    }
    active_token(path, now)
}

fn active_token(path: &Path, now: DateTime<Utc>) -> Result<String, AppError> {
    match load_session(path) {
        Ok(Some(session)) if !session.is_expired(now) => Ok(session.access_token),
        Ok(Some(session)) => {
            tracing::info!(expired_at = %session.expires_at, "session expired");
            Err(AppError::SessionExpired)
        }
        Ok(None) => Err(AppError::SessionExpired),
        Err(e) => {
            tracing::warn!("unreadable session file: {:#}", e);
            Err(AppError::SessionExpired)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_expiry() {
        let now = Utc::now();
        let session = Session::new("tok".to_string(), now, Duration::hours(12));
        assert!(!session.is_expired(now));
        assert!(!session.is_expired(now + Duration::hours(11)));
        assert!(session.is_expired(now + Duration::hours(12)));
    }

    #[test]
    fn test_active_token_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let now = Utc::now();
        save_session(&path, &Session::new("abc".to_string(), now, Duration::hours(1))).unwrap();

        assert_eq!(active_token(&path, now).unwrap(), "abc");
        assert!(matches!(
            active_token(&path, now + Duration::hours(2)),
            Err(AppError::SessionExpired)
        ));
    }

    #[test]
    fn test_missing_or_corrupt_session_is_expired() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        assert!(matches!(
            active_token(&path, Utc::now()),
            Err(AppError::SessionExpired)
        ));

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            active_token(&path, Utc::now()),
            Err(AppError::SessionExpired)
        ));
    }
}
