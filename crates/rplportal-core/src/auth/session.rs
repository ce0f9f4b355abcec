use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Session file name in cache directory
const SESSION_FILE: &str = "session.json";

/// Token lifetime used when the auth service omits `expires_in`
pub const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub user_id: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub expires_in_secs: i64,
}

impl SessionData {
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.created_at + Duration::seconds(self.expires_in_secs)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at()
    }

    /// Minutes remaining until expiry (for display)
    pub fn minutes_until_expiry(&self) -> i64 {
        (self.expires_at() - Utc::now()).num_minutes().max(0)
    }
}

pub struct Session {
    cache_dir: PathBuf,
    pub data: Option<SessionData>,
}

impl Session {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            data: None,
        }
    }

    /// Load session from disk. An expired session is discarded.
    pub fn load(&mut self) -> Result<bool> {
        let path = self.session_path();
        if !path.exists() {
            return Ok(false);
        }

        let contents = std::fs::read_to_string(&path).context("Failed to read session file")?;
        let data: SessionData =
            serde_json::from_str(&contents).context("Failed to parse session file")?;

        if data.is_expired() {
            debug!(email = %data.email, "Discarding expired session");
            self.clear()?;
            return Ok(false);
        }

        self.data = Some(data);
        Ok(true)
    }

    pub fn save(&self) -> Result<()> {
        if let Some(ref data) = self.data {
            let path = self.session_path();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).context("Failed to create cache directory")?;
            }
            let contents = serde_json::to_string_pretty(data)?;
            std::fs::write(path, contents).context("Failed to write session file")?;
        }
        Ok(())
    }

    /// Forget the token and remove the session file
    pub fn clear(&mut self) -> Result<()> {
        self.data = None;
        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(path).context("Failed to remove session file")?;
        }
        Ok(())
    }

    pub fn update(&mut self, data: SessionData) {
        self.data = Some(data);
    }

    pub fn token(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.access_token.as_str())
    }

    pub fn user_id(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.user_id.as_str())
    }

    /// Check if session is valid (exists and not expired)
    pub fn is_valid(&self) -> bool {
        self.data.as_ref().map(|d| !d.is_expired()).unwrap_or(false)
    }

    fn session_path(&self) -> PathBuf {
        self.cache_dir.join(SESSION_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(created_at: DateTime<Utc>, expires_in_secs: i64) -> SessionData {
        SessionData {
            access_token: "token-abc".to_string(),
            refresh_token: Some("refresh".to_string()),
            user_id: "user-1".to_string(),
            email: "staff@example.com".to_string(),
            created_at,
            expires_in_secs,
        }
    }

    fn temp_cache_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("rplportal-test-{}-{}", name, std::process::id()))
    }

    #[test]
    fn test_expiry_boundary() {
        let created = Utc::now();
        let data = sample(created, 3600);
        assert!(!data.is_expired_at(created + Duration::seconds(3600)));
        assert!(data.is_expired_at(created + Duration::seconds(3601)));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = temp_cache_dir("roundtrip");
        let mut session = Session::new(dir.clone());
        session.update(sample(Utc::now(), 3600));
        session.save().unwrap();

        let mut loaded = Session::new(dir.clone());
        assert!(loaded.load().unwrap());
        assert_eq!(loaded.token(), Some("token-abc"));
        assert_eq!(loaded.user_id(), Some("user-1"));
        assert!(loaded.is_valid());

        loaded.clear().unwrap();
        assert!(!dir.join(SESSION_FILE).exists());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_expired_session_is_discarded() {
        let dir = temp_cache_dir("expired");
        let mut session = Session::new(dir.clone());
        session.update(sample(Utc::now() - Duration::hours(2), 3600));
        session.save().unwrap();

        let mut loaded = Session::new(dir.clone());
        assert!(!loaded.load().unwrap());
        assert!(loaded.data.is_none());
        assert!(!dir.join(SESSION_FILE).exists());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_missing_file_loads_nothing() {
        let mut session = Session::new(temp_cache_dir("missing"));
        assert!(!session.load().unwrap());
        assert!(!session.is_valid());
    }
}
