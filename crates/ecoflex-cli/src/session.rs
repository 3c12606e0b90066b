//! Persisted login session.
//!
//! After a successful login the token and account summary are written as
//! JSON to `<data_dir>/ecoflex/session.json` (or the configured
//! `session_file`). `logout` deletes the file.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use ecoflex_core::Role;
use ecoflex_core::api::AuthResponse;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// What is remembered between invocations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Bearer token.
    pub token: String,
    /// Account name.
    pub username: String,
    /// Account type.
    pub role: Role,
    /// Account id.
    pub user_id: i64,
    /// API the token was issued by.
    pub api_url: String,
    /// When the login happened.
    pub logged_in_at: DateTime<Utc>,
}

impl Session {
    /// Session for a fresh login against `api_url`.
    pub fn from_login(auth: AuthResponse, api_url: impl Into<String>) -> Self {
        Self {
            token: auth.token,
            username: auth.username,
            role: auth.role,
            user_id: auth.user_id,
            api_url: api_url.into(),
            logged_in_at: Utc::now(),
        }
    }
}

/// Reads and writes the session file.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Store backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the configured path, else in the platform data directory.
    pub fn locate(configured: Option<&Path>) -> Result<Self> {
        if let Some(path) = configured {
            return Ok(Self::new(path));
        }
        dirs::data_dir()
            .map(|dir| Self::new(dir.join("ecoflex").join("session.json")))
            .ok_or_else(|| Error::input("Could not determine a data directory for the session"))
    }

    /// File backing this store.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Saved session, if any.
    pub fn load(&self) -> Result<Option<Session>> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::session(&self.path, e)),
        };
        match serde_json::from_str(&text) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring unreadable session");
                Ok(None)
            }
        }
    }

    /// Saved session, or [`Error::NotLoggedIn`].
    pub fn require(&self) -> Result<Session> {
        self.load()?.ok_or(Error::NotLoggedIn)
    }

    /// Writes `session`, replacing any previous one.
    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| Error::session(parent, e))?;
        }
        let json = serde_json::to_string_pretty(session).map_err(|e| Error::session(&self.path, e))?;
        std::fs::write(&self.path, json).map_err(|e| Error::session(&self.path, e))?;
        restrict_permissions(&self.path)?;
        tracing::debug!(path = %self.path.display(), "session saved");
        Ok(())
    }

    /// Removes the session; `false` when there was none.
    pub fn clear(&self) -> Result<bool> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::session(&self.path, e)),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| Error::session(path, e))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> Session {
        Session::from_login(
            AuthResponse {
                token: "tok".into(),
                username: "asha".into(),
                role: Role::Family,
                user_id: 7,
            },
            "http://localhost:8080/api",
        )
    }

    #[test]
    fn test_missing_file_is_no_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        assert!(store.load().unwrap().is_none());
        assert!(matches!(store.require(), Err(Error::NotLoggedIn)));
    }

    #[test]
    fn test_save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("deep/dir/session.json"));
        let session = sample();
        store.save(&session).unwrap();
        assert_eq!(store.load().unwrap(), Some(session));
        assert!(store.clear().unwrap());
        assert!(!store.clear().unwrap());
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_wire_names_are_camel_case() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["userId"], 7);
        assert_eq!(json["role"], "FAMILY");
    }

    #[test]
    fn test_corrupt_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(SessionStore::new(&path).load().unwrap().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_session_file_is_private() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        store.save(&sample()).unwrap();
        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_configured_path_wins() {
        let store = SessionStore::locate(Some(Path::new("/tmp/custom.json"))).unwrap();
        assert_eq!(store.path(), Path::new("/tmp/custom.json"));
    }
}
