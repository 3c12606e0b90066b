//! CLI configuration (`<config_dir>/ecoflex/cli.toml`).

use std::path::PathBuf;

use ecoflex_client::DEFAULT_API_URL;
use ecoflex_core::config::env_override;
use ecoflex_core::{ConfigManager, Result};
use serde::{Deserialize, Serialize};

/// Settings for the `ecoflex` binary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// API root the client talks to.
    pub api_url: String,
    /// Where the login session is kept; the data directory when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_file: Option<PathBuf>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            session_file: None,
        }
    }
}

impl ConfigManager for CliConfig {
    fn file_name() -> &'static str {
        "cli.toml"
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        let prefix = Self::env_prefix();
        if let Some(url) = env_override::<String>(&format!("{prefix}_API_URL"))? {
            self.api_url = url;
        }
        if let Some(path) = env_override::<PathBuf>(&format!("{prefix}_SESSION_FILE"))? {
            self.session_file = Some(path);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_points_at_local_server() {
        let config = CliConfig::default();
        assert_eq!(config.api_url, "http://localhost:8080/api");
        assert!(config.session_file.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cli.toml");
        std::fs::write(
            &path,
            "api_url = \"http://eco.example:9000/api\"\nsession_file = \"/tmp/s.json\"\n",
        )
        .unwrap();
        let config = CliConfig::load(path.to_str()).unwrap();
        assert_eq!(config.api_url, "http://eco.example:9000/api");
        assert_eq!(config.session_file, Some(PathBuf::from("/tmp/s.json")));
    }

    #[test]
    fn test_default_renders_without_session_file() {
        let text = CliConfig::default().to_toml_string().unwrap();
        assert!(text.contains("api_url"));
        assert!(!text.contains("session_file"));
    }
}
