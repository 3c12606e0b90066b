//! TOML configuration management shared by the server and the CLI.
//!
//! A binary declares its configuration struct and implements
//! [`ConfigManager`] for it. The provided methods take care of locating the
//! file (`--config` flag, then `{PROJECT}_CONFIG`, then
//! `<config_dir>/ecoflex/<file_name>`), parsing it, rendering it back to TOML
//! and exporting it as environment variables.

use std::path::PathBuf;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{Error, Result};

/// Behaviour shared by every TOML-backed configuration struct.
pub trait ConfigManager: Serialize + DeserializeOwned + Default {
    /// Name used for the config directory and the env-var prefix.
    fn project_name() -> &'static str {
        "ecoflex"
    }

    /// File name inside the project config directory.
    fn file_name() -> &'static str;

    /// Environment variable prefix, e.g. `ECOFLEX`.
    fn env_prefix() -> String {
        Self::project_name().to_uppercase().replace(['-', ' '], "_")
    }

    /// Apply `{PREFIX}_*` environment overrides after loading.
    fn apply_env_overrides(&mut self) -> Result<()> {
        Ok(())
    }

    /// `<config_dir>/<project>/<file_name>` for this platform.
    fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(Self::project_name()).join(Self::file_name()))
    }

    /// Explicit path first, then `{PREFIX}_CONFIG`, then the default path.
    fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(PathBuf::from(path));
        }
        if let Ok(path) = std::env::var(format!("{}_CONFIG", Self::env_prefix())) {
            if !path.trim().is_empty() {
                return Some(PathBuf::from(path));
            }
        }
        Self::default_config_path()
    }

    /// Load from the resolved path, falling back to defaults when the file
    /// does not exist, then apply environment overrides.
    fn load(explicit: Option<&str>) -> Result<Self> {
        let mut config = match Self::resolve_config_path(explicit) {
            Some(path) if path.exists() => {
                let content =
                    std::fs::read_to_string(&path).map_err(|e| Error::io_with_path(e, &path))?;
                toml::from_str(&content).map_err(|e| {
                    Error::config(format!("Failed to parse {}: {e}", path.display()))
                })?
            }
            _ => Self::default(),
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Render as pretty TOML.
    fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Flatten into `PREFIX_SECTION_KEY=value` pairs.
    fn to_env_vars(&self) -> Result<Vec<(String, String)>> {
        let value = toml::Value::try_from(self).map_err(|e| Error::config(e.to_string()))?;
        let mut vars = Vec::new();
        flatten(&Self::env_prefix(), &value, &mut vars);
        Ok(vars)
    }
}

fn flatten(prefix: &str, value: &toml::Value, out: &mut Vec<(String, String)>) {
    match value {
        toml::Value::Table(table) => {
            for (key, inner) in table {
                let name = format!("{prefix}_{}", key.to_uppercase().replace('-', "_"));
                flatten(&name, inner, out);
            }
        }
        toml::Value::String(s) => out.push((prefix.to_string(), s.clone())),
        other => out.push((prefix.to_string(), other.to_string())),
    }
}

/// Reads `name` from the environment and parses it, if set and non-blank.
pub fn env_override<T>(name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| Error::config(format!("{name}: {e}"))),
        _ => Ok(None),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    #[serde(default)]
    struct Sample {
        name: String,
        listen: Listen,
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    #[serde(default)]
    struct Listen {
        port: u16,
    }

    impl Default for Sample {
        fn default() -> Self {
            Self {
                name: "demo".into(),
                listen: Listen::default(),
            }
        }
    }

    impl Default for Listen {
        fn default() -> Self {
            Self { port: 8080 }
        }
    }

    impl ConfigManager for Sample {
        fn file_name() -> &'static str {
            "sample.toml"
        }
    }

    #[test]
    fn test_explicit_path_wins() {
        let path = Sample::resolve_config_path(Some("/explicit/sample.toml")).unwrap();
        assert_eq!(path, PathBuf::from("/explicit/sample.toml"));
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("absent.toml");
        let config = Sample::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config, Sample::default());
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("sample.toml");
        std::fs::write(&path, "[listen]\nport = 9000\n").unwrap();
        let config = Sample::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.listen.port, 9000);
        assert_eq!(config.name, "demo");
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("sample.toml");
        std::fs::write(&path, "listen = [").unwrap();
        let err = Sample::load(Some(path.to_str().unwrap())).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn test_env_vars_are_flattened() {
        let vars = Sample::default().to_env_vars().unwrap();
        assert!(vars.contains(&("ECOFLEX_NAME".into(), "demo".into())));
        assert!(vars.contains(&("ECOFLEX_LISTEN_PORT".into(), "8080".into())));
    }

    #[test]
    fn test_env_override_parses() {
        assert_eq!(
            env_override::<u16>("ECOFLEX_TEST_SURELY_UNSET_VAR").unwrap(),
            None
        );
    }
}
