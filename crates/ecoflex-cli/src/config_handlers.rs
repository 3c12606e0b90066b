//! `ecoflex config ...` subcommands.
//!
//! The handlers are generic over [`ConfigManager`] and return the text to
//! print, so they can be tested without capturing stdout. Keys are dotted
//! paths into the TOML document (`api_url`, `section.key`).

use std::path::{Path, PathBuf};

use ecoflex_core::{ConfigManager, Error, Result};

use crate::cli::ConfigAction;
use crate::config::CliConfig;
use crate::prompt::Prompter;

/// Runs a config subcommand against [`CliConfig`] and writes the result
/// through `p`.
pub fn handle_config_command<P: Prompter + ?Sized>(
    config_path: Option<&str>,
    action: ConfigAction,
    p: &mut P,
) -> crate::Result<()> {
    let output = match action {
        ConfigAction::Path => config_path_report::<CliConfig>(config_path)?,
        ConfigAction::Get { key } => config_get::<CliConfig>(config_path, &key)?,
        ConfigAction::Set { key, value } => config_set::<CliConfig>(config_path, &key, &value)?,
        ConfigAction::Init { file, force } => {
            let target = file.as_deref().or(config_path);
            config_init::<CliConfig>(target, force)?
        }
        ConfigAction::Export { docker_env } => {
            config_export(&CliConfig::load(config_path)?, docker_env)?
        }
    };
    p.say(&output)
}

/// Resolved config path, with a hint when the file is missing.
pub fn config_path_report<C: ConfigManager>(config_path: Option<&str>) -> Result<String> {
    let path = C::resolve_config_path(config_path)
        .ok_or_else(|| Error::config("Could not determine config directory for this platform"))?;
    let mut report = path.display().to_string();
    if !path.exists() {
        report.push_str(&format!(
            "\n(not created yet; run `{} config init`)",
            C::project_name()
        ));
    }
    Ok(report)
}

/// Effective value of `key` (file plus defaults plus environment).
pub fn config_get<C: ConfigManager>(config_path: Option<&str>, key: &str) -> Result<String> {
    let config = C::load(config_path)?;
    let tree = toml::Value::try_from(&config).map_err(|e| Error::config(e.to_string()))?;
    lookup(&tree, key)
        .map(render_value)
        .ok_or_else(|| Error::config(format!("Key '{key}' not found in configuration")))
}

/// Writes `key = value` into an existing config file.
pub fn config_set<C: ConfigManager>(
    config_path: Option<&str>,
    key: &str,
    value: &str,
) -> Result<String> {
    let path = C::resolve_config_path(config_path)
        .ok_or_else(|| Error::config("Could not determine config directory"))?;
    if !path.exists() {
        return Err(Error::config(format!(
            "No config file at {}. Run `{} config init` first.",
            path.display(),
            C::project_name()
        )));
    }
    let mut doc = read_document(&path)?;
    insert(&mut doc, key, infer_value(value))?;

    // Refuse edits that would make the file unloadable.
    let check = toml::to_string(&doc).map_err(|e| Error::config(e.to_string()))?;
    toml::from_str::<C>(&check)
        .map_err(|e| Error::config(format!("Invalid value for '{key}': {e}")))?;

    let rendered = toml::to_string_pretty(&doc).map_err(|e| Error::config(e.to_string()))?;
    std::fs::write(&path, rendered).map_err(|e| Error::io_with_path(e, &path))?;
    Ok(format!("Set {key} = {value} in {}", path.display()))
}

/// Writes a file holding the default configuration.
pub fn config_init<C: ConfigManager>(file: Option<&str>, force: bool) -> Result<String> {
    let path = match file {
        Some(p) => PathBuf::from(p),
        None => C::default_config_path()
            .ok_or_else(|| Error::config("Could not determine config directory"))?,
    };
    if path.exists() && !force {
        return Err(Error::config(format!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        )));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;
    }
    std::fs::write(&path, C::default().to_toml_string()?)
        .map_err(|e| Error::io_with_path(e, &path))?;
    Ok(format!("Config file created at {}", path.display()))
}

/// `KEY=value` lines, or docker `--env` flags.
pub fn config_export<C: ConfigManager>(config: &C, docker_env: bool) -> Result<String> {
    let lines: Vec<String> = config
        .to_env_vars()?
        .into_iter()
        .map(|(key, value)| {
            if docker_env {
                format!("--env {key}={value}")
            } else {
                format!("{key}={value}")
            }
        })
        .collect();
    Ok(lines.join("\n"))
}

fn read_document(path: &Path) -> Result<toml::Value> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
    toml::from_str(&content)
        .map_err(|e| Error::config(format!("Failed to parse {}: {e}", path.display())))
}

/// Follows a dotted key through nested tables.
pub fn lookup<'a>(root: &'a toml::Value, key: &str) -> Option<&'a toml::Value> {
    key.split('.')
        .try_fold(root, |node, part| node.as_table()?.get(part))
}

/// Sets a dotted key, creating missing tables on the way.
pub fn insert(root: &mut toml::Value, key: &str, value: toml::Value) -> Result<()> {
    let (parents, leaf) = match key.rsplit_once('.') {
        Some((parents, leaf)) => (parents.split('.').collect::<Vec<_>>(), leaf),
        None => (Vec::new(), key),
    };
    if leaf.is_empty() || parents.iter().any(|p| p.is_empty()) {
        return Err(Error::config(format!("Invalid key '{key}'")));
    }
    let mut node = root;
    for part in parents {
        let table = node
            .as_table_mut()
            .ok_or_else(|| Error::config(format!("'{part}' is not a table")))?;
        node = table
            .entry(part.to_string())
            .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));
    }
    node.as_table_mut()
        .ok_or_else(|| Error::config(format!("Cannot set '{key}' on a non-table value")))?
        .insert(leaf.to_string(), value);
    Ok(())
}

/// Reads a command-line value as bool, integer, float or string, in that
/// order.
pub fn infer_value(raw: &str) -> toml::Value {
    match raw {
        "true" => toml::Value::Boolean(true),
        "false" => toml::Value::Boolean(false),
        _ => raw
            .parse::<i64>()
            .map(toml::Value::Integer)
            .or_else(|_| raw.parse::<f64>().map(toml::Value::Float))
            .unwrap_or_else(|_| toml::Value::String(raw.to_string())),
    }
}

/// Plain rendering for scalars, TOML for tables and arrays.
pub fn render_value(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Integer(i) => i.to_string(),
        toml::Value::Float(f) => f.to_string(),
        toml::Value::Boolean(b) => b.to_string(),
        toml::Value::Datetime(dt) => dt.to_string(),
        toml::Value::Array(_) | toml::Value::Table(_) => {
            toml::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::prompt::LinePrompter;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn config_file(dir: &TempDir, content: &str) -> String {
        let path = dir.path().join("cli.toml");
        std::fs::write(&path, content).unwrap();
        path.to_str().unwrap().to_string()
    }

    fn scripted() -> LinePrompter<Cursor<Vec<u8>>, Vec<u8>> {
        LinePrompter::new(Cursor::new(Vec::new()), Vec::new())
    }

    #[test]
    fn test_command_output_goes_through_prompter() {
        let dir = TempDir::new().unwrap();
        let path = config_file(&dir, "");

        let mut p = scripted();
        handle_config_command(Some(&path), ConfigAction::Path, &mut p).unwrap();
        assert_eq!(String::from_utf8(p.into_output()).unwrap(), format!("{path}\n"));

        let mut p = scripted();
        handle_config_command(
            Some(&path),
            ConfigAction::Set {
                key: "session_file".into(),
                value: "/tmp/s.json".into(),
            },
            &mut p,
        )
        .unwrap();
        let out = String::from_utf8(p.into_output()).unwrap();
        assert!(out.starts_with("Set session_file = /tmp/s.json"));

        let mut p = scripted();
        let err = handle_config_command(
            Some(&path),
            ConfigAction::Get { key: "nope".into() },
            &mut p,
        )
        .unwrap_err();
        assert!(err.user_message().contains("'nope' not found"));
        assert!(p.into_output().is_empty());
    }

    #[test]
    fn test_path_report_hints_at_init() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        let report = config_path_report::<CliConfig>(missing.to_str()).unwrap();
        assert!(report.starts_with(missing.to_str().unwrap()));
        assert!(report.contains("ecoflex config init"));

        let existing = config_file(&dir, "");
        let report = config_path_report::<CliConfig>(Some(&existing)).unwrap();
        assert_eq!(report, existing);
    }

    #[test]
    fn test_get_reads_file_value() {
        let dir = TempDir::new().unwrap();
        let path = config_file(&dir, "api_url = \"http://remote:9000/api\"\n");
        if std::env::var("ECOFLEX_API_URL").is_err() {
            assert_eq!(
                config_get::<CliConfig>(Some(&path), "api_url").unwrap(),
                "http://remote:9000/api"
            );
        }
    }

    #[test]
    fn test_get_unknown_key() {
        let dir = TempDir::new().unwrap();
        let path = config_file(&dir, "");
        let err = config_get::<CliConfig>(Some(&path), "nope").unwrap_err();
        assert!(err.to_string().contains("'nope' not found"));
    }

    #[test]
    fn test_set_updates_file() {
        let dir = TempDir::new().unwrap();
        let path = config_file(&dir, "api_url = \"http://a/api\"\n");
        let msg = config_set::<CliConfig>(Some(&path), "session_file", "/tmp/s.json").unwrap();
        assert!(msg.starts_with("Set session_file = /tmp/s.json"));
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("session_file = \"/tmp/s.json\""));
        assert!(written.contains("http://a/api"));
    }

    #[test]
    fn test_set_rejects_wrong_type() {
        let dir = TempDir::new().unwrap();
        let path = config_file(&dir, "api_url = \"http://a/api\"\n");
        let err = config_set::<CliConfig>(Some(&path), "api_url", "42").unwrap_err();
        assert!(err.to_string().contains("Invalid value for 'api_url'"));
        let untouched = std::fs::read_to_string(&path).unwrap();
        assert!(untouched.contains("http://a/api"));
    }

    #[test]
    fn test_set_requires_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.toml");
        let err = config_set::<CliConfig>(path.to_str(), "api_url", "x").unwrap_err();
        assert!(err.to_string().contains("config init"));
    }

    #[test]
    fn test_init_and_force() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/cli.toml");
        let target = path.to_str().unwrap();

        config_init::<CliConfig>(Some(target), false).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("http://localhost:8080/api"));

        assert!(config_init::<CliConfig>(Some(target), false).is_err());
        std::fs::write(&path, "api_url = \"changed\"\n").unwrap();
        config_init::<CliConfig>(Some(target), true).unwrap();
        let reset = std::fs::read_to_string(&path).unwrap();
        assert!(reset.contains("http://localhost:8080/api"));
    }

    #[test]
    fn test_export_formats() {
        let config = CliConfig::default();
        let plain = config_export(&config, false).unwrap();
        assert!(plain.contains("ECOFLEX_API_URL=http://localhost:8080/api"));
        let docker = config_export(&config, true).unwrap();
        assert!(docker.contains("--env ECOFLEX_API_URL="));
    }

    #[test]
    fn test_lookup_and_insert_nested() {
        let mut doc: toml::Value = toml::from_str("[display]\ncolor = true\n").unwrap();
        assert_eq!(lookup(&doc, "display.color"), Some(&toml::Value::Boolean(true)));
        assert!(lookup(&doc, "display.width").is_none());
        assert!(lookup(&doc, "display.color.deep").is_none());

        insert(&mut doc, "display.width", toml::Value::Integer(80)).unwrap();
        insert(&mut doc, "new.section.key", toml::Value::String("v".into())).unwrap();
        assert_eq!(lookup(&doc, "display.width"), Some(&toml::Value::Integer(80)));
        assert_eq!(
            lookup(&doc, "new.section.key"),
            Some(&toml::Value::String("v".into()))
        );
    }

    #[test]
    fn test_insert_rejects_bad_paths() {
        let mut doc: toml::Value = toml::from_str("name = \"x\"\n").unwrap();
        assert!(insert(&mut doc, "name.inner", toml::Value::Integer(1)).is_err());
        assert!(insert(&mut doc, "a..b", toml::Value::Integer(1)).is_err());
        assert!(insert(&mut doc, "trailing.", toml::Value::Integer(1)).is_err());
    }

    #[test]
    fn test_infer_value() {
        assert_eq!(infer_value("true"), toml::Value::Boolean(true));
        assert_eq!(infer_value("8080"), toml::Value::Integer(8080));
        assert_eq!(infer_value("0.7"), toml::Value::Float(0.7));
        assert_eq!(
            infer_value("http://x/api"),
            toml::Value::String("http://x/api".into())
        );
    }

    #[test]
    fn test_render_value() {
        assert_eq!(render_value(&toml::Value::String("a".into())), "a");
        assert_eq!(render_value(&toml::Value::Integer(3)), "3");
        let table: toml::Value = toml::from_str("k = 1\n").unwrap();
        assert!(render_value(&table).contains("k = 1"));
    }
}
