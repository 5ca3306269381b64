use acctkit::AccountsConfig;
use anyhow::{Context, Result, bail};
use std::fs;
use std::path::Path;

use crate::paths;

/// File formats a configuration can be written in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// Detect the format from a file extension, defaulting to TOML
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Toml,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Toml => "toml",
            Self::Json => "json",
        }
    }
}

/// Parse configuration text in the given format
pub fn parse(content: &str, format: ConfigFormat) -> Result<AccountsConfig> {
    match format {
        ConfigFormat::Toml => {
            toml::from_str(content).context("Invalid TOML format in accounts config")
        }
        ConfigFormat::Json => {
            serde_json::from_str(content).context("Invalid JSON format in accounts config")
        }
    }
}

/// Load configuration from a file
pub fn load_from(path: &Path) -> Result<AccountsConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Could not read config file: {}", path.display()))?;
    let format = ConfigFormat::from_path(path);
    log::debug!("Parsing {} as {}", path.display(), format.extension());
    parse(&content, format).with_context(|| format!("Failed to load {}", path.display()))
}

/// Load configuration, locating the file the way the CLI documents
///
/// `title` overrides `ssh_authorized_key_title` from the file.
pub fn load(explicit: Option<&Path>, title: Option<&str>) -> Result<AccountsConfig> {
    let path = paths::config_file(explicit)?;
    if !path.exists() {
        bail!(
            "Config file not found: {} (set --config or {})",
            path.display(),
            paths::ENV_CONFIG
        );
    }

    log::info!("Loading accounts config from {}", path.display());
    let mut config = load_from(&path)?;

    if let Some(title) = title {
        log::debug!("Overriding ssh_authorized_key_title with '{title}'");
        config.ssh_authorized_key_title = title.to_string();
    }

    Ok(config)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_format_from_path() {
        assert_eq!(ConfigFormat::from_path(Path::new("a.json")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("a.JSON")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("a.toml")), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("accounts")), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::Json.extension(), "json");
    }

    #[test]
    fn test_load_toml_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("accounts.toml");
        fs::write(
            &path,
            r#"
[ssh_keys.foo]
type = "ssh-rsa"
public = "FOO"

[accounts.foo]
"#,
        )
        .unwrap();

        let config = load(Some(&path), None).unwrap();
        assert!(config.ssh_keys.contains("foo"));
        assert!(config.accounts.contains("foo"));
    }

    #[test]
    fn test_load_json_file_with_title_override() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("accounts.json");
        fs::write(
            &path,
            r#"{"ssh_keys": {"foo": {"public": "FOO"}}, "accounts": {"foo": {}}}"#,
        )
        .unwrap();

        let config = load(Some(&path), Some("%{ssh_key} on %{account}")).unwrap();
        assert_eq!(config.ssh_authorized_key_title, "%{ssh_key} on %{account}");

        let resolved = acctkit::resolve(&config).unwrap();
        assert!(resolved.authorized_key("foo on foo").is_some());
    }

    #[test]
    fn test_toml_keeps_declaration_order() {
        let config = parse(
            r#"
[groups.zed]
[groups.amy]

[ssh_keys.zed]
[ssh_keys.amy]

[users.zed]
[users.amy]

[accounts.zed]
purge_ssh_keys = true

[accounts.amy]
"#,
            ConfigFormat::Toml,
        )
        .unwrap();

        let resolved = acctkit::resolve(&config).unwrap();
        let groups: Vec<&str> = resolved.groups.iter().map(|g| g.name.as_str()).collect();
        let users: Vec<&str> = resolved.users.iter().map(|u| u.name.as_str()).collect();
        let keys: Vec<&str> = resolved
            .ssh_authorized_keys
            .iter()
            .map(|k| k.title.as_str())
            .collect();
        assert_eq!(groups, vec!["zed", "amy"]);
        assert_eq!(users, vec!["zed", "amy"]);
        assert_eq!(keys, vec!["zed-on-zed", "amy-on-amy"]);
    }

    #[test]
    fn test_later_purge_setting_wins_in_file_order() {
        let config = parse(
            r#"
[usergroups]
admins = ["zed"]

[ssh_keys.zed]
[users.zed]

[accounts.zed]
purge_ssh_keys = false

[accounts."@admins"]
purge_ssh_keys = true
"#,
            ConfigFormat::Toml,
        )
        .unwrap();

        let resolved = acctkit::resolve(&config).unwrap();
        assert_eq!(resolved.user("zed").unwrap().purge_ssh_keys, Some(true));
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = load(Some(&dir.path().join("nope.toml")), None).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_invalid_config_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("accounts.toml");
        fs::write(&path, "[accounts.foo]\nauthorised_keys = \"bar\"\n").unwrap();

        let err = load_from(&path).unwrap_err();
        assert!(err.to_string().contains("accounts.toml"));
        assert!(format!("{err:#}").contains("authorised_keys"));
    }
}
