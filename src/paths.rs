//! Config path resolution for accounts
//!
//! # Environment Variables
//!
//! - `ACCOUNTS_CONFIG` - Config file to load (also settable with `--config`)
//! - `ACCOUNTS_CONFIG_DIR` - Override config directory
//!
//! # Path Resolution Priority
//!
//! For config_dir():
//! 1. `ACCOUNTS_CONFIG_DIR` environment variable
//! 2. `XDG_CONFIG_HOME/accounts` (if set)
//! 3. `~/.config/accounts`

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Environment variable for the config file
pub const ENV_CONFIG: &str = "ACCOUNTS_CONFIG";

/// Environment variable for config directory override
pub const ENV_CONFIG_DIR: &str = "ACCOUNTS_CONFIG_DIR";

/// Default config file name inside the config directory
pub const CONFIG_FILE: &str = "accounts.toml";

/// Get the accounts config directory path
pub fn config_dir() -> Result<PathBuf> {
    config_dir_with(|key| std::env::var(key).ok(), dirs::home_dir())
        .context("Could not determine home directory")
}

/// Config directory from an environment lookup and a home directory.
fn config_dir_with<F>(env: F, home: Option<PathBuf>) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(dir) = env(ENV_CONFIG_DIR).filter(|d| !d.is_empty()) {
        let path = expand(&dir);
        log::debug!("Using config dir from {}: {}", ENV_CONFIG_DIR, path.display());
        return Some(path);
    }

    if let Some(xdg_config) = env("XDG_CONFIG_HOME").filter(|d| !d.is_empty()) {
        let path = PathBuf::from(xdg_config).join("accounts");
        log::debug!("Using XDG_CONFIG_HOME: {}", path.display());
        return Some(path);
    }

    let path = home?.join(".config").join("accounts");
    log::debug!("Using default config dir: {}", path.display());
    Some(path)
}

/// Config file to load: the explicit path if given, else the default one.
pub fn config_file(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(expand(&path.to_string_lossy())),
        None => Ok(config_dir()?.join(CONFIG_FILE)),
    }
}

/// Expand ~ and environment variables in a path string.
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}

// ============================================================================
// Tests
// ============================================================================
