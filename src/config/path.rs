//! Config and description table path management.
//!
//! Handles determining the config file and description table locations
//! across platforms, with support for CLI overrides and environment variables.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use etcetera::base_strategy::{BaseStrategy, choose_base_strategy};

/// Environment variable overriding the config file location
pub const CONFIG_PATH_ENV: &str = "EXTLATENCY_CONFIG_PATH";

/// Environment variable overriding the description table location
pub const DESCRIPTIONS_PATH_ENV: &str = "EXTLATENCY_DESCRIPTIONS_PATH";

/// Description table picked up from the working directory when nothing else is configured
pub const LOCAL_DESCRIPTIONS_FILE: &str = "descriptions.json";

/// Where a config file path came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigLocation {
    /// `--config` flag or environment variable; must exist
    Explicit(PathBuf),
    /// Platform default; used only if it exists
    Default(PathBuf),
}

/// Get the config file location.
///
/// Priority:
/// 1. CLI --config flag
/// 2. EXTLATENCY_CONFIG_PATH environment variable
/// 3. Platform-specific default location
pub fn config_location(cli: Option<&Path>) -> Option<ConfigLocation> {
    resolve_config_location(
        cli,
        std::env::var_os(CONFIG_PATH_ENV),
        default_config_path(),
    )
}

fn resolve_config_location(
    cli: Option<&Path>,
    env: Option<OsString>,
    default: Option<PathBuf>,
) -> Option<ConfigLocation> {
    if let Some(path) = cli {
        return Some(ConfigLocation::Explicit(path.to_path_buf()));
    }
    if let Some(path) = env.filter(|p| !p.is_empty()) {
        return Some(ConfigLocation::Explicit(PathBuf::from(path)));
    }
    default.map(ConfigLocation::Default)
}

/// Platform config location.
///
/// choose_base_strategy uses:
/// - XDG on Linux (respects XDG_CONFIG_HOME, falls back to ~/.config)
/// - XDG on macOS (~/.config instead of ~/Library/Application Support)
/// - Windows conventions on Windows (%APPDATA%)
fn default_config_path() -> Option<PathBuf> {
    let strategy = choose_base_strategy().ok()?;
    Some(strategy.config_dir().join("extlatency").join("config.toml"))
}

/// Get the description table path, if any is configured.
///
/// Priority:
/// 1. CLI --descriptions flag
/// 2. EXTLATENCY_DESCRIPTIONS_PATH environment variable
/// 3. `descriptions` key in the config file
/// 4. `descriptions.json` in the working directory, if it exists
///
/// `None` means the built-in table should be used.
pub fn descriptions_path(cli: Option<&Path>, configured: Option<&Path>) -> Option<PathBuf> {
    resolve_descriptions_path(
        cli,
        std::env::var_os(DESCRIPTIONS_PATH_ENV),
        configured,
        Path::new(LOCAL_DESCRIPTIONS_FILE),
    )
}

fn resolve_descriptions_path(
    cli: Option<&Path>,
    env: Option<OsString>,
    configured: Option<&Path>,
    local: &Path,
) -> Option<PathBuf> {
    if let Some(path) = cli {
        return Some(path.to_path_buf());
    }
    if let Some(path) = env.filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    if let Some(path) = configured {
        return Some(path.to_path_buf());
    }
    local.exists().then(|| local.to_path_buf())
}
