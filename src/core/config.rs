//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.campus-assistant/config.toml`. If missing on first
//! run, a commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::UserProfile;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CampusConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub profile: ProfileConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct BackendConfig {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ProfileConfig {
    pub program: Option<String>,
    pub year: Option<u32>,
}

pub const DEFAULT_BASE_URL: &str = "http://localhost:8001";

pub const ENV_BASE_URL: &str = "CAMPUS_API_BASE_URL";
pub const ENV_PROGRAM: &str = "CAMPUS_PROGRAM";
pub const ENV_YEAR: &str = "CAMPUS_YEAR";

// ============================================================================
// Resolved Config
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub base_url: String,
    /// Per-request limit. `None` waits as long as the transport does.
    pub timeout: Option<Duration>,
    /// `None` when neither program nor year is known.
    pub profile: Option<UserProfile>,
}

/// Values given on the command line. `None` = flag not passed.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub base_url: Option<String>,
    pub program: Option<String>,
    pub year: Option<u32>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.campus-assistant/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".campus-assistant").join("config.toml"))
}

/// Load config from `~/.campus-assistant/config.toml`.
///
/// A missing file generates the commented-out default and yields
/// `CampusConfig::default()`. A malformed file is `ConfigError::Parse`.
pub fn load_config() -> Result<CampusConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(CampusConfig::default());
        }
    };
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<CampusConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(CampusConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: CampusConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

const DEFAULT_CONFIG: &str = r#"# Campus Assistant Configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [backend]
# base_url = "http://localhost:8001"   # Or set CAMPUS_API_BASE_URL
# timeout_secs = 60                    # Unset = wait for the backend indefinitely

# [profile]
# program = "MSIT"                     # Or set CAMPUS_PROGRAM
# year = 1                             # Or set CAMPUS_YEAR
"#;

fn generate_default_config(path: &Path) {
    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, DEFAULT_CONFIG) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &CampusConfig, cli: &CliOverrides) -> ResolvedConfig {
    resolve_with_env(config, cli, |key| std::env::var(key).ok())
}

/// `resolve` with an injectable environment lookup.
fn resolve_with_env(
    config: &CampusConfig,
    cli: &CliOverrides,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    let non_blank = |v: String| {
        let v = v.trim().to_string();
        (!v.is_empty()).then_some(v)
    };

    // Base URL: CLI → env → config → default
    // A blank layer counts as unset, so it never masks the layers below
    let base_url = cli
        .base_url
        .clone()
        .and_then(non_blank)
        .or_else(|| env(ENV_BASE_URL).and_then(non_blank))
        .or_else(|| config.backend.base_url.clone().and_then(non_blank))
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let program = cli
        .program
        .clone()
        .and_then(non_blank)
        .or_else(|| env(ENV_PROGRAM).and_then(non_blank))
        .or_else(|| config.profile.program.clone().and_then(non_blank));

    let year = cli.year.or_else(|| {
        env(ENV_YEAR)
            .and_then(|raw| match raw.trim().parse::<u32>() {
                Ok(y) => Some(y),
                Err(_) => {
                    warn!("Ignoring non-numeric {}={:?}", ENV_YEAR, raw);
                    None
                }
            })
            .or(config.profile.year)
    });

    let profile = UserProfile { program, year };
    let profile = (!profile.is_empty()).then_some(profile);

    // Zero means "no limit", same as unset
    let timeout = config
        .backend
        .timeout_secs
        .filter(|s| *s > 0)
        .map(Duration::from_secs);

    ResolvedConfig {
        base_url,
        timeout,
        profile,
    }
}
