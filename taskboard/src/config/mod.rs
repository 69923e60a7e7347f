//! Configuration system for the `Taskboard` client.
//!
//! Supports layered configuration with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attribute)
//! 3. TOML config file (`~/.config/taskboard/config.toml`)
//! 4. Compiled defaults
//!
//! Missing config file is not an error (defaults are used). An explicit
//! `--config` path that doesn't exist is an error.

use std::path::PathBuf;
use std::time::Duration;

use taskboard_proto::task::{MAX_DESCRIPTION_LENGTH, OwnerRef};

use crate::login::DEFAULT_CAPTCHA_LENGTH;
use crate::remote::http::DEFAULT_BASE_URL;
use crate::store::{Reconcile, StoreOptions};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),
}

// ---------------------------------------------------------------------------
// TOML file structs (all fields Option for partial overrides)
// ---------------------------------------------------------------------------

/// Top-level TOML config file structure.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    remote: RemoteFileConfig,
    store: StoreFileConfig,
    user: UserFileConfig,
    ui: UiFileConfig,
}

/// `[remote]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct RemoteFileConfig {
    base_url: Option<String>,
    offline: Option<bool>,
}

/// `[store]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct StoreFileConfig {
    reconcile: Option<Reconcile>,
    operation_history: Option<usize>,
    max_description_len: Option<usize>,
}

/// `[user]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct UserFileConfig {
    owner_ref: Option<u64>,
}

/// `[ui]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct UiFileConfig {
    poll_timeout_ms: Option<u64>,
    captcha_length: Option<usize>,
    notification_ttl_secs: Option<u64>,
}

// ---------------------------------------------------------------------------
// Resolved configuration (concrete types, all fields populated)
// ---------------------------------------------------------------------------

/// Fully resolved client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    // -- Remote --
    /// Base URL of the todo service.
    pub base_url: String,
    /// Work against the in-process demo collection instead of HTTP.
    pub offline: bool,

    // -- Store --
    /// Reconciliation source for confirmed updates.
    pub reconcile: Reconcile,
    /// Number of finished operations kept in the store history.
    pub operation_history: usize,
    /// Maximum task description length in characters.
    pub max_description_len: usize,

    // -- User --
    /// Owner reference stamped on created tasks.
    pub owner_ref: OwnerRef,

    // -- UI --
    /// Poll timeout for the TUI event loop.
    pub poll_timeout: Duration,
    /// Number of captcha characters on the login screen.
    pub captcha_length: usize,
    /// How long a notification stays in the status bar.
    pub notification_ttl: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            offline: false,
            reconcile: Reconcile::TrustPatch,
            operation_history: 32,
            max_description_len: MAX_DESCRIPTION_LENGTH,
            owner_ref: OwnerRef::new(1),
            poll_timeout: Duration::from_millis(50),
            captcha_length: DEFAULT_CAPTCHA_LENGTH,
            notification_ttl: Duration::from_secs(4),
        }
    }
}

impl ClientConfig {
    /// Load configuration by merging CLI args, env vars, and a TOML file.
    ///
    /// If `--config` is given and the file does not exist, returns an
    /// error. If no `--config` is given, the default path
    /// (`~/.config/taskboard/config.toml`) is tried and silently ignored if
    /// missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the config file cannot be read or parsed.
    pub fn load(cli: &CliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Ok(Self::resolve(cli, &file))
    }

    /// Resolve a `ClientConfig` from CLI args and a parsed config file.
    ///
    /// Priority: CLI > file > default.
    #[must_use]
    fn resolve(cli: &CliArgs, file: &ConfigFile) -> Self {
        let defaults = Self::default();

        Self {
            base_url: cli
                .base_url
                .clone()
                .or_else(|| file.remote.base_url.clone())
                .unwrap_or(defaults.base_url),
            offline: cli.offline || file.remote.offline.unwrap_or(defaults.offline),
            reconcile: file.store.reconcile.unwrap_or(defaults.reconcile),
            operation_history: file
                .store
                .operation_history
                .unwrap_or(defaults.operation_history),
            max_description_len: file
                .store
                .max_description_len
                .unwrap_or(defaults.max_description_len),
            owner_ref: file
                .user
                .owner_ref
                .map_or(defaults.owner_ref, OwnerRef::new),
            poll_timeout: file
                .ui
                .poll_timeout_ms
                .map_or(defaults.poll_timeout, Duration::from_millis),
            captcha_length: file
                .ui
                .captcha_length
                .unwrap_or(defaults.captcha_length),
            notification_ttl: file
                .ui
                .notification_ttl_secs
                .map_or(defaults.notification_ttl, Duration::from_secs),
        }
    }

    /// Build the [`StoreOptions`] for this configuration.
    #[must_use]
    pub const fn to_store_options(&self) -> StoreOptions {
        StoreOptions {
            reconcile: self.reconcile,
            max_description_len: self.max_description_len,
            operation_history: self.operation_history,
        }
    }
}

/// CLI arguments parsed by clap.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "Terminal task board backed by a remote todo collection")]
pub struct CliArgs {
    /// Base URL of the todo service.
    #[arg(long, env = "TASKBOARD_URL")]
    pub base_url: Option<String>,

    /// Use the in-process demo collection instead of the network.
    #[arg(long)]
    pub offline: bool,

    /// Path to config file (default: `~/.config/taskboard/config.toml`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", env = "TASKBOARD_LOG")]
    pub log_level: String,

    /// Path to log file (default: `$TMPDIR/taskboard.log`).
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Load and parse a TOML config file.
///
/// If `explicit_path` is `Some`, the file must exist (error if not).
/// If `explicit_path` is `None`, the default path is tried and missing file
/// is treated as empty config.
fn load_config_file(explicit_path: Option<&std::path::Path>) -> Result<ConfigFile, ConfigError> {
    let path = if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    } else {
        let Some(config_dir) = dirs::config_dir() else {
            return Ok(ConfigFile::default());
        };
        config_dir.join("taskboard").join("config.toml")
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}
