//! Configuration loader with file resolution and environment override support.

use super::error::{ConfigError, ConfigResult};
use super::schema::{Config, EndpointConfig};
use crate::bridge::DispatchMode;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Environment variable prefix for overrides
const ENV_PREFIX: &str = "SERIAL_TAP";

/// Config file name looked up in the current directory
const LOCAL_CONFIG_FILE_NAME: &str = "serial-tap.toml";

/// Config file name inside the per-user config directory
const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory under the per-user config directory
const APP_DIR_NAME: &str = "serial-tap";

/// Environment variable for explicit config path
const CONFIG_PATH_ENV: &str = "SERIAL_TAP_CONFIG";

/// Configuration loader with resolution and override logic.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Resolved config file path (if any)
    pub config_path: Option<PathBuf>,
    /// The loaded configuration
    pub config: Config,
}

impl ConfigLoader {
    /// Load configuration using standard resolution order.
    ///
    /// Resolution priority (highest to lowest):
    /// 1. `explicit` (the `--config` flag); it must exist
    /// 2. `SERIAL_TAP_CONFIG` environment variable
    /// 3. `./serial-tap.toml` (current directory)
    /// 4. `$XDG_CONFIG_HOME/serial-tap/config.toml` or `%APPDATA%\serial-tap\config.toml`
    /// 5. Built-in defaults (no file required)
    ///
    /// Environment variables override any config file values.
    pub fn load(explicit: Option<&Path>) -> ConfigResult<Self> {
        let config_path = match explicit {
            Some(path) if !path.exists() => return Err(ConfigError::NotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => resolve_config_path(),
        };

        let mut config = match config_path {
            Some(ref path) => load_from_file(path)?,
            None => Config::default(),
        };

        apply_env_overrides(&mut config)?;

        Ok(Self {
            config_path,
            config,
        })
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref().to_path_buf();
        let mut config = load_from_file(&path)?;
        apply_env_overrides(&mut config)?;

        Ok(Self {
            config_path: Some(path),
            config,
        })
    }

    /// Create a loader with default configuration (no file, no environment).
    pub fn with_defaults() -> Self {
        Self {
            config_path: None,
            config: Config::default(),
        }
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get a mutable reference to the configuration.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Consume the loader and return the configuration.
    pub fn into_config(self) -> Config {
        self.config
    }
}

/// Resolve the configuration file path using standard locations.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }

    let cwd_config = PathBuf::from(LOCAL_CONFIG_FILE_NAME);
    if cwd_config.exists() {
        return Some(cwd_config);
    }

    get_default_config_path().filter(|path| path.exists())
}

/// Get the platform-specific config directory.
fn get_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var("APPDATA").ok().map(PathBuf::from)
    }

    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var("HOME")
                    .ok()
                    .map(|h| PathBuf::from(h).join(".config"))
            })
    }
}

/// Get the default per-user config file path.
pub fn get_default_config_path() -> Option<PathBuf> {
    get_config_dir().map(|d| d.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Load configuration from a file.
fn load_from_file(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut config: Config = toml::from_str(&content)?;

    // A `[left]`/`[right]` section replaces the whole built-in endpoint, so
    // restore whichever key it left out.
    let defaults = Config::default();
    fill_endpoint(&mut config.left, defaults.left);
    fill_endpoint(&mut config.right, defaults.right);

    Ok(config)
}

fn fill_endpoint(endpoint: &mut EndpointConfig, default: EndpointConfig) {
    if endpoint.port.is_empty() {
        endpoint.port = default.port;
    }
    if endpoint.label.is_empty() {
        endpoint.label = default.label;
    }
}

fn env_key(suffix: &str) -> String {
    format!("{}_{}", ENV_PREFIX, suffix)
}

fn env_var(suffix: &str) -> Option<String> {
    std::env::var(env_key(suffix)).ok()
}

fn env_parse<T: FromStr>(suffix: &str, what: &str) -> ConfigResult<Option<T>> {
    match env_var(suffix) {
        Some(val) => val
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::env_parse(env_key(suffix), format!("Invalid {what}"))),
        None => Ok(None),
    }
}

fn parse_flag(val: &str) -> bool {
    let val = val.trim().to_lowercase();
    val == "true" || val == "1" || val == "yes"
}

/// Apply environment variable overrides to the configuration.
///
/// Environment variables follow the pattern `SERIAL_TAP_<SECTION>_<KEY>`, for
/// example `SERIAL_TAP_LEFT_PORT=COM3,9600,N,8,1` or
/// `SERIAL_TAP_SERIAL_READ_TIMEOUT_MS=250`.
fn apply_env_overrides(config: &mut Config) -> ConfigResult<()> {
    // Endpoints
    if let Some(val) = env_var("LEFT_PORT") {
        config.left.port = val;
    }
    if let Some(val) = env_var("LEFT_LABEL") {
        config.left.label = val;
    }
    if let Some(val) = env_var("RIGHT_PORT") {
        config.right.port = val;
    }
    if let Some(val) = env_var("RIGHT_LABEL") {
        config.right.label = val;
    }

    // Serial
    if let Some(val) = env_parse("SERIAL_READ_TIMEOUT_MS", "timeout")? {
        config.serial.read_timeout_ms = val;
    }
    if let Some(val) = env_parse("SERIAL_READ_BUFFER_SIZE", "buffer size")? {
        config.serial.read_buffer_size = val;
    }
    if let Some(val) = env_parse("SERIAL_POLL_INTERVAL_MS", "poll interval")? {
        config.serial.poll_interval_ms = val;
    }
    if let Some(val) = env_var("SERIAL_DISPATCH") {
        config.serial.dispatch = match val.trim().to_lowercase().as_str() {
            "concurrent" => DispatchMode::Concurrent,
            "ordered" => DispatchMode::Ordered,
            _ => {
                return Err(ConfigError::env_parse(
                    env_key("SERIAL_DISPATCH"),
                    "expected \"concurrent\" or \"ordered\"",
                ))
            }
        };
    }

    // Logging
    if let Some(val) = env_var("LOGGING_LEVEL") {
        config.logging.level = val;
    }
    if let Some(val) = env_var("LOGGING_FILE") {
        config.logging.file = if val.is_empty() {
            None
        } else {
            Some(PathBuf::from(val))
        };
    }
    if let Some(val) = env_var("LOGGING_LOG_CONTROL_FLOW") {
        config.logging.log_control_flow = parse_flag(&val);
    }

    // Interrupt
    if let Some(val) = env_var("INTERRUPT_KEYPRESS") {
        config.interrupt.keypress = parse_flag(&val);
    }

    Ok(())
}
