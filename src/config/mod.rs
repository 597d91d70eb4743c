//! Configuration module for serial-tap.
//!
//! This module provides TOML-based configuration with environment variable overrides.
//!
//! # Configuration Resolution
//!
//! Configuration is loaded from the first of these that exists:
//!
//! 1. The path given with `--config`
//! 2. `SERIAL_TAP_CONFIG` environment variable
//! 3. `./serial-tap.toml` (current directory)
//! 4. `~/.config/serial-tap/config.toml` (XDG on Linux/macOS)
//! 5. `%APPDATA%\serial-tap\config.toml` (Windows)
//! 6. Built-in defaults (no file required)
//!
//! # Environment Overrides
//!
//! Any configuration value can be overridden via environment variables.
//! The pattern is: `SERIAL_TAP_<SECTION>_<KEY>`
//!
//! Examples:
//! - `SERIAL_TAP_LEFT_PORT=COM3,9600,N,8,1`
//! - `SERIAL_TAP_SERIAL_DISPATCH=ordered`
//! - `SERIAL_TAP_LOGGING_FILE=/var/log/serial-tap.log`
//!
//! Command-line flags are applied on top of all of the above by the binary.
//!
//! # Example
//!
//! ```rust,no_run
//! use serial_tap::config::ConfigLoader;
//!
//! let loader = ConfigLoader::load(None)?;
//! let config = loader.config();
//! config.validate()?;
//!
//! println!("Left: {} ({})", config.left.port, config.left.label);
//! # Ok::<(), serial_tap::config::ConfigError>(())
//! ```

mod error;
mod loader;
mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{get_default_config_path, resolve_config_path, ConfigLoader};
pub use schema::{Config, EndpointConfig, InterruptConfig, LoggingConfig, SerialConfig};
