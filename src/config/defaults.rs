//! Default configuration constants used across the system.

use super::types::BindMode;

/// Default HTTP port.
pub const DEFAULT_SERVER_PORT: u16 = 8080;

/// Default bind mode.
pub const DEFAULT_BIND_MODE: BindMode = BindMode::Loopback;

/// Default config file name written by `config init`.
pub const DEFAULT_CONFIG_FILE: &str = "privops.json";

/// Per-user config directory name under the home directory.
pub const HOME_CONFIG_DIR: &str = ".privops";
