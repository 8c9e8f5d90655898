//! Default paths for promemoria components
//!
//! Paths are user-writable by default (no root required):
//! - Socket: `$XDG_RUNTIME_DIR/promemoria/promemoriad.sock` or `/tmp/promemoria-$USER/promemoriad.sock`
//! - Data: `$XDG_DATA_HOME/promemoria` or `~/.local/share/promemoria`
//! - Config: `$XDG_CONFIG_HOME/promemoria/config.toml` or `~/.config/promemoria/config.toml`

use std::path::PathBuf;

/// Environment variable for overriding the socket path
pub const PROMEMORIA_SOCKET_ENV: &str = "PROMEMORIA_SOCKET";

/// Environment variable for overriding the data directory
pub const PROMEMORIA_DATA_DIR_ENV: &str = "PROMEMORIA_DATA_DIR";

const SOCKET_FILENAME: &str = "promemoriad.sock";
/// File name of the key-value store inside the data directory
pub const STORE_FILENAME: &str = "store.db";
const CONFIG_FILENAME: &str = "config.toml";
const APP_DIR: &str = "promemoria";

/// Get the default socket path.
///
/// Order of precedence:
/// 1. `$PROMEMORIA_SOCKET`
/// 2. `$XDG_RUNTIME_DIR/promemoria/promemoriad.sock`
/// 3. `/tmp/promemoria-$USER/promemoriad.sock`
pub fn default_socket_path() -> PathBuf {
    if let Ok(path) = std::env::var(PROMEMORIA_SOCKET_ENV) {
        return PathBuf::from(path);
    }

    socket_path_without_env()
}

/// Get the socket path without checking the override variable.
pub fn socket_path_without_env() -> PathBuf {
    if let Ok(runtime_dir) = std::env::var("XDG_RUNTIME_DIR") {
        return PathBuf::from(runtime_dir).join(APP_DIR).join(SOCKET_FILENAME);
    }

    let username = std::env::var("USER").unwrap_or_else(|_| "unknown".to_string());
    PathBuf::from(format!("/tmp/{}-{}", APP_DIR, username)).join(SOCKET_FILENAME)
}

/// Get the default data directory.
///
/// Order of precedence:
/// 1. `$PROMEMORIA_DATA_DIR`
/// 2. `$XDG_DATA_HOME/promemoria`
/// 3. `~/.local/share/promemoria`
pub fn default_data_dir() -> PathBuf {
    if let Ok(path) = std::env::var(PROMEMORIA_DATA_DIR_ENV) {
        return PathBuf::from(path);
    }

    data_dir_without_env()
}

/// Get the data directory without checking the override variable.
pub fn data_dir_without_env() -> PathBuf {
    if let Ok(data_home) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(data_home).join(APP_DIR);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(APP_DIR);
    }

    PathBuf::from("/tmp").join(APP_DIR).join("data")
}

/// Get the default config file path.
///
/// 1. `$XDG_CONFIG_HOME/promemoria/config.toml`
/// 2. `~/.config/promemoria/config.toml`
pub fn default_config_path() -> PathBuf {
    if let Ok(config_home) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(config_home).join(APP_DIR).join(CONFIG_FILENAME);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join(CONFIG_FILENAME);
    }

    PathBuf::from("/etc").join(APP_DIR).join(CONFIG_FILENAME)
}
