//! XDG Base Directory paths for radstudy.
//!
//! The server and CLI resolve their config and default data locations the
//! same way on every platform, following XDG rather than platform-native
//! directories.

use std::path::PathBuf;

/// Get the radstudy config directory.
///
/// Returns `$XDG_CONFIG_HOME/radstudy` if set, otherwise `~/.config/radstudy`.
///
/// # Examples
///
/// ```
/// use radstudy_paths::config_dir;
///
/// let config_file = config_dir().join("config.toml");
/// ```
pub fn config_dir() -> PathBuf {
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg_config).join("radstudy")
    } else if let Some(home) = dirs::home_dir() {
        home.join(".config/radstudy")
    } else {
        PathBuf::from(".config/radstudy")
    }
}

/// Get the radstudy data directory.
///
/// Returns `$XDG_DATA_HOME/radstudy` if set, otherwise
/// `~/.local/share/radstudy`. Default response files live here.
pub fn data_dir() -> PathBuf {
    if let Ok(xdg_data) = std::env::var("XDG_DATA_HOME") {
        PathBuf::from(xdg_data).join("radstudy")
    } else if let Some(home) = dirs::home_dir() {
        home.join(".local/share/radstudy")
    } else {
        PathBuf::from(".local/share/radstudy")
    }
}

/// Default JSON-lines response file.
pub fn default_responses_path() -> PathBuf {
    data_dir().join("responses.jsonl")
}
