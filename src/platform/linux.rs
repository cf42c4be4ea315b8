// WinWork data path for Linux
// Data: $XDG_DATA_HOME/winwork or ~/.local/share/winwork

use std::env;
use std::path::PathBuf;

/// Uses `$XDG_DATA_HOME/winwork` if set, otherwise `~/.local/share/winwork`.
pub fn get_data_dir() -> PathBuf {
    if let Ok(xdg) = env::var("XDG_DATA_HOME") {
        PathBuf::from(xdg).join("winwork")
    } else {
        let home = env::var("HOME").unwrap_or_else(|_| String::from("/tmp"));
        PathBuf::from(home)
            .join(".local")
            .join("share")
            .join("winwork")
    }
}
