// WinWork data path for Windows
// Data: %APPDATA%/WinWork

use std::env;
use std::path::PathBuf;

/// `%APPDATA%/WinWork`
pub fn get_data_dir() -> PathBuf {
    let appdata =
        env::var("APPDATA").unwrap_or_else(|_| String::from("C:\\Users\\Default\\AppData\\Roaming"));
    PathBuf::from(appdata).join("WinWork")
}
