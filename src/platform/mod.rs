// WinWork platform abstraction
// Provides the per-OS data directory the link database lives in.
//
// Uses `cfg(target_os)` for conditional compilation to select the correct
// platform-specific implementation at compile time.

use std::path::PathBuf;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

/// Returns the platform-specific data directory for WinWork.
///
/// - **Linux**: `~/.local/share/winwork` (or `$XDG_DATA_HOME/winwork`)
/// - **macOS**: `~/Library/Application Support/WinWork`
/// - **Windows**: `%APPDATA%/WinWork`
pub fn get_data_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_data_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_data_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_data_dir()
    }
    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    {
        PathBuf::from(".").join("winwork")
    }
}
