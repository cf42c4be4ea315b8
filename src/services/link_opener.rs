//! Launching links through the operating system.
//!
//! The service only sees the [`LinkOpener`] trait; [`ShellOpener`] is the
//! real implementation used by the desktop shell and the RPC binary.

use std::io;
use std::process::{Command, ExitStatus};
use std::thread::{self, JoinHandle};

use crate::types::errors::OpenError;
use crate::types::link::{Link, LinkType};

/// Performs the OS-level "open" action for a link.
pub trait LinkOpener {
    fn open(&self, link: &Link) -> Result<(), OpenError>;
}

/// Opens links with the platform's default handlers.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellOpener;

/// Returns the trimmed target of a launchable link.
pub fn launch_target(link: &Link) -> Result<&str, OpenError> {
    if !link.link_type.requires_target() {
        return Err(OpenError::NothingToOpen(link.name.clone()));
    }
    link.url
        .as_deref()
        .map(str::trim)
        .filter(|target| !target.is_empty())
        .ok_or_else(|| OpenError::MissingTarget(link.name.clone()))
}

/// Store apps are addressed by their AppUserModelID under `shell:AppsFolder`.
fn store_app_uri(target: &str) -> String {
    if target.starts_with("shell:") {
        target.to_string()
    } else {
        format!("shell:AppsFolder\\{}", target)
    }
}

/// Spawns `command` in the platform shell.
///
/// The child is reaped on a detached thread whose handle yields the exit status.
fn run_in_shell(command: &str) -> io::Result<JoinHandle<io::Result<ExitStatus>>> {
    #[cfg(target_os = "windows")]
    let mut cmd = {
        let mut c = Command::new("cmd");
        c.args(["/C", command]);
        c
    };
    #[cfg(not(target_os = "windows"))]
    let mut cmd = {
        let mut c = Command::new("sh");
        c.args(["-c", command]);
        c
    };
    let mut child = cmd.spawn()?;
    let pid = child.id();
    thread::Builder::new()
        .name(format!("winwork-reap-{}", pid))
        .spawn(move || {
            let status = child.wait();
            tracing::debug!(pid, ?status, "terminal command exited");
            status
        })
}

impl LinkOpener for ShellOpener {
    fn open(&self, link: &Link) -> Result<(), OpenError> {
        let target = launch_target(link)?;
        tracing::info!(id = link.id, kind = ?link.link_type, "opening link");

        let result = match link.link_type {
            LinkType::Terminal => run_in_shell(target).map(|_| ()),
            LinkType::WindowsStoreApp => open::that_detached(store_app_uri(target)),
            _ => open::that_detached(target),
        };
        result.map_err(|e| OpenError::LaunchFailed(format!("{}: {}", target, e)))
    }
}
