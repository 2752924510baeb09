//! PID file lifecycle: refuse to start over a stale-looking PID file
//! that actually belongs to a live process, write ours on startup,
//! remove it on clean shutdown.
//!
//! Liveness is checked with `kill(pid, None)`, the standard Unix idiom
//! for "does this process exist" without actually signalling it.

use std::path::Path;

use nix::sys::signal::kill;
use nix::unistd::Pid;

use crate::error::ConfigError;

/// Errors if an existing PID file names a process that is still alive.
pub fn check_stale(path: &Path) -> Result<(), ConfigError> {
    let Ok(contents) = std::fs::read_to_string(path) else {
        return Ok(());
    };
    let Ok(pid) = contents.trim().parse::<i32>() else {
        return Ok(());
    };

    if kill(Pid::from_raw(pid), None).is_ok() {
        return Err(ConfigError::PidFileInUse {
            path: path.to_path_buf(),
            pid,
        });
    }

    Ok(())
}

pub fn write(path: &Path) -> std::io::Result<()> {
    std::fs::write(path, std::process::id().to_string())
}

pub fn remove(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        tracing::warn!(path = %path.display(), error = %e, "failed to remove PID file");
    }
}
