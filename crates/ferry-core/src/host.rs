//! Host application session
//!
//! Recovery tells the host to end the current session or to open the
//! recovered profile. Both signals are fire-and-forget: recovery has already
//! succeeded once they are sent.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

/// The running host application
pub trait HostSession {
    /// End the current session and continue in `new_profile_dir`
    fn quit_and_replace(&self, new_profile_dir: &Path);

    /// Open `profile_dir` alongside the current session
    fn launch(&self, profile_dir: &Path);
}

impl<T: HostSession + ?Sized> HostSession for &T {
    fn quit_and_replace(&self, new_profile_dir: &Path) {
        (**self).quit_and_replace(new_profile_dir);
    }

    fn launch(&self, profile_dir: &Path) {
        (**self).launch(profile_dir);
    }
}

/// Host that ignores session signals (headless use)
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHost;

impl HostSession for NoopHost {
    fn quit_and_replace(&self, new_profile_dir: &Path) {
        tracing::debug!(profile = %new_profile_dir.display(), "No host session to replace");
    }

    fn launch(&self, profile_dir: &Path) {
        tracing::debug!(profile = %profile_dir.display(), "No host session to launch");
    }
}

/// Host that starts the browser binary with `--profile <dir>`
///
/// `quit_and_replace` also raises a flag the host's main loop polls to shut
/// the current session down.
#[derive(Debug)]
pub struct ProcessHost {
    binary: PathBuf,
    quit_requested: AtomicBool,
}

impl ProcessHost {
    #[must_use]
    pub fn new(binary: PathBuf) -> Self {
        Self {
            binary,
            quit_requested: AtomicBool::new(false),
        }
    }

    /// Whether the current session was asked to quit
    #[must_use]
    pub fn quit_requested(&self) -> bool {
        self.quit_requested.load(Ordering::SeqCst)
    }

    /// Start the browser and reap it on a background thread once it exits
    fn spawn(&self, profile_dir: &Path) -> Option<JoinHandle<()>> {
        let result = Command::new(&self.binary)
            .arg("--profile")
            .arg(profile_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        let mut child = match result {
            Ok(child) => child,
            Err(e) => {
                tracing::warn!(
                    binary = %self.binary.display(),
                    profile = %profile_dir.display(),
                    error = %e,
                    "Failed to launch browser"
                );
                return None;
            }
        };

        let pid = child.id();
        tracing::info!(
            binary = %self.binary.display(),
            profile = %profile_dir.display(),
            pid,
            "Launched browser"
        );
        Some(thread::spawn(move || match child.wait() {
            Ok(status) => tracing::debug!(pid, %status, "Browser exited"),
            Err(e) => tracing::warn!(pid, error = %e, "Failed to wait for browser"),
        }))
    }
}

impl HostSession for ProcessHost {
    fn quit_and_replace(&self, new_profile_dir: &Path) {
        let _ = self.spawn(new_profile_dir);
        self.quit_requested.store(true, Ordering::SeqCst);
    }

    fn launch(&self, profile_dir: &Path) {
        let _ = self.spawn(profile_dir);
    }
}
