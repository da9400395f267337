//! Out-of-band reset signal.
//!
//! The component that decides the user has dismissed a warning is separate
//! from the component holding the running score. They talk only through this
//! flag: raising it any number of times before it is consumed is the same as
//! raising it once, and consuming it is a single atomic read-and-clear.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// File name of the durable flag inside the data directory.
pub const RESET_FLAG_FILE: &str = "reset_score.flag";

/// A settable, consume-once reset flag.
pub trait ResetSignal: Send + Sync {
    /// Raise the flag.
    fn signal_reset(&self);

    /// Clear the flag, reporting whether it was raised.
    fn consume_reset_if_pending(&self) -> bool;
}

/// Thread-safe shared reset signal.
pub type SharedResetSignal = Arc<dyn ResetSignal>;

/// Errors from the file-backed flag.
#[derive(Debug, Error)]
pub enum SignalError {
    #[error("could not write reset flag {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// In-process flag for collaborators that share an address space.
#[derive(Debug, Default)]
pub struct AtomicResetFlag {
    pending: AtomicBool,
}

impl AtomicResetFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the flag is raised, without consuming it.
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }
}

impl ResetSignal for AtomicResetFlag {
    fn signal_reset(&self) {
        self.pending.store(true, Ordering::SeqCst);
    }

    fn consume_reset_if_pending(&self) -> bool {
        self.pending.swap(false, Ordering::SeqCst)
    }
}

/// Durable flag file for collaborators running as separate processes.
///
/// Consumption removes the file; only the caller whose removal succeeds sees
/// the flag as pending.
#[derive(Debug, Clone)]
pub struct FileResetFlag {
    path: PathBuf,
}

impl FileResetFlag {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Flag file inside the given data directory.
    pub fn in_dir(data_path: &Path) -> Self {
        Self::new(data_path.join(RESET_FLAG_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raise the flag, reporting I/O failures.
    pub fn try_signal(&self) -> Result<(), SignalError> {
        let write = || -> std::io::Result<()> {
            if let Some(parent) = self.path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&self.path, "reset")
        };
        write().map_err(|source| SignalError::Write {
            path: self.path.clone(),
            source,
        })
    }

    /// Whether the flag file exists, without consuming it.
    pub fn is_pending(&self) -> bool {
        self.path.exists()
    }
}

impl ResetSignal for FileResetFlag {
    fn signal_reset(&self) {
        if let Err(e) = self.try_signal() {
            tracing::warn!(error = %e, "Reset signal not recorded");
        }
    }

    fn consume_reset_if_pending(&self) -> bool {
        match std::fs::remove_file(&self.path) {
            Ok(()) => true,
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(e) => {
                tracing::warn!(path = ?self.path, error = %e, "Could not consume reset flag");
                false
            }
        }
    }
}
