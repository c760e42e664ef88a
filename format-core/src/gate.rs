// SPDX-License-Identifier: GPL-3.0-only

use std::fs::{File, OpenOptions, TryLockError};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

/// In-process busy flag guarding the start of a format workflow
///
/// For hosts with several start actions in one process. Callers hold the
/// returned `WorkflowGuard` for the duration of the run. Separate processes
/// are kept apart by [`RunLock`].
#[derive(Debug, Clone, Default)]
pub struct WorkflowGate {
    busy: Arc<AtomicBool>,
}

impl WorkflowGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` while another workflow holds the gate.
    pub fn try_begin(&self) -> Option<WorkflowGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| WorkflowGuard {
                busy: Arc::clone(&self.busy),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Releases the gate on drop
#[derive(Debug)]
pub struct WorkflowGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for WorkflowGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// Exclusive OS lock on a well-known file, held for a whole run
///
/// The lock is released when the value is dropped or the process exits,
/// so a crashed run never leaves a stale lock behind. The file itself is
/// left in place.
#[derive(Debug)]
pub struct RunLock {
    _file: File,
    path: PathBuf,
}

impl RunLock {
    pub const FILE_NAME: &'static str = "safe-format.lock";

    /// `Ok(None)` while another run, in any process, holds the lock in `dir`.
    pub fn try_acquire(dir: &Path) -> io::Result<Option<Self>> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(Self::FILE_NAME);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)?;

        match file.try_lock() {
            Ok(()) => {
                debug!("Acquired run lock {:?}", path);
                Ok(Some(Self { _file: file, path }))
            }
            Err(TryLockError::WouldBlock) => Ok(None),
            Err(TryLockError::Error(e)) => Err(e),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
