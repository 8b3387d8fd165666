// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Single-writer guard for a knowledge store.
//!
//! Write passes hold `<root>/.lock` for their whole duration. The file is
//! created with `create_new`, so a second writer fails fast with
//! [`CortexError::Locked`] instead of interleaving upserts. The lock is
//! released when the guard is dropped. A lock left behind by a crashed
//! process must be removed by hand.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::domain::{CortexError, Result};

#[derive(Debug)]
pub struct StoreLock {
    path: PathBuf,
}

impl StoreLock {
    pub fn acquire(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CortexError::io(parent, e))?;
        }

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(CortexError::Locked(path));
            }
            Err(e) => return Err(CortexError::io(&path, e)),
        };

        // Informational only; nothing reads it back
        let _ = writeln!(file, "pid={} acquired={}", std::process::id(), chrono::Utc::now().to_rfc3339());

        tracing::debug!(path = %path.display(), "Acquired store lock");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to release store lock");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_writer_is_rejected_until_release() {
        let dir = tempfile::tempdir().unwrap();
        let lock_path = dir.path().join("store").join(".lock");

        let first = StoreLock::acquire(&lock_path).unwrap();
        assert!(lock_path.exists());
        assert!(matches!(StoreLock::acquire(&lock_path), Err(CortexError::Locked(_))));

        drop(first);
        assert!(!lock_path.exists());
        assert!(StoreLock::acquire(&lock_path).is_ok());
    }
}
