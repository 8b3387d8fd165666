// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Whole-document writes: content goes to a temporary file in the target
//! directory, which is then renamed over the destination. A failed write
//! never leaves a partial document behind.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::domain::{CortexError, Result};

#[cfg(unix)]
const DOCUMENT_MODE: u32 = 0o644;

pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    std::fs::create_dir_all(dir).map_err(|e| CortexError::io(dir, e))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| CortexError::io(dir, e))?;
    tmp.write_all(contents.as_bytes())
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| CortexError::io(tmp.path(), e))?;

    // Temporary files are created owner-only; documents are shared
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(DOCUMENT_MODE);
        tmp.as_file()
            .set_permissions(perms)
            .map_err(|e| CortexError::io(tmp.path(), e))?;
    }

    tmp.persist(path).map_err(|e| CortexError::io(path, e.error))?;

    tracing::trace!(path = %path.display(), bytes = contents.len(), "Wrote document");
    Ok(())
}
