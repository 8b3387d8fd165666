// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Observation log reader.
//!
//! The log is JSON Lines, appended to by an external hook. Reading is
//! tolerant: blank lines and lines that fail to parse are skipped, and an
//! absent log is simply empty.

use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use super::atomic_file::write_atomic;
use crate::domain::{CortexError, Observation, Result, StorePaths};

pub struct ObservationLog {
    path: PathBuf,
    marker: PathBuf,
}

impl ObservationLog {
    pub fn new(path: impl Into<PathBuf>, marker: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            marker: marker.into(),
        }
    }

    pub fn for_store(paths: &StorePaths) -> Self {
        Self::new(paths.observations_file(), paths.analysis_marker())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All parseable observations, in file order
    pub fn read(&self) -> Result<Vec<Observation>> {
        let file = match std::fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No observation log");
                return Ok(Vec::new());
            }
            Err(e) => return Err(CortexError::io(&self.path, e)),
        };
        parse_lines(BufReader::new(file)).map_err(|e| CortexError::io(&self.path, e))
    }

    /// Record when the log was last analyzed
    pub fn mark_analyzed(&self, at: DateTime<Utc>) -> Result<()> {
        write_atomic(&self.marker, &at.to_rfc3339())
    }

    pub fn last_analyzed(&self) -> Option<DateTime<Utc>> {
        let raw = std::fs::read_to_string(&self.marker).ok()?;
        DateTime::parse_from_rfc3339(raw.trim())
            .ok()
            .map(|at| at.with_timezone(&Utc))
    }
}

/// Parse JSON Lines, skipping blank and malformed lines. Invalid UTF-8 only
/// affects the line it occurs on.
pub fn parse_lines(reader: impl BufRead) -> std::io::Result<Vec<Observation>> {
    let mut observations = Vec::new();
    let mut skipped = 0usize;

    for (index, line) in reader.split(b'\n').enumerate() {
        let line = line?;
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        match serde_json::from_slice::<Observation>(&line) {
            Ok(observation) => observations.push(observation),
            Err(e) => {
                skipped += 1;
                tracing::debug!(line = index + 1, error = %e, "Skipping invalid observation");
            }
        }
    }

    if skipped > 0 {
        tracing::warn!(skipped, "Skipped malformed observation lines");
    }
    Ok(observations)
}
