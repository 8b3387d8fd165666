// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Instinct document storage.
//!
//! Each instinct is one Markdown file named `<id>.md`:
//!
//! ```text
//! ---
//! id: tool-preference-read
//! trigger: when needing to use development tools
//! confidence: 0.55
//! domain: tool-usage
//! source: session-observation
//! last_updated: 2026-03-14
//! observation_count: 7
//! ---
//!
//! # Tool Preference Read
//!
//! ## Action
//! Prefer using Read (used 70% of the time)
//!
//! ## Evidence
//! ...
//! ```
//!
//! Instincts learned locally live in `instincts/personal`; instincts shared
//! from elsewhere live in `instincts/inherited` and are only ever read.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use super::atomic_file::write_atomic;
use super::frontmatter;
use crate::domain::{
    clamp_confidence, ConfidenceConfig, CortexError, Instinct, InstinctDomain, InstinctId,
    InstinctRepository, Result, StorePaths,
};

const DEFAULT_CONFIDENCE: f64 = 0.5;

#[derive(Serialize)]
struct InstinctHeader<'a> {
    id: &'a str,
    trigger: &'a str,
    confidence: f64,
    domain: &'a str,
    source: &'a str,
    last_updated: String,
    observation_count: u32,
}

/// Render an instinct as a complete document
pub fn render_instinct(instinct: &Instinct) -> Result<String> {
    let header = InstinctHeader {
        id: instinct.id.as_str(),
        trigger: &instinct.trigger,
        confidence: instinct.confidence,
        domain: instinct.domain.as_str(),
        source: &instinct.source,
        last_updated: instinct.last_updated.to_string(),
        observation_count: instinct.observation_count,
    };

    let body = format!(
        "# {title}\n\n## Action\n{action}\n\n## Evidence\n- Observed {count} times\n- Source: {source}\n- Last analyzed: {date}\n",
        title = instinct.id.title(),
        action = instinct.action,
        count = instinct.observation_count,
        source = instinct.source,
        date = instinct.last_updated,
    );

    frontmatter::render(&header, &body)
}

/// Parse an instinct document. `None` when the header or its `id` is
/// missing. Absent optional fields take lenient defaults; `source` falls
/// back to `default_source`. Confidence is kept within `[0, 1]`.
pub fn parse_instinct(content: &str, default_source: &str) -> Option<Instinct> {
    let doc = frontmatter::parse(content)?;
    let fm = &doc.frontmatter;

    let id = fm.get_str("id").filter(|id| !id.trim().is_empty())?;
    let last_updated = fm
        .get_str("last_updated")
        .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok())
        .unwrap_or_else(|| Utc::now().date_naive());

    Some(Instinct {
        id: InstinctId::new(id),
        trigger: fm.get_str("trigger").unwrap_or_default(),
        action: doc.section("Action").unwrap_or_default(),
        domain: InstinctDomain::from(fm.get_str("domain").unwrap_or_default()),
        confidence: fm
            .get_f64("confidence")
            .filter(|c| c.is_finite())
            .map_or(DEFAULT_CONFIDENCE, |c| clamp_confidence(c, 1.0)),
        observation_count: fm.get_u32("observation_count").unwrap_or(1).max(1),
        source: fm
            .get_str("source")
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| default_source.to_string()),
        last_updated,
    })
}

/// Filesystem-backed instinct store. Loaded confidence never exceeds the
/// configured ceiling.
pub struct FileInstinctRepository {
    personal_dir: PathBuf,
    inherited_dir: PathBuf,
    confidence_ceiling: f64,
}

impl FileInstinctRepository {
    pub fn new(personal_dir: impl Into<PathBuf>, inherited_dir: impl Into<PathBuf>) -> Self {
        Self {
            personal_dir: personal_dir.into(),
            inherited_dir: inherited_dir.into(),
            confidence_ceiling: ConfidenceConfig::default().ceiling,
        }
    }

    pub fn with_confidence_ceiling(mut self, ceiling: f64) -> Self {
        self.confidence_ceiling = ceiling;
        self
    }

    pub fn for_store(paths: &StorePaths) -> Self {
        Self::new(paths.personal_dir(), paths.inherited_dir())
    }

    pub fn path_for(&self, id: &InstinctId) -> PathBuf {
        self.personal_dir.join(format!("{}.md", id))
    }

    /// Instincts in one directory, sorted by file name
    fn load_dir(&self, dir: &Path, label: &str) -> Result<Vec<Instinct>> {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(CortexError::io(dir, e)),
        };

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "md"))
            .collect();
        files.sort();

        let mut instincts = Vec::with_capacity(files.len());
        for path in files {
            let content = match std::fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable instinct");
                    continue;
                }
            };
            match parse_instinct(&content, label) {
                Some(mut instinct) => {
                    instinct.confidence =
                        clamp_confidence(instinct.confidence, self.confidence_ceiling);
                    instincts.push(instinct);
                }
                None => {
                    tracing::debug!(path = %path.display(), "Skipping malformed instinct document");
                }
            }
        }
        Ok(instincts)
    }
}

impl InstinctRepository for FileInstinctRepository {
    fn load(&self) -> Result<BTreeMap<InstinctId, Instinct>> {
        let instincts = self.load_dir(&self.personal_dir, "personal")?;
        Ok(instincts.into_iter().map(|i| (i.id.clone(), i)).collect())
    }

    fn load_all(&self) -> Result<Vec<Instinct>> {
        let mut all = self.load_dir(&self.personal_dir, "personal")?;
        all.extend(self.load_dir(&self.inherited_dir, "inherited")?);
        Ok(all)
    }

    fn save(&self, instinct: &Instinct) -> Result<()> {
        let content = render_instinct(instinct)?;
        write_atomic(&self.path_for(&instinct.id), &content)
    }
}

/// In-memory instinct store for testing
#[derive(Default)]
pub struct InMemoryInstinctRepository {
    personal: RwLock<BTreeMap<InstinctId, Instinct>>,
    inherited: Vec<Instinct>,
}

impl InMemoryInstinctRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_inherited(inherited: Vec<Instinct>) -> Self {
        Self {
            personal: RwLock::default(),
            inherited,
        }
    }

    pub fn get(&self, id: &InstinctId) -> Option<Instinct> {
        self.personal.read().ok()?.get(id).cloned()
    }
}

impl InstinctRepository for InMemoryInstinctRepository {
    fn load(&self) -> Result<BTreeMap<InstinctId, Instinct>> {
        Ok(self.personal.read().map(|m| m.clone()).unwrap_or_default())
    }

    fn load_all(&self) -> Result<Vec<Instinct>> {
        let mut all: Vec<Instinct> = self.load()?.into_values().collect();
        all.extend(self.inherited.iter().cloned());
        Ok(all)
    }

    fn save(&self, instinct: &Instinct) -> Result<()> {
        if let Ok(mut personal) = self.personal.write() {
            personal.insert(instinct.id.clone(), instinct.clone());
        }
        Ok(())
    }
}
