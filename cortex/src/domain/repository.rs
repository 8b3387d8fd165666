// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Repository interfaces for the learning loop.
//!
//! | Trait | Aggregate | Implementations |
//! |-------|-----------|----------------|
//! | `InstinctRepository` | `Instinct` | `FileInstinctRepository`, `InMemoryInstinctRepository` |
//! | `ArtifactRepository` | `EvolvedArtifact` | `FileArtifactRepository`, `InMemoryArtifactRepository` |
//!
//! The instinct store is the only interface shared by the analyzer and the
//! evolution pass. Passes are synchronous and assume a single writer per
//! store (see `infrastructure::store_lock`).

use std::collections::BTreeMap;
use std::path::PathBuf;

use super::error::Result;
use super::evolved::EvolvedArtifact;
use super::instinct::{Instinct, InstinctId};

pub trait InstinctRepository: Send + Sync {
    /// Instincts owned by this store, keyed by id. Malformed records are
    /// skipped; a missing store is empty.
    fn load(&self) -> Result<BTreeMap<InstinctId, Instinct>>;

    /// Every readable instinct, including ones inherited from other stores,
    /// in a stable order.
    fn load_all(&self) -> Result<Vec<Instinct>>;

    /// Create or overwrite one record as a whole document
    fn save(&self, instinct: &Instinct) -> Result<()>;
}

pub trait ArtifactRepository: Send + Sync {
    /// Where `artifact` is (or would be) stored
    fn location(&self, artifact: &EvolvedArtifact) -> PathBuf;

    /// Persist an artifact, overwriting any same-named artifact of its kind
    fn save(&self, artifact: &EvolvedArtifact) -> Result<PathBuf>;
}
