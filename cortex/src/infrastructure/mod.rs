// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Infrastructure layer: observation log, document stores, store lock

pub mod artifact_store;
pub mod atomic_file;
pub mod frontmatter;
pub mod instinct_store;
pub mod observation_log;
pub mod store_lock;

pub use artifact_store::{render_artifact, FileArtifactRepository, InMemoryArtifactRepository};
pub use instinct_store::{
    parse_instinct, render_instinct, FileInstinctRepository, InMemoryInstinctRepository,
};
pub use observation_log::ObservationLog;
pub use store_lock::StoreLock;
