// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain
//!
//! Observations, patterns, instincts and evolved artifacts.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Value types, confidence arithmetic and repository contracts

pub mod config;
pub mod error;
pub mod events;
pub mod evolved;
pub mod instinct;
pub mod observation;
pub mod pattern;
pub mod repository;

pub use config::*;
pub use error::*;
pub use events::*;
pub use evolved::*;
pub use instinct::*;
pub use observation::*;
pub use pattern::*;
pub use repository::*;
