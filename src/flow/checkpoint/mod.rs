// SPDX-License-Identifier: MIT

//! Checkpoint persistence
//!
//! This module provides:
//! - `Checkpoint` - the paused-run record, one per session
//! - `CheckpointStore` - the storage contract the runner depends on
//! - `MemoryCheckpointStore` - process-local store, mainly for tests
//! - `FileCheckpointStore` - JSON-file store that survives restarts

mod file;
mod memory;

pub use file::FileCheckpointStore;
pub use memory::MemoryCheckpointStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::StoreError;

/// Snapshot of a suspended run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub session_id: String,
    pub pipeline_id: String,
    /// Step that raised the suspension
    pub paused_at_step: String,
    /// State the suspending step was given (before its own update)
    pub state_snapshot: Value,
    pub pending_prompt: String,
    pub created_at: DateTime<Utc>,
}

impl Checkpoint {
    pub fn new(
        session_id: impl Into<String>,
        pipeline_id: impl Into<String>,
        paused_at_step: impl Into<String>,
        state_snapshot: Value,
        pending_prompt: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            pipeline_id: pipeline_id.into(),
            paused_at_step: paused_at_step.into(),
            state_snapshot,
            pending_prompt: pending_prompt.into(),
            created_at: Utc::now(),
        }
    }
}

/// Session-keyed checkpoint storage.
///
/// At most one checkpoint per session: `put` replaces whatever was stored.
/// Operations on different sessions must not interfere, and a `put` or
/// `delete` must never be observed half-done by a concurrent `get`.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Store (or replace) the checkpoint for `checkpoint.session_id`
    async fn put(&self, checkpoint: Checkpoint) -> Result<(), StoreError>;

    /// Fetch the live checkpoint for a session
    async fn get(&self, session_id: &str) -> Result<Option<Checkpoint>, StoreError>;

    /// Remove a session's checkpoint; returns whether one existed
    async fn delete(&self, session_id: &str) -> Result<bool, StoreError>;

    /// Sessions that currently have a checkpoint, sorted
    async fn sessions(&self) -> Result<Vec<String>, StoreError>;
}
