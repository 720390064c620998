// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{Checkpoint, CheckpointStore};
use crate::flow::error::StoreError;

/// In-process checkpoint store. Does not survive a restart.
#[derive(Clone, Default)]
pub struct MemoryCheckpointStore {
    checkpoints: Arc<RwLock<HashMap<String, Checkpoint>>>,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CheckpointStore for MemoryCheckpointStore {
    async fn put(&self, checkpoint: Checkpoint) -> Result<(), StoreError> {
        let mut checkpoints = self.checkpoints.write().await;
        checkpoints.insert(checkpoint.session_id.clone(), checkpoint);
        Ok(())
    }

    async fn get(&self, session_id: &str) -> Result<Option<Checkpoint>, StoreError> {
        let checkpoints = self.checkpoints.read().await;
        Ok(checkpoints.get(session_id).cloned())
    }

    async fn delete(&self, session_id: &str) -> Result<bool, StoreError> {
        let mut checkpoints = self.checkpoints.write().await;
        Ok(checkpoints.remove(session_id).is_some())
    }

    async fn sessions(&self) -> Result<Vec<String>, StoreError> {
        let checkpoints = self.checkpoints.read().await;
        let mut ids: Vec<String> = checkpoints.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn checkpoint(session: &str, step: &str, prompt: &str) -> Checkpoint {
        Checkpoint::new(session, "pipeline", step, json!({}), prompt)
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let store = MemoryCheckpointStore::new();
        store.put(checkpoint("s1", "ask", "ok?")).await.unwrap();

        let loaded = store.get("s1").await.unwrap().unwrap();
        assert_eq!(loaded.paused_at_step, "ask");
        assert_eq!(loaded.pending_prompt, "ok?");
    }

    #[tokio::test]
    async fn test_get_missing_session() {
        let store = MemoryCheckpointStore::new();
        assert!(store.get("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_replaces_previous_checkpoint() {
        let store = MemoryCheckpointStore::new();
        store.put(checkpoint("s1", "x", "P1")).await.unwrap();
        store.put(checkpoint("s1", "y", "P2")).await.unwrap();

        let loaded = store.get("s1").await.unwrap().unwrap();
        assert_eq!(loaded.paused_at_step, "y");
        assert_eq!(loaded.pending_prompt, "P2");
        assert_eq!(store.sessions().await.unwrap(), vec!["s1".to_string()]);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryCheckpointStore::new();
        store.put(checkpoint("s1", "x", "P")).await.unwrap();

        assert!(store.delete("s1").await.unwrap());
        assert!(!store.delete("s1").await.unwrap());
        assert!(store.get("s1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = MemoryCheckpointStore::new();
        store.put(checkpoint("b", "x", "P")).await.unwrap();
        store.put(checkpoint("a", "y", "Q")).await.unwrap();
        store.delete("b").await.unwrap();

        assert_eq!(store.sessions().await.unwrap(), vec!["a".to_string()]);
        assert_eq!(store.get("a").await.unwrap().unwrap().pending_prompt, "Q");
    }
}
