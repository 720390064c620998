// SPDX-License-Identifier: MIT

//! Pipeline state
//!
//! This module provides:
//! - `WorkflowState` - the contract every pipeline state implements
//! - `StateMap` - a loosely typed field map with overlay merging

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// State threaded through a pipeline.
///
/// Steps never mutate the state they are given; they return an `Update`
/// which the runner overlays with [`WorkflowState::merge`]. Fields are only
/// added or overwritten, never removed.
pub trait WorkflowState:
    Clone + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Partial update returned by a step
    type Update: Send + 'static;

    /// Return a new state with `update` overlaid
    fn merge(&self, update: Self::Update) -> Self;
}

/// Loosely typed state: named JSON fields with overwrite semantics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateMap {
    fields: HashMap<String, Value>,
}

impl StateMap {
    /// Create an empty StateMap
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.set(key, value);
        self
    }

    /// Get a field value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Get a field value, falling back to `default` when it was never written
    pub fn get_or(&self, key: &str, default: Value) -> Value {
        self.fields.get(key).cloned().unwrap_or(default)
    }

    /// Get a field decoded as `T`, falling back to `default` when missing or
    /// of the wrong shape
    pub fn get_as<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.fields
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or(default)
    }

    /// Add or overwrite a field
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.fields.insert(key.into(), value);
    }

    /// Whether a field has been written
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Get all field names
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Convert state to JSON object
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }
}

impl WorkflowState for StateMap {
    type Update = StateMap;

    fn merge(&self, update: StateMap) -> StateMap {
        let mut next = self.clone();
        next.fields.extend(update.fields);
        next
    }
}

impl FromIterator<(String, Value)> for StateMap {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}
