// SPDX-License-Identifier: MIT

//! Interrupt/resume orchestration kit
//!
//! This module provides:
//! - `state` - the state contract and a generic field map
//! - `step` - named units of work
//! - `interrupt` - the suspend/resume protocol and run lifecycle
//! - `pipeline` - validated step graphs with conditional dispatch
//! - `checkpoint` - session-keyed persistence of suspended runs
//! - `runner` - drives a pipeline to the next suspension or to completion

pub mod checkpoint;
pub mod error;
pub mod interrupt;
pub mod pipeline;
pub mod runner;
pub mod state;
pub mod step;

pub use checkpoint::{Checkpoint, CheckpointStore, FileCheckpointStore, MemoryCheckpointStore};
pub use error::{CollaboratorError, FlowError, StepError, StoreError};
pub use interrupt::{Approval, Interrupt, RunPhase, StepContext, AFFIRMATIVE_ANSWER};
pub use pipeline::{Pipeline, PipelineBuilder};
pub use runner::{GraphRunner, RunOutcome};
pub use state::{StateMap, WorkflowState};
pub use step::{FnStep, Step};
