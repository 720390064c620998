// SPDX-License-Identifier: MIT

//! Typed error handling for the orchestration kit
//!
//! Errors are split by concern: `FlowError` for pipeline construction and
//! runner bookkeeping, `StepError` for what a single step can produce, and
//! `StoreError` for checkpoint persistence.

use thiserror::Error;

use super::interrupt::{Interrupt, RunPhase};

/// Errors raised while building or driving a pipeline
#[derive(Debug, Error)]
pub enum FlowError {
    /// `resume` called for a session with no live checkpoint
    #[error("No pending interrupt for session '{session_id}'")]
    NoPendingInterrupt { session_id: String },

    /// A dispatcher can route to a step the pipeline does not declare
    #[error("Step '{step}' dispatches to unknown step '{target}'")]
    UnknownDispatchTarget { step: String, target: String },

    /// An edge or entry refers to a step that was never added
    #[error("Pipeline '{pipeline}' has no step named '{step}'")]
    UnknownStep { pipeline: String, step: String },

    /// Two steps registered under the same name
    #[error("Duplicate step name: {0}")]
    DuplicateStep(String),

    /// No entry step was set
    #[error("Pipeline '{0}' has no entry step")]
    MissingEntry(String),

    /// A non-terminal step has no outgoing transition
    #[error("Step '{0}' has no successor and is not a finish point")]
    DanglingStep(String),

    /// A step was given more than one outgoing transition
    #[error("Step '{0}' has more than one outgoing transition")]
    ConflictingTransition(String),

    /// No finish point was declared
    #[error("Pipeline '{0}' has no finish point")]
    NoFinishPoint(String),

    /// Circular dependency detected between steps
    #[error("Circular dependency detected: {0:?}")]
    CircularDependency(Vec<String>),

    /// The stored checkpoint was written by another pipeline
    #[error("Checkpoint for session '{session_id}' belongs to pipeline '{found}', not '{expected}'")]
    PipelineMismatch {
        session_id: String,
        expected: String,
        found: String,
    },

    /// Illegal move in the suspend/resume state machine
    #[error("Invalid run transition: {from:?} -> {to:?}")]
    InvalidTransition { from: RunPhase, to: RunPhase },

    /// Checkpoint persistence failure
    #[error("Checkpoint store error: {0}")]
    Store(#[from] StoreError),

    /// State snapshot encoding/decoding errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// What a step can produce instead of a state update
#[derive(Debug, Error)]
pub enum StepError {
    /// The step asked for a human answer. Not a failure: the runner turns it
    /// into a checkpoint.
    #[error("Suspended: {}", .0.prompt)]
    Interrupted(Interrupt),

    /// The step's own logic failed; aborts the run
    #[error("Step execution failed: {0}")]
    Execution(String),

    /// A collaborator failure the step chose to propagate
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
}

impl StepError {
    /// Create an execution error
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution(message.into())
    }

    /// Whether this is a suspension rather than a failure
    pub fn is_interrupt(&self) -> bool {
        matches!(self, Self::Interrupted(_))
    }
}

/// Failure reported by an external capability (search, ranking, classification)
#[derive(Debug, Clone, Error)]
#[error("Collaborator '{collaborator}' failed: {message}")]
pub struct CollaboratorError {
    pub collaborator: String,
    pub message: String,
}

impl CollaboratorError {
    pub fn new(collaborator: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            collaborator: collaborator.into(),
            message: message.into(),
        }
    }
}

/// Checkpoint store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O errors from file-backed stores
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Record encoding/decoding errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// A stored record could not be trusted
    #[error("Corrupt checkpoint for session '{session_id}': {message}")]
    Corrupt { session_id: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_pending_interrupt_message() {
        let err = FlowError::NoPendingInterrupt {
            session_id: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "No pending interrupt for session 'abc'");
    }

    #[test]
    fn test_step_error_is_interrupt() {
        let suspended = StepError::Interrupted(Interrupt::new("continue?"));
        assert!(suspended.is_interrupt());
        assert_eq!(suspended.to_string(), "Suspended: continue?");

        let failed = StepError::execution("boom");
        assert!(!failed.is_interrupt());
    }

    #[test]
    fn test_collaborator_error_converts_into_step_error() {
        let err: StepError = CollaboratorError::new("finder", "timeout").into();
        assert!(matches!(err, StepError::Collaborator(_)));
        assert_eq!(err.to_string(), "Collaborator 'finder' failed: timeout");
    }

    #[test]
    fn test_store_error_wraps_into_flow_error() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err: FlowError = StoreError::from(io).into();
        assert!(err.to_string().starts_with("Checkpoint store error"));
    }
}
