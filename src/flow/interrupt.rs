// SPDX-License-Identifier: MIT

//! Suspend/resume protocol
//!
//! A step suspends by calling [`StepContext::interrupt`]. On a fresh run the
//! call returns `Err(StepError::Interrupted(..))`, which the step propagates
//! with `?` and the runner turns into a checkpoint. When the runner re-enters
//! the same step on resume, the context carries the human's answer and the
//! very same call returns `Ok(answer)`, so step code reads as a plain
//! synchronous question.

use serde::{Deserialize, Serialize};

use super::error::{FlowError, StepError};

/// The one answer that counts as approval. Matched exactly.
pub const AFFIRMATIVE_ANSWER: &str = "yes";

/// A pending question for the human
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interrupt {
    pub prompt: String,
}

impl Interrupt {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}

/// Per-invocation context handed to a step
#[derive(Debug)]
pub struct StepContext {
    session_id: String,
    resume: Option<String>,
}

impl StepContext {
    /// Context for a normal invocation
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            resume: None,
        }
    }

    /// Context for re-entering a suspended step with the human's answer
    pub fn resuming(session_id: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            resume: Some(answer.into()),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Whether this invocation is a resume
    pub fn is_resuming(&self) -> bool {
        self.resume.is_some()
    }

    /// Ask the human a question.
    ///
    /// Returns the resume answer if one is waiting (consuming it), otherwise
    /// suspends the run with `prompt`.
    pub fn interrupt(&mut self, prompt: impl Into<String>) -> Result<String, StepError> {
        match self.resume.take() {
            Some(answer) => Ok(answer),
            None => Err(StepError::Interrupted(Interrupt::new(prompt))),
        }
    }
}

/// Human decision derived from a resume answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Approval {
    #[serde(rename = "yes")]
    Approved,
    #[default]
    #[serde(rename = "no")]
    Declined,
}

impl Approval {
    /// Anything other than the exact affirmative sentinel is a decline.
    pub fn from_answer(answer: &str) -> Self {
        if answer == AFFIRMATIVE_ANSWER {
            Self::Approved
        } else {
            Self::Declined
        }
    }

    pub fn is_approved(self) -> bool {
        self == Self::Approved
    }
}

/// Lifecycle of a single run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunPhase {
    Running,
    Suspended,
    Resumed,
    Completed,
    Failed,
}

impl RunPhase {
    /// Legal moves: RUNNING -> SUSPENDED -> RESUMED -> RUNNING -> COMPLETED,
    /// and RUNNING/RESUMED -> FAILED.
    pub fn can_transition_to(self, next: RunPhase) -> bool {
        use RunPhase::*;
        matches!(
            (self, next),
            (Running, Suspended)
                | (Running, Completed)
                | (Running, Failed)
                | (Suspended, Resumed)
                | (Resumed, Running)
                | (Resumed, Suspended)
                | (Resumed, Failed)
        )
    }

    pub fn advance(self, next: RunPhase) -> Result<RunPhase, FlowError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(FlowError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RunPhase::Completed | RunPhase::Failed)
    }
}
