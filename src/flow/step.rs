// SPDX-License-Identifier: MIT

//! Pipeline steps

use async_trait::async_trait;

use super::error::StepError;
use super::interrupt::StepContext;
use super::state::WorkflowState;

/// A named unit of work in a pipeline.
///
/// A step reads the state it is given and returns only its own output
/// fields as an update. To ask the human something it calls
/// `ctx.interrupt(prompt)?`; see [`StepContext::interrupt`].
#[async_trait]
pub trait Step<S: WorkflowState>: Send + Sync {
    /// Returns the step name (must be unique within a pipeline)
    fn name(&self) -> &str;

    /// Run the step against the current state
    async fn run(&self, state: &S, ctx: &mut StepContext) -> Result<S::Update, StepError>;
}

/// Step backed by a synchronous closure
pub struct FnStep<F> {
    name: String,
    func: F,
}

impl<F> FnStep<F> {
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

#[async_trait]
impl<S, F> Step<S> for FnStep<F>
where
    S: WorkflowState,
    F: Fn(&S, &mut StepContext) -> Result<S::Update, StepError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, state: &S, ctx: &mut StepContext) -> Result<S::Update, StepError> {
        (self.func)(state, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::state::StateMap;
    use serde_json::json;

    #[tokio::test]
    async fn test_fn_step_returns_update() {
        let step = FnStep::new(
            "double",
            |state: &StateMap, _ctx: &mut StepContext| -> Result<StateMap, StepError> {
                let n = state.get_as::<i64>("n", 0);
                Ok(StateMap::new().with("doubled", json!(n * 2)))
            },
        );

        assert_eq!(Step::<StateMap>::name(&step), "double");

        let state = StateMap::new().with("n", json!(21));
        let mut ctx = StepContext::new("s");
        let update = step.run(&state, &mut ctx).await.unwrap();
        assert_eq!(update.get("doubled"), Some(&json!(42)));
    }

    #[tokio::test]
    async fn test_fn_step_can_suspend() {
        let step = FnStep::new(
            "ask",
            |_state: &StateMap, ctx: &mut StepContext| -> Result<StateMap, StepError> {
                let answer = ctx.interrupt("Proceed?")?;
                Ok(StateMap::new().with("answer", json!(answer)))
            },
        );

        let state = StateMap::new();
        let mut fresh = StepContext::new("s");
        assert!(step.run(&state, &mut fresh).await.unwrap_err().is_interrupt());

        let mut resumed = StepContext::resuming("s", "no");
        let update = step.run(&state, &mut resumed).await.unwrap();
        assert_eq!(update.get("answer"), Some(&json!("no")));
    }
}
