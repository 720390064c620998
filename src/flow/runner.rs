// SPDX-License-Identifier: MIT

//! Graph runner
//!
//! Drives a [`Pipeline`] for one session until it either suspends or
//! finishes, persisting suspensions through a [`CheckpointStore`]. The
//! runner itself keeps nothing between calls; every resume re-reads the
//! store.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::checkpoint::{Checkpoint, CheckpointStore};
use super::error::{FlowError, StepError};
use super::interrupt::{RunPhase, StepContext};
use super::pipeline::Pipeline;
use super::state::WorkflowState;

/// Result of a `start` or `resume` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome<S> {
    /// Waiting for a human answer; the checkpoint is stored
    Suspended { step: String, prompt: String },
    /// Reached a finish point; the checkpoint is gone
    Completed { state: S },
    /// A step or dispatcher failed; the store was not touched
    Failed { step: String, error: String },
}

impl<S> RunOutcome<S> {
    pub fn is_suspended(&self) -> bool {
        matches!(self, RunOutcome::Suspended { .. })
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed { .. })
    }

    pub fn prompt(&self) -> Option<&str> {
        match self {
            RunOutcome::Suspended { prompt, .. } => Some(prompt),
            _ => None,
        }
    }

    /// Final state, if the run completed
    pub fn into_state(self) -> Option<S> {
        match self {
            RunOutcome::Completed { state } => Some(state),
            _ => None,
        }
    }
}

/// Where a drive begins
struct Entry {
    step: String,
    answer: Option<String>,
    phase: RunPhase,
}

/// Runs pipelines against a shared checkpoint store
#[derive(Clone)]
pub struct GraphRunner {
    store: Arc<dyn CheckpointStore>,
}

impl GraphRunner {
    pub fn new(store: Arc<dyn CheckpointStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn CheckpointStore> {
        &self.store
    }

    /// Run `pipeline` from its entry with a fresh state.
    ///
    /// A checkpoint already pending for `session_id` is discarded: it is
    /// overwritten if this run suspends and removed if this run completes.
    pub async fn start<S: WorkflowState>(
        &self,
        pipeline: &Pipeline<S>,
        session_id: &str,
        initial: S,
    ) -> Result<RunOutcome<S>, FlowError> {
        if let Some(existing) = self.store.get(session_id).await? {
            log::warn!(
                "Session '{}' restarted while paused at '{}' in '{}'; discarding that run",
                session_id,
                existing.paused_at_step,
                existing.pipeline_id
            );
        }

        log::info!("Starting pipeline '{}' for session '{}'", pipeline.id(), session_id);
        let entry = Entry {
            step: pipeline.entry().to_string(),
            answer: None,
            phase: RunPhase::Running,
        };
        self.drive(pipeline, session_id, initial, entry).await
    }

    /// Continue a suspended run, feeding `answer` to the step that asked.
    pub async fn resume<S: WorkflowState>(
        &self,
        pipeline: &Pipeline<S>,
        session_id: &str,
        answer: impl Into<String>,
    ) -> Result<RunOutcome<S>, FlowError> {
        let checkpoint =
            self.store
                .get(session_id)
                .await?
                .ok_or_else(|| FlowError::NoPendingInterrupt {
                    session_id: session_id.to_string(),
                })?;

        if checkpoint.pipeline_id != pipeline.id() {
            return Err(FlowError::PipelineMismatch {
                session_id: session_id.to_string(),
                expected: pipeline.id().to_string(),
                found: checkpoint.pipeline_id,
            });
        }
        if !pipeline.contains(&checkpoint.paused_at_step) {
            return Err(FlowError::UnknownStep {
                pipeline: pipeline.id().to_string(),
                step: checkpoint.paused_at_step,
            });
        }

        let state: S = serde_json::from_value(checkpoint.state_snapshot)?;

        log::info!(
            "Resuming pipeline '{}' for session '{}' at '{}'",
            pipeline.id(),
            session_id,
            checkpoint.paused_at_step
        );
        let entry = Entry {
            step: checkpoint.paused_at_step,
            answer: Some(answer.into()),
            phase: RunPhase::Suspended.advance(RunPhase::Resumed)?,
        };
        self.drive(pipeline, session_id, state, entry).await
    }

    async fn drive<S: WorkflowState>(
        &self,
        pipeline: &Pipeline<S>,
        session_id: &str,
        mut state: S,
        entry: Entry,
    ) -> Result<RunOutcome<S>, FlowError> {
        let mut phase = entry.phase;
        let mut answer = entry.answer;
        let mut current = entry.step;

        // Pipelines are acyclic, so no step runs twice in one drive
        loop {
            let step = pipeline
                .step(&current)
                .ok_or_else(|| FlowError::UnknownStep {
                    pipeline: pipeline.id().to_string(),
                    step: current.clone(),
                })?;

            let mut ctx = match answer.take() {
                Some(answer) => StepContext::resuming(session_id, answer),
                None => StepContext::new(session_id),
            };

            log::debug!("Session '{}': running step '{}'", session_id, current);
            match step.run(&state, &mut ctx).await {
                Ok(update) => {
                    state = state.merge(update);
                    if phase != RunPhase::Running {
                        phase = phase.advance(RunPhase::Running)?;
                    }
                }
                Err(StepError::Interrupted(interrupt)) => {
                    phase = phase.advance(RunPhase::Suspended)?;
                    let snapshot = serde_json::to_value(&state)?;
                    self.store
                        .put(Checkpoint::new(
                            session_id,
                            pipeline.id(),
                            &current,
                            snapshot,
                            &interrupt.prompt,
                        ))
                        .await?;
                    log::info!(
                        "Session '{}' {:?} at '{}' in '{}'",
                        session_id,
                        phase,
                        current,
                        pipeline.id()
                    );
                    return Ok(RunOutcome::Suspended {
                        step: current,
                        prompt: interrupt.prompt,
                    });
                }
                Err(e) => {
                    phase.advance(RunPhase::Failed)?;
                    log::error!("Session '{}': step '{}' failed: {}", session_id, current, e);
                    return Ok(fail(&current, e));
                }
            }

            match pipeline.next_step(&current, &state) {
                Ok(Some(next)) => current = next,
                Ok(None) => {
                    phase.advance(RunPhase::Completed)?;
                    self.store.delete(session_id).await?;
                    log::info!(
                        "Session '{}' completed pipeline '{}' at '{}'",
                        session_id,
                        pipeline.id(),
                        current
                    );
                    return Ok(RunOutcome::Completed { state });
                }
                Err(e) => {
                    phase.advance(RunPhase::Failed)?;
                    log::error!("Session '{}': routing after '{}' failed: {}", session_id, current, e);
                    return Ok(fail(&current, e));
                }
            }
        }
    }
}

fn fail<S>(step: &str, error: impl ToString) -> RunOutcome<S> {
    RunOutcome::Failed {
        step: step.to_string(),
        error: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::checkpoint::MemoryCheckpointStore;
    use crate::flow::interrupt::Approval;
    use crate::flow::state::StateMap;
    use crate::flow::step::{FnStep, Step};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts invocations and records a marker field
    struct CountingStep {
        name: String,
        calls: Arc<AtomicUsize>,
    }

    impl CountingStep {
        fn new(name: &str) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    name: name.to_string(),
                    calls: calls.clone(),
                },
                calls,
            )
        }
    }

    #[async_trait]
    impl Step<StateMap> for CountingStep {
        fn name(&self) -> &str {
            &self.name
        }

        async fn run(
            &self,
            _state: &StateMap,
            _ctx: &mut StepContext,
        ) -> Result<StateMap, StepError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(StateMap::new().with(format!("{}_done", self.name), json!(true)))
        }
    }

    fn ask_step() -> impl Step<StateMap> {
        FnStep::new(
            "ask",
            |state: &StateMap, ctx: &mut StepContext| -> Result<StateMap, StepError> {
                let count = state.get_as::<u64>("count", 0);
                let answer = ctx.interrupt(format!("Found {count}. Continue?"))?;
                Ok(StateMap::new().with("approval", json!(Approval::from_answer(&answer))))
            },
        )
    }

    fn route(state: &StateMap) -> String {
        match state.get_as("approval", Approval::Declined) {
            Approval::Approved => "accept".to_string(),
            Approval::Declined => "reject".to_string(),
        }
    }

    fn approval_pipeline() -> (Pipeline<StateMap>, Arc<AtomicUsize>) {
        let (prepare, prepare_calls) = CountingStep::new("prepare");
        let (accept, _) = CountingStep::new("accept");
        let (reject, _) = CountingStep::new("reject");
        let pipeline = Pipeline::<StateMap>::builder("approval")
            .add_step(prepare)
            .add_step(ask_step())
            .add_step(accept)
            .add_step(reject)
            .set_entry("prepare")
            .add_edge("prepare", "ask")
            .add_conditional_edges("ask", &["accept", "reject"], route)
            .set_finish_point("accept")
            .set_finish_point("reject")
            .build()
            .unwrap();
        (pipeline, prepare_calls)
    }

    fn runner() -> (GraphRunner, MemoryCheckpointStore) {
        let store = MemoryCheckpointStore::new();
        (GraphRunner::new(Arc::new(store.clone())), store)
    }

    #[tokio::test]
    async fn test_start_suspends_and_stores_checkpoint() {
        let (pipeline, _) = approval_pipeline();
        let (runner, store) = runner();

        let initial = StateMap::new().with("count", json!(3));
        let outcome = runner.start(&pipeline, "s1", initial).await.unwrap();

        assert_eq!(
            outcome,
            RunOutcome::Suspended {
                step: "ask".to_string(),
                prompt: "Found 3. Continue?".to_string(),
            }
        );

        let checkpoint = store.get("s1").await.unwrap().unwrap();
        assert_eq!(checkpoint.pipeline_id, "approval");
        assert_eq!(checkpoint.paused_at_step, "ask");
        assert_eq!(checkpoint.pending_prompt, "Found 3. Continue?");
        // Snapshot is the state the suspending step was given
        assert_eq!(checkpoint.state_snapshot["prepare_done"], json!(true));
        assert!(checkpoint.state_snapshot.get("approval").is_none());
    }

    #[tokio::test]
    async fn test_resume_takes_positive_branch() {
        let (pipeline, prepare_calls) = approval_pipeline();
        let (runner, store) = runner();

        runner.start(&pipeline, "s1", StateMap::new()).await.unwrap();
        let outcome = runner.resume(&pipeline, "s1", "yes").await.unwrap();

        let state = outcome.into_state().expect("completed");
        assert_eq!(state.get("accept_done"), Some(&json!(true)));
        assert!(state.get("reject_done").is_none());
        // Steps before the suspension are not re-run
        assert_eq!(prepare_calls.load(Ordering::SeqCst), 1);
        assert!(store.get("s1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_resume_with_other_answer_takes_negative_branch() {
        for answer in ["YES", "sure", "", "no"] {
            let (pipeline, _) = approval_pipeline();
            let (runner, _) = runner();

            runner.start(&pipeline, "s", StateMap::new()).await.unwrap();
            let state = runner
                .resume(&pipeline, "s", answer)
                .await
                .unwrap()
                .into_state()
                .unwrap();

            assert_eq!(state.get("reject_done"), Some(&json!(true)), "{answer:?}");
            assert!(state.get("accept_done").is_none(), "{answer:?}");
        }
    }

    #[tokio::test]
    async fn test_resume_without_checkpoint() {
        let (pipeline, _) = approval_pipeline();
        let (runner, _) = runner();

        let err = runner.resume(&pipeline, "ghost", "yes").await.unwrap_err();
        assert!(matches!(err, FlowError::NoPendingInterrupt { session_id } if session_id == "ghost"));
    }

    #[tokio::test]
    async fn test_second_resume_fails() {
        let (pipeline, _) = approval_pipeline();
        let (runner, _) = runner();

        runner.start(&pipeline, "s1", StateMap::new()).await.unwrap();
        assert!(runner.resume(&pipeline, "s1", "yes").await.unwrap().is_completed());

        let err = runner.resume(&pipeline, "s1", "yes").await.unwrap_err();
        assert!(matches!(err, FlowError::NoPendingInterrupt { .. }));
    }

    #[tokio::test]
    async fn test_resume_rejects_foreign_pipeline() {
        let (pipeline, _) = approval_pipeline();
        let (runner, store) = runner();
        store
            .put(Checkpoint::new("s1", "other", "ask", json!({}), "?"))
            .await
            .unwrap();

        let err = runner.resume(&pipeline, "s1", "yes").await.unwrap_err();
        assert!(matches!(err, FlowError::PipelineMismatch { .. }));
        // Checkpoint left alone
        assert!(store.get("s1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_failed_step_writes_no_checkpoint() {
        let pipeline = Pipeline::<StateMap>::builder("failing")
            .add_step(ask_step())
            .add_step(FnStep::new(
                "explode",
                |_: &StateMap, _: &mut StepContext| -> Result<StateMap, StepError> {
                    Err(StepError::execution("invariant violated"))
                },
            ))
            .set_entry("ask")
            .add_edge("ask", "explode")
            .set_finish_point("explode")
            .build()
            .unwrap();
        let (runner, store) = runner();

        runner.start(&pipeline, "s1", StateMap::new()).await.unwrap();
        let before = store.get("s1").await.unwrap().unwrap();

        let outcome = runner.resume(&pipeline, "s1", "yes").await.unwrap();
        match outcome {
            RunOutcome::Failed { step, error } => {
                assert_eq!(step, "explode");
                assert!(error.contains("invariant violated"));
            }
            other => panic!("expected failure, got {other:?}"),
        }

        // The earlier checkpoint is untouched
        assert_eq!(store.get("s1").await.unwrap().unwrap(), before);
    }

    #[tokio::test]
    async fn test_failed_start_keeps_previous_checkpoint() {
        let (pipeline, _) = approval_pipeline();
        let failing = Pipeline::<StateMap>::builder("broken")
            .add_step(FnStep::new(
                "explode",
                |_: &StateMap, _: &mut StepContext| -> Result<StateMap, StepError> {
                    Err(StepError::execution("boom"))
                },
            ))
            .set_entry("explode")
            .set_finish_point("explode")
            .build()
            .unwrap();
        let (runner, store) = runner();

        runner.start(&pipeline, "s1", StateMap::new()).await.unwrap();
        let outcome = runner.start(&failing, "s1", StateMap::new()).await.unwrap();
        assert!(matches!(outcome, RunOutcome::Failed { .. }));

        assert_eq!(store.get("s1").await.unwrap().unwrap().pipeline_id, "approval");
    }

    #[tokio::test]
    async fn test_restart_overwrites_checkpoint() {
        let (pipeline, _) = approval_pipeline();
        let (runner, store) = runner();

        runner
            .start(&pipeline, "s1", StateMap::new().with("count", json!(1)))
            .await
            .unwrap();
        runner
            .start(&pipeline, "s1", StateMap::new().with("count", json!(2)))
            .await
            .unwrap();

        let checkpoint = store.get("s1").await.unwrap().unwrap();
        assert_eq!(checkpoint.pending_prompt, "Found 2. Continue?");
        assert_eq!(store.sessions().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_dispatch_to_undeclared_target_fails_run() {
        let (accept, _) = CountingStep::new("accept");
        let pipeline = Pipeline::<StateMap>::builder("liar")
            .add_step(ask_step())
            .add_step(accept)
            .set_entry("ask")
            .add_conditional_edges("ask", &["accept"], |_: &StateMap| "nowhere".to_string())
            .set_finish_point("accept")
            .build()
            .unwrap();
        let (runner, store) = runner();

        runner.start(&pipeline, "s1", StateMap::new()).await.unwrap();
        let outcome = runner.resume(&pipeline, "s1", "yes").await.unwrap();

        assert!(matches!(outcome, RunOutcome::Failed { ref step, .. } if step == "ask"));
        assert!(store.get("s1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_pipeline_without_interrupts_completes_in_one_call() {
        let (a, a_calls) = CountingStep::new("a");
        let (b, b_calls) = CountingStep::new("b");
        let pipeline = Pipeline::<StateMap>::builder("linear")
            .add_step(a)
            .add_step(b)
            .set_entry("a")
            .add_edge("a", "b")
            .set_finish_point("b")
            .build()
            .unwrap();
        let (runner, _) = runner();

        let state = runner
            .start(&pipeline, "s", StateMap::new())
            .await
            .unwrap()
            .into_state()
            .unwrap();

        assert_eq!(state.get("a_done"), Some(&json!(true)));
        assert_eq!(state.get("b_done"), Some(&json!(true)));
        assert_eq!(a_calls.load(Ordering::SeqCst), 1);
        assert_eq!(b_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let outcome: RunOutcome<StateMap> = RunOutcome::Suspended {
            step: "ask".to_string(),
            prompt: "?".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"status": "suspended", "step": "ask", "prompt": "?"})
        );
    }
}
