// SPDX-License-Identifier: MIT

//! Request routing and the session-level facade over both pipelines

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::career::{self, state::CareerFeatures, state::CareerState};
use super::config::NavigatorConfig;
use super::error::NavigatorError;
use super::tools::{
    BudgetRanker, CareerClassifier, CatalogFinder, UniversityFinder, UniversityRanker,
    WeightedClassifier,
};
use super::university::{self, state::StudentProfile, state::UniversityState};
use crate::flow::{
    Checkpoint, CheckpointStore, FileCheckpointStore, FlowError, GraphRunner, Pipeline, RunOutcome,
};

const UNIVERSITY_KEYWORDS: &[&str] = &[
    "university",
    "universities",
    "admission",
    "admissions",
    "matric",
    "inter",
    "intermediate",
    "fee",
    "fees",
    "budget",
    "semester",
    "degree",
];

const CAREER_KEYWORDS: &[&str] = &[
    "career",
    "careers",
    "job",
    "jobs",
    "profession",
    "math score",
    "biology score",
    "interest",
    "interests",
    "skills",
];

/// The two workflows the service runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineKind {
    University,
    Career,
}

impl PipelineKind {
    pub const ALL: [PipelineKind; 2] = [PipelineKind::University, PipelineKind::Career];

    /// Stable pipeline id, as stored in checkpoints
    pub fn id(self) -> &'static str {
        match self {
            PipelineKind::University => university::PIPELINE_ID,
            PipelineKind::Career => career::PIPELINE_ID,
        }
    }
}

impl fmt::Display for PipelineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for PipelineKind {
    type Err = NavigatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PipelineKind::ALL
            .into_iter()
            .find(|k| k.id() == s)
            .ok_or_else(|| NavigatorError::UnknownPipeline(s.to_string()))
    }
}

/// Lowercased words of `text`, space separated and padded
fn normalise(text: &str) -> String {
    let words: Vec<&str> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    format!(" {} ", words.join(" ").to_lowercase())
}

fn hits(normalised: &str, keywords: &[&str]) -> usize {
    keywords
        .iter()
        .filter(|k| normalised.contains(&format!(" {} ", k)))
        .count()
}

/// Pick a pipeline for a free-text request. Ties and no hits give `None`.
pub fn route(text: &str) -> Option<PipelineKind> {
    let normalised = normalise(text);
    let university = hits(&normalised, UNIVERSITY_KEYWORDS);
    let career = hits(&normalised, CAREER_KEYWORDS);
    log::debug!("Routing hits: university={}, career={}", university, career);

    match university.cmp(&career) {
        std::cmp::Ordering::Greater => Some(PipelineKind::University),
        std::cmp::Ordering::Less => Some(PipelineKind::Career),
        std::cmp::Ordering::Equal => None,
    }
}

/// Result of resuming a session, tagged with the pipeline it ran
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "pipeline", content = "outcome", rename_all = "lowercase")]
pub enum SessionOutcome {
    University(RunOutcome<UniversityState>),
    Career(RunOutcome<CareerState>),
}

impl SessionOutcome {
    pub fn kind(&self) -> PipelineKind {
        match self {
            SessionOutcome::University(_) => PipelineKind::University,
            SessionOutcome::Career(_) => PipelineKind::Career,
        }
    }

    pub fn is_suspended(&self) -> bool {
        match self {
            SessionOutcome::University(o) => o.is_suspended(),
            SessionOutcome::Career(o) => o.is_suspended(),
        }
    }
}

/// Owns the runner and both pipelines. Build once per process and share.
pub struct Navigator {
    runner: GraphRunner,
    university: Pipeline<UniversityState>,
    career: Pipeline<CareerState>,
}

impl Navigator {
    /// Wire both pipelines; fails if either is mis-wired
    pub fn new(
        store: Arc<dyn CheckpointStore>,
        finder: Arc<dyn UniversityFinder>,
        ranker: Arc<dyn UniversityRanker>,
        classifier: Arc<dyn CareerClassifier>,
    ) -> Result<Self, NavigatorError> {
        Ok(Self {
            runner: GraphRunner::new(store),
            university: university::build_pipeline(finder, ranker)?,
            career: career::build_pipeline(classifier)?,
        })
    }

    /// File-backed store and YAML catalog from configuration
    pub async fn from_config(config: &NavigatorConfig) -> Result<Self, NavigatorError> {
        let store = FileCheckpointStore::open(&config.checkpoint_dir).await?;
        let finder = CatalogFinder::load(&config.university_catalog).await?;
        log::info!(
            "Checkpoints in {:?}, catalog {:?}",
            store.dir(),
            config.university_catalog
        );
        Self::new(
            Arc::new(store),
            Arc::new(finder),
            Arc::new(BudgetRanker::new()),
            Arc::new(WeightedClassifier::new()),
        )
    }

    pub async fn start_university(
        &self,
        session_id: &str,
        profile: StudentProfile,
    ) -> Result<RunOutcome<UniversityState>, NavigatorError> {
        let outcome = self
            .runner
            .start(&self.university, session_id, UniversityState::new(profile))
            .await?;
        Ok(outcome)
    }

    pub async fn start_career(
        &self,
        session_id: &str,
        features: CareerFeatures,
    ) -> Result<RunOutcome<CareerState>, NavigatorError> {
        let outcome = self
            .runner
            .start(&self.career, session_id, CareerState::new(features))
            .await?;
        Ok(outcome)
    }

    /// Resume whichever pipeline the session is paused in
    pub async fn resume(
        &self,
        session_id: &str,
        answer: &str,
    ) -> Result<SessionOutcome, NavigatorError> {
        let kind = match self.pending(session_id).await? {
            Some(checkpoint) => checkpoint.pipeline_id.parse::<PipelineKind>()?,
            None => {
                return Err(FlowError::NoPendingInterrupt {
                    session_id: session_id.to_string(),
                }
                .into())
            }
        };

        let outcome = match kind {
            PipelineKind::University => SessionOutcome::University(
                self.runner
                    .resume(&self.university, session_id, answer)
                    .await?,
            ),
            PipelineKind::Career => {
                SessionOutcome::Career(self.runner.resume(&self.career, session_id, answer).await?)
            }
        };
        Ok(outcome)
    }

    /// The checkpoint a session is waiting on, if any
    pub async fn pending(&self, session_id: &str) -> Result<Option<Checkpoint>, NavigatorError> {
        Ok(self.runner.store().get(session_id).await?)
    }

    /// Sessions with a pending checkpoint
    pub async fn sessions(&self) -> Result<Vec<String>, NavigatorError> {
        Ok(self.runner.store().sessions().await?)
    }

    /// Drop a session's pending checkpoint; returns whether one existed
    pub async fn abandon(&self, session_id: &str) -> Result<bool, NavigatorError> {
        let removed = self.runner.store().delete(session_id).await?;
        if removed {
            log::info!("Session '{}' abandoned", session_id);
        }
        Ok(removed)
    }

    /// Step names per pipeline, for introspection
    pub fn describe(&self) -> Vec<(PipelineKind, Vec<String>)> {
        vec![
            (
                PipelineKind::University,
                self.university.step_names().to_vec(),
            ),
            (PipelineKind::Career, self.career.step_names().to_vec()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::MemoryCheckpointStore;
    use crate::navigator::university::state::University;

    fn navigator() -> Navigator {
        let finder = CatalogFinder::new(vec![University {
            name: "Riverside University".to_string(),
            city: "Lahore".to_string(),
            location: "Punjab".to_string(),
            admission_portal: "https://riverside.example.edu".to_string(),
            fee_per_semester: 90_000,
            min_inter_marks: 700,
            merit_formula: String::new(),
            programs: vec!["Computer Science".to_string()],
        }]);
        Navigator::new(
            Arc::new(MemoryCheckpointStore::new()),
            Arc::new(finder),
            Arc::new(BudgetRanker::new()),
            Arc::new(WeightedClassifier::new()),
        )
        .unwrap()
    }

    #[test]
    fn test_route_university_request() {
        let text = "Suggest a university in Lahore, my inter marks are 950 and fee budget is 100000";
        assert_eq!(route(text), Some(PipelineKind::University));
    }

    #[test]
    fn test_route_career_request() {
        let text = "Which career fits me? I have a math score of 90 and an interest in tech";
        assert_eq!(route(text), Some(PipelineKind::Career));
    }

    #[test]
    fn test_route_does_not_match_inside_words() {
        // "interest" must not count as "inter"
        assert_eq!(route("my interests"), Some(PipelineKind::Career));
        assert_eq!(route("hello there"), None);
        assert_eq!(route("a job at a university"), None);
    }

    #[test]
    fn test_pipeline_kind_ids() {
        assert_eq!("university".parse::<PipelineKind>().unwrap(), PipelineKind::University);
        assert_eq!(PipelineKind::Career.to_string(), "career");
        assert!(matches!(
            "chat".parse::<PipelineKind>(),
            Err(NavigatorError::UnknownPipeline(_))
        ));
    }

    #[tokio::test]
    async fn test_resume_selects_pipeline_from_checkpoint() {
        let nav = navigator();
        let profile = StudentProfile {
            inter_marks: 900,
            city: "Lahore".to_string(),
            fee_budget: Some(100_000),
            ..Default::default()
        };

        nav.start_university("u", profile).await.unwrap();
        nav.start_career("c", CareerFeatures::default()).await.unwrap();
        assert_eq!(nav.sessions().await.unwrap(), vec!["c".to_string(), "u".to_string()]);

        let outcome = nav.resume("c", "no").await.unwrap();
        assert_eq!(outcome.kind(), PipelineKind::Career);

        let outcome = nav.resume("u", "yes").await.unwrap();
        match outcome {
            SessionOutcome::University(RunOutcome::Completed { state }) => {
                assert!(state.ranked);
                assert_eq!(state.recommendations.len(), 1);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(nav.sessions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_resume_unknown_session() {
        let err = navigator().resume("nobody", "yes").await.unwrap_err();
        assert!(err.is_no_pending_interrupt());
    }

    #[tokio::test]
    async fn test_abandon() {
        let nav = navigator();
        nav.start_career("c", CareerFeatures::default()).await.unwrap();

        assert!(nav.abandon("c").await.unwrap());
        assert!(!nav.abandon("c").await.unwrap());
        assert!(nav.pending("c").await.unwrap().is_none());
    }

    #[test]
    fn test_describe_lists_both_pipelines() {
        let described = navigator().describe();
        assert_eq!(described.len(), 2);
        assert_eq!(described[0].1[0], "find_universities");
        assert_eq!(described[1].1[0], "validate_inputs");
    }
}
