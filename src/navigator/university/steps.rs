// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::sync::Arc;

use super::state::{UniversityState, UniversityUpdate};
use crate::flow::{Approval, Step, StepContext, StepError};
use crate::navigator::tools::{UniversityFinder, UniversityRanker};

pub const FIND_UNIVERSITIES: &str = "find_universities";
pub const APPROVE_DECISION: &str = "approve_decision";
pub const RANK_UNIS: &str = "rank_unis";
pub const RECOMMEND_FINALIZED: &str = "recommend_finalized_universities";

/// Looks up candidates for the student's profile
pub struct FindUniversities {
    finder: Arc<dyn UniversityFinder>,
}

impl FindUniversities {
    pub fn new(finder: Arc<dyn UniversityFinder>) -> Self {
        Self { finder }
    }
}

#[async_trait]
impl Step<UniversityState> for FindUniversities {
    fn name(&self) -> &str {
        FIND_UNIVERSITIES
    }

    async fn run(
        &self,
        state: &UniversityState,
        _ctx: &mut StepContext,
    ) -> Result<UniversityUpdate, StepError> {
        let universities = match self.finder.find(&state.profile).await {
            Ok(found) => found,
            Err(e) => {
                log::warn!("{}; continuing with no candidates", e);
                Vec::new()
            }
        };
        log::info!(
            "Finder '{}' returned {} universities",
            self.finder.name(),
            universities.len()
        );

        Ok(UniversityUpdate {
            universities: Some(universities),
            ..Default::default()
        })
    }
}

/// Question put to the student once candidates are known
pub fn approval_prompt(count: usize) -> String {
    if count == 0 {
        return "No universities found. Would you like me to try with broader criteria (yes/no)?"
            .to_string();
    }

    format!(
        "I found {count} universities matching your criteria!\n\n\
         Would you like me to:\n\
         - Rank them based on your budget, marks, and location preferences (best matches first)?\n\
         - Or show all universities without ranking, so you can browse every option?\n\n\
         Your choice (yes/no)?"
    )
}

/// Asks whether to rank the candidates
pub fn approve_decision(
    state: &UniversityState,
    ctx: &mut StepContext,
) -> Result<UniversityUpdate, StepError> {
    let answer = ctx.interrupt(approval_prompt(state.universities.len()))?;
    Ok(UniversityUpdate {
        rank_unis: Some(Approval::from_answer(&answer)),
        ..Default::default()
    })
}

/// Dispatcher after `approve_decision`
pub fn final_decision(state: &UniversityState) -> String {
    if state.rank_unis.is_approved() {
        RANK_UNIS.to_string()
    } else {
        RECOMMEND_FINALIZED.to_string()
    }
}

/// Scores and filters the candidates
pub struct RankUnis {
    ranker: Arc<dyn UniversityRanker>,
}

impl RankUnis {
    pub fn new(ranker: Arc<dyn UniversityRanker>) -> Self {
        Self { ranker }
    }
}

#[async_trait]
impl Step<UniversityState> for RankUnis {
    fn name(&self) -> &str {
        RANK_UNIS
    }

    async fn run(
        &self,
        state: &UniversityState,
        _ctx: &mut StepContext,
    ) -> Result<UniversityUpdate, StepError> {
        let ranked = match self.ranker.rank(&state.universities, &state.profile).await {
            Ok(ranked) => ranked,
            Err(e) => {
                log::warn!("{}; falling back to the unranked list", e);
                return Ok(UniversityUpdate {
                    ranked_universities: Some(Vec::new()),
                    ranking_failed: Some(true),
                    ..Default::default()
                });
            }
        };
        log::info!(
            "Ranker '{}' kept {} of {} universities",
            self.ranker.name(),
            ranked.len(),
            state.universities.len()
        );

        Ok(UniversityUpdate {
            ranked_universities: Some(ranked),
            ranking_failed: Some(false),
            ..Default::default()
        })
    }
}

/// Writes the list shown to the student. Without an approved, successful
/// ranking the raw candidates are shown unranked.
pub fn recommend_finalized_universities(
    state: &UniversityState,
    _ctx: &mut StepContext,
) -> Result<UniversityUpdate, StepError> {
    let update = if state.rank_unis.is_approved() && !state.ranking_failed {
        UniversityUpdate {
            recommendations: Some(
                state
                    .ranked_universities
                    .iter()
                    .map(|r| r.university.clone())
                    .collect(),
            ),
            ranked: Some(true),
            ..Default::default()
        }
    } else {
        UniversityUpdate {
            recommendations: Some(state.universities.clone()),
            ranked: Some(false),
            ..Default::default()
        }
    };
    Ok(update)
}
