// SPDX-License-Identifier: MIT

//! University recommendation workflow
//!
//! `find_universities` -> `approve_decision` -> (`final_decision`) ->
//! `rank_unis` -> `recommend_finalized_universities`, where a declined
//! ranking goes straight to `recommend_finalized_universities`.

pub mod state;
pub mod steps;

use std::sync::Arc;

use crate::flow::{FlowError, FnStep, Pipeline};
use crate::navigator::tools::{UniversityFinder, UniversityRanker};
use state::UniversityState;
use steps::{
    approve_decision, final_decision, recommend_finalized_universities, FindUniversities,
    RankUnis, APPROVE_DECISION, FIND_UNIVERSITIES, RANK_UNIS, RECOMMEND_FINALIZED,
};

pub const PIPELINE_ID: &str = "university";

/// Build the validated university pipeline around the given collaborators
pub fn build_pipeline(
    finder: Arc<dyn UniversityFinder>,
    ranker: Arc<dyn UniversityRanker>,
) -> Result<Pipeline<UniversityState>, FlowError> {
    Pipeline::builder(PIPELINE_ID)
        .add_step(FindUniversities::new(finder))
        .add_step(FnStep::new(APPROVE_DECISION, approve_decision))
        .add_step(RankUnis::new(ranker))
        .add_step(FnStep::new(
            RECOMMEND_FINALIZED,
            recommend_finalized_universities,
        ))
        .set_entry(FIND_UNIVERSITIES)
        .add_edge(FIND_UNIVERSITIES, APPROVE_DECISION)
        .add_conditional_edges(
            APPROVE_DECISION,
            &[RANK_UNIS, RECOMMEND_FINALIZED],
            final_decision,
        )
        .add_edge(RANK_UNIS, RECOMMEND_FINALIZED)
        .set_finish_point(RECOMMEND_FINALIZED)
        .build()
}
