// SPDX-License-Identifier: MIT

//! Career recommendation workflow
//!
//! A linear pipeline: `validate_inputs` -> `analyze_predictions` ->
//! `approve_recommendation` -> `rank_recommendations`.

pub mod catalog;
pub mod state;
pub mod steps;

use std::sync::Arc;

use crate::flow::{FlowError, FnStep, Pipeline};
use crate::navigator::tools::CareerClassifier;
use state::CareerState;
use steps::{
    approve_recommendation, rank_recommendations, validate_inputs, AnalyzePredictions,
    ANALYZE_PREDICTIONS, APPROVE_RECOMMENDATION, RANK_RECOMMENDATIONS, VALIDATE_INPUTS,
};

pub const PIPELINE_ID: &str = "career";

/// Build the validated career pipeline around the given classifier
pub fn build_pipeline(
    classifier: Arc<dyn CareerClassifier>,
) -> Result<Pipeline<CareerState>, FlowError> {
    Pipeline::builder(PIPELINE_ID)
        .add_step(FnStep::new(VALIDATE_INPUTS, validate_inputs))
        .add_step(AnalyzePredictions::new(classifier))
        .add_step(FnStep::new(APPROVE_RECOMMENDATION, approve_recommendation))
        .add_step(FnStep::new(RANK_RECOMMENDATIONS, rank_recommendations))
        .set_entry(VALIDATE_INPUTS)
        .add_edge(VALIDATE_INPUTS, ANALYZE_PREDICTIONS)
        .add_edge(ANALYZE_PREDICTIONS, APPROVE_RECOMMENDATION)
        .add_edge(APPROVE_RECOMMENDATION, RANK_RECOMMENDATIONS)
        .set_finish_point(RANK_RECOMMENDATIONS)
        .build()
}
