// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::sync::Arc;

use super::catalog::{adjust_for_preferences, career_details};
use super::state::{CareerRecommendation, CareerState, CareerUpdate};
use crate::flow::{Approval, Step, StepContext, StepError};
use crate::navigator::tools::CareerClassifier;

pub const VALIDATE_INPUTS: &str = "validate_inputs";
pub const ANALYZE_PREDICTIONS: &str = "analyze_predictions";
pub const APPROVE_RECOMMENDATION: &str = "approve_recommendation";
pub const RANK_RECOMMENDATIONS: &str = "rank_recommendations";

/// Records problems with the inputs. Never aborts the run.
pub fn validate_inputs(
    state: &CareerState,
    _ctx: &mut StepContext,
) -> Result<CareerUpdate, StepError> {
    let f = &state.features;
    let mut issues = Vec::new();

    if !(0..=100).contains(&f.math_score) {
        issues.push("Math score should be between 0 and 100".to_string());
    }
    if !(0..=100).contains(&f.bio_score) {
        issues.push("Biology score should be between 0 and 100".to_string());
    }
    if !(f.interest_tech || f.interest_art) {
        issues.push("Please select at least one area of interest".to_string());
    }
    if !(f.group_work || f.logical_thinking || f.likes_speaking) {
        issues.push("Please select at least one work preference".to_string());
    }

    let current_step = if issues.is_empty() {
        "validated"
    } else {
        log::warn!("Career inputs have {} issue(s): {:?}", issues.len(), issues);
        "validation_error"
    };

    Ok(CareerUpdate {
        validation_issues: Some(issues),
        current_step: Some(current_step.to_string()),
        ..Default::default()
    })
}

/// Classifies the profile and attaches reference data to each label
pub struct AnalyzePredictions {
    classifier: Arc<dyn CareerClassifier>,
}

impl AnalyzePredictions {
    pub fn new(classifier: Arc<dyn CareerClassifier>) -> Self {
        Self { classifier }
    }
}

#[async_trait]
impl Step<CareerState> for AnalyzePredictions {
    fn name(&self) -> &str {
        ANALYZE_PREDICTIONS
    }

    async fn run(
        &self,
        state: &CareerState,
        _ctx: &mut StepContext,
    ) -> Result<CareerUpdate, StepError> {
        let predictions = match self.classifier.predict(&state.features).await {
            Ok(predictions) => predictions,
            Err(e) => {
                log::warn!("{}; continuing with no predictions", e);
                Vec::new()
            }
        };

        let recommendations: Vec<CareerRecommendation> = predictions
            .iter()
            .map(|p| {
                let confidence = adjust_for_preferences(p.confidence, &p.career, &state.features);
                career_details(&p.career, confidence)
            })
            .collect();

        log::info!(
            "Classifier '{}' suggested {:?}",
            self.classifier.name(),
            predictions.iter().map(|p| &p.career).collect::<Vec<_>>()
        );

        Ok(CareerUpdate {
            career_predictions: Some(predictions),
            career_recommendations: Some(recommendations),
            current_step: Some("analyzed".to_string()),
            ..Default::default()
        })
    }
}

/// Highest confidence first, ties by career name. The first entry is the
/// match the student is asked to approve and the one finalized.
pub fn sorted_by_confidence(
    recommendations: &[CareerRecommendation],
) -> Vec<CareerRecommendation> {
    let mut sorted = recommendations.to_vec();
    sorted.sort_by(|a, b| {
        b.confidence_score
            .total_cmp(&a.confidence_score)
            .then_with(|| a.career_name.cmp(&b.career_name))
    });
    sorted
}

/// Question put to the student once recommendations exist
pub fn approval_prompt(state: &CareerState) -> String {
    let sorted = sorted_by_confidence(&state.career_recommendations);
    let Some(top) = sorted.first() else {
        return "I could not find a confident career match for your profile. \
                Finish without a recommendation (yes/no)?"
            .to_string();
    };

    let mut prompt = format!(
        "Your strongest career match is {} ({:.0}% confidence). {}",
        top.career_name,
        top.confidence_score * 100.0,
        top.description
    );
    if top.confidence_score < state.confidence_threshold {
        prompt.push_str(&format!(
            " This is below the {:.0}% confidence threshold.",
            state.confidence_threshold * 100.0
        ));
    }
    prompt.push_str("\n\nAccept this as your final recommendation (yes/no)?");
    prompt
}

/// Asks the student to accept the top match
pub fn approve_recommendation(
    state: &CareerState,
    ctx: &mut StepContext,
) -> Result<CareerUpdate, StepError> {
    let answer = ctx.interrupt(approval_prompt(state))?;
    Ok(CareerUpdate {
        user_approval: Some(Approval::from_answer(&answer)),
        current_step: Some("approval_received".to_string()),
        ..Default::default()
    })
}

/// Orders recommendations by confidence and settles the final pick
pub fn rank_recommendations(
    state: &CareerState,
    _ctx: &mut StepContext,
) -> Result<CareerUpdate, StepError> {
    let sorted = sorted_by_confidence(&state.career_recommendations);

    let final_recommendation = if state.user_approval.is_approved() {
        sorted.first().cloned()
    } else {
        None
    };

    Ok(CareerUpdate {
        career_recommendations: Some(sorted),
        final_recommendation: Some(final_recommendation),
        current_step: Some("ranked".to_string()),
        processing_complete: Some(true),
        ..Default::default()
    })
}
