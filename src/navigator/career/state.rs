// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

use crate::flow::{Approval, WorkflowState};

/// Confidence below which a top match is flagged to the student
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.7;

/// The seven classifier inputs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CareerFeatures {
    /// Math score, 0 to 100
    pub math_score: i32,
    /// Biology score, 0 to 100
    pub bio_score: i32,
    pub interest_tech: bool,
    pub interest_art: bool,
    pub group_work: bool,
    pub logical_thinking: bool,
    pub likes_speaking: bool,
}

impl CareerFeatures {
    /// Feature vector in classifier order, scores scaled to 0..=1
    pub fn to_vector(&self) -> [f64; 7] {
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        [
            f64::from(self.math_score) / 100.0,
            f64::from(self.bio_score) / 100.0,
            flag(self.interest_tech),
            flag(self.interest_art),
            flag(self.group_work),
            flag(self.logical_thinking),
            flag(self.likes_speaking),
        ]
    }
}

/// A label from the classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareerPrediction {
    pub career: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareerRecommendation {
    pub career_name: String,
    pub confidence_score: f64,
    pub description: String,
    pub required_skills: Vec<String>,
    pub salary_range: String,
    pub job_outlook: String,
    pub education_requirements: String,
    pub companies: Vec<String>,
}

/// State of the career recommendation pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareerState {
    pub features: CareerFeatures,
    #[serde(default)]
    pub career_predictions: Vec<CareerPrediction>,
    #[serde(default)]
    pub career_recommendations: Vec<CareerRecommendation>,
    #[serde(default)]
    pub final_recommendation: Option<CareerRecommendation>,
    #[serde(default = "default_threshold")]
    pub confidence_threshold: f64,
    #[serde(default)]
    pub user_approval: Approval,
    #[serde(default)]
    pub validation_issues: Vec<String>,
    #[serde(default)]
    pub current_step: String,
    #[serde(default)]
    pub processing_complete: bool,
}

fn default_threshold() -> f64 {
    DEFAULT_CONFIDENCE_THRESHOLD
}

impl CareerState {
    pub fn new(features: CareerFeatures) -> Self {
        Self {
            features,
            career_predictions: Vec::new(),
            career_recommendations: Vec::new(),
            final_recommendation: None,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            user_approval: Approval::default(),
            validation_issues: Vec::new(),
            current_step: String::new(),
            processing_complete: false,
        }
    }
}

impl Default for CareerState {
    fn default() -> Self {
        Self::new(CareerFeatures::default())
    }
}

/// Output fields a career step may write
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CareerUpdate {
    pub career_predictions: Option<Vec<CareerPrediction>>,
    pub career_recommendations: Option<Vec<CareerRecommendation>>,
    pub final_recommendation: Option<Option<CareerRecommendation>>,
    pub user_approval: Option<Approval>,
    pub validation_issues: Option<Vec<String>>,
    pub current_step: Option<String>,
    pub processing_complete: Option<bool>,
}

impl WorkflowState for CareerState {
    type Update = CareerUpdate;

    fn merge(&self, update: CareerUpdate) -> Self {
        let mut next = self.clone();
        if let Some(predictions) = update.career_predictions {
            next.career_predictions = predictions;
        }
        if let Some(recommendations) = update.career_recommendations {
            next.career_recommendations = recommendations;
        }
        if let Some(final_recommendation) = update.final_recommendation {
            next.final_recommendation = final_recommendation;
        }
        if let Some(approval) = update.user_approval {
            next.user_approval = approval;
        }
        if let Some(issues) = update.validation_issues {
            next.validation_issues = issues;
        }
        if let Some(step) = update.current_step {
            next.current_step = step;
        }
        if let Some(done) = update.processing_complete {
            next.processing_complete = done;
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_vector_order() {
        let features = CareerFeatures {
            math_score: 90,
            bio_score: 40,
            interest_tech: true,
            likes_speaking: true,
            ..Default::default()
        };
        assert_eq!(features.to_vector(), [0.9, 0.4, 1.0, 0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_new_state_uses_default_threshold() {
        let state = CareerState::new(CareerFeatures::default());
        assert_eq!(state.confidence_threshold, DEFAULT_CONFIDENCE_THRESHOLD);
        assert!(state.final_recommendation.is_none());
        assert!(!state.processing_complete);
    }

    #[test]
    fn test_snapshot_without_threshold_gets_default() {
        let state: CareerState =
            serde_json::from_value(serde_json::json!({"features": {"math_score": 70}})).unwrap();
        assert_eq!(state.features.math_score, 70);
        assert_eq!(state.confidence_threshold, DEFAULT_CONFIDENCE_THRESHOLD);
    }

    #[test]
    fn test_merge_keeps_unwritten_fields() {
        let state = CareerState::default().merge(CareerUpdate {
            current_step: Some("validated".to_string()),
            ..Default::default()
        });
        let state = state.merge(CareerUpdate {
            processing_complete: Some(true),
            ..Default::default()
        });

        assert_eq!(state.current_step, "validated");
        assert!(state.processing_complete);
        assert!(state.validation_issues.is_empty());
    }
}
