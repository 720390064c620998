// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use super::{CareerClassifier, CollaboratorError};
use crate::navigator::career::state::{CareerFeatures, CareerPrediction};

/// Labels returned per prediction, at most
pub const MAX_PREDICTIONS: usize = 3;

/// Labels at or below this probability are dropped
pub const MIN_CONFIDENCE: f64 = 0.1;

/// Per-career weights over math, bio, tech, art, group, logic, speaking
const DEFAULT_WEIGHTS: &[(&str, [f64; 7])] = &[
    ("IT", [2.0, 0.0, 3.0, -1.0, 0.0, 2.0, 0.0]),
    ("Engineering", [2.5, 0.0, 1.5, 0.0, 0.5, 2.0, 0.0]),
    ("Medicine", [0.5, 3.5, 0.0, 0.0, 0.5, 0.5, 0.5]),
    ("Business", [0.5, 0.0, 0.0, 0.0, 2.5, 0.5, 2.0]),
    ("Design", [0.0, 0.0, 0.5, 3.5, 0.5, 0.0, 0.0]),
    ("Social Sciences", [0.0, 0.5, 0.0, 1.0, 1.5, 0.0, 1.5]),
    ("Education", [0.0, 0.5, 0.0, 0.5, 1.0, 0.0, 2.5]),
];

/// Linear career classifier with softmax-normalised output
#[derive(Debug, Clone)]
pub struct WeightedClassifier {
    weights: Vec<(String, [f64; 7])>,
}

impl WeightedClassifier {
    pub fn new() -> Self {
        Self::with_weights(
            DEFAULT_WEIGHTS
                .iter()
                .map(|(label, w)| (label.to_string(), *w))
                .collect(),
        )
    }

    pub fn with_weights(weights: Vec<(String, [f64; 7])>) -> Self {
        Self { weights }
    }

    /// Probability for every label, in weight-table order
    pub fn probabilities(&self, features: &CareerFeatures) -> Vec<(String, f64)> {
        let x = features.to_vector();
        let logits: Vec<f64> = self
            .weights
            .iter()
            .map(|(_, w)| w.iter().zip(x.iter()).map(|(a, b)| a * b).sum::<f64>())
            .collect();

        let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> = logits.iter().map(|l| (l - max).exp()).collect();
        let total: f64 = exps.iter().sum();

        self.weights
            .iter()
            .zip(exps)
            .map(|((label, _), e)| (label.clone(), e / total))
            .collect()
    }
}

impl Default for WeightedClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CareerClassifier for WeightedClassifier {
    fn name(&self) -> &str {
        "weighted"
    }

    async fn predict(
        &self,
        features: &CareerFeatures,
    ) -> Result<Vec<CareerPrediction>, CollaboratorError> {
        if self.weights.is_empty() {
            return Err(CollaboratorError::new(self.name(), "no career labels loaded"));
        }

        let mut scored = self.probabilities(features);
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        Ok(scored
            .into_iter()
            .take(MAX_PREDICTIONS)
            .filter(|(_, p)| *p > MIN_CONFIDENCE)
            .map(|(career, confidence)| CareerPrediction { career, confidence })
            .collect())
    }
}
