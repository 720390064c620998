// SPDX-License-Identifier: MIT

//! Collaborators the pipeline steps call out to
//!
//! This module provides:
//! - `UniversityFinder` / `UniversityRanker` - candidate search and scoring
//! - `CareerClassifier` - the opaque "features in, ranked labels out" oracle
//! - deterministic implementations of all three

mod catalog;
mod classifier;
mod ranker;

pub use catalog::CatalogFinder;
pub use classifier::WeightedClassifier;
pub use ranker::BudgetRanker;

pub use crate::flow::CollaboratorError;

use async_trait::async_trait;

use super::career::state::{CareerFeatures, CareerPrediction};
use super::university::state::{RankedUniversity, StudentProfile, University};

/// Supplies raw university candidates for a profile
#[async_trait]
pub trait UniversityFinder: Send + Sync {
    /// Returns the finder name (used in error reports)
    fn name(&self) -> &str;

    async fn find(&self, profile: &StudentProfile) -> Result<Vec<University>, CollaboratorError>;
}

/// Filters and scores university candidates
#[async_trait]
pub trait UniversityRanker: Send + Sync {
    fn name(&self) -> &str;

    /// Returns candidates best first
    async fn rank(
        &self,
        candidates: &[University],
        profile: &StudentProfile,
    ) -> Result<Vec<RankedUniversity>, CollaboratorError>;
}

/// Predicts careers from the seven profile features
#[async_trait]
pub trait CareerClassifier: Send + Sync {
    fn name(&self) -> &str;

    /// Returns labels with confidence, highest first
    async fn predict(
        &self,
        features: &CareerFeatures,
    ) -> Result<Vec<CareerPrediction>, CollaboratorError>;
}
