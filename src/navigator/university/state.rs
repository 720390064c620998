// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

use crate::flow::{Approval, WorkflowState};

/// Academic profile and preferences of a prospective student
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudentProfile {
    /// Matric marks out of 1100
    pub matric_marks: u32,
    /// Intermediate marks out of 1100
    pub inter_marks: u32,
    pub degree_preference: String,
    pub city: String,
    /// Wider region (province) used when no city matches
    pub location: String,
    /// Maximum fee per semester; `None` means no limit
    pub fee_budget: Option<u32>,
}

/// Admission details of one university program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct University {
    pub name: String,
    pub city: String,
    #[serde(default)]
    pub location: String,
    pub admission_portal: String,
    pub fee_per_semester: u32,
    pub min_inter_marks: u32,
    #[serde(default)]
    pub merit_formula: String,
    /// Degree programs offered
    #[serde(default)]
    pub programs: Vec<String>,
}

/// A university with the score the ranker gave it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedUniversity {
    pub university: University,
    pub score: f64,
}

/// State of the university recommendation pipeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UniversityState {
    pub profile: StudentProfile,
    /// Raw candidates from the finder
    #[serde(default)]
    pub universities: Vec<University>,
    /// The student's answer to the ranking question
    #[serde(default)]
    pub rank_unis: Approval,
    #[serde(default)]
    pub ranked_universities: Vec<RankedUniversity>,
    /// Set when the ranker could not be reached
    #[serde(default)]
    pub ranking_failed: bool,
    /// Final list shown to the student
    #[serde(default)]
    pub recommendations: Vec<University>,
    /// Whether `recommendations` is in ranked order
    #[serde(default)]
    pub ranked: bool,
}

impl UniversityState {
    pub fn new(profile: StudentProfile) -> Self {
        Self {
            profile,
            ..Default::default()
        }
    }
}

/// Output fields a university step may write
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniversityUpdate {
    pub universities: Option<Vec<University>>,
    pub rank_unis: Option<Approval>,
    pub ranked_universities: Option<Vec<RankedUniversity>>,
    pub ranking_failed: Option<bool>,
    pub recommendations: Option<Vec<University>>,
    pub ranked: Option<bool>,
}

impl WorkflowState for UniversityState {
    type Update = UniversityUpdate;

    fn merge(&self, update: UniversityUpdate) -> Self {
        let mut next = self.clone();
        if let Some(universities) = update.universities {
            next.universities = universities;
        }
        if let Some(rank_unis) = update.rank_unis {
            next.rank_unis = rank_unis;
        }
        if let Some(ranked_universities) = update.ranked_universities {
            next.ranked_universities = ranked_universities;
        }
        if let Some(ranking_failed) = update.ranking_failed {
            next.ranking_failed = ranking_failed;
        }
        if let Some(recommendations) = update.recommendations {
            next.recommendations = recommendations;
        }
        if let Some(ranked) = update.ranked {
            next.ranked = ranked;
        }
        next
    }
}
