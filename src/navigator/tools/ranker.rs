// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use super::{CollaboratorError, UniversityRanker};
use crate::navigator::university::state::{RankedUniversity, StudentProfile, University};

/// Inter marks are out of this total
const MAX_INTER_MARKS: f64 = 1100.0;

/// Ranks universities on fee budget, city and marks margin.
///
/// Candidates above the budget or outside the preferred city are dropped.
/// The rest are scored on how much of the budget they leave unused and how
/// far the student's marks clear the admission cut-off.
#[derive(Debug, Clone)]
pub struct BudgetRanker {
    affordability_weight: f64,
    merit_weight: f64,
}

impl BudgetRanker {
    pub fn new() -> Self {
        Self {
            affordability_weight: 0.6,
            merit_weight: 0.4,
        }
    }

    pub fn with_weights(affordability_weight: f64, merit_weight: f64) -> Self {
        Self {
            affordability_weight,
            merit_weight,
        }
    }

    fn budget(profile: &StudentProfile) -> Option<u32> {
        profile.fee_budget.filter(|b| *b > 0)
    }

    fn eligible(university: &University, profile: &StudentProfile) -> bool {
        let fee_ok = Self::budget(profile).map_or(true, |b| university.fee_per_semester <= b);
        let city_ok =
            profile.city.is_empty() || university.city.eq_ignore_ascii_case(&profile.city);
        fee_ok && city_ok
    }

    fn score(&self, university: &University, profile: &StudentProfile) -> f64 {
        let affordability = Self::budget(profile)
            .map(|b| 1.0 - f64::from(university.fee_per_semester) / f64::from(b))
            .unwrap_or(0.0);

        let merit = if profile.inter_marks == 0 {
            0.0
        } else {
            (f64::from(profile.inter_marks) - f64::from(university.min_inter_marks)).max(0.0)
                / MAX_INTER_MARKS
        };

        self.affordability_weight * affordability + self.merit_weight * merit
    }
}

impl Default for BudgetRanker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UniversityRanker for BudgetRanker {
    fn name(&self) -> &str {
        "budget"
    }

    async fn rank(
        &self,
        candidates: &[University],
        profile: &StudentProfile,
    ) -> Result<Vec<RankedUniversity>, CollaboratorError> {
        let mut ranked: Vec<RankedUniversity> = candidates
            .iter()
            .filter(|u| Self::eligible(u, profile))
            .map(|u| RankedUniversity {
                score: self.score(u, profile),
                university: u.clone(),
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| {
                    a.university
                        .fee_per_semester
                        .cmp(&b.university.fee_per_semester)
                })
                .then_with(|| a.university.name.cmp(&b.university.name))
        });

        log::debug!(
            "Ranked {} of {} candidates",
            ranked.len(),
            candidates.len()
        );
        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uni(name: &str, city: &str, fee: u32, min_marks: u32) -> University {
        University {
            name: name.to_string(),
            city: city.to_string(),
            location: String::new(),
            admission_portal: String::new(),
            fee_per_semester: fee,
            min_inter_marks: min_marks,
            merit_formula: String::new(),
            programs: vec![],
        }
    }

    fn profile(city: &str, budget: Option<u32>, inter: u32) -> StudentProfile {
        StudentProfile {
            inter_marks: inter,
            city: city.to_string(),
            fee_budget: budget,
            ..Default::default()
        }
    }

    fn names(ranked: &[RankedUniversity]) -> Vec<&str> {
        ranked.iter().map(|r| r.university.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_drops_over_budget_and_other_cities() {
        let candidates = vec![
            uni("Cheap", "Lahore", 50_000, 600),
            uni("Pricey", "Lahore", 250_000, 600),
            uni("Elsewhere", "Karachi", 40_000, 600),
        ];
        let ranked = BudgetRanker::new()
            .rank(&candidates, &profile("Lahore", Some(100_000), 900))
            .await
            .unwrap();
        assert_eq!(names(&ranked), vec!["Cheap"]);
    }

    #[tokio::test]
    async fn test_orders_by_score() {
        let candidates = vec![
            uni("Mid", "Lahore", 60_000, 700),
            uni("Low", "Lahore", 20_000, 700),
            uni("High", "Lahore", 90_000, 700),
        ];
        let ranked = BudgetRanker::new()
            .rank(&candidates, &profile("", Some(100_000), 900))
            .await
            .unwrap();
        assert_eq!(names(&ranked), vec!["Low", "Mid", "High"]);
        assert!(ranked[0].score > ranked[1].score);
    }

    #[tokio::test]
    async fn test_ties_break_on_fee_then_name() {
        let candidates = vec![
            uni("Beta", "Lahore", 80_000, 700),
            uni("Alpha", "Lahore", 80_000, 700),
            uni("Gamma", "Lahore", 30_000, 700),
        ];
        // No budget and no marks: every score is zero
        let ranked = BudgetRanker::new()
            .rank(&candidates, &profile("", None, 0))
            .await
            .unwrap();
        assert_eq!(names(&ranked), vec!["Gamma", "Alpha", "Beta"]);
    }

    #[tokio::test]
    async fn test_zero_budget_means_no_limit() {
        let candidates = vec![uni("Any", "Lahore", 500_000, 0)];
        let ranked = BudgetRanker::new()
            .rank(&candidates, &profile("", Some(0), 0))
            .await
            .unwrap();
        assert_eq!(ranked.len(), 1);
    }

    #[tokio::test]
    async fn test_merit_only_weights() {
        let candidates = vec![
            uni("Easy", "Lahore", 90_000, 600),
            uni("Hard", "Lahore", 10_000, 850),
        ];
        let ranked = BudgetRanker::with_weights(0.0, 1.0)
            .rank(&candidates, &profile("", Some(100_000), 900))
            .await
            .unwrap();
        assert_eq!(names(&ranked), vec!["Easy", "Hard"]);
    }
}
