// SPDX-License-Identifier: MIT

//! Static career reference data

use once_cell::sync::Lazy;
use std::collections::HashMap;

use super::state::{CareerFeatures, CareerRecommendation};

struct CareerProfile {
    description: &'static str,
    required_skills: &'static [&'static str],
    salary_range: &'static str,
    job_outlook: &'static str,
    education_requirements: &'static str,
    companies: &'static [&'static str],
}

static CAREERS: Lazy<HashMap<&'static str, CareerProfile>> = Lazy::new(|| {
    HashMap::from([
        (
            "IT",
            CareerProfile {
                description: "Information Technology professionals work with computer systems, software, and networks to solve business problems.",
                required_skills: &["Programming", "Problem solving", "Analytical thinking", "Communication"],
                salary_range: "$60,000 - $150,000",
                job_outlook: "Excellent growth",
                education_requirements: "Bachelor's in Computer Science or related field",
                companies: &["Google", "Microsoft", "Apple", "Amazon", "Meta"],
            },
        ),
        (
            "Engineering",
            CareerProfile {
                description: "Engineers apply scientific and mathematical principles to design and build solutions for real-world problems.",
                required_skills: &["Mathematics", "Physics", "Design thinking", "Project management"],
                salary_range: "$70,000 - $130,000",
                job_outlook: "Strong growth",
                education_requirements: "Bachelor's in Engineering",
                companies: &["Tesla", "Boeing", "General Electric", "Intel", "Samsung"],
            },
        ),
        (
            "Medicine",
            CareerProfile {
                description: "Medical professionals diagnose, treat, and prevent illnesses and injuries in patients.",
                required_skills: &["Biology", "Chemistry", "Patient care", "Critical thinking"],
                salary_range: "$200,000 - $400,000",
                job_outlook: "Excellent growth",
                education_requirements: "Medical degree (MD/DO)",
                companies: &["Hospitals", "Clinics", "Research institutions", "Pharmaceutical companies"],
            },
        ),
        (
            "Business",
            CareerProfile {
                description: "Business professionals manage organizations, develop strategies, and drive growth and profitability.",
                required_skills: &["Leadership", "Communication", "Analytics", "Strategic thinking"],
                salary_range: "$50,000 - $200,000",
                job_outlook: "Good growth",
                education_requirements: "Bachelor's in Business Administration or related field",
                companies: &["McKinsey", "Deloitte", "Goldman Sachs", "Amazon", "Apple"],
            },
        ),
        (
            "Design",
            CareerProfile {
                description: "Designers create visual and user experiences that solve problems and communicate ideas effectively.",
                required_skills: &["Creativity", "Visual design", "User research", "Prototyping"],
                salary_range: "$45,000 - $120,000",
                job_outlook: "Growing",
                education_requirements: "Bachelor's in Design or related field",
                companies: &["Adobe", "Figma", "IDEO", "Pentagram", "Frog Design"],
            },
        ),
        (
            "Social Sciences",
            CareerProfile {
                description: "Social scientists study human behavior, societies, and social relationships to understand and improve society.",
                required_skills: &["Research", "Analysis", "Writing", "Critical thinking"],
                salary_range: "$40,000 - $100,000",
                job_outlook: "Moderate growth",
                education_requirements: "Bachelor's in Social Sciences or related field",
                companies: &["Research institutions", "Government agencies", "Non-profits", "Universities"],
            },
        ),
        (
            "Education",
            CareerProfile {
                description: "Educators teach and inspire students, develop curriculum, and contribute to the learning and development of others.",
                required_skills: &["Teaching", "Communication", "Patience", "Organization"],
                salary_range: "$35,000 - $80,000",
                job_outlook: "Stable",
                education_requirements: "Bachelor's in Education or related field",
                companies: &["Schools", "Universities", "Training centers", "Online platforms"],
            },
        ),
    ])
});

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Full recommendation for a classifier label; unknown labels get generic text
pub fn career_details(career: &str, confidence: f64) -> CareerRecommendation {
    match CAREERS.get(career) {
        Some(profile) => CareerRecommendation {
            career_name: career.to_string(),
            confidence_score: confidence,
            description: profile.description.to_string(),
            required_skills: owned(profile.required_skills),
            salary_range: profile.salary_range.to_string(),
            job_outlook: profile.job_outlook.to_string(),
            education_requirements: profile.education_requirements.to_string(),
            companies: owned(profile.companies),
        },
        None => CareerRecommendation {
            career_name: career.to_string(),
            confidence_score: confidence,
            description: format!("Career in {}", career),
            required_skills: owned(&["Problem solving", "Communication"]),
            salary_range: "$50,000 - $100,000".to_string(),
            job_outlook: "Growing".to_string(),
            education_requirements: "Bachelor's degree".to_string(),
            companies: owned(&["Top companies in the field"]),
        },
    }
}

/// Nudge a confidence score toward careers the profile clearly favours.
/// The result never exceeds 1.0.
pub fn adjust_for_preferences(confidence: f64, career: &str, features: &CareerFeatures) -> f64 {
    let technical = matches!(career, "IT" | "Engineering");
    let mut bonus = 0.0;

    if features.math_score > 80 && technical {
        bonus += 0.1;
    }
    if features.bio_score > 80 && career == "Medicine" {
        bonus += 0.1;
    }
    if features.interest_tech && career == "IT" {
        bonus += 0.15;
    }
    if features.interest_art && career == "Design" {
        bonus += 0.15;
    }
    if features.group_work && career == "Business" {
        bonus += 0.1;
    }
    if features.logical_thinking && technical {
        bonus += 0.1;
    }
    if features.likes_speaking && career == "Education" {
        bonus += 0.1;
    }

    (confidence + bonus).min(1.0)
}

/// Labels with reference data
pub fn known_careers() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = CAREERS.keys().copied().collect();
    names.sort_unstable();
    names
}
