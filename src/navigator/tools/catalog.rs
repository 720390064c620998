// SPDX-License-Identifier: MIT

//! University finder backed by a YAML catalog

use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;

use super::{CollaboratorError, UniversityFinder};
use crate::navigator::error::NavigatorError;
use crate::navigator::university::state::{StudentProfile, University};

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    universities: Vec<University>,
}

/// Finds universities in a fixed catalog
#[derive(Debug, Clone, Default)]
pub struct CatalogFinder {
    universities: Vec<University>,
}

impl CatalogFinder {
    pub fn new(universities: Vec<University>) -> Self {
        Self { universities }
    }

    /// Load a catalog from a YAML file
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self, NavigatorError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            NavigatorError::config(format!("Cannot read catalog {:?}: {}", path, e))
        })?;
        let finder = Self::parse_yaml(&content)?;
        log::info!(
            "Loaded {} universities from {:?}",
            finder.universities.len(),
            path
        );
        Ok(finder)
    }

    /// Parse a catalog from a YAML string
    pub fn parse_yaml(content: &str) -> Result<Self, NavigatorError> {
        let file: CatalogFile = serde_yaml::from_str(content)?;
        Ok(Self::new(file.universities))
    }

    pub fn len(&self) -> usize {
        self.universities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.universities.is_empty()
    }

    fn matches(university: &University, profile: &StudentProfile) -> bool {
        let place_ok = if !profile.city.is_empty() {
            university.city.eq_ignore_ascii_case(&profile.city)
        } else if !profile.location.is_empty() {
            university.location.eq_ignore_ascii_case(&profile.location)
        } else {
            true
        };

        let degree = profile.degree_preference.to_lowercase();
        let degree_ok = degree.is_empty()
            || university
                .programs
                .iter()
                .any(|p| p.to_lowercase().contains(&degree));

        // Zero marks means the student did not say
        let marks_ok = profile.inter_marks == 0 || profile.inter_marks >= university.min_inter_marks;

        place_ok && degree_ok && marks_ok
    }
}

#[async_trait]
impl UniversityFinder for CatalogFinder {
    fn name(&self) -> &str {
        "catalog"
    }

    async fn find(&self, profile: &StudentProfile) -> Result<Vec<University>, CollaboratorError> {
        Ok(self
            .universities
            .iter()
            .filter(|u| Self::matches(u, profile))
            .cloned()
            .collect())
    }
}
