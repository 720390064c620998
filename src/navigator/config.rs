// SPDX-License-Identifier: MIT

//! Environment-driven configuration

use std::path::PathBuf;

use super::error::NavigatorError;

pub const CHECKPOINT_DIR_VAR: &str = "NAVIGATOR_CHECKPOINT_DIR";
pub const UNIVERSITY_CATALOG_VAR: &str = "NAVIGATOR_UNIVERSITY_CATALOG";
pub const PORT_VAR: &str = "NAVIGATOR_PORT";

const DEFAULT_CHECKPOINT_DIR: &str = ".navigator/checkpoints";
const DEFAULT_UNIVERSITY_CATALOG: &str = "data/universities.yaml";
const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, PartialEq)]
pub struct NavigatorConfig {
    pub checkpoint_dir: PathBuf,
    pub university_catalog: PathBuf,
    pub port: u16,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            checkpoint_dir: PathBuf::from(DEFAULT_CHECKPOINT_DIR),
            university_catalog: PathBuf::from(DEFAULT_UNIVERSITY_CATALOG),
            port: DEFAULT_PORT,
        }
    }
}

impl NavigatorConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, NavigatorError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`; unset or blank keys use defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, NavigatorError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(dir) = get(CHECKPOINT_DIR_VAR) {
            config.checkpoint_dir = PathBuf::from(dir);
        }
        if let Some(catalog) = get(UNIVERSITY_CATALOG_VAR) {
            config.university_catalog = PathBuf::from(catalog);
        }
        if let Some(port) = get(PORT_VAR) {
            config.port = port.trim().parse().map_err(|_| {
                NavigatorError::config(format!(
                    "{} must be a port number, got '{}'",
                    PORT_VAR, port
                ))
            })?;
        }

        Ok(config)
    }
}
