// SPDX-License-Identifier: MIT

//! Education and career advisory service built on [`crate::flow`]
//!
//! This module provides:
//! - `university` / `career` - the two human-in-the-loop pipelines
//! - `tools` - collaborator contracts and their shipped implementations
//! - `supervisor` - request routing and the session facade
//! - `server` - the HTTP API
//! - `config` / `error` - configuration and application errors

pub mod career;
pub mod config;
pub mod error;
pub mod server;
pub mod supervisor;
pub mod tools;
pub mod university;

pub use config::NavigatorConfig;
pub use error::NavigatorError;
pub use supervisor::{route, Navigator, PipelineKind, SessionOutcome};
