//! studyquiz-grader: grading collaborator clients.
//!
//! Implements the `Grader` trait over HTTP, plus a mock for tests, and
//! loads the grader configuration.

pub mod config;
pub mod error;
pub mod http;
pub mod mock;

pub use config::{create_grader, load_config, GraderConfig, StudyquizConfig};
pub use error::GraderError;
pub use http::HttpGrader;
pub use mock::MockGrader;
