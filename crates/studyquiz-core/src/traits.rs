//! Trait definition for the remote grading collaborator.
//!
//! Implemented by the `studyquiz-grader` crate (HTTP and mock graders).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::TextKind;

// ---------------------------------------------------------------------------
// Grader trait
// ---------------------------------------------------------------------------

/// A backend that grades free-text answers.
#[async_trait]
pub trait Grader: Send + Sync {
    /// Human-readable grader name (e.g. "http").
    fn name(&self) -> &str;

    /// Grade one answer. Any error is treated as "remote unavailable".
    async fn grade(&self, request: &GradeRequest) -> anyhow::Result<GradeResponse>;
}

/// Request body sent to the grading collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeRequest {
    /// The question prompt.
    pub question: String,
    /// The learner's submitted answer.
    pub answer: String,
    /// Resolved interaction kind.
    pub question_type: TextKind,
    /// Difficulty label of the quiz.
    pub difficulty: String,
    /// Reference answer, empty when absent.
    pub expected_answer: String,
    /// Explanation, empty when absent.
    pub explanation: String,
    /// Concept label.
    pub concept: String,
}

/// Grader response. Every field is optional; missing ones are backfilled
/// from the local heuristic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GradeResponse {
    #[serde(default)]
    pub is_correct: Option<bool>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub concept: Option<String>,
    #[serde(default)]
    pub guidance: Option<String>,
    #[serde(default)]
    pub feedback: Option<String>,
}
