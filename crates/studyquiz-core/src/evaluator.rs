//! Free-text answer evaluation.
//!
//! Tries the remote grader once, falls back to the keyword heuristic on any
//! failure, and normalizes both paths into an [`EvaluationOutcome`]. This
//! never fails: the worst case is a heuristic-graded answer.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::heuristic::{self, HeuristicVerdict};
use crate::model::{InteractionKind, Question, TextKind};
use crate::traits::{GradeRequest, GradeResponse, Grader};

/// Score assigned by the fallback path to a correct answer.
pub const FALLBACK_SCORE_CORRECT: f64 = 0.7;
/// Score assigned by the fallback path to an incorrect answer.
pub const FALLBACK_SCORE_INCORRECT: f64 = 0.35;
pub const FALLBACK_FEEDBACK_CORRECT: &str = "Good answer quality.";
pub const FALLBACK_FEEDBACK_INCORRECT: &str = "Answer needs more precision.";

/// Where an outcome's verdict came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradingSource {
    Remote,
    Local,
}

/// Normalized result of evaluating one free-text answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationOutcome {
    pub is_correct: bool,
    pub concept: String,
    pub guidance: String,
    pub feedback: String,
    /// Always within `[0, 1]`.
    pub score: f64,
    pub source: GradingSource,
}

impl EvaluationOutcome {
    /// The outcome used when the grader is unavailable.
    pub fn from_heuristic(verdict: &HeuristicVerdict) -> Self {
        let (score, feedback) = if verdict.is_correct {
            (FALLBACK_SCORE_CORRECT, FALLBACK_FEEDBACK_CORRECT)
        } else {
            (FALLBACK_SCORE_INCORRECT, FALLBACK_FEEDBACK_INCORRECT)
        };
        Self {
            is_correct: verdict.is_correct,
            concept: verdict.concept.clone(),
            guidance: verdict.guidance.clone(),
            feedback: feedback.to_string(),
            score,
            source: GradingSource::Local,
        }
    }

    /// Adopt the remote response, backfilling missing fields from `local`.
    pub fn merge_remote(remote: GradeResponse, local: &EvaluationOutcome) -> Self {
        let score = remote
            .score
            .filter(|s| s.is_finite())
            .map(|s| s.clamp(0.0, 1.0))
            .unwrap_or(local.score);
        Self {
            is_correct: remote.is_correct.unwrap_or(local.is_correct),
            concept: non_blank(remote.concept).unwrap_or_else(|| local.concept.clone()),
            guidance: non_blank(remote.guidance).unwrap_or_else(|| local.guidance.clone()),
            feedback: non_blank(remote.feedback).unwrap_or_else(|| local.feedback.clone()),
            score,
            source: GradingSource::Remote,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Evaluates free-text answers, remotely when a grader is configured.
#[derive(Clone, Default)]
pub struct AnswerEvaluator {
    grader: Option<Arc<dyn Grader>>,
}

impl AnswerEvaluator {
    pub fn new(grader: Arc<dyn Grader>) -> Self {
        Self {
            grader: Some(grader),
        }
    }

    /// An evaluator with no remote grader; every answer is graded locally.
    pub fn local_only() -> Self {
        Self { grader: None }
    }

    pub fn with_grader(grader: Option<Arc<dyn Grader>>) -> Self {
        Self { grader }
    }

    /// Name of the configured grader, or "local".
    pub fn grader_name(&self) -> &str {
        self.grader.as_deref().map(|g| g.name()).unwrap_or("local")
    }

    /// Evaluate `raw_answer` to `question`.
    ///
    /// Choice questions are graded as fill-in-the-blank against the correct
    /// option label; the session never routes them here.
    #[instrument(
        level = "debug",
        skip(self, question, raw_answer),
        fields(question_id = %question.id, answer_len = raw_answer.len(), grader = self.grader_name())
    )]
    pub async fn evaluate(
        &self,
        question: &Question,
        raw_answer: &str,
        default_kind: Option<InteractionKind>,
        difficulty: &str,
    ) -> EvaluationOutcome {
        let kind = question.resolve_kind(default_kind);
        let text_kind = kind.text_kind().unwrap_or(TextKind::FillBlank);
        let graded_question = if kind.is_choice() {
            as_fill_blank(question)
        } else {
            question.clone()
        };

        let verdict = heuristic::assess_question(&graded_question, raw_answer, text_kind);
        let local = EvaluationOutcome::from_heuristic(&verdict);

        let Some(grader) = &self.grader else {
            tracing::debug!(correct = local.is_correct, "no grader configured, using heuristic");
            return local;
        };

        let request = GradeRequest {
            question: graded_question.prompt.clone(),
            answer: raw_answer.trim().to_string(),
            question_type: text_kind,
            difficulty: difficulty.to_string(),
            expected_answer: graded_question.reference_text.clone().unwrap_or_default(),
            explanation: graded_question.explanation.clone().unwrap_or_default(),
            concept: verdict.concept.clone(),
        };

        match grader.grade(&request).await {
            Ok(response) => {
                let outcome = EvaluationOutcome::merge_remote(response, &local);
                tracing::debug!(
                    correct = outcome.is_correct,
                    score = outcome.score,
                    local_correct = local.is_correct,
                    "graded remotely"
                );
                outcome
            }
            Err(e) => {
                tracing::warn!(
                    grader = grader.name(),
                    error = %format!("{e:#}"),
                    "remote grading failed, using heuristic"
                );
                local
            }
        }
    }
}

fn as_fill_blank(question: &Question) -> Question {
    let mut q = question.clone();
    if q.reference_text.is_none() {
        q.reference_text = q.correct_label().map(str::to_string);
    }
    q
}
