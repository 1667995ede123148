//! Question-set loader.
//!
//! Reads the JSON emitted by the quiz generator (or a hand-written TOML
//! file with the same field names), normalizes it into a [`QuestionSet`],
//! and validates it.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{InteractionKind, Question, QuestionSet};

/// Intermediate structure matching the generator's wire format.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuestionSet {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    difficulty: Option<String>,
    #[serde(default, alias = "quiz_type", alias = "defaultKind", alias = "default_kind")]
    quiz_type: Option<String>,
    #[serde(default)]
    questions: Vec<RawQuestion>,
}

/// Either a full set or a bare array of questions.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawDocument {
    Set(RawQuestionSet),
    Questions(Vec<RawQuestion>),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuestion {
    #[serde(default)]
    id: Option<String>,
    #[serde(default, alias = "prompt")]
    question: Option<String>,
    #[serde(default)]
    options: Vec<String>,
    #[serde(default, alias = "correct_answer", alias = "correctOption")]
    correct_answer: Option<i64>,
    #[serde(default, alias = "correct_text", alias = "referenceText")]
    correct_text: Option<String>,
    #[serde(default)]
    explanation: Option<String>,
    #[serde(default, rename = "type", alias = "kind")]
    kind: Option<String>,
    #[serde(default)]
    concept: Option<String>,
    #[serde(default)]
    guidance: Option<String>,
}

/// Load a question set from a `.json` or `.toml` file.
pub fn load_question_set(path: &Path) -> Result<QuestionSet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question set: {}", path.display()))?;

    let is_toml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("toml"));

    let set = if is_toml {
        parse_question_set_toml(&content)
    } else {
        parse_question_set_json(&content)
    };
    set.with_context(|| format!("failed to parse question set: {}", path.display()))
}

/// Parse the generator's JSON output.
pub fn parse_question_set_json(content: &str) -> Result<QuestionSet> {
    let document: RawDocument =
        serde_json::from_str(content).context("invalid question set JSON")?;
    let raw = match document {
        RawDocument::Set(set) => set,
        RawDocument::Questions(questions) => RawQuestionSet {
            title: None,
            difficulty: None,
            quiz_type: None,
            questions,
        },
    };
    normalize(raw)
}

/// Parse a hand-written TOML question set.
pub fn parse_question_set_toml(content: &str) -> Result<QuestionSet> {
    let raw: RawQuestionSet = toml::from_str(content).context("invalid question set TOML")?;
    normalize(raw)
}

fn parse_kind(value: Option<&str>) -> Result<Option<InteractionKind>> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse().map_err(|e: String| anyhow::anyhow!("{}", e)))
        .transpose()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn normalize(raw: RawQuestionSet) -> Result<QuestionSet> {
    let default_kind = parse_kind(raw.quiz_type.as_deref())?;

    let questions = raw
        .questions
        .into_iter()
        .enumerate()
        .map(|(i, q)| {
            let number = i + 1;
            let kind = parse_kind(q.kind.as_deref())
                .with_context(|| format!("question {number}"))?;
            let id = non_blank(q.id).unwrap_or_else(|| format!("q{number}"));
            let prompt = non_blank(q.question).unwrap_or_else(|| format!("Question {number}"));

            let correct_option = match (q.options.len(), q.correct_answer) {
                (0, _) | (_, None) => 0,
                (len, Some(raw_index)) => {
                    let clamped = raw_index.clamp(0, len as i64 - 1) as usize;
                    if clamped as i64 != raw_index {
                        tracing::warn!(
                            question = %id,
                            raw_index,
                            clamped,
                            "correct answer index out of range, clamped"
                        );
                    }
                    clamped
                }
            };

            Ok(Question {
                id,
                prompt,
                kind,
                options: q.options,
                correct_option,
                reference_text: non_blank(q.correct_text),
                explanation: non_blank(q.explanation),
                concept: non_blank(q.concept),
                guidance: non_blank(q.guidance),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(QuestionSet {
        title: non_blank(raw.title).unwrap_or_else(|| "Generated Quiz".to_string()),
        difficulty: non_blank(raw.difficulty),
        default_kind,
        questions,
    })
}

/// A non-fatal issue found in a question set.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub question_id: Option<String>,
    pub message: String,
}

/// Check a question set for problems that still allow a session to run.
pub fn validate_question_set(set: &QuestionSet) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if set.questions.is_empty() {
        warnings.push(ValidationWarning {
            question_id: None,
            message: "question set has no questions".into(),
        });
    }

    let mut seen_ids = HashSet::new();
    for question in &set.questions {
        let warn = |message: String| ValidationWarning {
            question_id: Some(question.id.clone()),
            message,
        };

        if !seen_ids.insert(question.id.as_str()) {
            warnings.push(warn(format!("duplicate question id '{}'", question.id)));
        }

        if question.prompt.trim().is_empty() {
            warnings.push(warn("empty prompt".into()));
        }

        match question.resolve_kind(set.default_kind) {
            InteractionKind::MultipleChoice => {
                if question.options.len() < 2 {
                    warnings.push(warn(format!(
                        "multiple choice question has {} option(s)",
                        question.options.len()
                    )));
                }
            }
            InteractionKind::TrueFalse => {
                let labels: Vec<&str> = question.options.iter().map(String::as_str).collect();
                if labels != ["True", "False"] && labels != ["False", "True"] {
                    warnings.push(warn(format!(
                        "true/false question has options {labels:?}"
                    )));
                }
            }
            InteractionKind::FillBlank | InteractionKind::Essay => {
                if question.reference_corpus().is_empty() {
                    warnings.push(warn(
                        "free-text question has no reference text or explanation; any answer of sufficient length will be accepted offline".into(),
                    ));
                }
                if !question.options.is_empty() {
                    warnings.push(warn("free-text question has options that will be ignored".into()));
                }
            }
        }
    }

    warnings
}
