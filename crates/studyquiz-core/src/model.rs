//! Core data model types for studyquiz.
//!
//! A [`Question`] is immutable for the lifetime of a session. Its
//! [`InteractionKind`] decides both how it is answered and how it is graded.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fallback concept label when none can be derived from the prompt.
pub const DEFAULT_CONCEPT: &str = "Core Concept";

/// How a question is answered and graded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    MultipleChoice,
    TrueFalse,
    FillBlank,
    Essay,
}

/// The free-text subset of [`InteractionKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextKind {
    FillBlank,
    Essay,
}

impl InteractionKind {
    /// `Some` for the kinds answered with free text.
    pub fn text_kind(self) -> Option<TextKind> {
        match self {
            InteractionKind::FillBlank => Some(TextKind::FillBlank),
            InteractionKind::Essay => Some(TextKind::Essay),
            InteractionKind::MultipleChoice | InteractionKind::TrueFalse => None,
        }
    }

    /// Whether the question is answered by picking an option.
    pub fn is_choice(self) -> bool {
        self.text_kind().is_none()
    }
}

impl From<TextKind> for InteractionKind {
    fn from(kind: TextKind) -> Self {
        match kind {
            TextKind::FillBlank => InteractionKind::FillBlank,
            TextKind::Essay => InteractionKind::Essay,
        }
    }
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InteractionKind::MultipleChoice => write!(f, "multiple_choice"),
            InteractionKind::TrueFalse => write!(f, "true_false"),
            InteractionKind::FillBlank => write!(f, "fill_blank"),
            InteractionKind::Essay => write!(f, "essay"),
        }
    }
}

impl fmt::Display for TextKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        InteractionKind::from(*self).fmt(f)
    }
}

impl FromStr for InteractionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mcq" | "multiple_choice" | "multiple-choice" => Ok(InteractionKind::MultipleChoice),
            "tf" | "true_false" | "true-false" => Ok(InteractionKind::TrueFalse),
            "fill" | "fill_blank" | "fill-blank" | "fill_in" | "fill-in" | "fillin" => {
                Ok(InteractionKind::FillBlank)
            }
            "essay" => Ok(InteractionKind::Essay),
            other => Err(format!("unknown question type: {other}")),
        }
    }
}

/// A single quiz question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Identifier, unique within a question set.
    pub id: String,
    /// Display text of the question.
    pub prompt: String,
    /// Explicit interaction kind; takes priority over any default.
    #[serde(default)]
    pub kind: Option<InteractionKind>,
    /// Choice labels (empty for free-text questions).
    #[serde(default)]
    pub options: Vec<String>,
    /// Index into `options` of the correct choice.
    #[serde(default)]
    pub correct_option: usize,
    /// Canonical expected answer for free-text grading.
    #[serde(default)]
    pub reference_text: Option<String>,
    /// Shown after any answer is submitted.
    #[serde(default)]
    pub explanation: Option<String>,
    /// Short topic label.
    #[serde(default)]
    pub concept: Option<String>,
    /// Remediation text for free-text questions.
    #[serde(default)]
    pub guidance: Option<String>,
}

impl Question {
    /// Resolve the interaction kind: explicit kind, then the session-wide
    /// default, then inference from the options.
    pub fn resolve_kind(&self, default: Option<InteractionKind>) -> InteractionKind {
        if let Some(kind) = self.kind.or(default) {
            return kind;
        }
        match self.options.len() {
            0 => InteractionKind::FillBlank,
            2 if self.is_true_false_pair() => InteractionKind::TrueFalse,
            _ => InteractionKind::MultipleChoice,
        }
    }

    fn is_true_false_pair(&self) -> bool {
        let has = |label: &str| self.options.iter().any(|o| o == label);
        self.options.len() == 2 && has("True") && has("False")
    }

    /// The concept label, derived from the first two words of the prompt
    /// when not set explicitly.
    pub fn concept_label(&self) -> String {
        if let Some(concept) = self.concept.as_deref().map(str::trim) {
            if !concept.is_empty() {
                return concept.to_string();
            }
        }
        derive_concept(&self.prompt)
    }

    /// Reference text and explanation joined into one grading corpus.
    pub fn reference_corpus(&self) -> String {
        let reference = self.reference_text.as_deref().unwrap_or("");
        let explanation = self.explanation.as_deref().unwrap_or("");
        format!("{reference} {explanation}").trim().to_string()
    }

    /// Label of the correct option, if it exists.
    pub fn correct_label(&self) -> Option<&str> {
        self.options.get(self.correct_option).map(String::as_str)
    }
}

/// First two word tokens of `prompt` with punctuation stripped.
pub fn derive_concept(prompt: &str) -> String {
    let words: Vec<String> = prompt
        .split_whitespace()
        .map(|token| {
            token
                .chars()
                .filter(|c| c.is_alphanumeric() || *c == '_')
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .take(2)
        .collect();

    if words.is_empty() {
        DEFAULT_CONCEPT.to_string()
    } else {
        words.join(" ")
    }
}

/// A finished question set handed over by the quiz generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionSet {
    /// Human-readable title.
    pub title: String,
    /// Difficulty label forwarded to the grader.
    #[serde(default)]
    pub difficulty: Option<String>,
    /// Session-wide default interaction kind.
    #[serde(default)]
    pub default_kind: Option<InteractionKind>,
    /// The questions, in presentation order.
    #[serde(default)]
    pub questions: Vec<Question>,
}

pub fn default_difficulty() -> String {
    "medium".to_string()
}
