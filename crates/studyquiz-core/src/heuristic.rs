//! Keyword-overlap grading for free-text answers.
//!
//! Deterministic and network-free. Used as the fallback when remote grading
//! fails and as the baseline the remote result is backfilled from.
//!
//! An empty keyword pool never fails the learner: with no reference text
//! there is nothing to check against, so only the length rule applies.

use serde::{Deserialize, Serialize};

use crate::model::{Question, TextKind};

/// Keywords shorter than this are ignored.
pub const MIN_KEYWORD_LEN: usize = 4;
/// At most this many distinct keywords are considered.
pub const MAX_KEYWORDS: usize = 10;

const ESSAY_MIN_WORDS: usize = 12;
const ESSAY_MIN_OVERLAP: f64 = 0.25;
const FILL_MIN_WORDS: usize = 1;
const FILL_MIN_OVERLAP: f64 = 0.20;

/// The heuristic's judgment on one answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeuristicVerdict {
    pub is_correct: bool,
    /// Whitespace-delimited tokens in the normalized answer.
    pub word_count: usize,
    /// The keyword pool extracted from the reference corpus.
    pub keywords: Vec<String>,
    /// How many keywords occur in the answer.
    pub matched: usize,
    /// `matched / keywords.len()`, or 0 for an empty pool.
    pub overlap: f64,
    pub concept: String,
    pub guidance: String,
}

/// Extract the keyword pool from a reference corpus.
///
/// Non-word characters become separators; tokens shorter than
/// [`MIN_KEYWORD_LEN`] are dropped; first-seen order is kept.
pub fn extract_keywords(corpus: &str) -> Vec<String> {
    let cleaned: String = corpus
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { ' ' })
        .collect();

    let mut keywords: Vec<String> = Vec::new();
    for token in cleaned.split_whitespace() {
        if token.chars().count() < MIN_KEYWORD_LEN {
            continue;
        }
        if keywords.iter().any(|k| k == token) {
            continue;
        }
        keywords.push(token.to_string());
        if keywords.len() == MAX_KEYWORDS {
            break;
        }
    }
    keywords
}

/// Grade `answer` against `corpus`.
pub fn assess(answer: &str, corpus: &str, kind: TextKind, concept: &str) -> HeuristicVerdict {
    let normalized = answer.trim().to_lowercase();
    let word_count = normalized.split_whitespace().count();
    let keywords = extract_keywords(corpus);
    let matched = keywords
        .iter()
        .filter(|k| normalized.contains(k.as_str()))
        .count();
    let overlap = if keywords.is_empty() {
        0.0
    } else {
        matched as f64 / keywords.len() as f64
    };

    let (min_words, min_overlap) = match kind {
        TextKind::Essay => (ESSAY_MIN_WORDS, ESSAY_MIN_OVERLAP),
        TextKind::FillBlank => (FILL_MIN_WORDS, FILL_MIN_OVERLAP),
    };
    let is_correct = word_count >= min_words && (keywords.is_empty() || overlap >= min_overlap);

    HeuristicVerdict {
        is_correct,
        word_count,
        keywords,
        matched,
        overlap,
        concept: concept.to_string(),
        guidance: guidance_text(kind, concept, is_correct),
    }
}

/// Grade an answer to `question`, using its own guidance when it carries one.
pub fn assess_question(question: &Question, answer: &str, kind: TextKind) -> HeuristicVerdict {
    let concept = question.concept_label();
    let mut verdict = assess(answer, &question.reference_corpus(), kind, &concept);
    if let Some(guidance) = question.guidance.as_deref().map(str::trim) {
        if !guidance.is_empty() {
            verdict.guidance = guidance.to_string();
        }
    }
    verdict
}

/// Templated remediation text.
pub fn guidance_text(kind: TextKind, concept: &str, is_correct: bool) -> String {
    match (kind, is_correct) {
        (TextKind::Essay, true) => format!(
            "Keep grounding your argument in {concept}: tie each claim to a specific example or definition."
        ),
        (TextKind::Essay, false) => format!(
            "Revisit {concept}: explain the core idea in your own words, then support it with key terms from the material."
        ),
        (TextKind::FillBlank, true) => {
            format!("Keep grounding your recall of {concept} in the exact key term.")
        }
        (TextKind::FillBlank, false) => {
            format!("Revisit {concept} and focus on the precise term the sentence calls for.")
        }
    }
}
