//! The `studyquiz grade` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use studyquiz_core::parser;
use studyquiz_grader::config::load_config_from;

use super::build_evaluator;

pub async fn execute(
    questions_path: PathBuf,
    id: String,
    answer: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let set = parser::load_question_set(&questions_path)?;
    let question = set
        .questions
        .iter()
        .find(|q| q.id == id)
        .with_context(|| format!("question '{id}' not found in {}", questions_path.display()))?;

    let default_kind = match set.default_kind {
        Some(kind) => Some(kind),
        None => config.default_kind()?,
    };
    let difficulty = set.difficulty.clone().unwrap_or(config.difficulty.clone());

    let evaluator = build_evaluator(&config)?;
    tracing::info!(question = %id, grader = evaluator.grader_name(), "grading answer");
    let outcome = evaluator
        .evaluate(question, &answer, default_kind, &difficulty)
        .await;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
