pub mod grade;
pub mod init;
pub mod take;
pub mod validate;

use anyhow::Result;

use studyquiz_core::{AnswerEvaluator, InteractionKind, QuestionSet, QuizSession};
use studyquiz_grader::{create_grader, StudyquizConfig};

/// Build the evaluator described by the config.
pub fn build_evaluator(config: &StudyquizConfig) -> Result<AnswerEvaluator> {
    let grader = create_grader(&config.grader)?;
    Ok(AnswerEvaluator::with_grader(grader))
}

/// Build a session, resolving difficulty and default kind as
/// flag > question set > config.
pub fn build_session(
    set: &QuestionSet,
    config: &StudyquizConfig,
    difficulty: Option<String>,
    kind: Option<String>,
) -> Result<QuizSession> {
    let default_kind = match kind {
        Some(k) => Some(
            k.parse::<InteractionKind>()
                .map_err(|e| anyhow::anyhow!("{}", e))?,
        ),
        None => match set.default_kind {
            Some(k) => Some(k),
            None => config.default_kind()?,
        },
    };
    let difficulty = difficulty
        .or_else(|| set.difficulty.clone())
        .unwrap_or_else(|| config.difficulty.clone());

    Ok(QuizSession::new(set.questions.clone())
        .with_default_kind(default_kind)
        .with_difficulty(&difficulty))
}
