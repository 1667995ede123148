//! The `studyquiz validate` command.

use std::path::PathBuf;

use anyhow::Result;

use studyquiz_core::parser;

pub fn execute(questions_path: PathBuf) -> Result<()> {
    let set = parser::load_question_set(&questions_path)?;
    println!("Question set: {} ({} questions)", set.title, set.questions.len());

    let warnings = parser::validate_question_set(&set);
    for w in &warnings {
        let prefix = w
            .question_id
            .as_ref()
            .map(|id| format!("  [{id}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("All questions valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
