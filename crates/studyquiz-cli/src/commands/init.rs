//! The `studyquiz init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("studyquiz.toml").exists() {
        println!("studyquiz.toml already exists, skipping.");
    } else {
        std::fs::write("studyquiz.toml", SAMPLE_CONFIG)?;
        println!("Created studyquiz.toml");
    }

    std::fs::create_dir_all("question-sets")?;
    let example_path = std::path::Path::new("question-sets/example.json");
    if example_path.exists() {
        println!("question-sets/example.json already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_QUESTION_SET)?;
        println!("Created question-sets/example.json");
    }

    println!("\nNext steps:");
    println!("  1. Point [grader] in studyquiz.toml at your grading service (or keep type = \"local\")");
    println!("  2. Run: studyquiz validate --questions question-sets/example.json");
    println!("  3. Run: studyquiz take --questions question-sets/example.json");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# studyquiz configuration

# Difficulty label sent to the grader when a question set has none.
difficulty = "medium"

# Default question type when neither the question nor the set names one.
# default_kind = "mcq"

[grader]
type = "local"

# Remote grading service; answers fall back to local grading on any failure.
# [grader]
# type = "http"
# base_url = "http://localhost:8000"
# path = "/api/quiz/grade/"
# api_key = "${STUDYQUIZ_GRADER_KEY}"
# timeout_secs = 20
"#;

const EXAMPLE_QUESTION_SET: &str = r#"{
  "title": "Cell Biology Basics",
  "difficulty": "easy",
  "questions": [
    {
      "id": "q1",
      "question": "Which organelle is known as the powerhouse of the cell?",
      "options": ["Nucleus", "Mitochondria", "Ribosome", "Golgi apparatus"],
      "correctAnswer": 1,
      "explanation": "Mitochondria produce most of the cell's ATP."
    },
    {
      "id": "q2",
      "question": "Plant cells have a cell wall.",
      "options": ["True", "False"],
      "correctAnswer": 0,
      "explanation": "The cell wall is made mostly of cellulose."
    },
    {
      "id": "q3",
      "question": "Mitochondria produce ____ for the cell.",
      "type": "fill_blank",
      "correctText": "energy",
      "explanation": "They convert nutrients into energy in the form of ATP."
    },
    {
      "id": "q4",
      "question": "Explain how mitochondria produce energy.",
      "type": "essay",
      "correctText": "Mitochondria produce energy through cellular respiration, converting glucose and oxygen into ATP.",
      "concept": "Cellular Respiration"
    }
  ]
}
"#;
