//! studyquiz CLI: take, validate and grade generated quizzes.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "studyquiz", version, about = "Quiz sessions for generated study sets")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take a quiz interactively
    Take {
        /// Path to a .json or .toml question set
        #[arg(long)]
        questions: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Difficulty label sent to the grader (overrides the question set)
        #[arg(long)]
        difficulty: Option<String>,

        /// Default question type: mcq, tf, fill_blank, essay
        #[arg(long)]
        kind: Option<String>,
    },

    /// Validate a question set
    Validate {
        /// Path to a .json or .toml question set
        #[arg(long)]
        questions: PathBuf,
    },

    /// Grade a single free-text answer and print the outcome as JSON
    Grade {
        /// Path to a .json or .toml question set
        #[arg(long)]
        questions: PathBuf,

        /// Question id
        #[arg(long)]
        id: String,

        /// The answer to grade
        #[arg(long)]
        answer: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config and example question set
    Init,
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so they never interleave with the quiz transcript.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("studyquiz=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Take {
            questions,
            config,
            difficulty,
            kind,
        } => commands::take::execute(questions, config, difficulty, kind).await,
        Commands::Validate { questions } => commands::validate::execute(questions),
        Commands::Grade {
            questions,
            id,
            answer,
            config,
        } => commands::grade::execute(questions, id, answer, config).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
