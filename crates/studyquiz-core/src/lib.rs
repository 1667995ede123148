//! studyquiz-core: quiz session engine, answer evaluation, and scoring.
//!
//! This crate defines the question model, the keyword-overlap heuristic,
//! the answer evaluator with its remote-grading fallback, and the session
//! state machine that the rest of studyquiz builds on.

pub mod error;
pub mod evaluator;
pub mod heuristic;
pub mod model;
pub mod parser;
pub mod review;
pub mod session;
pub mod statistics;
pub mod traits;

pub use error::SessionError;
pub use evaluator::{AnswerEvaluator, EvaluationOutcome};
pub use model::{InteractionKind, Question, QuestionSet, TextKind};
pub use session::{Phase, QuizSession, SessionMode};
