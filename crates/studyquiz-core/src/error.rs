//! Session error types.
//!
//! These represent invalid operations on a [`QuizSession`](crate::session::QuizSession):
//! calling a mutator in the wrong state or with an out-of-range index. The
//! documented no-ops (repeat option selection, blank text, a submission
//! already in flight) are not errors.

use thiserror::Error;

use crate::model::InteractionKind;

/// Invalid operations on a quiz session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The session has no questions.
    #[error("the quiz has no questions")]
    EmptyQuiz,

    /// The session is finished; only statistics and review are available.
    #[error("the quiz is already finished")]
    Finished,

    /// Statistics or review were requested before the quiz finished.
    #[error("the quiz is not finished yet")]
    NotFinished,

    /// A question index outside the set.
    #[error("question index {index} out of range (quiz has {len} questions)")]
    IndexOutOfRange { index: usize, len: usize },

    /// An option index outside the current question's options.
    #[error("option {option} out of range (question has {len} options)")]
    OptionOutOfRange { option: usize, len: usize },

    /// The operation does not fit the question's interaction kind.
    #[error("question {index} is {kind} and cannot be answered this way")]
    WrongInteraction { index: usize, kind: InteractionKind },

    /// `next()` before the current question was answered.
    #[error("question {index} has not been answered yet")]
    NotAnswered { index: usize },

    /// Review requested but every answered question is correct.
    #[error("there are no incorrect answers to review")]
    NoIncorrectAnswers,

    /// A review-only operation outside review mode.
    #[error("the quiz is not in review mode")]
    NotInReview,

    /// A submission completed against a different session.
    #[error("submission belongs to another session")]
    ForeignSubmission,
}
