//! Review mode: replaying the questions answered incorrectly.
//!
//! Entering review lands on the first miss in question order. The session's
//! own `next()` still walks every question; [`ReviewNavigator`] adds jumps
//! that skip straight between misses.

use crate::error::SessionError;
use crate::session::{QuizSession, SessionMode};

/// Indices answered incorrectly, in question order.
pub fn incorrect_indices(session: &QuizSession) -> Vec<usize> {
    session
        .results
        .iter()
        .filter(|(_, correct)| !**correct)
        .map(|(index, _)| *index)
        .collect()
}

/// 1-based position of the current question among the misses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewPosition {
    pub ordinal: usize,
    pub total: usize,
}

impl QuizSession {
    /// Switch a finished session to review mode at the first incorrect
    /// answer. Returns that index.
    pub fn enter_review(&mut self) -> Result<usize, SessionError> {
        if !self.finished {
            return Err(SessionError::NotFinished);
        }
        let first = incorrect_indices(self)
            .first()
            .copied()
            .ok_or(SessionError::NoIncorrectAnswers)?;

        self.go_to_question(first)?;
        self.mode = SessionMode::Review;
        tracing::debug!(session = %self.id(), index = first, "entered review");
        Ok(first)
    }

    /// Return to quiz mode, keeping position and results.
    pub fn exit_review(&mut self) -> Result<(), SessionError> {
        if self.mode != SessionMode::Review {
            return Err(SessionError::NotInReview);
        }
        self.mode = SessionMode::Quiz;
        Ok(())
    }

    /// Review helpers; only meaningful while in review mode.
    pub fn review(&mut self) -> Result<ReviewNavigator<'_>, SessionError> {
        if self.mode != SessionMode::Review {
            return Err(SessionError::NotInReview);
        }
        Ok(ReviewNavigator { session: self })
    }
}

/// Moves a review-mode session between incorrect answers.
pub struct ReviewNavigator<'a> {
    session: &'a mut QuizSession,
}

impl ReviewNavigator<'_> {
    pub fn incorrect(&self) -> Vec<usize> {
        incorrect_indices(self.session)
    }

    /// `None` when the current question is not one of the misses.
    pub fn position(&self) -> Option<ReviewPosition> {
        let misses = self.incorrect();
        let current = self.session.current_index();
        misses
            .iter()
            .position(|&i| i == current)
            .map(|p| ReviewPosition {
                ordinal: p + 1,
                total: misses.len(),
            })
    }

    /// Jump to the next miss after the current question; `None` if there is
    /// none.
    pub fn next_incorrect(&mut self) -> Result<Option<usize>, SessionError> {
        let current = self.session.current_index();
        let target = self.incorrect().into_iter().find(|&i| i > current);
        self.jump(target)
    }

    /// Jump to the previous miss before the current question.
    pub fn previous_incorrect(&mut self) -> Result<Option<usize>, SessionError> {
        let current = self.session.current_index();
        let target = self.incorrect().into_iter().rev().find(|&i| i < current);
        self.jump(target)
    }

    fn jump(&mut self, target: Option<usize>) -> Result<Option<usize>, SessionError> {
        let Some(index) = target else {
            return Ok(None);
        };
        self.session.go_to_question(index)?;
        Ok(Some(index))
    }
}
