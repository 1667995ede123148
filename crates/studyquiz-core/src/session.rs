//! The quiz session state machine.
//!
//! A [`QuizSession`] owns the question list and every question-indexed map
//! (results, chosen options, text answers, feedback). The host drives it
//! through mutators and reads it through accessors; nothing else writes to
//! those maps.
//!
//! Progression per question is `Answering -> Answered -> (next) -> ...`
//! until `Finished`. The [`SessionMode`] is orthogonal and only changes
//! where review entry lands.
//!
//! Free-text grading is the one suspension point. It is split into
//! [`QuizSession::begin_text_submission`], [`PendingSubmission::evaluate`]
//! and [`QuizSession::complete_submission`] so the host can keep navigating
//! while the grader works; the result is always written to the index that
//! was current when the answer was submitted.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SessionError;
use crate::evaluator::{AnswerEvaluator, EvaluationOutcome, GradingSource};
use crate::model::{default_difficulty, InteractionKind, Question, QuestionSet};
use crate::statistics::{compute_stats, SessionStats};

/// Quiz or review traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    Quiz,
    Review,
}

/// Where the session is in its progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No questions; nothing can be answered.
    Empty,
    /// Waiting for an answer to the question at this index.
    Answering(usize),
    /// A free-text answer for this index is being graded.
    Grading(usize),
    /// The question at this index has a recorded result.
    Answered(usize),
    Finished,
}

/// Per-question outcome, as shown by a question navigator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionStatus {
    Unanswered,
    Correct,
    Incorrect,
}

/// Stored grading feedback for a free-text question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFeedback {
    pub concept: String,
    pub guidance: String,
    pub feedback: String,
    pub score: f64,
    pub source: GradingSource,
}

impl From<&EvaluationOutcome> for TextFeedback {
    fn from(outcome: &EvaluationOutcome) -> Self {
        Self {
            concept: outcome.concept.clone(),
            guidance: outcome.guidance.clone(),
            feedback: outcome.feedback.clone(),
            score: outcome.score,
            source: outcome.source,
        }
    }
}

/// Input state for the current question, cleared on navigation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransientInput {
    pub selected_option: Option<usize>,
    pub draft: String,
}

/// A free-text answer that has been accepted and is waiting for grading.
///
/// Holds everything the evaluator needs, so grading does not borrow the
/// session.
#[derive(Debug)]
pub struct PendingSubmission {
    session_id: Uuid,
    generation: u64,
    index: usize,
    question: Question,
    answer: String,
    default_kind: Option<InteractionKind>,
    difficulty: String,
}

impl PendingSubmission {
    /// The question index this answer belongs to.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The trimmed answer text.
    pub fn answer(&self) -> &str {
        &self.answer
    }

    /// Run the evaluator. Never fails.
    pub async fn evaluate(self, evaluator: &AnswerEvaluator) -> CompletedSubmission {
        let outcome = evaluator
            .evaluate(
                &self.question,
                &self.answer,
                self.default_kind,
                &self.difficulty,
            )
            .await;
        CompletedSubmission {
            session_id: self.session_id,
            generation: self.generation,
            index: self.index,
            answer: self.answer,
            outcome,
        }
    }
}

/// A graded submission ready to be folded back into its session.
#[derive(Debug)]
pub struct CompletedSubmission {
    session_id: Uuid,
    generation: u64,
    index: usize,
    answer: String,
    outcome: EvaluationOutcome,
}

impl CompletedSubmission {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn outcome(&self) -> &EvaluationOutcome {
        &self.outcome
    }
}

/// One attempt at a fixed question set.
#[derive(Debug, Clone)]
pub struct QuizSession {
    id: Uuid,
    questions: Vec<Question>,
    default_kind: Option<InteractionKind>,
    difficulty: String,
    pub(crate) current_index: usize,
    pub(crate) results: BTreeMap<usize, bool>,
    selected_options: BTreeMap<usize, usize>,
    user_text_answers: BTreeMap<usize, String>,
    text_feedback: BTreeMap<usize, TextFeedback>,
    pub(crate) mode: SessionMode,
    pub(crate) finished: bool,
    input: TransientInput,
    in_flight: Option<usize>,
    /// Bumped by `reset()` so stale completions can be recognized.
    generation: u64,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

impl QuizSession {
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            id: Uuid::new_v4(),
            questions,
            default_kind: None,
            difficulty: default_difficulty(),
            current_index: 0,
            results: BTreeMap::new(),
            selected_options: BTreeMap::new(),
            user_text_answers: BTreeMap::new(),
            text_feedback: BTreeMap::new(),
            mode: SessionMode::Quiz,
            finished: false,
            input: TransientInput::default(),
            in_flight: None,
            generation: 0,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Start a session over a generated question set.
    pub fn from_set(set: &QuestionSet) -> Self {
        let mut session = Self::new(set.questions.clone()).with_default_kind(set.default_kind);
        if let Some(difficulty) = &set.difficulty {
            session.difficulty = difficulty.clone();
        }
        session
    }

    pub fn with_default_kind(mut self, kind: Option<InteractionKind>) -> Self {
        self.default_kind = kind;
        self
    }

    pub fn with_difficulty(mut self, difficulty: &str) -> Self {
        self.difficulty = difficulty.to_string();
        self
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn difficulty(&self) -> &str {
        &self.difficulty
    }

    pub fn default_kind(&self) -> Option<InteractionKind> {
        self.default_kind
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    /// Resolved interaction kind of the question at `index`.
    pub fn kind_of(&self, index: usize) -> Option<InteractionKind> {
        self.questions
            .get(index)
            .map(|q| q.resolve_kind(self.default_kind))
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn input(&self) -> &TransientInput {
        &self.input
    }

    /// Index whose free-text answer is currently being graded.
    pub fn in_flight(&self) -> Option<usize> {
        self.in_flight
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    pub fn phase(&self) -> Phase {
        if self.finished {
            Phase::Finished
        } else if self.questions.is_empty() {
            Phase::Empty
        } else if self.results.contains_key(&self.current_index) {
            Phase::Answered(self.current_index)
        } else if self.in_flight == Some(self.current_index) {
            Phase::Grading(self.current_index)
        } else {
            Phase::Answering(self.current_index)
        }
    }

    /// Correctness per answered index.
    pub fn results(&self) -> &BTreeMap<usize, bool> {
        &self.results
    }

    pub fn result(&self, index: usize) -> Option<bool> {
        self.results.get(&index).copied()
    }

    pub fn status(&self, index: usize) -> QuestionStatus {
        match self.results.get(&index) {
            None => QuestionStatus::Unanswered,
            Some(true) => QuestionStatus::Correct,
            Some(false) => QuestionStatus::Incorrect,
        }
    }

    /// The option the learner picked for a choice question.
    pub fn selected_option(&self, index: usize) -> Option<usize> {
        self.selected_options.get(&index).copied()
    }

    pub fn text_answer(&self, index: usize) -> Option<&str> {
        self.user_text_answers.get(&index).map(String::as_str)
    }

    pub fn feedback(&self, index: usize) -> Option<&TextFeedback> {
        self.text_feedback.get(&index)
    }

    /// Fraction of the set reached, counting the current question.
    pub fn progress(&self) -> f64 {
        if self.questions.is_empty() {
            0.0
        } else {
            (self.current_index + 1) as f64 / self.questions.len() as f64
        }
    }

    /// Statistics over what has been recorded so far.
    pub fn stats(&self) -> SessionStats {
        compute_stats(&self.results, self.questions.len())
    }

    /// Final statistics; only available once finished.
    pub fn summary(&self) -> Result<SessionStats, SessionError> {
        if !self.finished {
            return Err(SessionError::NotFinished);
        }
        Ok(self.stats())
    }

    // -----------------------------------------------------------------------
    // Answering
    // -----------------------------------------------------------------------

    fn ensure_active(&self) -> Result<(), SessionError> {
        if self.questions.is_empty() {
            return Err(SessionError::EmptyQuiz);
        }
        if self.finished {
            return Err(SessionError::Finished);
        }
        Ok(())
    }

    fn current_kind(&self) -> InteractionKind {
        self.questions[self.current_index].resolve_kind(self.default_kind)
    }

    /// Pick an option on the current choice question.
    ///
    /// Returns `Some(correct)` when the answer was recorded and `None` when
    /// the question was already answered.
    pub fn select_option(&mut self, option: usize) -> Result<Option<bool>, SessionError> {
        self.ensure_active()?;
        let index = self.current_index;
        let kind = self.current_kind();
        if !kind.is_choice() {
            return Err(SessionError::WrongInteraction { index, kind });
        }
        if self.results.contains_key(&index) {
            return Ok(None);
        }
        let question = &self.questions[index];
        if option >= question.options.len() {
            return Err(SessionError::OptionOutOfRange {
                option,
                len: question.options.len(),
            });
        }

        let correct = option == question.correct_option;
        self.input.selected_option = Some(option);
        self.selected_options.insert(index, option);
        self.results.insert(index, correct);
        tracing::debug!(session = %self.id, index, option, correct, "option selected");
        Ok(Some(correct))
    }

    /// Update the draft text of the current question.
    pub fn set_draft(&mut self, text: &str) -> Result<(), SessionError> {
        self.ensure_active()?;
        self.input.draft = text.to_string();
        Ok(())
    }

    /// Accept a free-text answer for grading and take the submission lock.
    ///
    /// Returns `None` (nothing happens) for blank text, an already answered
    /// question, or while another submission is in flight.
    pub fn begin_text_submission(
        &mut self,
        text: &str,
    ) -> Result<Option<PendingSubmission>, SessionError> {
        self.ensure_active()?;
        let index = self.current_index;
        let kind = self.current_kind();
        if kind.text_kind().is_none() {
            return Err(SessionError::WrongInteraction { index, kind });
        }

        let answer = text.trim();
        if answer.is_empty() || self.results.contains_key(&index) {
            return Ok(None);
        }
        if let Some(pending) = self.in_flight {
            tracing::debug!(session = %self.id, index, pending, "submission already in flight");
            return Ok(None);
        }

        self.in_flight = Some(index);
        self.input.draft = answer.to_string();
        tracing::debug!(session = %self.id, index, %kind, "text answer submitted");
        Ok(Some(PendingSubmission {
            session_id: self.id,
            generation: self.generation,
            index,
            question: self.questions[index].clone(),
            answer: answer.to_string(),
            default_kind: self.default_kind,
            difficulty: self.difficulty.clone(),
        }))
    }

    /// Fold a graded submission into the session at its captured index and
    /// release the lock.
    ///
    /// Returns `false` if the session was reset after the answer was
    /// submitted, or if the submission no longer holds the lock; the
    /// result is dropped and recorded answers stay as they are.
    pub fn complete_submission(
        &mut self,
        completed: CompletedSubmission,
    ) -> Result<bool, SessionError> {
        if completed.session_id != self.id {
            return Err(SessionError::ForeignSubmission);
        }
        if completed.generation != self.generation {
            tracing::debug!(
                session = %self.id,
                index = completed.index,
                "dropping result submitted before reset"
            );
            return Ok(false);
        }

        let index = completed.index;
        if self.in_flight != Some(index) || self.results.contains_key(&index) {
            tracing::debug!(
                session = %self.id,
                index,
                in_flight = ?self.in_flight,
                "dropping result that does not hold the submission lock"
            );
            return Ok(false);
        }
        if index != self.current_index {
            tracing::debug!(
                session = %self.id,
                index,
                current = self.current_index,
                "writing result for a question the learner has left"
            );
        }
        self.results.insert(index, completed.outcome.is_correct);
        self.user_text_answers.insert(index, completed.answer);
        self.text_feedback
            .insert(index, TextFeedback::from(&completed.outcome));
        self.in_flight = None;
        Ok(true)
    }

    /// Submit, grade, and record a free-text answer in one call.
    ///
    /// Returns the outcome, or `None` when the submission was a no-op.
    pub async fn submit_text_answer(
        &mut self,
        evaluator: &AnswerEvaluator,
        text: &str,
    ) -> Result<Option<EvaluationOutcome>, SessionError> {
        let Some(pending) = self.begin_text_submission(text)? else {
            return Ok(None);
        };
        let completed = pending.evaluate(evaluator).await;
        let outcome = completed.outcome.clone();
        self.complete_submission(completed)?;
        Ok(Some(outcome))
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    fn move_to(&mut self, index: usize) {
        self.current_index = index;
        self.input = TransientInput::default();
    }

    /// Advance past an answered question, finishing after the last one.
    ///
    /// In review mode unanswered questions can be passed too, so the
    /// summary is always reachable.
    pub fn next(&mut self) -> Result<(), SessionError> {
        self.ensure_active()?;
        let index = self.current_index;
        if self.mode == SessionMode::Quiz && !self.results.contains_key(&index) {
            return Err(SessionError::NotAnswered { index });
        }
        if index + 1 >= self.questions.len() {
            self.finish();
        } else {
            self.move_to(index + 1);
            tracing::debug!(session = %self.id, index = index + 1, mode = ?self.mode, "next question");
        }
        Ok(())
    }

    /// Step back one question; a no-op on the first.
    pub fn previous(&mut self) -> Result<(), SessionError> {
        self.ensure_active()?;
        if self.current_index > 0 {
            self.move_to(self.current_index - 1);
        }
        Ok(())
    }

    /// Jump to any question. Recorded answers stay as they are; from the
    /// finished summary this resumes the session at `index`.
    pub fn go_to_question(&mut self, index: usize) -> Result<(), SessionError> {
        let len = self.questions.len();
        if len == 0 {
            return Err(SessionError::EmptyQuiz);
        }
        if index >= len {
            return Err(SessionError::IndexOutOfRange { index, len });
        }
        self.finished = false;
        self.move_to(index);
        Ok(())
    }

    /// End the attempt now; unanswered questions count as missed.
    pub fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        self.finished_at = Some(Utc::now());
        let stats = self.stats();
        tracing::debug!(
            session = %self.id,
            correct = stats.correct,
            incorrect = stats.incorrect,
            unanswered = stats.unanswered,
            percentage = stats.percentage,
            "quiz finished"
        );
    }

    /// Walk the set again from the start in quiz mode, keeping results.
    pub fn replay(&mut self) -> Result<(), SessionError> {
        self.go_to_question(0)?;
        self.mode = SessionMode::Quiz;
        Ok(())
    }

    /// Discard every answer and start over.
    pub fn reset(&mut self) {
        self.results.clear();
        self.selected_options.clear();
        self.user_text_answers.clear();
        self.text_feedback.clear();
        self.current_index = 0;
        self.mode = SessionMode::Quiz;
        self.finished = false;
        self.input = TransientInput::default();
        self.in_flight = None;
        self.generation += 1;
        self.started_at = Utc::now();
        self.finished_at = None;
        tracing::debug!(session = %self.id, generation = self.generation, "quiz reset");
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;

    use crate::evaluator::{FALLBACK_SCORE_CORRECT, FALLBACK_SCORE_INCORRECT};
    use crate::traits::{GradeRequest, GradeResponse, Grader};

    pub(crate) fn mcq(id: &str, correct: usize) -> Question {
        Question {
            id: id.into(),
            prompt: format!("Question {id}?"),
            kind: None,
            options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
            correct_option: correct,
            reference_text: None,
            explanation: Some("Because.".into()),
            concept: None,
            guidance: None,
        }
    }

    pub(crate) fn fill(id: &str) -> Question {
        Question {
            id: id.into(),
            prompt: "Mitochondria produce ____.".into(),
            kind: Some(InteractionKind::FillBlank),
            options: vec![],
            correct_option: 0,
            reference_text: Some("mitochondria produce energy".into()),
            explanation: None,
            concept: None,
            guidance: None,
        }
    }

    struct FailingGrader {
        calls: AtomicU32,
    }

    #[async_trait]
    impl Grader for FailingGrader {
        fn name(&self) -> &str {
            "failing"
        }

        async fn grade(&self, _: &GradeRequest) -> anyhow::Result<GradeResponse> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            anyhow::bail!("grader unreachable")
        }
    }

    struct ApprovingGrader;

    #[async_trait]
    impl Grader for ApprovingGrader {
        fn name(&self) -> &str {
            "approving"
        }

        async fn grade(&self, _: &GradeRequest) -> anyhow::Result<GradeResponse> {
            Ok(GradeResponse {
                is_correct: Some(true),
                score: Some(0.95),
                feedback: Some("Precise.".into()),
                ..Default::default()
            })
        }
    }

    #[test]
    fn select_option_marks_correctness() {
        let mut session = QuizSession::new(vec![mcq("1", 2)]);
        assert_eq!(session.phase(), Phase::Answering(0));
        assert_eq!(session.select_option(2), Ok(Some(true)));
        assert_eq!(session.phase(), Phase::Answered(0));
        assert_eq!(session.selected_option(0), Some(2));
        assert_eq!(session.input().selected_option, Some(2));

        let mut other = QuizSession::new(vec![mcq("1", 2)]);
        assert_eq!(other.select_option(0), Ok(Some(false)));
        assert_eq!(other.status(0), QuestionStatus::Incorrect);
    }

    #[test]
    fn select_option_is_idempotent_once_answered() {
        let mut session = QuizSession::new(vec![mcq("1", 1)]);
        session.select_option(0).unwrap();
        assert_eq!(session.select_option(1), Ok(None));
        assert_eq!(session.result(0), Some(false));
        assert_eq!(session.selected_option(0), Some(0));
    }

    #[test]
    fn select_option_rejects_bad_input() {
        let mut session = QuizSession::new(vec![mcq("1", 1), fill("2")]);
        assert_eq!(
            session.select_option(4),
            Err(SessionError::OptionOutOfRange { option: 4, len: 4 })
        );
        session.select_option(1).unwrap();
        session.next().unwrap();
        assert_eq!(
            session.select_option(0),
            Err(SessionError::WrongInteraction {
                index: 1,
                kind: InteractionKind::FillBlank
            })
        );
    }

    #[test]
    fn next_requires_an_answer() {
        let mut session = QuizSession::new(vec![mcq("1", 0), mcq("2", 0)]);
        assert_eq!(session.next(), Err(SessionError::NotAnswered { index: 0 }));
        session.select_option(0).unwrap();
        session.set_draft("scratch").unwrap();
        session.next().unwrap();
        assert_eq!(session.current_index(), 1);
        assert_eq!(session.input(), &TransientInput::default());
        assert_eq!(session.phase(), Phase::Answering(1));
    }

    #[test]
    fn next_past_last_finishes() {
        let mut session = QuizSession::new(vec![mcq("1", 0)]);
        session.select_option(0).unwrap();
        session.next().unwrap();
        assert!(session.is_finished());
        assert_eq!(session.phase(), Phase::Finished);
        assert!(session.finished_at().is_some());
        assert_eq!(session.next(), Err(SessionError::Finished));
        assert_eq!(session.select_option(0), Err(SessionError::Finished));
    }

    #[test]
    fn go_to_question_keeps_results() {
        let mut session = QuizSession::new(vec![mcq("1", 0), mcq("2", 0), mcq("3", 0)]);
        session.select_option(0).unwrap();
        session.go_to_question(2).unwrap();
        assert_eq!(session.phase(), Phase::Answering(2));
        session.go_to_question(0).unwrap();
        assert_eq!(session.phase(), Phase::Answered(0));
        assert_eq!(session.result(0), Some(true));
        assert_eq!(
            session.go_to_question(3),
            Err(SessionError::IndexOutOfRange { index: 3, len: 3 })
        );
    }

    #[test]
    fn previous_steps_back() {
        let mut session = QuizSession::new(vec![mcq("1", 0), mcq("2", 0)]);
        session.previous().unwrap();
        assert_eq!(session.current_index(), 0);
        session.go_to_question(1).unwrap();
        session.previous().unwrap();
        assert_eq!(session.current_index(), 0);
    }

    #[test]
    fn stats_partition_the_set() {
        let mut session = QuizSession::new(vec![mcq("1", 0), mcq("2", 0), mcq("3", 0)]);
        session.select_option(0).unwrap();
        session.next().unwrap();
        session.select_option(1).unwrap();
        assert_eq!(session.summary(), Err(SessionError::NotFinished));
        session.finish();
        let stats = session.summary().unwrap();
        assert_eq!(stats.correct + stats.incorrect + stats.unanswered, 3);
        assert_eq!(stats.percentage, 33);
    }

    #[test]
    fn empty_quiz_is_well_defined() {
        let mut session = QuizSession::new(vec![]);
        assert_eq!(session.phase(), Phase::Empty);
        assert_eq!(session.current_question(), None);
        assert_eq!(session.progress(), 0.0);
        assert_eq!(session.select_option(0), Err(SessionError::EmptyQuiz));
        assert_eq!(session.next(), Err(SessionError::EmptyQuiz));
        assert_eq!(session.go_to_question(0), Err(SessionError::EmptyQuiz));
        session.finish();
        let stats = session.summary().unwrap();
        assert_eq!(stats.percentage, 0);
        assert_eq!(stats.total, 0);
    }

    #[test]
    fn reset_clears_everything() {
        let mut session = QuizSession::new(vec![mcq("1", 0), mcq("2", 0)]);
        session.select_option(1).unwrap();
        session.finish();
        session.reset();
        assert!(session.results().is_empty());
        assert_eq!(session.selected_option(0), None);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.mode(), SessionMode::Quiz);
        assert!(!session.is_finished());
        assert_eq!(session.finished_at(), None);
    }

    #[test]
    fn replay_keeps_results() {
        let mut session = QuizSession::new(vec![mcq("1", 0), mcq("2", 0)]);
        session.select_option(0).unwrap();
        session.finish();
        session.replay().unwrap();
        assert!(!session.is_finished());
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.phase(), Phase::Answered(0));
    }

    #[tokio::test]
    async fn text_answer_falls_back_when_grader_fails() {
        let grader = Arc::new(FailingGrader {
            calls: AtomicU32::new(0),
        });
        let evaluator = AnswerEvaluator::new(grader.clone());
        let mut session = QuizSession::new(vec![fill("1"), fill("2")]);

        let outcome = session
            .submit_text_answer(&evaluator, "  energy ")
            .await
            .unwrap()
            .unwrap();
        assert!(outcome.is_correct);
        assert_eq!(session.phase(), Phase::Answered(0));
        assert_eq!(session.text_answer(0), Some("energy"));
        assert_eq!(session.feedback(0).unwrap().score, FALLBACK_SCORE_CORRECT);

        session.next().unwrap();
        session.submit_text_answer(&evaluator, "x").await.unwrap();
        assert_eq!(session.result(1), Some(false));
        assert_eq!(session.feedback(1).unwrap().score, FALLBACK_SCORE_INCORRECT);
        assert_eq!(grader.calls.load(Ordering::Relaxed), 2);
    }

    #[tokio::test]
    async fn remote_verdict_is_recorded() {
        let evaluator = AnswerEvaluator::new(Arc::new(ApprovingGrader));
        let mut session = QuizSession::new(vec![fill("1")]);
        session.submit_text_answer(&evaluator, "water").await.unwrap();
        let feedback = session.feedback(0).unwrap();
        assert_eq!(session.result(0), Some(true));
        assert_eq!(feedback.score, 0.95);
        assert_eq!(feedback.feedback, "Precise.");
        assert_eq!(feedback.source, GradingSource::Remote);
    }

    #[tokio::test]
    async fn blank_and_repeat_submissions_are_no_ops() {
        let evaluator = AnswerEvaluator::local_only();
        let mut session = QuizSession::new(vec![fill("1")]);
        assert_eq!(session.submit_text_answer(&evaluator, "   ").await, Ok(None));
        assert!(session.results().is_empty());

        session.submit_text_answer(&evaluator, "energy").await.unwrap();
        assert_eq!(session.submit_text_answer(&evaluator, "other").await, Ok(None));
        assert_eq!(session.text_answer(0), Some("energy"));
    }

    #[test]
    fn text_submission_on_choice_question_is_rejected() {
        let mut session = QuizSession::new(vec![mcq("1", 0)]);
        assert_eq!(
            session.begin_text_submission("A").unwrap_err(),
            SessionError::WrongInteraction {
                index: 0,
                kind: InteractionKind::MultipleChoice
            }
        );
    }

    #[tokio::test]
    async fn only_one_submission_in_flight() {
        let mut session = QuizSession::new(vec![fill("1"), fill("2")]);
        let pending = session.begin_text_submission("energy").unwrap().unwrap();
        assert_eq!(session.phase(), Phase::Grading(0));
        assert_eq!(session.in_flight(), Some(0));
        assert!(session.begin_text_submission("energy").unwrap().is_none());

        session.go_to_question(1).unwrap();
        assert!(session.begin_text_submission("energy").unwrap().is_none());

        let completed = pending.evaluate(&AnswerEvaluator::local_only()).await;
        assert!(session.complete_submission(completed).unwrap());
        assert_eq!(session.in_flight(), None);
        assert!(session.begin_text_submission("energy").unwrap().is_some());
    }

    #[tokio::test]
    async fn stale_result_lands_on_original_index() {
        let mut session = QuizSession::new(vec![fill("1"), mcq("2", 0), fill("3")]);
        let pending = session.begin_text_submission("energy").unwrap().unwrap();
        assert_eq!(pending.index(), 0);

        session.go_to_question(2).unwrap();
        let completed = pending.evaluate(&AnswerEvaluator::local_only()).await;
        session.complete_submission(completed).unwrap();

        assert_eq!(session.current_index(), 2);
        assert_eq!(session.result(0), Some(true));
        assert_eq!(session.result(2), None);
        assert_eq!(session.phase(), Phase::Answering(2));
        assert_eq!(session.text_answer(0), Some("energy"));
    }

    #[tokio::test]
    async fn result_after_reset_is_dropped() {
        let mut session = QuizSession::new(vec![fill("1")]);
        let pending = session.begin_text_submission("energy").unwrap().unwrap();
        session.reset();
        let completed = pending.evaluate(&AnswerEvaluator::local_only()).await;
        assert_eq!(session.complete_submission(completed), Ok(false));
        assert!(session.results().is_empty());
        assert_eq!(session.in_flight(), None);
    }

    #[tokio::test]
    async fn submission_from_another_session_is_rejected() {
        let mut first = QuizSession::new(vec![fill("1")]);
        let mut second = QuizSession::new(vec![fill("1")]);
        let pending = first.begin_text_submission("energy").unwrap().unwrap();
        let completed = pending.evaluate(&AnswerEvaluator::local_only()).await;
        assert_eq!(
            second.complete_submission(completed),
            Err(SessionError::ForeignSubmission)
        );
    }

    #[tokio::test]
    async fn completion_without_the_lock_is_dropped() {
        let mut session = QuizSession::new(vec![fill("1"), fill("2")]);
        let pending = session.begin_text_submission("energy").unwrap().unwrap();
        let completed = pending.evaluate(&AnswerEvaluator::local_only()).await;
        let (session_id, generation) = (completed.session_id, completed.generation);
        let mut wrong = completed.outcome.clone();
        wrong.is_correct = false;
        let resend = || CompletedSubmission {
            session_id,
            generation,
            index: 0,
            answer: "wrong".into(),
            outcome: wrong.clone(),
        };

        assert_eq!(session.complete_submission(completed), Ok(true));
        assert_eq!(session.result(0), Some(true));

        // nothing in flight
        assert_eq!(session.complete_submission(resend()), Ok(false));

        // lock held by another question
        session.next().unwrap();
        let _held = session.begin_text_submission("energy").unwrap().unwrap();
        assert_eq!(session.complete_submission(resend()), Ok(false));

        assert_eq!(session.result(0), Some(true));
        assert_eq!(session.text_answer(0), Some("energy"));
        assert_eq!(session.in_flight(), Some(1));
    }

    #[test]
    fn from_set_carries_defaults() {
        let set = QuestionSet {
            title: "Cells".into(),
            difficulty: Some("hard".into()),
            default_kind: Some(InteractionKind::Essay),
            questions: vec![Question {
                kind: None,
                ..fill("1")
            }],
        };
        let session = QuizSession::from_set(&set);
        assert_eq!(session.difficulty(), "hard");
        assert_eq!(session.kind_of(0), Some(InteractionKind::Essay));
        assert_eq!(session.kind_of(1), None);
    }
}
