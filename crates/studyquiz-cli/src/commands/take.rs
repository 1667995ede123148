//! The `studyquiz take` command: an interactive quiz on stdin/stdout.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use studyquiz_core::evaluator::GradingSource;
use studyquiz_core::parser;
use studyquiz_core::review::incorrect_indices;
use studyquiz_core::session::QuestionStatus;
use studyquiz_core::{AnswerEvaluator, InteractionKind, Phase, QuizSession, SessionMode};
use studyquiz_grader::config::load_config_from;

use super::{build_evaluator, build_session};

pub async fn execute(
    questions_path: PathBuf,
    config_path: Option<PathBuf>,
    difficulty: Option<String>,
    kind: Option<String>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let set = parser::load_question_set(&questions_path)?;
    let session = build_session(&set, &config, difficulty, kind)?;
    let evaluator = build_evaluator(&config)?;

    tracing::info!(
        session = %session.id(),
        questions = session.len(),
        grader = evaluator.grader_name(),
        "starting quiz"
    );

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut runner = QuizRunner::new(session, evaluator, stdin.lock(), stdout.lock());
    runner.run(&set.title).await
}

enum Flow {
    Continue,
    Quit,
}

/// Drives a [`QuizSession`] from line-based input.
///
/// An option number answers a choice question, any other text answers a
/// free-text question, and lines starting with `:` are commands. An empty
/// line moves on from an answered question.
pub struct QuizRunner<R, W> {
    session: QuizSession,
    evaluator: AnswerEvaluator,
    input: R,
    out: W,
}

impl<R: BufRead, W: Write> QuizRunner<R, W> {
    pub fn new(session: QuizSession, evaluator: AnswerEvaluator, input: R, out: W) -> Self {
        Self {
            session,
            evaluator,
            input,
            out,
        }
    }

    /// Run until `:quit` or end of input. End of input finishes an
    /// unfinished quiz so the summary is always shown.
    pub async fn run(&mut self, title: &str) -> Result<()> {
        if self.session.is_empty() {
            writeln!(self.out, "{title} has no questions.")?;
            return Ok(());
        }

        writeln!(
            self.out,
            "{title} ({} questions, {})",
            self.session.len(),
            self.session.difficulty()
        )?;
        writeln!(self.out, "Type :help for commands.")?;
        self.render_current()?;

        loop {
            write!(self.out, "> ")?;
            self.out.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                writeln!(self.out)?;
                if !self.session.is_finished() {
                    self.session.finish();
                    self.render_summary()?;
                }
                return Ok(());
            }

            let line = line.trim();
            let flow = match line.strip_prefix(':') {
                Some(command) => self.command(command)?,
                None => {
                    self.answer(line).await?;
                    Flow::Continue
                }
            };
            if let Flow::Quit = flow {
                return Ok(());
            }
        }
    }

    async fn answer(&mut self, line: &str) -> Result<()> {
        match self.session.phase() {
            Phase::Empty => {}
            Phase::Finished => {
                if !line.is_empty() {
                    writeln!(
                        self.out,
                        "The quiz is finished. Use :review, :replay, :restart, :goto N or :quit."
                    )?;
                }
            }
            Phase::Grading(_) => writeln!(self.out, "Still grading the previous answer.")?,
            Phase::Answered(_) => {
                if line.is_empty() {
                    self.advance()?;
                } else {
                    writeln!(self.out, "Already answered. Press Enter to continue.")?;
                }
            }
            Phase::Answering(index) => {
                if !line.is_empty() {
                    self.submit(index, line).await?;
                }
            }
        }
        Ok(())
    }

    async fn submit(&mut self, index: usize, line: &str) -> Result<()> {
        let Some(kind) = self.session.kind_of(index) else {
            return Ok(());
        };

        if kind.is_choice() {
            let count = self.session.questions()[index].options.len();
            if count == 0 {
                writeln!(self.out, "This question has no options. Use :goto N or :finish.")?;
                return Ok(());
            }
            match line.parse::<usize>() {
                Ok(n) if (1..=count).contains(&n) => match self.session.select_option(n - 1) {
                    Ok(_) => self.render_result(index)?,
                    Err(e) => writeln!(self.out, "! {e}")?,
                },
                _ => writeln!(self.out, "Enter an option number from 1 to {count}.")?,
            }
            return Ok(());
        }

        writeln!(self.out, "Grading...")?;
        self.out.flush()?;
        match self.session.submit_text_answer(&self.evaluator, line).await {
            Ok(Some(_)) => self.render_result(index)?,
            Ok(None) => {}
            Err(e) => writeln!(self.out, "! {e}")?,
        }
        Ok(())
    }

    /// Enter on an answered question: the next question in quiz mode, the
    /// next miss in review mode.
    fn advance(&mut self) -> Result<()> {
        let moved = if self.session.mode() == SessionMode::Review {
            let step = self.session.review().and_then(|mut nav| nav.next_incorrect());
            match step {
                Ok(Some(_)) => Ok(()),
                Ok(None) => {
                    self.session.finish();
                    Ok(())
                }
                Err(e) => Err(e),
            }
        } else {
            self.session.next()
        };

        match moved {
            Ok(()) => self.render_current(),
            Err(e) => {
                writeln!(self.out, "! {e}")?;
                Ok(())
            }
        }
    }

    fn command(&mut self, command: &str) -> Result<Flow> {
        let mut parts = command.split_whitespace();
        let name = parts.next().unwrap_or("");

        let result = match name {
            "next" | "n" => self.session.next(),
            "prev" | "p" => self.session.previous(),
            "goto" | "g" => {
                let len = self.session.len();
                match parts.next().and_then(|n| n.parse::<usize>().ok()) {
                    Some(n) if (1..=len).contains(&n) => self.session.go_to_question(n - 1),
                    _ => {
                        writeln!(self.out, "Usage: :goto N (1-{len})")?;
                        return Ok(Flow::Continue);
                    }
                }
            }
            "finish" => {
                self.session.finish();
                Ok(())
            }
            "review" => self.session.enter_review().map(|_| ()),
            "replay" => self.session.replay(),
            "restart" => {
                self.session.reset();
                tracing::info!(session = %self.session.id(), "quiz restarted");
                Ok(())
            }
            "quit" | "q" => {
                writeln!(self.out, "Bye.")?;
                return Ok(Flow::Quit);
            }
            "help" | "h" => {
                self.print_help()?;
                return Ok(Flow::Continue);
            }
            other => {
                writeln!(self.out, "Unknown command :{other}. Type :help for commands.")?;
                return Ok(Flow::Continue);
            }
        };

        match result {
            Ok(()) => self.render_current()?,
            Err(e) => writeln!(self.out, "! {e}")?,
        }
        Ok(Flow::Continue)
    }

    fn render_current(&mut self) -> Result<()> {
        match self.session.phase() {
            Phase::Empty => Ok(()),
            Phase::Finished => self.render_summary(),
            Phase::Answering(index) | Phase::Grading(index) => self.render_question(index),
            Phase::Answered(index) => {
                self.render_question(index)?;
                self.render_result(index)
            }
        }
    }

    fn render_question(&mut self, index: usize) -> Result<()> {
        let session = &self.session;
        let question = &session.questions()[index];
        let kind = session
            .kind_of(index)
            .unwrap_or(InteractionKind::MultipleChoice);
        let total = session.len();

        let header = if session.mode() == SessionMode::Review {
            let misses = incorrect_indices(session);
            match misses.iter().position(|&i| i == index) {
                Some(p) => format!(
                    "[Review {}/{}] Question {} of {total}:",
                    p + 1,
                    misses.len(),
                    index + 1
                ),
                None => format!("[Review] Question {} of {total}:", index + 1),
            }
        } else {
            format!("[{}/{total}]", index + 1)
        };

        let mut lines = vec![String::new(), format!("{header} {}", question.prompt)];
        match kind.text_kind() {
            None => {
                for (n, option) in question.options.iter().enumerate() {
                    lines.push(format!("  {}) {option}", n + 1));
                }
            }
            Some(text_kind) => lines.push(format!("  ({} answer)", text_label(text_kind.into()))),
        }
        self.emit(&lines)
    }

    fn render_result(&mut self, index: usize) -> Result<()> {
        let session = &self.session;
        let question = &session.questions()[index];
        let kind = session
            .kind_of(index)
            .unwrap_or(InteractionKind::MultipleChoice);
        let correct = session.result(index).unwrap_or(false);

        let mut lines = Vec::new();
        if kind.is_choice() {
            if correct {
                lines.push("Correct!".to_string());
            } else {
                lines.push(format!(
                    "Incorrect. The correct answer is {}) {}.",
                    question.correct_option + 1,
                    question.correct_label().unwrap_or("?")
                ));
            }
        } else if let Some(feedback) = session.feedback(index) {
            lines.push(if correct { "Correct!" } else { "Not quite." }.to_string());
            if let Some(answer) = session.text_answer(index) {
                lines.push(format!("Your answer: {answer}"));
            }
            let source = match feedback.source {
                GradingSource::Remote => "remote",
                GradingSource::Local => "local",
            };
            lines.push(format!(
                "Score: {:.0}% ({source} grading)",
                feedback.score * 100.0
            ));
            lines.push(format!("Feedback: {}", feedback.feedback));
            lines.push(format!("Concept: {}", feedback.concept));
            lines.push(format!("Guidance: {}", feedback.guidance));
        }
        if let Some(explanation) = &question.explanation {
            lines.push(format!("Explanation: {explanation}"));
        }
        lines.push("Press Enter to continue.".to_string());
        self.emit(&lines)
    }

    fn render_summary(&mut self) -> Result<()> {
        let stats = self.session.summary()?;

        let mut table = Table::new();
        table.set_header(vec!["Correct", "Incorrect", "Missed", "Score", "Rating"]);
        table.add_row(vec![
            Cell::new(stats.correct),
            Cell::new(stats.incorrect),
            Cell::new(stats.unanswered),
            Cell::new(format!("{}%", stats.percentage)),
            Cell::new(stats.rating),
        ]);

        let marks: Vec<String> = (0..self.session.len())
            .map(|i| {
                let mark = match self.session.status(i) {
                    QuestionStatus::Correct => "✓",
                    QuestionStatus::Incorrect => "✗",
                    QuestionStatus::Unanswered => "·",
                };
                format!("{}{mark}", i + 1)
            })
            .collect();

        let mut lines = vec![String::new(), "Quiz complete.".to_string(), table.to_string()];
        lines.push(format!("Questions: {}", marks.join(" ")));
        if let Some(finished_at) = self.session.finished_at() {
            let elapsed = finished_at - self.session.started_at();
            lines.push(format!(
                "Time: {}m {:02}s",
                elapsed.num_minutes(),
                elapsed.num_seconds() % 60
            ));
        }
        if stats.incorrect > 0 {
            lines.push(
                "Type :review to revisit missed questions, :replay to walk through again, :restart to start over, or :quit."
                    .to_string(),
            );
        } else {
            lines.push("Type :replay to walk through again, :restart to start over, or :quit.".to_string());
        }
        self.emit(&lines)
    }

    fn print_help(&mut self) -> Result<()> {
        let lines = [
            "Answer with an option number, or type your answer for free-text questions.",
            "Press Enter on an answered question to continue.",
            "  :next        next question",
            "  :prev        previous question",
            "  :goto N      jump to question N",
            "  :finish      end the quiz now",
            "  :review      revisit incorrect answers (after finishing)",
            "  :replay      walk through the quiz again, keeping answers",
            "  :restart     discard all answers and start over",
            "  :quit        leave",
        ]
        .map(String::from);
        self.emit(&lines)
    }

    fn emit(&mut self, lines: &[String]) -> Result<()> {
        for line in lines {
            writeln!(self.out, "{line}")?;
        }
        Ok(())
    }
}

fn text_label(kind: InteractionKind) -> &'static str {
    match kind {
        InteractionKind::Essay => "essay",
        _ => "short",
    }
}
