//! Mock grader for testing.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use studyquiz_core::traits::{GradeRequest, GradeResponse, Grader};

use crate::error::GraderError;

/// A grader that returns a canned response (or fails) without any network.
pub struct MockGrader {
    /// `None` makes every call fail.
    response: Option<GradeResponse>,
    /// Per-answer overrides: answer substring → response.
    overrides: Vec<(String, GradeResponse)>,
    call_count: AtomicU32,
    last_request: Mutex<Option<GradeRequest>>,
}

impl MockGrader {
    /// A grader that always answers with `response`.
    pub fn with_fixed_response(response: GradeResponse) -> Self {
        Self {
            response: Some(response),
            overrides: Vec::new(),
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// A grader that is always unreachable.
    pub fn failing() -> Self {
        Self {
            response: None,
            overrides: Vec::new(),
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Return `response` for answers containing `needle`.
    pub fn with_override(mut self, needle: &str, response: GradeResponse) -> Self {
        self.overrides.push((needle.to_lowercase(), response));
        self
    }

    /// Number of grading calls made.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// The last request received.
    pub fn last_request(&self) -> Option<GradeRequest> {
        self.last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl Grader for MockGrader {
    fn name(&self) -> &str {
        "mock"
    }

    async fn grade(&self, request: &GradeRequest) -> anyhow::Result<GradeResponse> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self
            .last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(request.clone());

        let answer = request.answer.to_lowercase();
        if let Some((_, response)) = self
            .overrides
            .iter()
            .find(|(needle, _)| answer.contains(needle.as_str()))
        {
            return Ok(response.clone());
        }

        self.response
            .clone()
            .ok_or_else(|| GraderError::NetworkError("mock grader unavailable".into()).into())
    }
}
