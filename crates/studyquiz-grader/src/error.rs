//! Grader error types.

use thiserror::Error;

/// Errors that can occur when calling the grading collaborator.
///
/// The answer evaluator treats every variant the same way (fall back to the
/// local heuristic); the distinction is for logs.
#[derive(Debug, Error)]
pub enum GraderError {
    /// Authentication failed (missing or invalid token).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The grader returned a non-success response.
    #[error("grader error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("malformed grader response: {0}")]
    MalformedResponse(String),

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),
}
