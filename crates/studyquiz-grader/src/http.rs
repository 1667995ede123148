//! HTTP grading collaborator.

use std::time::{Duration, Instant};

use anyhow::Context;
use async_trait::async_trait;
use tracing::instrument;

use studyquiz_core::traits::{GradeRequest, GradeResponse, Grader};

use crate::error::GraderError;

pub const DEFAULT_PATH: &str = "/api/quiz/grade/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Grades answers by POSTing them to a JSON endpoint.
///
/// No retries: a failed call simply means the heuristic grade is used.
pub struct HttpGrader {
    endpoint: String,
    api_key: Option<String>,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl HttpGrader {
    pub fn new(
        base_url: &str,
        path: Option<&str>,
        api_key: Option<String>,
        timeout_secs: Option<u64>,
    ) -> anyhow::Result<Self> {
        let timeout_secs = timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build HTTP client")?;

        let path = path.unwrap_or(DEFAULT_PATH);
        let endpoint = format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );

        Ok(Self {
            endpoint,
            api_key: api_key.filter(|k| !k.is_empty()),
            timeout_secs,
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Grader for HttpGrader {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self, request), fields(endpoint = %self.endpoint, kind = %request.question_type))]
    async fn grade(&self, request: &GradeRequest) -> anyhow::Result<GradeResponse> {
        let start = Instant::now();

        let mut req = self
            .client
            .post(&self.endpoint)
            .header("content-type", "application/json");
        if let Some(key) = &self.api_key {
            req = req.header("Authorization", format!("Bearer {key}"));
        }

        let response = req.json(request).send().await.map_err(|e| {
            if e.is_timeout() {
                GraderError::Timeout(self.timeout_secs)
            } else {
                GraderError::NetworkError(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        if status == 401 || status == 403 {
            let body = response.text().await.unwrap_or_default();
            return Err(GraderError::AuthenticationFailed(body).into());
        }
        if !(200..300).contains(&status) {
            let body = response.text().await.unwrap_or_default();
            return Err(GraderError::ApiError {
                status,
                message: body,
            }
            .into());
        }

        let graded: GradeResponse = response
            .json()
            .await
            .map_err(|e| GraderError::MalformedResponse(e.to_string()))?;

        tracing::debug!(
            latency_ms = start.elapsed().as_millis() as u64,
            correct = ?graded.is_correct,
            score = ?graded.score,
            "grader responded"
        );
        Ok(graded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use studyquiz_core::model::TextKind;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> GradeRequest {
        GradeRequest {
            question: "Mitochondria produce ____.".into(),
            answer: "energy".into(),
            question_type: TextKind::FillBlank,
            difficulty: "medium".into(),
            expected_answer: "energy".into(),
            explanation: String::new(),
            concept: "Mitochondria produce".into(),
        }
    }

    #[tokio::test]
    async fn successful_grading() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/quiz/grade/"))
            .and(header("Authorization", "Bearer test-key"))
            .and(body_partial_json(serde_json::json!({
                "answer": "energy",
                "questionType": "fill_blank",
                "expectedAnswer": "energy"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "is_correct": true,
                "score": 0.9,
                "concept": "Cellular Respiration",
                "guidance": "Mention ATP next time.",
                "feedback": "Correct."
            })))
            .mount(&server)
            .await;

        let grader = HttpGrader::new(&server.uri(), None, Some("test-key".into()), None).unwrap();
        let response = grader.grade(&request()).await.unwrap();
        assert_eq!(response.is_correct, Some(true));
        assert_eq!(response.score, Some(0.9));
        assert_eq!(response.feedback.as_deref(), Some("Correct."));
    }

    #[tokio::test]
    async fn partial_response_and_custom_path() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/grade"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"is_correct": false})),
            )
            .mount(&server)
            .await;

        let base = format!("{}/", server.uri());
        let grader = HttpGrader::new(&base, Some("/grade"), None, Some(5)).unwrap();
        assert_eq!(grader.endpoint(), format!("{}/grade", server.uri()));

        let response = grader.grade(&request()).await.unwrap();
        assert_eq!(response.is_correct, Some(false));
        assert_eq!(response.score, None);
    }

    #[tokio::test]
    async fn error_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .mount(&server)
            .await;

        let grader = HttpGrader::new(&server.uri(), None, None, None).unwrap();
        let err = grader.grade(&request()).await.unwrap_err();
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn unauthorized_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad token"))
            .mount(&server)
            .await;

        let grader = HttpGrader::new(&server.uri(), None, Some("wrong".into()), None).unwrap();
        let err = grader.grade(&request()).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GraderError>(),
            Some(GraderError::AuthenticationFailed(_))
        ));
    }

    #[tokio::test]
    async fn malformed_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let grader = HttpGrader::new(&server.uri(), None, None, None).unwrap();
        let err = grader.grade(&request()).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GraderError>(),
            Some(GraderError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn timeout_is_reported() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"is_correct": true}))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let grader = HttpGrader::new(&server.uri(), None, None, Some(1)).unwrap();
        let err = grader.grade(&request()).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GraderError>(),
            Some(GraderError::Timeout(1))
        ));
    }

    #[tokio::test]
    async fn unreachable_server() {
        let grader = HttpGrader::new("http://127.0.0.1:9", None, None, Some(2)).unwrap();
        assert!(grader.grade(&request()).await.is_err());
    }
}
