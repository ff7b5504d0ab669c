//! HTTP implementation of [`SessionApi`]

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{ApiError, ErrorCode};
use super::{ApiResult, SessionApi};
use crate::config::ApiConfig;
use crate::schema::{
    decode, AnswerQuestionRequest, AskQuestionRequest, CreateSessionRequest, GuessLetterRequest,
    GuessWordRequest, HealthResponse, SessionId, SessionSnapshot, Validate,
};

const JSON: &str = "application/json";
const JSON_BODY: &str = "application/json; charset=utf-8";

/// Five-By backend client
#[derive(Clone, Debug)]
pub struct FiveByClient {
    /// Base URL without a trailing slash
    base_url: String,
    /// HTTP client
    http_client: reqwest::Client,
}

impl FiveByClient {
    /// Create a client for `base_url` with a per-request timeout
    pub fn new(base_url: &str, timeout: Duration) -> ApiResult<Self> {
        let base_url = normalize_base_url(base_url)?;
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::ClientBuild)?;
        Ok(Self {
            base_url,
            http_client,
        })
    }

    /// Create from the `[api]` config section
    pub fn from_config(config: &ApiConfig) -> ApiResult<Self> {
        Self::new(&config.base_url, config.request_timeout())
    }

    /// Base URL requests are sent to
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET` a path and validate the response as `T`
    pub async fn get<T>(&self, path: &str) -> ApiResult<T>
    where
        T: DeserializeOwned + Validate,
    {
        self.request::<T, ()>(Method::GET, path, None).await
    }

    /// Send a request and validate the 2xx response as `T`
    ///
    /// `Accept: application/json` is always sent; `Content-Type` only when
    /// there is a body.
    pub async fn request<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> ApiResult<T>
    where
        T: DeserializeOwned + Validate,
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, normalize_path(path));
        let mut builder = self
            .http_client
            .request(method.clone(), &url)
            .header(ACCEPT, JSON);
        if let Some(body) = body {
            let bytes = serde_json::to_vec(body)
                .map_err(|err| ApiError::InvalidRequest(err.into()))?;
            builder = builder.header(CONTENT_TYPE, JSON_BODY).body(bytes);
        }

        tracing::debug!(%method, %url, "sending request");
        let response = builder.send().await.map_err(ApiError::from_transport)?;
        let status = response.status();
        let text = response.text().await.map_err(ApiError::from_transport)?;
        let payload = parse_json(status.as_u16(), &text)?;
        tracing::debug!(%method, %url, status = status.as_u16(), "received response");

        if status.is_success() {
            return decode::<T>(payload).map_err(|source| {
                tracing::warn!(%url, error = %source, "response failed validation");
                ApiError::InvalidResponseShape {
                    status: status.as_u16(),
                    source,
                }
            });
        }

        Err(parse_error_envelope(status.as_u16(), payload))
    }

    async fn post_snapshot<B>(&self, path: &str, body: &B) -> ApiResult<SessionSnapshot>
    where
        B: Serialize + Sync,
    {
        self.request(Method::POST, path, Some(body)).await
    }
}

#[async_trait]
impl SessionApi for FiveByClient {
    async fn create_session(&self, request: &CreateSessionRequest) -> ApiResult<SessionSnapshot> {
        let snapshot = self.post_snapshot("/sessions", request).await?;
        tracing::info!(session_id = %snapshot.session_id, "session created");
        Ok(snapshot)
    }

    async fn get_session(&self, session_id: SessionId) -> ApiResult<SessionSnapshot> {
        self.get(&format!("/sessions/{session_id}")).await
    }

    async fn ask_question(
        &self,
        session_id: SessionId,
        request: &AskQuestionRequest,
    ) -> ApiResult<SessionSnapshot> {
        self.post_snapshot(&format!("/sessions/{session_id}/ask"), request)
            .await
    }

    async fn answer_question(
        &self,
        session_id: SessionId,
        request: &AnswerQuestionRequest,
    ) -> ApiResult<SessionSnapshot> {
        self.post_snapshot(&format!("/sessions/{session_id}/answer"), request)
            .await
    }

    async fn guess_letter(
        &self,
        session_id: SessionId,
        request: &GuessLetterRequest,
    ) -> ApiResult<SessionSnapshot> {
        self.post_snapshot(&format!("/sessions/{session_id}/guess-letter"), request)
            .await
    }

    async fn guess_word(
        &self,
        session_id: SessionId,
        request: &GuessWordRequest,
    ) -> ApiResult<SessionSnapshot> {
        self.post_snapshot(&format!("/sessions/{session_id}/guess-word"), request)
            .await
    }

    async fn health(&self) -> ApiResult<HealthResponse> {
        self.get("/health").await
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Strip trailing slashes and require an http(s) scheme
pub(crate) fn normalize_base_url(base_url: &str) -> ApiResult<String> {
    let trimmed = base_url.trim().trim_end_matches('/');
    let lower = trimmed.to_ascii_lowercase();
    let has_host = lower
        .strip_prefix("http://")
        .or_else(|| lower.strip_prefix("https://"))
        .is_some_and(|rest| !rest.is_empty());
    if has_host {
        Ok(trimmed.to_string())
    } else {
        Err(ApiError::InvalidBaseUrl(base_url.to_string()))
    }
}

fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

/// Empty bodies read as `null`
fn parse_json(status: u16, text: &str) -> ApiResult<Value> {
    if text.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(text).map_err(|_| ApiError::InvalidJson { status })
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(default)]
    details: Option<Value>,
}

fn parse_error_envelope(status: u16, payload: Value) -> ApiError {
    match serde_json::from_value::<ErrorEnvelope>(payload.clone()) {
        Ok(ErrorEnvelope { error }) => {
            tracing::debug!(status, code = %error.code, "server returned error");
            ApiError::Server {
                status,
                code: ErrorCode::from_code(&error.code),
                message: error.message,
                details: error.details,
            }
        }
        Err(_) => ApiError::InvalidErrorShape {
            status,
            body: payload,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_base_url_trailing_slashes_stripped() {
        assert_eq!(
            normalize_base_url("http://localhost:8000///").unwrap(),
            "http://localhost:8000"
        );
    }

    #[test]
    fn test_base_url_requires_http_scheme() {
        assert!(matches!(
            normalize_base_url("ftp://example.com"),
            Err(ApiError::InvalidBaseUrl(_))
        ));
        assert!(normalize_base_url("localhost:8000").is_err());
        assert!(normalize_base_url("https://").is_err());
    }

    #[test]
    fn test_path_gets_leading_slash() {
        assert_eq!(normalize_path("health"), "/health");
        assert_eq!(normalize_path("/health"), "/health");
    }

    #[test]
    fn test_empty_body_is_null() {
        assert_eq!(parse_json(204, "").unwrap(), Value::Null);
        assert!(matches!(
            parse_json(200, "<html>"),
            Err(ApiError::InvalidJson { status: 200 })
        ));
    }

    #[test]
    fn test_error_envelope_with_details() {
        let err = parse_error_envelope(
            409,
            json!({"error": {"code": "cell_locked", "message": "locked", "details": {"cell": 3}}}),
        );
        match err {
            ApiError::Server {
                status,
                code,
                details,
                ..
            } => {
                assert_eq!(status, 409);
                assert_eq!(code, ErrorCode::CellLocked);
                assert_eq!(details, Some(json!({"cell": 3})));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_envelope_keeps_raw_body() {
        let err = parse_error_envelope(500, json!({"detail": "boom"}));
        assert_eq!(err.code(), "invalid_error_shape");
        assert_eq!(err.details(), Some(json!({"detail": "boom"})));
    }
}
