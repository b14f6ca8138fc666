use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::client::context::RequestContext;
use crate::client::error::ClientError;
use crate::core::config::parsing::{env_number, env_or_default};
use crate::schemas::assessment::{AssessmentResponse, QuestionResponse};
use crate::schemas::attempt::{AnswerMap, AttemptAnswersRequest, AttemptResponse};
use crate::schemas::score::ScoreResponse;
use crate::schemas::ErrorBody;

/// The server endpoints the attempt lifecycle consumes. `Ok(None)` on the two lookups means
/// the server answered 404, which is a valid "nothing yet" outcome rather than a failure.
#[async_trait]
pub trait AttemptApi: Send + Sync {
    async fn fetch_test(
        &self,
        ctx: &RequestContext,
        test_id: &str,
    ) -> Result<AssessmentResponse, ClientError>;

    async fn fetch_questions(
        &self,
        ctx: &RequestContext,
        test_id: &str,
    ) -> Result<Vec<QuestionResponse>, ClientError>;

    async fn fetch_attempt(
        &self,
        ctx: &RequestContext,
        test_id: &str,
    ) -> Result<Option<AttemptResponse>, ClientError>;

    async fn start_attempt(
        &self,
        ctx: &RequestContext,
        test_id: &str,
    ) -> Result<AttemptResponse, ClientError>;

    async fn submit_attempt(
        &self,
        ctx: &RequestContext,
        test_id: &str,
        answers: &AnswerMap,
    ) -> Result<AttemptResponse, ClientError>;

    async fn save_progress(
        &self,
        ctx: &RequestContext,
        test_id: &str,
        answers: &AnswerMap,
    ) -> Result<AttemptResponse, ClientError>;

    async fn fetch_score(
        &self,
        ctx: &RequestContext,
        test_id: &str,
    ) -> Result<Option<ScoreResponse>, ClientError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub base_url: String,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl ClientSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(5),
        }
    }

    pub fn from_env() -> Result<Self, ClientError> {
        let base_url = env_or_default("CLASSROOM_API_BASE_URL", "http://localhost:8000/api/v1");
        let request_timeout: u64 = env_number("CLASSROOM_HTTP_TIMEOUT_SECONDS", 30)
            .map_err(|e| ClientError::Config(e.to_string()))?;
        let connect_timeout: u64 = env_number("CLASSROOM_CONNECT_TIMEOUT_SECONDS", 5)
            .map_err(|e| ClientError::Config(e.to_string()))?;

        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::Config(format!("CLASSROOM_API_BASE_URL must be http(s): {base_url}")));
        }

        Ok(Self {
            base_url,
            request_timeout: Duration::from_secs(request_timeout),
            connect_timeout: Duration::from_secs(connect_timeout),
        })
    }
}

/// `AttemptApi` over HTTP with JSON bodies and a bearer header per call.
#[derive(Clone)]
pub struct HttpAttemptApi {
    client: Client,
    base_url: String,
}

impl HttpAttemptApi {
    pub fn new(settings: &ClientSettings) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .connect_timeout(settings.connect_timeout)
            .user_agent(concat!("classroom-attempts/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        Ok(Self { client, base_url: settings.base_url.trim_end_matches('/').to_string() })
    }

    fn test_url(&self, test_id: &str, suffix: &str) -> String {
        format!("{}/tests/{}{}", self.base_url, test_id, suffix)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        request: RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = request
            .bearer_auth(ctx.bearer_token())
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return response.json::<T>().await.map_err(|e| ClientError::Decode(e.to_string()));
        }

        let fallback = status.canonical_reason().unwrap_or("request failed").to_string();
        let detail = match response.json::<ErrorBody>().await {
            Ok(body) => body.detail,
            Err(_) => fallback,
        };
        tracing::debug!(status = status.as_u16(), detail = %detail, "Attempts API returned an error");
        Err(ClientError::from_status(status.as_u16(), detail))
    }

    async fn send_optional<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        request: RequestBuilder,
    ) -> Result<Option<T>, ClientError> {
        match self.send(ctx, request).await {
            Ok(value) => Ok(Some(value)),
            Err(ClientError::NotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

#[async_trait]
impl AttemptApi for HttpAttemptApi {
    async fn fetch_test(
        &self,
        ctx: &RequestContext,
        test_id: &str,
    ) -> Result<AssessmentResponse, ClientError> {
        self.send(ctx, self.client.get(self.test_url(test_id, ""))).await
    }

    async fn fetch_questions(
        &self,
        ctx: &RequestContext,
        test_id: &str,
    ) -> Result<Vec<QuestionResponse>, ClientError> {
        self.send(ctx, self.client.get(self.test_url(test_id, "/questions"))).await
    }

    async fn fetch_attempt(
        &self,
        ctx: &RequestContext,
        test_id: &str,
    ) -> Result<Option<AttemptResponse>, ClientError> {
        self.send_optional(ctx, self.client.get(self.test_url(test_id, "/attempts"))).await
    }

    async fn start_attempt(
        &self,
        ctx: &RequestContext,
        test_id: &str,
    ) -> Result<AttemptResponse, ClientError> {
        self.send(ctx, self.client.post(self.test_url(test_id, "/attempts/start"))).await
    }

    async fn submit_attempt(
        &self,
        ctx: &RequestContext,
        test_id: &str,
        answers: &AnswerMap,
    ) -> Result<AttemptResponse, ClientError> {
        let body = AttemptAnswersRequest { submitted_answers: answers.clone() };
        self.send(ctx, self.client.put(self.test_url(test_id, "/attempts/submit")).json(&body)).await
    }

    async fn save_progress(
        &self,
        ctx: &RequestContext,
        test_id: &str,
        answers: &AnswerMap,
    ) -> Result<AttemptResponse, ClientError> {
        let body = AttemptAnswersRequest { submitted_answers: answers.clone() };
        self.send(ctx, self.client.put(self.test_url(test_id, "/attempts/progress")).json(&body))
            .await
    }

    async fn fetch_score(
        &self,
        ctx: &RequestContext,
        test_id: &str,
    ) -> Result<Option<ScoreResponse>, ClientError> {
        let request = self.client.get(format!("{}/scores", self.base_url)).query(&[("testId", test_id)]);
        self.send_optional(ctx, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    #[tokio::test]
    async fn settings_from_env_use_defaults() {
        let _guard = test_support::env_lock().await;
        std::env::remove_var("CLASSROOM_API_BASE_URL");
        std::env::remove_var("CLASSROOM_HTTP_TIMEOUT_SECONDS");
        std::env::remove_var("CLASSROOM_CONNECT_TIMEOUT_SECONDS");

        let settings = ClientSettings::from_env().expect("settings");
        assert_eq!(settings, ClientSettings::new("http://localhost:8000/api/v1"));
    }

    #[tokio::test]
    async fn settings_from_env_reject_bad_values() {
        let _guard = test_support::env_lock().await;
        std::env::set_var("CLASSROOM_API_BASE_URL", "ftp://example.org");
        assert!(matches!(ClientSettings::from_env(), Err(ClientError::Config(_))));

        std::env::set_var("CLASSROOM_API_BASE_URL", "https://school.example/api/v1");
        std::env::set_var("CLASSROOM_HTTP_TIMEOUT_SECONDS", "soon");
        assert!(matches!(ClientSettings::from_env(), Err(ClientError::Config(_))));

        std::env::remove_var("CLASSROOM_API_BASE_URL");
        std::env::remove_var("CLASSROOM_HTTP_TIMEOUT_SECONDS");
    }

    #[test]
    fn urls_ignore_trailing_slash() {
        let api = HttpAttemptApi::new(&ClientSettings::new("http://localhost:8000/api/v1/"))
            .expect("client");
        assert_eq!(api.test_url("t-1", "/attempts"), "http://localhost:8000/api/v1/tests/t-1/attempts");
    }
}
