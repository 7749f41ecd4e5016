use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use skintel_session::ChatBackend;
use skintel_types::{
    ChatRequest, ChatResponse, ChatbotStatus, ErrorDetail, Exchange, SkinAdviceRequest,
    SkinAdviceResponse,
};

use crate::error::ApiError;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the skintel backend chat endpoints
#[derive(Debug, Clone)]
pub struct SkintelClient {
    base_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl SkintelClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            token: None,
            client: http_client(DEFAULT_TIMEOUT),
        }
    }

    /// Bearer token sent with every request
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Ask the chatbot, passing the prior exchanges as context
    pub async fn chat(&self, message: &str, history: &[Exchange]) -> Result<ChatResponse, ApiError> {
        let request = ChatRequest::new(message, history);
        debug!(
            "POST /chatbot ({} chars, {} context entries)",
            message.chars().count(),
            history.len()
        );

        let response = self
            .authorized(self.client.post(self.url("/chatbot")))
            .json(&request)
            .send()
            .await?;

        let reply: ChatResponse = Self::decode(response).await?;
        if !reply.success {
            return Err(ApiError::Unsuccessful(
                reply.error.unwrap_or_else(|| reply.message.clone()),
            ));
        }
        Ok(reply)
    }

    /// Chatbot quota and availability
    pub async fn status(&self) -> Result<ChatbotStatus, ApiError> {
        debug!("GET /chatbot/status");
        let response = self
            .authorized(self.client.get(self.url("/chatbot/status")))
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Advice for a set of detected skin concerns
    pub async fn skin_advice(
        &self,
        concerns: &[String],
        additional_context: Option<&str>,
    ) -> Result<SkinAdviceResponse, ApiError> {
        let request = SkinAdviceRequest {
            concerns: concerns.to_vec(),
            additional_context: additional_context.map(str::to_string),
        };
        debug!("POST /skin-advice ({} concerns)", concerns.len());

        let response = self
            .authorized(self.client.post(self.url("/skin-advice")))
            .json(&request)
            .send()
            .await?;

        let advice: SkinAdviceResponse = Self::decode(response).await?;
        if !advice.success || advice.advice.is_none() {
            return Err(ApiError::Unsuccessful(
                advice
                    .error
                    .unwrap_or_else(|| "no advice returned".to_string()),
            ));
        }
        Ok(advice)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ErrorDetail>(&body)
            .map(|d| d.message())
            .unwrap_or(body);

        if status == StatusCode::UNAUTHORIZED {
            Err(ApiError::Unauthorized(detail))
        } else {
            Err(ApiError::Service {
                status: status.as_u16(),
                detail,
            })
        }
    }
}

fn http_client(timeout: Duration) -> reqwest::Client {
    match reqwest::Client::builder().timeout(timeout).build() {
        Ok(client) => client,
        Err(e) => {
            warn!("Falling back to an HTTP client without timeout: {}", e);
            reqwest::Client::new()
        }
    }
}

#[async_trait(?Send)]
impl ChatBackend for SkintelClient {
    type Error = ApiError;

    async fn reply(&self, message: &str, history: &[Exchange]) -> Result<String, ApiError> {
        self.chat(message, history).await.map(|reply| reply.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let client = SkintelClient::new("http://localhost:8000/");
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.url("/chatbot"), "http://localhost:8000/chatbot");
    }

    #[tokio::test]
    async fn test_http_client_applies_timeout() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(
                wiremock::ResponseTemplate::new(200).set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let err = http_client(Duration::from_millis(50))
            .get(server.uri())
            .send()
            .await
            .unwrap_err();
        assert!(err.is_timeout());
        assert!(ApiError::Http(err).is_transient());
    }

    #[test]
    fn test_transient_errors() {
        let err = ApiError::Service {
            status: 503,
            detail: "busy".into(),
        };
        assert!(err.is_transient());
        assert!(!ApiError::Unauthorized("Invalid token".into()).is_transient());
        assert!(!ApiError::Service {
            status: 400,
            detail: "bad".into()
        }
        .is_transient());
    }
}
