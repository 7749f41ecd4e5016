use async_trait::async_trait;
use gloo_net::http::{Request, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use skintel_session::ChatBackend;
use skintel_types::{
    ChatRequest, ChatResponse, ErrorDetail, Exchange, SkinAdviceRequest, SkinAdviceResponse,
};

use crate::utils;

/// HTTP calls from the page to the chat service.
///
/// The bearer token is read from localStorage on every request so a login
/// in another tab is picked up without reloading the widget.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    api_base: String,
}

impl HttpBackend {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
        }
    }

    fn post(&self, path: &str) -> RequestBuilder {
        let builder = Request::post(&utils::endpoint(&self.api_base, path));
        match stored_token() {
            Some(token) => builder.header("Authorization", &format!("Bearer {}", token)),
            None => builder,
        }
    }

    pub async fn chat(&self, message: &str, history: &[Exchange]) -> Result<String, String> {
        let request = self
            .post("/chatbot")
            .json(&ChatRequest::new(message, history))
            .map_err(|e| format!("Failed to serialize request: {}", e))?;
        let response = request
            .send()
            .await
            .map_err(|e| format!("Network error: {}", e))?;

        let body: ChatResponse = decode(response).await?;
        if body.success {
            Ok(body.message)
        } else {
            Err(body.error.unwrap_or(body.message))
        }
    }

    pub async fn skin_advice(&self, concerns: &[String]) -> Result<String, String> {
        let payload = SkinAdviceRequest {
            concerns: concerns.to_vec(),
            additional_context: None,
        };
        let request = self
            .post("/skin-advice")
            .json(&payload)
            .map_err(|e| format!("Failed to serialize request: {}", e))?;
        let response = request
            .send()
            .await
            .map_err(|e| format!("Network error: {}", e))?;

        advice_text(decode(response).await?)
    }
}

#[async_trait(?Send)]
impl ChatBackend for HttpBackend {
    type Error = String;

    async fn reply(&self, message: &str, history: &[Exchange]) -> Result<String, String> {
        self.chat(message, history).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, String> {
    let status = response.status();
    if response.ok() {
        return response
            .json::<T>()
            .await
            .map_err(|e| format!("Invalid response: {}", e));
    }

    let text = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ErrorDetail>(&text)
        .map(|d| d.message())
        .unwrap_or(text);
    log::warn!("Chat service returned {}: {}", status, detail);
    Err(match status {
        401 => "Your session has expired. Please log in again.".to_string(),
        _ => format!("Service error ({}): {}", status, detail),
    })
}

// Same failure text as the native client: the body's `error` wins
fn advice_text(body: SkinAdviceResponse) -> Result<String, String> {
    match body.advice {
        Some(advice) if body.success => Ok(advice),
        _ => Err(body
            .error
            .unwrap_or_else(|| "no advice returned".to_string())),
    }
}

fn stored_token() -> Option<String> {
    web_sys::window()?
        .local_storage()
        .ok()??
        .get_item(utils::TOKEN_STORAGE_KEY)
        .ok()?
        .filter(|token| !token.trim().is_empty())
}
