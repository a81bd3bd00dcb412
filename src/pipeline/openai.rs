//! OpenAI-compatible vision client over plain HTTP.
//!
//! Works against any endpoint speaking the OpenAI wire format: OpenAI itself,
//! vLLM, LiteLLM, Ollama's `/v1`, LM Studio and friends. Two calls are used:
//!
//! * `GET  {api_url}/models`: default-model resolution
//! * `POST {api_url}/chat/completions`: one request per region
//!
//! Each request carries a single user message holding the prompt text and the
//! region as a `data:image/jpeg;base64,...` URL. There is no retry and no
//! caching here; a failed call is reported to the caller as-is.

use crate::error::ClientError;
use crate::pipeline::client::VisionClient;
use crate::pipeline::encode::data_url;
use async_trait::async_trait;
use edgequake_llm::ImageData;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Vision client for OpenAI-compatible APIs.
#[derive(Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
enum ContentPart<'a> {
    #[serde(rename = "text")]
    Text { text: &'a str },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModelList {
    #[serde(default)]
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl OpenAiClient {
    /// Create a client for `api_url` (e.g. `https://api.openai.com/v1`).
    ///
    /// Fails when the URL does not parse or the HTTP client cannot be built.
    /// No request is sent.
    pub fn new(
        api_key: impl Into<String>,
        api_url: &str,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let base_url = api_url.trim_end_matches('/').to_string();
        reqwest::Url::parse(&base_url)
            .map_err(|e| ClientError::Setup(format!("invalid API URL '{base_url}': {e}")))?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Setup(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url,
            api_key: api_key.into(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Turn a non-success response into [`ClientError::Api`], preferring the
    /// service's own error message when the body has one.
    async fn api_error(response: reqwest::Response) -> ClientError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        ClientError::Api { status, message }
    }
}

#[async_trait]
impl VisionClient for OpenAiClient {
    async fn list_models(&self) -> Result<Vec<String>, ClientError> {
        let response = self
            .http
            .get(self.endpoint("models"))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let list: ModelList = response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        debug!("Service reports {} models", list.data.len());

        Ok(list.data.into_iter().map(|m| m.id).collect())
    }

    async fn recognize(
        &self,
        model: &str,
        prompt: &str,
        image: &ImageData,
    ) -> Result<String, ClientError> {
        let request = ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text { text: prompt },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: data_url(image),
                        },
                    },
                ],
            }],
        };

        let response = self
            .http
            .post(self.endpoint("chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or(ClientError::EmptyResponse)?;

        Ok(choice.message.content.unwrap_or_default())
    }
}
