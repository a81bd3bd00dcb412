//! Adapter running recognition through an edgequake-llm provider.
//!
//! Lets every provider edgequake-llm knows about (OpenAI, Azure, Anthropic,
//! Gemini, Mistral, Ollama, LM Studio, ...) serve as the OCR backend. A
//! provider is bound to one model at creation time, so the model listing
//! reports exactly that model.

use crate::error::ClientError;
use crate::pipeline::client::VisionClient;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, ImageData, LLMProvider, ProviderFactory};
use std::sync::Arc;
use tracing::debug;

/// [`VisionClient`] backed by an `Arc<dyn LLMProvider>`.
pub struct ProviderClient {
    provider: Arc<dyn LLMProvider>,
    model: String,
}

impl ProviderClient {
    pub fn new(provider: Arc<dyn LLMProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Create a named provider (`"openai"`, `"gemini"`, `"ollama"`, ...) for
    /// `model` via [`ProviderFactory`].
    pub fn from_factory(provider_name: &str, model: &str) -> Result<Self, ClientError> {
        let provider = ProviderFactory::create_llm_provider(provider_name, model)
            .map_err(|e| ClientError::Setup(format!("provider '{provider_name}': {e}")))?;
        Ok(Self::new(provider, model))
    }
}

#[async_trait]
impl VisionClient for ProviderClient {
    async fn list_models(&self) -> Result<Vec<String>, ClientError> {
        Ok(vec![self.model.clone()])
    }

    async fn recognize(
        &self,
        model: &str,
        prompt: &str,
        image: &ImageData,
    ) -> Result<String, ClientError> {
        if model != self.model {
            debug!(
                "Provider is bound to '{}'; ignoring requested model '{}'",
                self.model, model
            );
        }
        let messages = vec![ChatMessage::user_with_images(prompt, vec![image.clone()])];
        let response = self
            .provider
            .chat(&messages, None)
            .await
            .map_err(|e| ClientError::Provider(format!("{e}")))?;
        Ok(response.content)
    }
}
