//! The narrow interface the engine needs from a remote vision service.
//!
//! Vendor SDKs stay behind [`VisionClient`]; tests swap in a double that
//! returns canned text.

use crate::error::ClientError;
use async_trait::async_trait;
use edgequake_llm::ImageData;

/// A remote service able to transcribe one image per call.
///
/// The handle is shared read-only across every page of a conversion.
#[async_trait]
pub trait VisionClient: Send + Sync {
    /// Model identifiers reported by the service, in service order.
    async fn list_models(&self) -> Result<Vec<String>, ClientError>;

    /// Send one image and one instruction, return the first completion's
    /// text exactly as received.
    async fn recognize(
        &self,
        model: &str,
        prompt: &str,
        image: &ImageData,
    ) -> Result<String, ClientError>;

    /// The first model the service reports, or `None` when it reports none.
    async fn resolve_default_model(&self) -> Result<Option<String>, ClientError> {
        let models = self.list_models().await?;
        Ok(models.into_iter().next().filter(|m| !m.is_empty()))
    }
}
