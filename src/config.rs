//! Configuration for the vision-LLM OCR engine.
//!
//! All engine behaviour is controlled through [`LlmOcrOptions`], built via
//! its [`LlmOcrOptionsBuilder`]. The builder only checks value ranges: whether
//! an API key and URL are present is decided when the engine is constructed,
//! because a disabled engine must accept any options.

use crate::error::OcrError;
use crate::prompts::DEFAULT_OCR_PROMPT;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Options for [`crate::engine::LlmOcrModel`].
///
/// # Example
/// ```rust
/// use edgequake_ocr::LlmOcrOptions;
///
/// let options = LlmOcrOptions::builder()
///     .api_key("sk-test")
///     .api_url("https://api.openai.com/v1")
///     .model("gpt-4o-mini")
///     .build()
///     .unwrap();
/// assert_eq!(options.model.as_deref(), Some("gpt-4o-mini"));
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct LlmOcrOptions {
    /// Secret for the remote service. Required when the engine is enabled.
    pub api_key: Option<String>,

    /// Base URL of an OpenAI-compatible API, e.g. `https://api.openai.com/v1`.
    /// Required when the engine is enabled.
    pub api_url: Option<String>,

    /// Model identifier. When `None` the first model reported by the
    /// service's model listing is used.
    pub model: Option<String>,

    /// Instruction sent alongside every region image.
    pub prompt: String,

    /// Recognise the whole page regardless of bitmap coverage. Default: false.
    pub force_full_page_ocr: bool,

    /// Minimum fraction of the page covered by bitmaps before any region is
    /// recognised. Range 0–1. Default: 0.05.
    pub bitmap_area_threshold: f64,

    /// Per-request timeout enforced by the HTTP transport. Default: 120.
    pub request_timeout_secs: u64,

    /// Diagnostic output.
    pub debug: DebugSettings,
}

impl Default for LlmOcrOptions {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: None,
            model: None,
            prompt: DEFAULT_OCR_PROMPT.to_string(),
            force_full_page_ocr: false,
            bitmap_area_threshold: 0.05,
            request_timeout_secs: 120,
            debug: DebugSettings::default(),
        }
    }
}

impl fmt::Debug for LlmOcrOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmOcrOptions")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("prompt_len", &self.prompt.len())
            .field("force_full_page_ocr", &self.force_full_page_ocr)
            .field("bitmap_area_threshold", &self.bitmap_area_threshold)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("debug", &self.debug)
            .finish()
    }
}

impl LlmOcrOptions {
    /// Create a new builder for `LlmOcrOptions`.
    pub fn builder() -> LlmOcrOptionsBuilder {
        LlmOcrOptionsBuilder {
            options: Self::default(),
        }
    }

    /// API key, treating an empty string as absent.
    pub(crate) fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.is_empty())
    }

    /// API URL, treating an empty string as absent.
    pub(crate) fn api_url(&self) -> Option<&str> {
        self.api_url.as_deref().filter(|u| !u.is_empty())
    }
}

/// Builder for [`LlmOcrOptions`].
#[derive(Debug)]
pub struct LlmOcrOptionsBuilder {
    options: LlmOcrOptions,
}

impl LlmOcrOptionsBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.options.api_key = Some(key.into());
        self
    }

    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.options.api_url = Some(url.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.options.model = Some(model.into());
        self
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.options.prompt = prompt.into();
        self
    }

    pub fn force_full_page_ocr(mut self, v: bool) -> Self {
        self.options.force_full_page_ocr = v;
        self
    }

    pub fn bitmap_area_threshold(mut self, threshold: f64) -> Self {
        self.options.bitmap_area_threshold = threshold;
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.options.request_timeout_secs = secs;
        self
    }

    pub fn visualize_ocr(mut self, v: bool) -> Self {
        self.options.debug.visualize_ocr = v;
        self
    }

    pub fn debug_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.options.debug.output_dir = dir.into();
        self
    }

    /// Build the options, validating ranges.
    pub fn build(self) -> Result<LlmOcrOptions, OcrError> {
        let o = &self.options;
        if !(0.0..=1.0).contains(&o.bitmap_area_threshold) {
            return Err(OcrError::InvalidConfig(format!(
                "bitmap_area_threshold must be within 0–1, got {}",
                o.bitmap_area_threshold
            )));
        }
        if o.request_timeout_secs == 0 {
            return Err(OcrError::InvalidConfig(
                "request_timeout_secs must be ≥ 1".into(),
            ));
        }
        Ok(self.options)
    }
}

/// Debug rendering of OCR regions and cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugSettings {
    /// Write one PNG per processed page showing regions and OCR cells.
    pub visualize_ocr: bool,
    /// Directory the PNGs are written to. Default: `debug`.
    pub output_dir: PathBuf,
}

impl Default for DebugSettings {
    fn default() -> Self {
        Self {
            visualize_ocr: false,
            output_dir: PathBuf::from("debug"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let o = LlmOcrOptions::default();
        assert!(o.api_key.is_none());
        assert!(o.model.is_none());
        assert_eq!(o.prompt, DEFAULT_OCR_PROMPT);
        assert!(!o.force_full_page_ocr);
        assert_eq!(o.bitmap_area_threshold, 0.05);
        assert!(!o.debug.visualize_ocr);
    }

    #[test]
    fn threshold_out_of_range_is_rejected() {
        let err = LlmOcrOptions::builder()
            .bitmap_area_threshold(1.5)
            .build()
            .unwrap_err();
        assert!(matches!(err, OcrError::InvalidConfig(_)));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        assert!(LlmOcrOptions::builder()
            .request_timeout_secs(0)
            .build()
            .is_err());
    }

    #[test]
    fn builder_does_not_require_credentials() {
        let o = LlmOcrOptions::builder().build().unwrap();
        assert!(o.api_key().is_none());
        assert!(o.api_url().is_none());
    }

    #[test]
    fn empty_strings_count_as_missing() {
        let o = LlmOcrOptions::builder().api_key("").api_url("").build().unwrap();
        assert!(o.api_key().is_none());
        assert!(o.api_url().is_none());
    }

    #[test]
    fn debug_output_redacts_key() {
        let o = LlmOcrOptions::builder().api_key("sk-secret").build().unwrap();
        let rendered = format!("{o:?}");
        assert!(!rendered.contains("sk-secret"), "got: {rendered}");
        assert!(rendered.contains("<redacted>"));
    }
}
