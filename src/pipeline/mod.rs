//! Pipeline stages for vision-LLM OCR.
//!
//! Each submodule implements exactly one step of the per-page flow driven
//! by [`crate::engine::LlmOcrModel`].
//!
//! ## Data Flow
//!
//! ```text
//! page ──▶ regions ──▶ encode ──▶ client ──▶ cells ──▶ merge
//!         (bitmaps)   (JPEG)     (VLM)     (1/region) (overlap)
//! ```
//!
//! 1. [`regions`]: pick the page areas to recognise
//! 2. [`encode`]: JPEG-encode and base64-wrap a rendered region
//! 3. [`client`]: the remote recognition seam; [`openai`] speaks the
//!    OpenAI-compatible wire format, [`provider`] adapts an edgequake-llm
//!    provider
//! 4. [`cells`]: turn model text into a positioned `TextCell`
//! 5. [`merge`]: combine OCR cells with the page's existing cells
//!
//! [`input`] resolves document paths and URLs; [`debug`] draws the
//! optional per-page visualisation.

pub mod cells;
pub mod client;
pub mod debug;
pub mod encode;
pub mod input;
pub mod merge;
#[cfg(feature = "openai")]
pub mod openai;
pub mod provider;
pub mod regions;
