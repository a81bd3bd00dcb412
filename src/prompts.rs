//! Instruction prompts sent with every region image.
//!
//! Callers can override the default via
//! [`crate::config::LlmOcrOptions::prompt`]; the constant here is used only
//! when no override is provided.

/// Default instruction for transcribing one region image.
///
/// The response is stored verbatim as the cell text, so the prompt asks for
/// the text alone.
pub const DEFAULT_OCR_PROMPT: &str = "Extract all text from this image. \
Return only the extracted text, preserving the original reading order and line breaks. \
Do not add explanations, commentary, or Markdown formatting. \
If the image contains no text, return an empty response.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_prompt_asks_for_plain_text() {
        assert!(DEFAULT_OCR_PROMPT.contains("Extract all text"));
        assert!(DEFAULT_OCR_PROMPT.contains("Do not add explanations"));
    }
}
