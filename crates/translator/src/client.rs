use serde_json::Value;

use crate::config::Provider;
use crate::error::TranslationError;
use crate::transport::HttpRequest;

/// Trait for provider API clients (Gemini, OpenAI, Ollama)
///
/// Each implementation knows how to:
/// - Construct the correct API URL
/// - Add proper authentication
/// - Build the request body for an image translation or a text question
/// - Pull the answer text out of the provider's response body
pub trait ProviderClient: Send + Sync {
    fn provider(&self) -> Provider;

    /// Endpoint URL, without any credential
    fn endpoint(&self) -> String;

    /// Add authentication to the request
    fn authorize(&self, request: HttpRequest) -> HttpRequest {
        request
    }

    /// Body asking the model to translate a base64 PNG
    fn translate_image_request(&self, image_base64: &str, instruction: &str) -> Value;

    /// Body carrying a single text prompt
    fn answer_question_request(&self, prompt: &str) -> Value;

    /// Extract the answer from a successful (2xx) response body
    fn extract_text(&self, body: &str) -> Result<String, TranslationError>;
}
