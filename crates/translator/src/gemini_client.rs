use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::client::ProviderClient;
use crate::config::{Provider, ProviderConfig};
use crate::error::TranslationError;
use crate::prompt::IMAGE_MIME_TYPE;
use crate::response::{decode, first, first_result, require};
use crate::transport::HttpRequest;

/// Google Gemini `generateContent` client
pub struct GeminiClient {
    api_key: SecretString,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: SecretString, model: String, base_url: String) -> Self {
        Self {
            api_key,
            model,
            base_url,
        }
    }

    pub fn from_config(config: &ProviderConfig) -> Result<Self, TranslationError> {
        let api_key = config.gemini_api_key.expose_secret().trim();
        if api_key.is_empty() {
            return Err(TranslationError::MissingCredential {
                provider: Provider::Gemini,
            });
        }
        if config.gemini_model.trim().is_empty() {
            return Err(TranslationError::IncompleteConfig {
                provider: Provider::Gemini,
                field: "model",
            });
        }

        Ok(Self::new(
            SecretString::from(api_key.to_string()),
            config.gemini_model.trim().to_string(),
            config.gemini_base_url.trim().to_string(),
        ))
    }
}

impl ProviderClient for GeminiClient {
    fn provider(&self) -> Provider {
        Provider::Gemini
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    fn authorize(&self, request: HttpRequest) -> HttpRequest {
        request.query("key", self.api_key.expose_secret())
    }

    fn translate_image_request(&self, image_base64: &str, instruction: &str) -> Value {
        json!({
            "contents": [{
                "parts": [
                    { "text": instruction },
                    {
                        "inline_data": {
                            "mime_type": IMAGE_MIME_TYPE,
                            "data": image_base64
                        }
                    }
                ]
            }]
        })
    }

    fn answer_question_request(&self, prompt: &str) -> Value {
        json!({
            "contents": [{
                "parts": [{ "text": prompt }]
            }]
        })
    }

    fn extract_text(&self, body: &str) -> Result<String, TranslationError> {
        let provider = Provider::Gemini;
        let response: GenerateContentResponse = decode(provider, body)?;

        let candidate = first_result(response.candidates, provider, "candidates")?;
        let content = require(candidate.content, provider, "candidates[0].content")?;
        let part = first(content.parts, provider, "candidates[0].content.parts[0]")?;
        require(part.text, provider, "candidates[0].content.parts[0].text")
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    parts: Option<Vec<Part>>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}
