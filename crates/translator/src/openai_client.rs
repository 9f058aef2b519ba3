use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::client::ProviderClient;
use crate::config::{Provider, ProviderConfig};
use crate::error::TranslationError;
use crate::prompt::png_data_uri;
use crate::response::{decode, first_result, require};
use crate::transport::HttpRequest;

/// OpenAI-compatible chat completions client
pub struct OpenAIClient {
    api_key: SecretString,
    model: String,
    base_url: String,
    max_tokens: u32,
}

impl OpenAIClient {
    pub fn new(api_key: SecretString, model: String, base_url: String, max_tokens: u32) -> Self {
        Self {
            api_key,
            model,
            base_url,
            max_tokens,
        }
    }

    pub fn from_config(config: &ProviderConfig) -> Result<Self, TranslationError> {
        let api_key = config.openai_api_key.expose_secret().trim();
        if api_key.is_empty() {
            return Err(TranslationError::MissingCredential {
                provider: Provider::OpenAI,
            });
        }
        if config.openai_model.trim().is_empty() {
            return Err(TranslationError::IncompleteConfig {
                provider: Provider::OpenAI,
                field: "model",
            });
        }

        Ok(Self::new(
            SecretString::from(api_key.to_string()),
            config.openai_model.trim().to_string(),
            config.openai_base_url.trim().to_string(),
            config.openai_max_tokens,
        ))
    }
}

impl ProviderClient for OpenAIClient {
    fn provider(&self) -> Provider {
        Provider::OpenAI
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    fn authorize(&self, request: HttpRequest) -> HttpRequest {
        request.bearer_auth(self.api_key.expose_secret())
    }

    fn translate_image_request(&self, image_base64: &str, instruction: &str) -> Value {
        json!({
            "model": self.model,
            "messages": [{
                "role": "user",
                "content": [
                    {
                        "type": "text",
                        "text": instruction
                    },
                    {
                        "type": "image_url",
                        "image_url": {
                            "url": png_data_uri(image_base64)
                        }
                    }
                ]
            }],
            "max_tokens": self.max_tokens
        })
    }

    // Text-only questions send `content` as a plain string, not a part list.
    fn answer_question_request(&self, prompt: &str) -> Value {
        json!({
            "model": self.model,
            "messages": [{
                "role": "user",
                "content": prompt
            }],
            "max_tokens": self.max_tokens
        })
    }

    fn extract_text(&self, body: &str) -> Result<String, TranslationError> {
        let provider = Provider::OpenAI;
        let response: ChatCompletionResponse = decode(provider, body)?;

        let choice = first_result(response.choices, provider, "choices")?;
        let message = require(choice.message, provider, "choices[0].message")?;
        require(message.content, provider, "choices[0].message.content")
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Option<Vec<Choice>>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<AssistantMessage>,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}
