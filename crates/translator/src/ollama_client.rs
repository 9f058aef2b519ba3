use serde::Deserialize;
use serde_json::{json, Value};

use crate::client::ProviderClient;
use crate::config::{Provider, ProviderConfig};
use crate::error::TranslationError;
use crate::response::{decode, require};

/// Local Ollama `/api/generate` client (no authentication)
pub struct OllamaClient {
    base_url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(base_url: String, model: String) -> Self {
        Self { base_url, model }
    }

    pub fn from_config(config: &ProviderConfig) -> Result<Self, TranslationError> {
        let base_url = config.ollama_base_url.trim();
        if base_url.is_empty() {
            return Err(TranslationError::IncompleteConfig {
                provider: Provider::Ollama,
                field: "base URL",
            });
        }
        if config.ollama_model.trim().is_empty() {
            return Err(TranslationError::IncompleteConfig {
                provider: Provider::Ollama,
                field: "model",
            });
        }

        Ok(Self::new(
            base_url.to_string(),
            config.ollama_model.trim().to_string(),
        ))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Endpoint listing locally installed models
    pub fn tags_endpoint(&self) -> String {
        format!("{}/api/tags", self.base_url.trim_end_matches('/'))
    }

    /// Names of the installed models from an `/api/tags` response body
    pub fn extract_model_names(&self, body: &str) -> Result<Vec<String>, TranslationError> {
        let response: TagsResponse = decode(Provider::Ollama, body)?;
        require(response.models, Provider::Ollama, "models")?
            .into_iter()
            .map(|model| require(model.name, Provider::Ollama, "models[].name"))
            .collect()
    }

    /// Whether the configured model is among `installed`.
    ///
    /// Ollama reports untagged pulls as `<name>:latest`.
    pub fn is_installed(&self, installed: &[String]) -> bool {
        installed.iter().any(|name| {
            name == &self.model
                || (!self.model.contains(':')
                    && name.strip_suffix(":latest") == Some(self.model.as_str()))
        })
    }
}

impl ProviderClient for OllamaClient {
    fn provider(&self) -> Provider {
        Provider::Ollama
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }

    fn translate_image_request(&self, image_base64: &str, instruction: &str) -> Value {
        json!({
            "model": self.model,
            "prompt": instruction,
            "images": [image_base64],
            "stream": false
        })
    }

    fn answer_question_request(&self, prompt: &str) -> Value {
        json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false
        })
    }

    fn extract_text(&self, body: &str) -> Result<String, TranslationError> {
        let response: GenerateResponse = decode(Provider::Ollama, body)?;
        require(response.response, Provider::Ollama, "response")
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    models: Option<Vec<TagModel>>,
}

#[derive(Debug, Deserialize)]
struct TagModel {
    name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OllamaClient {
        OllamaClient::new("http://localhost:11434/".to_string(), "llava".to_string())
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        assert_eq!(client().endpoint(), "http://localhost:11434/api/generate");
    }

    #[test]
    fn test_image_request_disables_streaming() {
        let body = client().translate_image_request("QUJD", "Translate");
        assert_eq!(
            body,
            json!({
                "model": "llava",
                "prompt": "Translate",
                "images": ["QUJD"],
                "stream": false
            })
        );
    }

    #[test]
    fn test_question_request_has_no_images() {
        let body = client().answer_question_request("why?");
        assert!(body.get("images").is_none());
        assert_eq!(body["stream"], json!(false));
    }

    #[test]
    fn test_extract_text() {
        let body = r#"{"model":"llava","created_at":"2024-01-01T00:00:00Z","response":"Bonjour","done":true}"#;
        assert_eq!(client().extract_text(body).ok(), Some("Bonjour".to_string()));
    }

    #[test]
    fn test_extract_text_failures() {
        let test_cases = vec![
            (r#"{"done":true}"#, "response"),
            (r#"{"response":null}"#, "response"),
            (r#"{"response":{"text":"hi"}}"#, "body"),
            ("garbage", "body"),
        ];

        for (body, expected_step) in test_cases {
            match client().extract_text(body) {
                Err(TranslationError::MalformedResponse {
                    provider: Provider::Ollama,
                    step,
                    ..
                }) => assert_eq!(step, expected_step, "body: {}", body),
                other => panic!("body {}: expected MalformedResponse, got {:?}", body, other),
            }
        }
    }

    #[test]
    fn test_tags_endpoint() {
        assert_eq!(client().tags_endpoint(), "http://localhost:11434/api/tags");
    }

    #[test]
    fn test_extract_model_names() {
        let body = r#"{"models":[{"name":"llava:latest","size":4733363377},{"name":"llama3:8b"}]}"#;
        assert_eq!(
            client().extract_model_names(body).ok(),
            Some(vec!["llava:latest".to_string(), "llama3:8b".to_string()])
        );
        assert_eq!(
            client().extract_model_names(r#"{"models":[]}"#).ok(),
            Some(Vec::new())
        );
    }

    #[test]
    fn test_extract_model_names_failures() {
        let test_cases = vec![
            ("{}", "models"),
            (r#"{"models":[{"size":1}]}"#, "models[].name"),
            (r#"{"models":"llava"}"#, "body"),
        ];

        for (body, expected_step) in test_cases {
            match client().extract_model_names(body) {
                Err(TranslationError::MalformedResponse { step, .. }) => {
                    assert_eq!(step, expected_step, "body: {}", body)
                }
                other => panic!("body {}: expected MalformedResponse, got {:?}", body, other),
            }
        }
    }

    #[test]
    fn test_is_installed() {
        let installed = vec!["llava:latest".to_string(), "llama3:8b".to_string()];
        let with_model =
            |model: &str| OllamaClient::new("http://localhost:11434".to_string(), model.to_string());

        let test_cases = vec![
            ("llava", true),
            ("llava:latest", true),
            ("llama3:8b", true),
            ("llama3", false),
            ("llava:13b", false),
            ("moondream", false),
        ];

        for (model, expected) in test_cases {
            assert_eq!(with_model(model).is_installed(&installed), expected, "{}", model);
        }
    }

    #[test]
    fn test_from_config_needs_url_and_model() {
        let no_url = ProviderConfig {
            ollama_base_url: "  ".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            OllamaClient::from_config(&no_url),
            Err(TranslationError::IncompleteConfig {
                field: "base URL",
                ..
            })
        ));

        let no_model = ProviderConfig {
            ollama_model: String::new(),
            ..Default::default()
        };
        assert!(matches!(
            OllamaClient::from_config(&no_model),
            Err(TranslationError::IncompleteConfig { field: "model", .. })
        ));

        assert!(OllamaClient::from_config(&ProviderConfig::default()).is_ok());
    }
}
