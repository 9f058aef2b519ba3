use crate::config::Provider;

#[derive(Debug, thiserror::Error)]
pub enum TranslationError {
    #[error("Unknown LLM provider: {0}")]
    UnknownProvider(String),
    #[error("{} API key not configured", .provider.display_name())]
    MissingCredential { provider: Provider },
    #[error("{} {field} not configured", .provider.display_name())]
    IncompleteConfig {
        provider: Provider,
        field: &'static str,
    },
    #[error("No image data to translate")]
    EmptyImage,
    #[error("Request failed: {0}")]
    Transport(String),
    #[error("Request timed out after {seconds} seconds")]
    Timeout { seconds: u64 },
    #[error("{} API returned status {status}: {body}", .provider.display_name())]
    ProviderError {
        provider: Provider,
        status: u16,
        body: String,
    },
    #[error("{} returned no results", .provider.display_name())]
    EmptyResponse { provider: Provider },
    #[error("Ollama model '{model}' is not installed")]
    ModelNotInstalled { model: String, available: Vec<String> },
    #[error("Malformed {} response at `{step}`: {detail}", .provider.display_name())]
    MalformedResponse {
        provider: Provider,
        step: &'static str,
        detail: String,
    },
}

impl TranslationError {
    /// HTTP status reported by the provider, if the request got that far
    pub fn status(&self) -> Option<u16> {
        match self {
            TranslationError::ProviderError { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns a user-friendly error message suitable for display in the UI
    pub fn user_message(&self) -> String {
        match self {
            TranslationError::UnknownProvider(name) => {
                format!("Unknown provider '{}'. Choose Gemini, OpenAI or Ollama in Settings.", name)
            }
            TranslationError::MissingCredential { provider } => format!(
                "{} API key not configured. Please add it in Settings.",
                provider.display_name()
            ),
            TranslationError::IncompleteConfig { provider, field } => format!(
                "{} {} is missing. Please check your Settings.",
                provider.display_name(),
                field
            ),
            TranslationError::EmptyImage => {
                "Nothing was captured. Please select a region and try again.".to_string()
            }
            TranslationError::Transport(_) => {
                "Network error. Please check your internet connection.".to_string()
            }
            TranslationError::Timeout { .. } => "Request timed out. Please try again.".to_string(),
            TranslationError::ProviderError {
                provider, status, ..
            } => match status {
                401 | 403 => format!(
                    "Invalid {} API key. Check your Settings.",
                    provider.display_name()
                ),
                429 => "Rate limit reached. Please wait and retry.".to_string(),
                _ => format!(
                    "{} request failed (HTTP {}). Please try again.",
                    provider.display_name(),
                    status
                ),
            },
            TranslationError::EmptyResponse { provider } => format!(
                "{} did not return a translation. Try a clearer capture.",
                provider.display_name()
            ),
            TranslationError::ModelNotInstalled { model, available } if available.is_empty() => {
                format!(
                    "Ollama has no models installed. Run `ollama pull {}` first.",
                    model
                )
            }
            TranslationError::ModelNotInstalled { model, available } => format!(
                "Ollama model '{}' is not installed. Installed models: {}.",
                model,
                available.join(", ")
            ),
            TranslationError::MalformedResponse { provider, .. } => format!(
                "{} returned an unexpected response. Please try again.",
                provider.display_name()
            ),
        }
    }
}
