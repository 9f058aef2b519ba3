use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};
use serde_json::Value;

use crate::client::ProviderClient;
use crate::config::{Provider, ProviderConfig, ProviderStatus, SharedConfig};
use crate::error::TranslationError;
use crate::gemini_client::GeminiClient;
use crate::ollama_client::OllamaClient;
use crate::openai_client::OpenAIClient;
use crate::prompt::{compose_question, translation_instruction};
use crate::transport::{HttpRequest, HttpTransport, ReqwestTransport};

const CREDENTIAL_CHECK_PROMPT: &str = "Reply with the single word OK.";
const OLLAMA_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Translation service that dispatches to the configured provider
///
/// Holds a live pointer to the configuration and one shared HTTP transport.
/// Every call snapshots the configuration, picks a `ProviderClient` for the
/// selected provider and issues exactly one request. Safe to share between
/// threads.
pub struct TranslationClient {
    config: SharedConfig,
    transport: Arc<dyn HttpTransport>,
}

impl TranslationClient {
    /// Create a client backed by a pooled `reqwest` blocking transport
    pub fn new(config: SharedConfig) -> Result<Self, TranslationError> {
        let transport = ReqwestTransport::new()?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    pub fn with_transport(config: SharedConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &SharedConfig {
        &self.config
    }

    /// Translate the text in a screenshot
    ///
    /// # Arguments
    /// * `image_base64` - Base64-encoded PNG; only checked for being non-empty
    ///
    /// # Returns
    /// * `Ok(String)` - Translation, exactly as returned by the provider
    /// * `Err(TranslationError)` - Error details
    pub fn translate(&self, image_base64: &str) -> Result<String, TranslationError> {
        let config = self.config.snapshot();
        let client = Self::create_client(&config)?;

        if image_base64.trim().is_empty() {
            warn!("Translation skipped: empty image");
            return Err(TranslationError::EmptyImage);
        }

        let instruction = translation_instruction(&config.target_language);
        let body = client.translate_image_request(image_base64, &instruction);
        self.send_and_parse(client.as_ref(), body, config.request_timeout)
    }

    /// Ask a follow-up question about a previous translation
    ///
    /// # Arguments
    /// * `question` - What the user wants to know
    /// * `context` - The translation the question refers to
    pub fn ask(&self, question: &str, context: &str) -> Result<String, TranslationError> {
        let prompt = compose_question(question, context);

        let config = self.config.snapshot();
        let client = Self::create_client(&config)?;

        let body = client.answer_question_request(&prompt);
        self.send_and_parse(client.as_ref(), body, config.request_timeout)
    }

    /// Test the active provider's credentials
    ///
    /// Gemini and OpenAI get a minimal text prompt. Ollama has no
    /// credentials, so its server is asked for the installed models instead
    /// and the configured model must be among them.
    ///
    /// # Returns
    /// * `Ok(true)` - Provider answered successfully
    /// * `Ok(false)` - Credentials were rejected (401/403)
    /// * `Err(TranslationError)` - Configuration, network or other API error;
    ///   `ModelNotInstalled` when Ollama lacks the configured model
    pub fn verify_credentials(&self) -> Result<bool, TranslationError> {
        let config = self.config.snapshot();

        if Provider::parse(&config.provider)? == Provider::Ollama {
            let client = OllamaClient::from_config(&config)?;
            let installed = self.fetch_ollama_models(&client, config.request_timeout)?;
            if !client.is_installed(&installed) {
                warn!(
                    "Ollama model {:?} not installed (available: {:?})",
                    client.model(),
                    installed
                );
                return Err(TranslationError::ModelNotInstalled {
                    model: client.model().to_string(),
                    available: installed,
                });
            }
            return Ok(true);
        }

        let client = Self::create_client(&config)?;

        let body = client.answer_question_request(CREDENTIAL_CHECK_PROMPT);
        match self.send_and_parse(client.as_ref(), body, config.request_timeout) {
            Ok(_) | Err(TranslationError::EmptyResponse { .. }) => Ok(true),
            Err(TranslationError::ProviderError {
                provider,
                status: status @ (401 | 403),
                ..
            }) => {
                warn!("{} credentials rejected ({})", provider, status);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Models installed on the configured Ollama server
    ///
    /// Works whichever provider is active, so the Ollama setup can be
    /// checked before switching to it.
    pub fn ollama_models(&self) -> Result<Vec<String>, TranslationError> {
        let config = self.config.snapshot();
        let client = OllamaClient::from_config(&config)?;
        self.fetch_ollama_models(&client, config.request_timeout)
    }

    /// Configuration status of every provider, from the current config
    pub fn provider_status(&self) -> Vec<ProviderStatus> {
        self.config.snapshot().status()
    }

    // ========== Private methods ==========

    /// Create the client for the selected provider, validating its settings
    fn create_client(config: &ProviderConfig) -> Result<Box<dyn ProviderClient>, TranslationError> {
        let provider = Provider::parse(&config.provider).inspect_err(|_| {
            error!("Unknown LLM provider: {:?}", config.provider);
        })?;

        let client: Box<dyn ProviderClient> = match provider {
            Provider::Gemini => Box::new(GeminiClient::from_config(config)?),
            Provider::OpenAI => Box::new(OpenAIClient::from_config(config)?),
            Provider::Ollama => Box::new(OllamaClient::from_config(config)?),
        };
        Ok(client)
    }

    fn fetch_ollama_models(
        &self,
        client: &OllamaClient,
        timeout: Duration,
    ) -> Result<Vec<String>, TranslationError> {
        let endpoint = client.tags_endpoint();
        debug!("Listing Ollama models at {}", endpoint);

        let request = HttpRequest::get(endpoint, timeout.min(OLLAMA_PROBE_TIMEOUT));
        let response = self.transport.get_json(&request)?;

        if !response.is_success() {
            error!(
                "Ollama model listing failed ({}): {}",
                response.status, response.body
            );
            return Err(TranslationError::ProviderError {
                provider: Provider::Ollama,
                status: response.status,
                body: response.body,
            });
        }

        let models = client.extract_model_names(&response.body)?;
        info!("Ollama server has {} models installed", models.len());
        Ok(models)
    }

    /// Send request and parse response
    fn send_and_parse(
        &self,
        client: &dyn ProviderClient,
        body: Value,
        timeout: Duration,
    ) -> Result<String, TranslationError> {
        let provider = client.provider();
        let endpoint = client.endpoint();
        let started_at = Instant::now();

        debug!("Sending {} request to {}", provider, endpoint);
        let request = client.authorize(HttpRequest::new(endpoint, body, timeout));
        let response = self.transport.post_json(&request)?;

        if !response.is_success() {
            error!(
                "{} API error response ({}): {}",
                provider, response.status, response.body
            );
            return Err(TranslationError::ProviderError {
                provider,
                status: response.status,
                body: response.body,
            });
        }

        let text = client.extract_text(&response.body)?;

        info!(
            "{} request succeeded in {}ms: {} characters",
            provider,
            started_at.elapsed().as_millis(),
            text.chars().count()
        );

        Ok(text)
    }
}
