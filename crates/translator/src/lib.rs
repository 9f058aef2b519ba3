//! Screenshot translation engine.
//!
//! Sends a captured PNG (or a follow-up question) to Gemini, an
//! OpenAI-compatible server or Ollama and returns the plain answer text.

mod client;
mod config;
mod error;
mod gemini_client;
mod ollama_client;
mod openai_client;
mod prompt;
mod response;
mod transport;
mod translator;

// Re-export public types
pub use client::ProviderClient;
pub use config::{
    Provider, ProviderConfig, ProviderStatus, SharedConfig, DEFAULT_GEMINI_BASE_URL,
    DEFAULT_GEMINI_MODEL, DEFAULT_OLLAMA_BASE_URL, DEFAULT_OLLAMA_MODEL,
    DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MAX_TOKENS, DEFAULT_OPENAI_MODEL, DEFAULT_PROVIDER,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_TARGET_LANGUAGE,
};
pub use error::TranslationError;
pub use gemini_client::GeminiClient;
pub use ollama_client::OllamaClient;
pub use openai_client::OpenAIClient;
pub use prompt::{compose_question, translation_instruction};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
pub use translator::TranslationClient;
