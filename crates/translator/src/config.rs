use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::error::TranslationError;

pub const DEFAULT_PROVIDER: &str = "gemini";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash-exp";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "llava";
pub const DEFAULT_TARGET_LANGUAGE: &str = "German";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// LLM backends supported by the engine
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Provider {
    Gemini,
    OpenAI,
    Ollama,
}

impl Provider {
    /// Human-readable name for user-facing messages
    pub fn display_name(self) -> &'static str {
        match self {
            Provider::Gemini => "Gemini",
            Provider::OpenAI => "OpenAI",
            Provider::Ollama => "Ollama",
        }
    }

    /// Parse the provider tag stored in configuration.
    pub fn parse(tag: &str) -> Result<Self, TranslationError> {
        Provider::from_str(tag.trim())
            .map_err(|_| TranslationError::UnknownProvider(tag.to_string()))
    }
}

/// Snapshot of everything the engine needs to reach a provider.
///
/// Built by the configuration owner and never mutated by the engine.
/// `provider` stays a raw tag so that a bad value surfaces as
/// [`TranslationError::UnknownProvider`] at call time.
pub struct ProviderConfig {
    pub provider: String,
    pub gemini_api_key: SecretString,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub openai_api_key: SecretString,
    pub openai_model: String,
    pub openai_base_url: String,
    pub openai_max_tokens: u32,
    pub ollama_base_url: String,
    pub ollama_model: String,
    pub target_language: String,
    /// Upper bound for a single provider round trip
    pub request_timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider: DEFAULT_PROVIDER.to_string(),
            gemini_api_key: SecretString::from(String::new()),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            openai_api_key: SecretString::from(String::new()),
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            openai_max_tokens: DEFAULT_OPENAI_MAX_TOKENS,
            ollama_base_url: DEFAULT_OLLAMA_BASE_URL.to_string(),
            ollama_model: DEFAULT_OLLAMA_MODEL.to_string(),
            target_language: DEFAULT_TARGET_LANGUAGE.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("provider", &self.provider)
            .field("gemini_api_key", &"[REDACTED]")
            .field("gemini_model", &self.gemini_model)
            .field("gemini_base_url", &self.gemini_base_url)
            .field("openai_api_key", &"[REDACTED]")
            .field("openai_model", &self.openai_model)
            .field("openai_base_url", &self.openai_base_url)
            .field("openai_max_tokens", &self.openai_max_tokens)
            .field("ollama_base_url", &self.ollama_base_url)
            .field("ollama_model", &self.ollama_model)
            .field("target_language", &self.target_language)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl ProviderConfig {
    /// Whether the given provider has everything it needs to be called
    pub fn is_configured(&self, provider: Provider) -> bool {
        match provider {
            Provider::Gemini => {
                !self.gemini_api_key.expose_secret().trim().is_empty()
                    && !self.gemini_model.trim().is_empty()
            }
            Provider::OpenAI => {
                !self.openai_api_key.expose_secret().trim().is_empty()
                    && !self.openai_model.trim().is_empty()
            }
            Provider::Ollama => {
                !self.ollama_base_url.trim().is_empty() && !self.ollama_model.trim().is_empty()
            }
        }
    }

    /// Configuration status of every supported provider
    pub fn status(&self) -> Vec<ProviderStatus> {
        let active = Provider::parse(&self.provider).ok();
        Provider::iter()
            .map(|provider| ProviderStatus {
                provider,
                configured: self.is_configured(provider),
                active: active == Some(provider),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderStatus {
    pub provider: Provider,
    pub configured: bool,
    pub active: bool,
}

/// Live, shareable pointer to the current [`ProviderConfig`].
///
/// The owner swaps in a whole new config on save; readers take an
/// `Arc` snapshot and keep using it for the rest of their call.
#[derive(Clone)]
pub struct SharedConfig {
    inner: Arc<RwLock<Arc<ProviderConfig>>>,
}

impl SharedConfig {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(config))),
        }
    }

    pub fn snapshot(&self) -> Arc<ProviderConfig> {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    pub fn replace(&self, config: ProviderConfig) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(config);
    }
}

impl fmt::Debug for SharedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedConfig").field(&self.snapshot()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_parse() {
        let test_cases = vec![
            ("gemini", Some(Provider::Gemini)),
            ("openai", Some(Provider::OpenAI)),
            ("ollama", Some(Provider::Ollama)),
            ("OpenAI", Some(Provider::OpenAI)),
            ("  ollama ", Some(Provider::Ollama)),
            ("claude", None),
            ("", None),
            ("open_ai", None),
        ];

        for (tag, expected) in test_cases {
            let parsed = Provider::parse(tag).ok();
            assert_eq!(parsed, expected, "parsing {:?}", tag);
        }
    }

    #[test]
    fn test_unknown_provider_keeps_raw_tag() {
        match Provider::parse("claude") {
            Err(TranslationError::UnknownProvider(tag)) => assert_eq!(tag, "claude"),
            other => panic!("expected UnknownProvider, got {:?}", other),
        }
    }

    #[test]
    fn test_provider_display_matches_config_tag() {
        for provider in Provider::iter() {
            assert_eq!(Provider::parse(&provider.to_string()).ok(), Some(provider));
        }
    }

    #[test]
    fn test_debug_redacts_api_keys() {
        let config = ProviderConfig {
            gemini_api_key: SecretString::from("gemini-secret".to_string()),
            openai_api_key: SecretString::from("sk-secret".to_string()),
            ..Default::default()
        };

        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("gemini-secret"));
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn test_status_reports_each_provider() {
        let config = ProviderConfig {
            provider: "openai".to_string(),
            openai_api_key: SecretString::from("sk-test".to_string()),
            ..Default::default()
        };

        let status = config.status();
        assert_eq!(
            status,
            vec![
                ProviderStatus {
                    provider: Provider::Gemini,
                    configured: false,
                    active: false,
                },
                ProviderStatus {
                    provider: Provider::OpenAI,
                    configured: true,
                    active: true,
                },
                ProviderStatus {
                    provider: Provider::Ollama,
                    configured: true,
                    active: false,
                },
            ]
        );
    }

    #[test]
    fn test_whitespace_key_is_not_configured() {
        let config = ProviderConfig {
            gemini_api_key: SecretString::from("  ".to_string()),
            openai_api_key: SecretString::from("\n".to_string()),
            ..Default::default()
        };

        assert!(!config.is_configured(Provider::Gemini));
        assert!(!config.is_configured(Provider::OpenAI));
        assert!(config.is_configured(Provider::Ollama));
    }

    #[test]
    fn test_snapshot_survives_replace() {
        let shared = SharedConfig::new(ProviderConfig {
            target_language: "German".to_string(),
            ..Default::default()
        });

        let before = shared.snapshot();
        shared.replace(ProviderConfig {
            target_language: "French".to_string(),
            ..Default::default()
        });

        assert_eq!(before.target_language, "German");
        assert_eq!(shared.snapshot().target_language, "French");
    }
}
