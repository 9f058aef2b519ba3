use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{info, warn};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use visolingua_translator::{
    ProviderConfig, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL, DEFAULT_OLLAMA_BASE_URL,
    DEFAULT_OLLAMA_MODEL, DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MAX_TOKENS,
    DEFAULT_OPENAI_MODEL, DEFAULT_PROVIDER, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_TARGET_LANGUAGE,
};

const APP_DIR: &str = "visolingua";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Could not determine the user config directory")]
    NoConfigDir,
    #[error("Failed to read config file {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error("Failed to write config file {path}: {source}")]
    Write { path: String, source: io::Error },
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Default settings location: `<config dir>/visolingua/config.toml`
pub fn default_path() -> Result<PathBuf, SettingsError> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
        .ok_or(SettingsError::NoConfigDir)
}

// ===== Persisted Settings =====

/// Settings file contents. Missing sections and keys fall back to defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub llm: LlmSettings,
    pub api_keys: ApiKeys,
    pub translation: TranslationSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LlmSettings {
    /// Active provider: gemini, openai or ollama
    pub provider: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub openai_model: String,
    /// Any OpenAI-compatible server works here
    pub openai_base_url: String,
    pub openai_max_tokens: u32,
    pub ollama_url: String,
    pub ollama_model: String,
    pub request_timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: DEFAULT_PROVIDER.to_string(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            openai_max_tokens: DEFAULT_OPENAI_MAX_TOKENS,
            ollama_url: DEFAULT_OLLAMA_BASE_URL.to_string(),
            ollama_model: DEFAULT_OLLAMA_MODEL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

#[derive(Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiKeys {
    pub gemini: String,
    pub openai: String,
}

impl fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |key: &str| if key.is_empty() { "" } else { "[REDACTED]" };
        f.debug_struct("ApiKeys")
            .field("gemini", &redact(&self.gemini))
            .field("openai", &redact(&self.openai))
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TranslationSettings {
    pub target_language: String,
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            target_language: DEFAULT_TARGET_LANGUAGE.to_string(),
        }
    }
}

impl Settings {
    /// Load settings from `path`, writing a default file first if none exists
    pub fn load_or_create(path: &Path) -> Result<Self, SettingsError> {
        if path.exists() {
            return Self::load(path);
        }

        info!("Config file not found, creating default at {:?}", path);
        let settings = Self::default();
        settings.save(path)?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let contents = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let settings: Settings = toml::from_str(&contents)?;

        info!("Config loaded from {:?}", path);
        info!("  Provider: {}", settings.llm.provider);
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let write_error = |source| SettingsError::Write {
            path: path.display().to_string(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_error)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents).map_err(write_error)?;
        restrict_permissions(path);
        Ok(())
    }

    /// Runtime snapshot handed to the translation engine
    pub fn to_provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            provider: self.llm.provider.clone(),
            gemini_api_key: SecretString::from(self.api_keys.gemini.trim().to_string()),
            gemini_model: self.llm.gemini_model.clone(),
            gemini_base_url: self.llm.gemini_base_url.clone(),
            openai_api_key: SecretString::from(self.api_keys.openai.trim().to_string()),
            openai_model: self.llm.openai_model.clone(),
            openai_base_url: self.llm.openai_base_url.clone(),
            openai_max_tokens: self.llm.openai_max_tokens,
            ollama_base_url: self.llm.ollama_url.clone(),
            ollama_model: self.llm.ollama_model.clone(),
            target_language: self.translation.target_language.clone(),
            request_timeout: Duration::from_secs(self.llm.request_timeout_secs.max(1)),
        }
    }
}

// The file holds API keys in plain text.
#[cfg(unix)]
fn restrict_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o600)) {
        warn!("Failed to restrict permissions on {:?}: {}", path, e);
    }
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    #[test]
    fn test_load_or_create_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);

        let settings = Settings::load_or_create(&path).unwrap();

        assert_eq!(settings, Settings::default());
        assert!(path.exists());
        assert_eq!(Settings::load(&path).unwrap(), Settings::default());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);

        let mut settings = Settings::default();
        settings.llm.provider = "openai".to_string();
        settings.llm.openai_model = "gpt-4o".to_string();
        settings.api_keys.openai = "sk-test".to_string();
        settings.translation.target_language = "Japanese".to_string();

        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path).unwrap(), settings);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(
            &path,
            "[llm]\nprovider = \"ollama\"\n\n[api_keys]\ngemini = \"abc\"\n",
        )
        .unwrap();

        let settings = Settings::load(&path).unwrap();

        assert_eq!(settings.llm.provider, "ollama");
        assert_eq!(settings.llm.ollama_model, DEFAULT_OLLAMA_MODEL);
        assert_eq!(settings.api_keys.gemini, "abc");
        assert_eq!(settings.api_keys.openai, "");
        assert_eq!(settings.translation.target_language, DEFAULT_TARGET_LANGUAGE);
    }

    #[test]
    fn test_invalid_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[llm\nprovider = ").unwrap();

        assert!(matches!(Settings::load(&path), Err(SettingsError::Parse(_))));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        assert!(matches!(
            Settings::load(&path),
            Err(SettingsError::Read { .. })
        ));
    }

    #[test]
    fn test_to_provider_config() {
        let mut settings = Settings::default();
        settings.llm.provider = "gemini".to_string();
        settings.llm.request_timeout_secs = 45;
        settings.api_keys.gemini = " gemini-key\n".to_string();
        settings.translation.target_language = "French".to_string();

        let config = settings.to_provider_config();

        assert_eq!(config.provider, "gemini");
        assert_eq!(config.gemini_api_key.expose_secret(), "gemini-key");
        assert_eq!(config.openai_api_key.expose_secret(), "");
        assert_eq!(config.gemini_model, DEFAULT_GEMINI_MODEL);
        assert_eq!(config.ollama_base_url, DEFAULT_OLLAMA_BASE_URL);
        assert_eq!(config.target_language, "French");
        assert_eq!(config.request_timeout, Duration::from_secs(45));
    }

    #[test]
    fn test_zero_timeout_is_clamped() {
        let mut settings = Settings::default();
        settings.llm.request_timeout_secs = 0;

        assert_eq!(
            settings.to_provider_config().request_timeout,
            Duration::from_secs(1)
        );
    }

    #[test]
    fn test_debug_hides_api_keys() {
        let mut settings = Settings::default();
        settings.api_keys.openai = "sk-very-secret".to_string();

        let rendered = format!("{:?}", settings);
        assert!(!rendered.contains("sk-very-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        Settings::default().save(&path).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
