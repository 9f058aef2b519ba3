//! Helpers for walking provider responses.
//!
//! Response schemas are all-`Option` serde structs; these helpers turn a
//! decode failure or a missing step into [`TranslationError::MalformedResponse`].

use log::warn;
use serde::de::DeserializeOwned;

use crate::config::Provider;
use crate::error::TranslationError;

/// Decode a response body into `T`, reporting failures at step `body`
pub(crate) fn decode<T: DeserializeOwned>(
    provider: Provider,
    body: &str,
) -> Result<T, TranslationError> {
    serde_json::from_str(body).map_err(|e| {
        warn!("Failed to parse {} response: {}", provider, e);
        TranslationError::MalformedResponse {
            provider,
            step: "body",
            detail: e.to_string(),
        }
    })
}

/// Require one traversal step to be present
pub(crate) fn require<T>(
    value: Option<T>,
    provider: Provider,
    step: &'static str,
) -> Result<T, TranslationError> {
    value.ok_or_else(|| {
        warn!("{} response is missing `{}`", provider, step);
        TranslationError::MalformedResponse {
            provider,
            step,
            detail: "missing or null".to_string(),
        }
    })
}

/// Take the first element of a required list.
///
/// An absent list is malformed, a present but empty one means the provider
/// had nothing to say.
pub(crate) fn first_result<T>(
    list: Option<Vec<T>>,
    provider: Provider,
    step: &'static str,
) -> Result<T, TranslationError> {
    let list = require(list, provider, step)?;
    list.into_iter().next().ok_or_else(|| {
        warn!("{} response has an empty `{}` list", provider, step);
        TranslationError::EmptyResponse { provider }
    })
}

/// Take the first element of a nested list, where emptiness is malformed
pub(crate) fn first<T>(
    list: Option<Vec<T>>,
    provider: Provider,
    step: &'static str,
) -> Result<T, TranslationError> {
    require(list.and_then(|items| items.into_iter().next()), provider, step)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, serde::Deserialize)]
    struct Sample {
        items: Option<Vec<String>>,
    }

    #[test]
    fn test_decode_rejects_invalid_json() {
        let result: Result<Sample, _> = decode(Provider::Gemini, "not json");
        assert!(matches!(
            result,
            Err(TranslationError::MalformedResponse { step: "body", .. })
        ));
    }

    #[test]
    fn test_decode_rejects_wrong_types() {
        let result: Result<Sample, _> = decode(Provider::Gemini, r#"{"items": 42}"#);
        assert!(matches!(
            result,
            Err(TranslationError::MalformedResponse { step: "body", .. })
        ));
    }

    #[test]
    fn test_first_result_distinguishes_missing_and_empty() {
        let missing = first_result::<String>(None, Provider::OpenAI, "choices");
        assert!(matches!(
            missing,
            Err(TranslationError::MalformedResponse {
                step: "choices",
                ..
            })
        ));

        let empty = first_result::<String>(Some(vec![]), Provider::OpenAI, "choices");
        assert!(matches!(
            empty,
            Err(TranslationError::EmptyResponse {
                provider: Provider::OpenAI
            })
        ));

        let present = first_result(Some(vec!["a".to_string()]), Provider::OpenAI, "choices");
        assert_eq!(present.ok(), Some("a".to_string()));
    }

    #[test]
    fn test_first_treats_empty_as_malformed() {
        let empty = first::<String>(Some(vec![]), Provider::Gemini, "parts[0]");
        assert!(matches!(
            empty,
            Err(TranslationError::MalformedResponse {
                step: "parts[0]",
                ..
            })
        ));
    }
}
