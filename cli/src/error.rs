use derive_more::{Display, From};
use visolingua_translator::{Provider, TranslationError};

use crate::config::SettingsError;
use crate::input::InputError;

#[derive(Debug, Display, From)]
pub enum Error {
    #[from]
    Translation(TranslationError),

    #[from]
    Settings(SettingsError),

    #[from]
    Input(InputError),

    #[display("{} rejected the configured credentials", _0.display_name())]
    CredentialsRejected(Provider),
}

impl std::error::Error for Error {}

impl Error {
    /// Message printed to the terminal on failure
    pub fn user_message(&self) -> String {
        match self {
            Error::Translation(e) => e.user_message(),
            Error::Settings(e) => e.to_string(),
            Error::Input(e) => e.to_string(),
            Error::CredentialsRejected(provider) => format!(
                "Invalid {} API key. Check your config file.",
                provider.display_name()
            ),
        }
    }
}
