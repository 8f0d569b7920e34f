//! Wrapper error types

use subtlekit_provider::Error as ProviderError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// No key material was supplied and none can be derived
    #[error("Missing key material")]
    MissingKeyMaterial,

    #[error("Key resolution lock poisoned")]
    LockPoisoned,

    /// Failure reported by the primitives provider, passed through as-is
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl Error {
    /// The underlying provider error, if this is one
    pub fn as_provider(&self) -> Option<&ProviderError> {
        match self {
            Error::Provider(err) => Some(err),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
