use thiserror::Error;

use crate::types::{Algorithm, KeyHandle, KeyUsage};

/// Errors raised by a cryptographic primitives provider
#[derive(Error, Debug)]
pub enum Error {
    /// The key was created non-extractable
    #[error("Key is not extractable")]
    NotExtractable,

    /// Padding, integrity or length check failed while decrypting
    #[error("Decryption failed")]
    DecryptionFailure,

    #[error("Encryption failed: {0}")]
    EncryptionFailure(String),

    #[error("Signing failed: {0}")]
    SigningFailure(String),

    /// Input exceeds what the algorithm can process in one call
    #[error("Message too long: maximum {max} bytes, got {actual}")]
    LengthViolation { max: usize, actual: usize },

    /// Malformed SPKI or PKCS8 input
    #[error("Unsupported key encoding: {0}")]
    UnsupportedKeyEncoding(String),

    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("Invalid IV length: expected {expected}, got {actual}")]
    InvalidIvLength { expected: usize, actual: usize },

    /// The key is bound to a different algorithm than the one requested
    #[error("Key algorithm {key} cannot be used for {requested}")]
    AlgorithmMismatch {
        key: Algorithm,
        requested: Algorithm,
    },

    #[error("Key usage {0:?} is not permitted for this key")]
    UsageNotPermitted(KeyUsage),

    #[error("Key not found: {0:?}")]
    KeyNotFound(KeyHandle),

    #[error("Key generation failed: {0}")]
    KeyGeneration(String),

    #[error("PKCS8 error: {0}")]
    Pkcs8Error(#[from] pkcs8::Error),

    #[error("SPKI error: {0}")]
    SpkiError(#[from] pkcs8::spki::Error),

    /// Anything not covered above
    #[error("Other error: {0}")]
    Other(String),
}

impl Error {
    pub fn key_not_found(handle: KeyHandle) -> Self {
        Error::KeyNotFound(handle)
    }

    pub fn encoding(err: impl std::fmt::Display) -> Self {
        Error::UnsupportedKeyEncoding(err.to_string())
    }

    pub fn lock_poisoned() -> Self {
        Error::Other("Failed to acquire key table lock".to_string())
    }
}

/// Result type for provider operations
pub type Result<T> = std::result::Result<T, Error>;
