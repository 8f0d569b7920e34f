//! # Subtlekit
//!
//! Lazy key-handle wrappers over a pluggable cryptographic primitives
//! provider.
//!
//! ## Crates
//!
//! - `subtlekit_provider` - the primitives boundary and its software backend
//! - `subtlekit_core` - AES-CBC, HMAC and RSA wrappers

// Re-export all sub-crates
pub use subtlekit_core;
pub use subtlekit_provider;

pub use subtlekit_core::{
    AesCbc, Error, Hmac, KeyPairSource, Result, RsaOaep, RsaPss, RsassaPkcs1v15, SecretSource,
};
pub use subtlekit_provider::{default_provider, CryptoProvider, KeyHandle, SoftwareProvider};
