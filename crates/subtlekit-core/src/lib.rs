//! Subtlekit Wrappers
//!
//! Convenience wrappers over a [`CryptoProvider`]: AES-CBC, HMAC-SHA256,
//! RSA-OAEP, RSA-PSS and RSASSA-PKCS1-v1_5 with fixed algorithm parameters.
//! Each wrapper resolves its key handle lazily on first use and caches it.
//! Every operation is also available as a free function on an explicit
//! handle.

pub mod error;
pub mod lazy;
pub mod params;
pub mod source;

mod symmetric;

// Algorithm wrappers
pub mod aes;
pub mod hmac;
pub mod rsa;

// Re-export commonly used types for convenience
pub use aes::AesCbc;
pub use error::{Error, Result};
pub use hmac::Hmac;
pub use lazy::LazyKey;
pub use rsa::{ResolvedPair, RsaOaep, RsaPss, RsassaPkcs1v15};
pub use source::{KeyPairSource, PublicKeyRef, SecretKeyRef, SecretSource};
pub use subtlekit_provider::{default_provider, CryptoProvider, KeyHandle, KeyPair};
