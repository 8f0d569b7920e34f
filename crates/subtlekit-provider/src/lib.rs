//! Subtlekit Primitives Provider
//!
//! This library defines the boundary between the subtlekit wrappers and the
//! code that performs the actual cryptography: key import, generation and
//! export, encryption, and signatures, all addressed through opaque key
//! handles.

use std::sync::{Arc, OnceLock};

pub mod error;
pub mod provider;
pub mod software;
pub mod types;

pub use error::{Error, Result};
pub use provider::CryptoProvider;
pub use software::{ProviderStats, SoftwareProvider};
pub use types::{
    Algorithm, CipherParams, KeyHandle, KeyInfo, KeyPair, KeyType, KeyUsage, RsaKeyGenParams,
    SecretKeyParams, SignatureParams,
};

/// Process-wide provider, created on first use
static DEFAULT_PROVIDER: OnceLock<Arc<SoftwareProvider>> = OnceLock::new();

/// Shared provider used by wrappers constructed without an explicit one
pub fn default_provider() -> Arc<dyn CryptoProvider> {
    DEFAULT_PROVIDER
        .get_or_init(|| Arc::new(SoftwareProvider::new()))
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_provider_is_shared() {
        let first = default_provider();
        let handle = first
            .import_secret(SecretKeyParams::hmac(), b"shared", true, &[KeyUsage::Sign])
            .unwrap();

        let second = default_provider();
        assert_eq!(second.export_raw(handle).unwrap(), b"shared");
        second.release(handle).unwrap();
    }
}
