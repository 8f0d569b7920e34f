//! AES-CBC with a 128-bit key
//!
//! CBC provides confidentiality only. There is no authentication tag, so
//! callers needing integrity must pair the ciphertext with a MAC such as
//! [`crate::Hmac`].

use std::sync::Arc;

use subtlekit_provider::{default_provider, CipherParams, CryptoProvider, KeyHandle};

use crate::{
    error::Result,
    params::{aes_key_params, CIPHER_USAGES},
    source::SecretSource,
    symmetric::SecretKeyCell,
};

/// Encrypt with an explicit key handle
///
/// `iv` must be exactly 16 bytes.
pub fn encrypt(
    provider: &dyn CryptoProvider,
    key: KeyHandle,
    plaintext: &[u8],
    iv: &[u8],
) -> Result<Vec<u8>> {
    Ok(provider.encrypt(CipherParams::AesCbc { iv }, key, plaintext)?)
}

/// Decrypt with an explicit key handle
pub fn decrypt(
    provider: &dyn CryptoProvider,
    key: KeyHandle,
    ciphertext: &[u8],
    iv: &[u8],
) -> Result<Vec<u8>> {
    Ok(provider.decrypt(CipherParams::AesCbc { iv }, key, ciphertext)?)
}

/// AES-CBC wrapper holding raw key bytes or a key handle
pub struct AesCbc {
    key: SecretKeyCell,
}

impl AesCbc {
    /// Wrap `key` using the process-wide provider
    pub fn new(key: impl Into<SecretSource>) -> Self {
        Self::with_provider(default_provider(), key)
    }

    pub fn with_provider(provider: Arc<dyn CryptoProvider>, key: impl Into<SecretSource>) -> Self {
        Self {
            key: SecretKeyCell::new(provider, key.into(), aes_key_params(), CIPHER_USAGES),
        }
    }

    /// Import a raw 16-byte key as an extractable AES-CBC key
    pub fn parse_key(provider: &dyn CryptoProvider, raw: &[u8]) -> Result<KeyHandle> {
        Ok(provider.import_secret(aes_key_params(), raw, true, CIPHER_USAGES)?)
    }

    /// Handle for this wrapper's key, importing it on first use
    pub fn resolve(&self, force: bool) -> Result<KeyHandle> {
        self.key.resolve(force)
    }

    pub fn encrypt(&self, plaintext: &[u8], iv: &[u8]) -> Result<Vec<u8>> {
        self.key
            .with_key(|provider, key| encrypt(provider, key, plaintext, iv))
    }

    pub fn decrypt(&self, ciphertext: &[u8], iv: &[u8]) -> Result<Vec<u8>> {
        self.key
            .with_key(|provider, key| decrypt(provider, key, ciphertext, iv))
    }

    /// Raw key bytes; fails for non-extractable keys
    pub fn export_key(&self) -> Result<Vec<u8>> {
        self.key
            .with_key(|provider, key| Ok(provider.export_raw(key)?))
    }
}
