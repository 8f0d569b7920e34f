//! RSA-OAEP with SHA-256
//!
//! Plaintexts are limited to [`OAEP_MAX_PLAINTEXT`](crate::params::OAEP_MAX_PLAINTEXT)
//! bytes. Longer input is rejected, never chunked.

use std::sync::Arc;

use subtlekit_provider::{
    default_provider, Algorithm, CipherParams, CryptoProvider, KeyHandle, KeyPair,
};

use super::{KeyPairCell, ResolvedPair};
use crate::{
    error::Result,
    source::{KeyPairSource, PublicKeyRef},
};

const ALGORITHM: Algorithm = Algorithm::RsaOaep;

/// Encrypt to a public key given as a handle or SPKI bytes
pub fn encrypt<'a>(
    provider: &dyn CryptoProvider,
    public_key: impl Into<PublicKeyRef<'a>>,
    plaintext: &[u8],
) -> Result<Vec<u8>> {
    super::with_public_key(provider, ALGORITHM, public_key.into(), |key| {
        Ok(provider.encrypt(CipherParams::RsaOaep, key, plaintext)?)
    })
}

pub fn decrypt(
    provider: &dyn CryptoProvider,
    private_key: KeyHandle,
    ciphertext: &[u8],
) -> Result<Vec<u8>> {
    Ok(provider.decrypt(CipherParams::RsaOaep, private_key, ciphertext)?)
}

pub struct RsaOaep {
    keys: KeyPairCell,
}

impl RsaOaep {
    /// Wrap `source` using the process-wide provider
    pub fn new(source: impl Into<KeyPairSource>) -> Self {
        Self::with_provider(default_provider(), source)
    }

    pub fn with_provider(
        provider: Arc<dyn CryptoProvider>,
        source: impl Into<KeyPairSource>,
    ) -> Self {
        Self {
            keys: KeyPairCell::new(provider, ALGORITHM, source.into()),
        }
    }

    /// Generate a standalone pair; no wrapper state is touched
    pub fn generate_key_pair(provider: &dyn CryptoProvider) -> Result<KeyPair> {
        super::generate_key_pair(provider, ALGORITHM)
    }

    pub fn parse_public_key(provider: &dyn CryptoProvider, spki: &[u8]) -> Result<KeyHandle> {
        super::parse_public_key(provider, ALGORITHM, spki)
    }

    pub fn resolve(&self, force: bool) -> Result<ResolvedPair> {
        self.keys.resolve(force)
    }

    pub fn public_key(&self) -> Result<KeyHandle> {
        self.keys.public_key()
    }

    /// SPKI DER of the public half, generating a pair if needed
    pub fn export_public_key(&self) -> Result<Vec<u8>> {
        self.keys.export_public_key()
    }

    pub fn export_public_jwk(&self) -> Result<String> {
        self.keys.export_public_jwk()
    }

    /// PKCS8 DER of the private half
    pub fn export_private_key(&self) -> Result<Vec<u8>> {
        self.keys.export_private_key()
    }

    pub fn fingerprint(&self) -> Result<[u8; 32]> {
        self.keys.fingerprint()
    }

    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        self.keys
            .with_public(|provider, public| encrypt(provider, public, plaintext))
    }

    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        self.keys
            .with_private(|provider, private| decrypt(provider, private, ciphertext))
    }
}

impl Default for RsaOaep {
    fn default() -> Self {
        Self::new(KeyPairSource::Generate)
    }
}
