//! RSA-PSS with SHA-256 and a 32-byte salt

use std::sync::Arc;

use subtlekit_provider::{default_provider, Algorithm, CryptoProvider, KeyHandle, KeyPair};

use super::{KeyPairCell, ResolvedPair};
use crate::{
    error::Result,
    params::PSS,
    source::{KeyPairSource, PublicKeyRef},
};

const ALGORITHM: Algorithm = Algorithm::RsaPss;

pub fn sign(
    provider: &dyn CryptoProvider,
    private_key: KeyHandle,
    data: &[u8],
) -> Result<Vec<u8>> {
    Ok(provider.sign(PSS, private_key, data)?)
}

/// Check `signature` over `data`
///
/// A wrong key, altered data or a malformed signature yields `Ok(false)`.
/// Only an unusable public key is an error.
pub fn verify<'a>(
    provider: &dyn CryptoProvider,
    public_key: impl Into<PublicKeyRef<'a>>,
    signature: &[u8],
    data: &[u8],
) -> Result<bool> {
    super::with_public_key(provider, ALGORITHM, public_key.into(), |key| {
        Ok(provider.verify(PSS, key, signature, data)?)
    })
}

pub struct RsaPss {
    keys: KeyPairCell,
}

impl RsaPss {
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

    pub fn export_public_key(&self) -> Result<Vec<u8>> {
        self.keys.export_public_key()
    }

    pub fn export_public_jwk(&self) -> Result<String> {
        self.keys.export_public_jwk()
    }

    pub fn export_private_key(&self) -> Result<Vec<u8>> {
        self.keys.export_private_key()
    }

    pub fn fingerprint(&self) -> Result<[u8; 32]> {
        self.keys.fingerprint()
    }

    pub fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.keys
            .with_private(|provider, private| sign(provider, private, data))
    }

    pub fn verify(&self, signature: &[u8], data: &[u8]) -> Result<bool> {
        self.keys
            .with_public(|provider, public| verify(provider, public, signature, data))
    }
}

impl Default for RsaPss {
    fn default() -> Self {
        Self::new(KeyPairSource::Generate)
    }
}
