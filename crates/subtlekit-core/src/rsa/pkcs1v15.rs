//! RSASSA-PKCS1-v1_5 with SHA-256. Signatures are deterministic.

use std::sync::Arc;

use subtlekit_provider::{
    default_provider, Algorithm, CryptoProvider, KeyHandle, KeyPair, SignatureParams,
};

use super::{KeyPairCell, ResolvedPair};
use crate::{
    error::Result,
    source::{KeyPairSource, PublicKeyRef},
};

const ALGORITHM: Algorithm = Algorithm::RsassaPkcs1v15;

pub fn sign(
    provider: &dyn CryptoProvider,
    private_key: KeyHandle,
    data: &[u8],
) -> Result<Vec<u8>> {
    Ok(provider.sign(SignatureParams::RsassaPkcs1v15, private_key, data)?)
}

pub fn verify<'a>(
    provider: &dyn CryptoProvider,
    public_key: impl Into<PublicKeyRef<'a>>,
    signature: &[u8],
    data: &[u8],
) -> Result<bool> {
    super::with_public_key(provider, ALGORITHM, public_key.into(), |key| {
        Ok(provider.verify(SignatureParams::RsassaPkcs1v15, key, signature, data)?)
    })
}

pub struct RsassaPkcs1v15 {
    keys: KeyPairCell,
}

impl RsassaPkcs1v15 {
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

impl Default for RsassaPkcs1v15 {
    fn default() -> Self {
        Self::new(KeyPairSource::Generate)
    }
}
