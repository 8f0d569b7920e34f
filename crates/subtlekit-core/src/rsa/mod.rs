//! RSA wrappers
//!
//! All three schemes share one lazily resolved key pair per wrapper. A
//! wrapper built from SPKI bytes holds only a public key: it can encrypt and
//! verify, but decrypting or signing fails with
//! [`Error::MissingKeyMaterial`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use subtlekit_provider::{Algorithm, CryptoProvider, KeyHandle, KeyPair, KeyUsage};

use crate::{
    error::{Error, Result},
    lazy::{release_handle, LazyKey},
    params::rsa_key_gen_params,
    source::{KeyPairSource, PublicKeyRef},
};

pub mod oaep;
pub mod pkcs1v15;
pub mod pss;

pub use oaep::RsaOaep;
pub use pkcs1v15::RsassaPkcs1v15;
pub use pss::RsaPss;

/// Handles a wrapper resolved for its key pair
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPair {
    pub public: KeyHandle,
    /// `None` when only a public key was supplied
    pub private: Option<KeyHandle>,
}

impl From<KeyPair> for ResolvedPair {
    fn from(pair: KeyPair) -> Self {
        Self {
            public: pair.public,
            private: Some(pair.private),
        }
    }
}

fn public_usages(algorithm: Algorithm) -> Vec<KeyUsage> {
    algorithm
        .supported_usages()
        .iter()
        .copied()
        .filter(KeyUsage::is_public)
        .collect()
}

/// Generate an extractable pair under the fixed RSA policy
pub(crate) fn generate_key_pair(
    provider: &dyn CryptoProvider,
    algorithm: Algorithm,
) -> Result<KeyPair> {
    Ok(provider.generate_key_pair(
        algorithm,
        &rsa_key_gen_params(),
        true,
        algorithm.supported_usages(),
    )?)
}

pub(crate) fn parse_public_key(
    provider: &dyn CryptoProvider,
    algorithm: Algorithm,
    spki: &[u8],
) -> Result<KeyHandle> {
    Ok(provider.import_spki(algorithm, spki, &public_usages(algorithm))?)
}

/// Run `f` with a public key handle, importing SPKI bytes for the duration
/// of the call
pub(crate) fn with_public_key<T>(
    provider: &dyn CryptoProvider,
    algorithm: Algorithm,
    key: PublicKeyRef<'_>,
    f: impl FnOnce(KeyHandle) -> Result<T>,
) -> Result<T> {
    match key {
        PublicKeyRef::Handle(handle) => f(handle),
        PublicKeyRef::Spki(der) => {
            let handle = parse_public_key(provider, algorithm, der)?;
            let result = f(handle);
            release_handle(provider, handle);
            result
        }
    }
}

/// Lazily resolved key pair shared by the RSA wrappers
pub(crate) struct KeyPairCell {
    provider: Arc<dyn CryptoProvider>,
    algorithm: Algorithm,
    source: KeyPairSource,
    keys: LazyKey<ResolvedPair>,
}

impl KeyPairCell {
    pub(crate) fn new(
        provider: Arc<dyn CryptoProvider>,
        algorithm: Algorithm,
        source: KeyPairSource,
    ) -> Self {
        let keys = match &source {
            KeyPairSource::Handles(pair) => LazyKey::resolved(ResolvedPair::from(*pair)),
            _ => LazyKey::new(),
        };
        Self {
            provider,
            algorithm,
            source,
            keys,
        }
    }

    pub(crate) fn provider(&self) -> &dyn CryptoProvider {
        self.provider.as_ref()
    }

    pub(crate) fn resolve(&self, force: bool) -> Result<ResolvedPair> {
        self.keys.resolve_with(
            force,
            || self.derive(),
            |stale| self.release(stale),
        )
    }

    pub(crate) fn public_key(&self) -> Result<KeyHandle> {
        Ok(self.resolve(false)?.public)
    }

    /// Run `f` with the resolved pair held against forced replacement
    fn with_pair<T>(&self, f: impl FnOnce(ResolvedPair) -> Result<T>) -> Result<T> {
        self.keys
            .with_value(|| self.derive(), |stale| self.release(stale), |pair| f(*pair))
    }

    pub(crate) fn with_public<T>(
        &self,
        f: impl FnOnce(&dyn CryptoProvider, KeyHandle) -> Result<T>,
    ) -> Result<T> {
        self.with_pair(|pair| f(self.provider(), pair.public))
    }

    pub(crate) fn with_private<T>(
        &self,
        f: impl FnOnce(&dyn CryptoProvider, KeyHandle) -> Result<T>,
    ) -> Result<T> {
        self.with_pair(|pair| {
            let private = pair.private.ok_or(Error::MissingKeyMaterial)?;
            f(self.provider(), private)
        })
    }

    pub(crate) fn export_public_key(&self) -> Result<Vec<u8>> {
        self.with_public(|provider, public| Ok(provider.export_spki(public)?))
    }

    pub(crate) fn export_public_jwk(&self) -> Result<String> {
        self.with_public(|provider, public| Ok(provider.export_jwk(public)?))
    }

    pub(crate) fn export_private_key(&self) -> Result<Vec<u8>> {
        self.with_private(|provider, private| Ok(provider.export_pkcs8(private)?))
    }

    pub(crate) fn fingerprint(&self) -> Result<[u8; 32]> {
        self.with_public(|provider, public| Ok(provider.fingerprint(public)?))
    }

    fn derive(&self) -> Result<ResolvedPair> {
        let algorithm = self.algorithm;
        let usages = algorithm.supported_usages();
        match &self.source {
            KeyPairSource::Generate => {
                let pair = self
                    .provider
                    .generate_key_pair(algorithm, &rsa_key_gen_params(), true, usages)?;
                Ok(pair.into())
            }
            KeyPairSource::Private(der) => {
                let pair = self.provider.import_pkcs8(algorithm, der, true, usages)?;
                Ok(pair.into())
            }
            KeyPairSource::Public(der) => Ok(ResolvedPair {
                public: parse_public_key(self.provider(), algorithm, der)?,
                private: None,
            }),
            KeyPairSource::Handles(pair) => {
                tracing::warn!(?pair, "no serialized key pair to re-import");
                Err(Error::MissingKeyMaterial)
            }
        }
    }

    fn release(&self, pair: ResolvedPair) {
        release_handle(self.provider(), pair.public);
        if let Some(private) = pair.private {
            release_handle(self.provider(), private);
        }
    }
}

impl Drop for KeyPairCell {
    fn drop(&mut self) {
        if let Some(pair) = self.keys.take_owned() {
            self.release(pair);
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::sync::OnceLock;

    use subtlekit_provider::{Algorithm, CryptoProvider, RsaKeyGenParams, SoftwareProvider};

    static PKCS8: OnceLock<Vec<Vec<u8>>> = OnceLock::new();

    /// One of two fixed PKCS8 keys, generated once per test run
    pub(crate) fn pkcs8(index: usize) -> &'static [u8] {
        let keys = PKCS8.get_or_init(|| {
            let provider = SoftwareProvider::new();
            (0..2)
                .map(|_| {
                    let pair = provider
                        .generate_key_pair(
                            Algorithm::RsaPss,
                            &RsaKeyGenParams::default(),
                            true,
                            Algorithm::RsaPss.supported_usages(),
                        )
                        .unwrap();
                    provider.export_pkcs8(pair.private).unwrap()
                })
                .collect()
        });
        &keys[index]
    }
}

#[cfg(test)]
mod tests {
    use subtlekit_provider::{Error as ProviderError, KeyType, SoftwareProvider};

    use super::*;

    fn cell(provider: &Arc<SoftwareProvider>, source: KeyPairSource) -> KeyPairCell {
        KeyPairCell::new(provider.clone(), Algorithm::RsaPss, source)
    }

    #[test]
    fn test_private_source_resolves_both_halves() {
        let provider = Arc::new(SoftwareProvider::new());
        let keys = cell(&provider, KeyPairSource::private_pkcs8(fixtures::pkcs8(0)));

        let pair = keys.resolve(false).unwrap();
        let private = pair.private.unwrap();
        assert_eq!(provider.key_info(pair.public).unwrap().key_type, KeyType::Public);
        assert_eq!(provider.key_info(private).unwrap().key_type, KeyType::Private);
        assert_eq!(keys.resolve(false).unwrap(), pair);
        assert_eq!(provider.stats().imports, 1);
    }

    #[test]
    fn test_public_source_has_no_private_half() {
        let provider = Arc::new(SoftwareProvider::new());
        let spki = cell(&provider, KeyPairSource::private_pkcs8(fixtures::pkcs8(0)))
            .export_public_key()
            .unwrap();

        let keys = cell(&provider, KeyPairSource::public_spki(spki));
        assert!(keys.resolve(false).unwrap().private.is_none());
        assert!(matches!(
            keys.with_private(|_, private| Ok(private)),
            Err(Error::MissingKeyMaterial)
        ));
        assert!(matches!(
            keys.export_private_key(),
            Err(Error::MissingKeyMaterial)
        ));
    }

    #[test]
    fn test_force_and_drop_release_pairs() {
        let provider = Arc::new(SoftwareProvider::new());
        {
            let keys = cell(&provider, KeyPairSource::private_pkcs8(fixtures::pkcs8(1)));
            let first = keys.resolve(false).unwrap();
            let second = keys.resolve(true).unwrap();
            assert_ne!(first, second);
            assert_eq!(provider.stats().live_keys, 2);
            assert_eq!(provider.stats().releases, 2);
        }
        assert_eq!(provider.stats().live_keys, 0);
    }

    #[test]
    fn test_supplied_handles_survive() {
        let provider = Arc::new(SoftwareProvider::new());
        let pair = provider
            .import_pkcs8(
                Algorithm::RsaPss,
                fixtures::pkcs8(0),
                false,
                Algorithm::RsaPss.supported_usages(),
            )
            .unwrap();
        {
            let keys = cell(&provider, pair.into());
            assert_eq!(keys.public_key().unwrap(), pair.public);
            assert!(matches!(keys.resolve(true), Err(Error::MissingKeyMaterial)));
            assert!(matches!(
                keys.export_private_key(),
                Err(Error::Provider(ProviderError::NotExtractable))
            ));
            // the public half is always exportable
            assert!(!keys.export_public_key().unwrap().is_empty());
        }
        assert_eq!(provider.stats().live_keys, 2);
    }

    #[test]
    fn test_fingerprint_matches_across_sources() {
        let provider = Arc::new(SoftwareProvider::new());
        let private = cell(&provider, KeyPairSource::private_pkcs8(fixtures::pkcs8(0)));
        let public = cell(
            &provider,
            KeyPairSource::public_spki(private.export_public_key().unwrap()),
        );
        assert_eq!(private.fingerprint().unwrap(), public.fingerprint().unwrap());

        let other = cell(&provider, KeyPairSource::private_pkcs8(fixtures::pkcs8(1)));
        assert_ne!(private.fingerprint().unwrap(), other.fingerprint().unwrap());
    }

    #[test]
    fn test_public_jwk() {
        let provider = Arc::new(SoftwareProvider::new());
        let keys = cell(&provider, KeyPairSource::private_pkcs8(fixtures::pkcs8(0)));
        let jwk: serde_json::Value = serde_json::from_str(&keys.export_public_jwk().unwrap()).unwrap();
        assert_eq!(jwk["kty"], "RSA");
        assert_eq!(jwk["alg"], "PS256");
        assert_eq!(jwk["e"], "AQAB");
    }

    #[test]
    fn test_temporary_public_key_is_released() {
        let provider = Arc::new(SoftwareProvider::new());
        let spki = cell(&provider, KeyPairSource::private_pkcs8(fixtures::pkcs8(0)))
            .export_public_key()
            .unwrap();
        assert_eq!(provider.stats().live_keys, 0);

        let info = with_public_key(
            provider.as_ref(),
            Algorithm::RsaPss,
            PublicKeyRef::from(&spki),
            |handle| Ok(provider.key_info(handle)?),
        )
        .unwrap();
        assert_eq!(info.usages, vec![KeyUsage::Verify]);
        assert_eq!(info.size_bits, 2048);
        assert_eq!(provider.stats().live_keys, 0);
    }
}
