//! Software implementation of [`CryptoProvider`] backed by the RustCrypto crates
//!
//! Key material never leaves the provider except through the export
//! operations, which honour the extractable flag chosen at creation.

pub mod aes;
pub mod hmac;
pub mod rsa;
mod stats;

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        RwLock,
    },
};

use ::rsa::{RsaPrivateKey, RsaPublicKey};
use base64::{engine::general_purpose, Engine as _};
use rand::RngCore;
use zeroize::Zeroizing;

pub use stats::ProviderStats;
use stats::{Counters, Op};

use crate::{
    error::{Error, Result},
    provider::CryptoProvider,
    types::{
        Algorithm, CipherParams, KeyHandle, KeyInfo, KeyPair, KeyType, KeyUsage, RsaKeyGenParams,
        SecretKeyParams, SignatureParams,
    },
};

enum Material {
    Secret(Zeroizing<Vec<u8>>),
    RsaPrivate(Box<RsaPrivateKey>),
    RsaPublic(Box<RsaPublicKey>),
}

struct StoredKey {
    info: KeyInfo,
    material: Material,
}

impl StoredKey {
    fn secret(&self) -> Result<&[u8]> {
        match &self.material {
            Material::Secret(bytes) => Ok(bytes.as_slice()),
            _ => Err(Error::Other("Expected a secret key".to_string())),
        }
    }

    fn rsa_public(&self) -> Result<&RsaPublicKey> {
        match &self.material {
            Material::RsaPublic(key) => Ok(key),
            _ => Err(Error::Other("Expected an RSA public key".to_string())),
        }
    }

    fn rsa_private(&self) -> Result<&RsaPrivateKey> {
        match &self.material {
            Material::RsaPrivate(key) => Ok(key),
            _ => Err(Error::Other("Expected an RSA private key".to_string())),
        }
    }

    /// Check the key may be used for `usage` under `algorithm`
    fn permit(&self, algorithm: Algorithm, usage: KeyUsage) -> Result<()> {
        if self.info.algorithm != algorithm {
            return Err(Error::AlgorithmMismatch {
                key: self.info.algorithm,
                requested: algorithm,
            });
        }
        if !self.info.allows(usage) {
            return Err(Error::UsageNotPermitted(usage));
        }
        Ok(())
    }

    fn ensure_extractable(&self) -> Result<()> {
        if self.info.extractable {
            Ok(())
        } else {
            Err(Error::NotExtractable)
        }
    }
}

/// Reject usages the algorithm cannot support and drop duplicates
fn normalize_usages(algorithm: Algorithm, usages: &[KeyUsage]) -> Result<Vec<KeyUsage>> {
    let mut normalized = Vec::with_capacity(usages.len());
    for usage in usages {
        if !algorithm.supported_usages().contains(usage) {
            return Err(Error::UsageNotPermitted(*usage));
        }
        if !normalized.contains(usage) {
            normalized.push(*usage);
        }
    }
    Ok(normalized)
}

fn split_usages(usages: &[KeyUsage]) -> (Vec<KeyUsage>, Vec<KeyUsage>) {
    usages.iter().copied().partition(|usage| usage.is_public())
}

fn ensure_rsa(algorithm: Algorithm) -> Result<()> {
    if algorithm.is_symmetric() {
        return Err(Error::Other(format!("{} is not an RSA algorithm", algorithm)));
    }
    Ok(())
}

/// Validate the length of secret key bytes for `params`
fn check_secret_length(params: SecretKeyParams, len: usize) -> Result<()> {
    if let Some(bits) = params.length {
        if bits != len * 8 {
            return Err(Error::InvalidKeyLength {
                expected: bits / 8,
                actual: len,
            });
        }
    }
    match params.algorithm {
        Algorithm::AesCbc if !aes::KEY_LENGTHS.contains(&len) => Err(Error::InvalidKeyLength {
            expected: 16,
            actual: len,
        }),
        Algorithm::Hmac if len == 0 => Err(Error::InvalidKeyLength {
            expected: hmac::BLOCK_SIZE,
            actual: 0,
        }),
        Algorithm::AesCbc | Algorithm::Hmac => Ok(()),
        other => Err(Error::Other(format!("{} is not a symmetric algorithm", other))),
    }
}

fn jwk_alg(info: &KeyInfo) -> &'static str {
    match (info.algorithm, info.size_bits) {
        (Algorithm::AesCbc, 192) => "A192CBC",
        (Algorithm::AesCbc, 256) => "A256CBC",
        (Algorithm::AesCbc, _) => "A128CBC",
        (Algorithm::Hmac, _) => "HS256",
        (Algorithm::RsaOaep, _) => "RSA-OAEP-256",
        (Algorithm::RsaPss, _) => "PS256",
        (Algorithm::RsassaPkcs1v15, _) => "RS256",
    }
}

/// Type alias for the key table
type KeyTable = RwLock<HashMap<KeyHandle, StoredKey>>;

/// In-memory primitives provider
pub struct SoftwareProvider {
    keys: KeyTable,
    next_handle: AtomicU64,
    counters: Counters,
}

impl SoftwareProvider {
    pub fn new() -> Self {
        Self {
            keys: RwLock::new(HashMap::new()),
            next_handle: AtomicU64::new(1),
            counters: Counters::default(),
        }
    }

    /// Operation counts since the provider was created
    pub fn stats(&self) -> ProviderStats {
        let live = self.keys.read().map(|keys| keys.len()).unwrap_or_default();
        self.counters.snapshot(live as u64)
    }

    fn insert(&self, info: KeyInfo, material: Material) -> Result<KeyHandle> {
        let handle = KeyHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        let mut keys = self.keys.write().map_err(|_| Error::lock_poisoned())?;
        keys.insert(handle, StoredKey { info, material });
        Ok(handle)
    }

    fn with_key<T>(&self, handle: KeyHandle, f: impl FnOnce(&StoredKey) -> Result<T>) -> Result<T> {
        let keys = self.keys.read().map_err(|_| Error::lock_poisoned())?;
        let stored = keys.get(&handle).ok_or_else(|| Error::key_not_found(handle))?;
        f(stored)
    }

    fn insert_pair(
        &self,
        algorithm: Algorithm,
        private_key: RsaPrivateKey,
        extractable: bool,
        usages: &[KeyUsage],
    ) -> Result<KeyPair> {
        let usages = normalize_usages(algorithm, usages)?;
        let (public_usages, private_usages) = split_usages(&usages);
        let size_bits = rsa::size_bits(&private_key.to_public_key());

        let public = self.insert(
            KeyInfo {
                algorithm,
                key_type: KeyType::Public,
                extractable: true,
                usages: public_usages,
                size_bits,
            },
            Material::RsaPublic(Box::new(private_key.to_public_key())),
        )?;
        let private = self.insert(
            KeyInfo {
                algorithm,
                key_type: KeyType::Private,
                extractable,
                usages: private_usages,
                size_bits,
            },
            Material::RsaPrivate(Box::new(private_key)),
        )?;
        Ok(KeyPair { public, private })
    }
}

impl Default for SoftwareProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl CryptoProvider for SoftwareProvider {
    fn import_secret(
        &self,
        params: SecretKeyParams,
        raw: &[u8],
        extractable: bool,
        usages: &[KeyUsage],
    ) -> Result<KeyHandle> {
        check_secret_length(params, raw.len())?;
        let usages = normalize_usages(params.algorithm, usages)?;

        let handle = self.insert(
            KeyInfo {
                algorithm: params.algorithm,
                key_type: KeyType::Secret,
                extractable,
                usages,
                size_bits: raw.len() * 8,
            },
            Material::Secret(Zeroizing::new(raw.to_vec())),
        )?;
        self.counters.record(Op::Import);
        tracing::debug!(?handle, algorithm = %params.algorithm, extractable, "imported secret key");
        Ok(handle)
    }

    fn generate_secret(
        &self,
        params: SecretKeyParams,
        extractable: bool,
        usages: &[KeyUsage],
    ) -> Result<KeyHandle> {
        let len = match (params.algorithm, params.length) {
            (_, Some(bits)) if bits == 0 || bits % 8 != 0 => {
                return Err(Error::KeyGeneration(format!("Invalid key length: {} bits", bits)))
            }
            (_, Some(bits)) => bits / 8,
            (Algorithm::Hmac, None) => hmac::BLOCK_SIZE,
            (algorithm, None) => {
                return Err(Error::KeyGeneration(format!(
                    "{} key generation requires a length",
                    algorithm
                )))
            }
        };
        check_secret_length(params, len)?;
        let usages = normalize_usages(params.algorithm, usages)?;

        let mut raw = Zeroizing::new(vec![0u8; len]);
        rand::thread_rng().fill_bytes(&mut raw);

        let handle = self.insert(
            KeyInfo {
                algorithm: params.algorithm,
                key_type: KeyType::Secret,
                extractable,
                usages,
                size_bits: len * 8,
            },
            Material::Secret(raw),
        )?;
        self.counters.record(Op::Generate);
        tracing::debug!(?handle, algorithm = %params.algorithm, "generated secret key");
        Ok(handle)
    }

    fn generate_key_pair(
        &self,
        algorithm: Algorithm,
        params: &RsaKeyGenParams,
        extractable: bool,
        usages: &[KeyUsage],
    ) -> Result<KeyPair> {
        ensure_rsa(algorithm)?;
        normalize_usages(algorithm, usages)?;

        let private_key = rsa::generate(params)?;
        let pair = self.insert_pair(algorithm, private_key, extractable, usages)?;
        self.counters.record(Op::Generate);
        tracing::debug!(
            public = ?pair.public,
            private = ?pair.private,
            %algorithm,
            modulus_length = params.modulus_length,
            "generated key pair"
        );
        Ok(pair)
    }

    fn import_spki(
        &self,
        algorithm: Algorithm,
        der: &[u8],
        usages: &[KeyUsage],
    ) -> Result<KeyHandle> {
        ensure_rsa(algorithm)?;
        let usages = normalize_usages(algorithm, usages)?;
        if let Some(usage) = usages.iter().find(|usage| !usage.is_public()) {
            return Err(Error::UsageNotPermitted(*usage));
        }

        let public_key = rsa::public_key_from_spki_der(der)?;
        let handle = self.insert(
            KeyInfo {
                algorithm,
                key_type: KeyType::Public,
                extractable: true,
                usages,
                size_bits: rsa::size_bits(&public_key),
            },
            Material::RsaPublic(Box::new(public_key)),
        )?;
        self.counters.record(Op::Import);
        tracing::debug!(?handle, %algorithm, "imported SPKI public key");
        Ok(handle)
    }

    fn import_pkcs8(
        &self,
        algorithm: Algorithm,
        der: &[u8],
        extractable: bool,
        usages: &[KeyUsage],
    ) -> Result<KeyPair> {
        ensure_rsa(algorithm)?;
        normalize_usages(algorithm, usages)?;

        let private_key = rsa::private_key_from_pkcs8_der(der)?;
        let pair = self.insert_pair(algorithm, private_key, extractable, usages)?;
        self.counters.record(Op::Import);
        tracing::debug!(private = ?pair.private, %algorithm, "imported PKCS8 private key");
        Ok(pair)
    }

    fn export_raw(&self, handle: KeyHandle) -> Result<Vec<u8>> {
        self.counters.record(Op::Export);
        self.with_key(handle, |stored| {
            let secret = stored.secret()?;
            stored.ensure_extractable()?;
            Ok(secret.to_vec())
        })
    }

    fn export_spki(&self, handle: KeyHandle) -> Result<Vec<u8>> {
        self.counters.record(Op::Export);
        self.with_key(handle, |stored| rsa::to_spki_der(stored.rsa_public()?))
    }

    fn export_pkcs8(&self, handle: KeyHandle) -> Result<Vec<u8>> {
        self.counters.record(Op::Export);
        self.with_key(handle, |stored| {
            let private_key = stored.rsa_private()?;
            stored.ensure_extractable()?;
            let der = rsa::to_pkcs8_der(private_key)?;
            Ok(der.to_vec())
        })
    }

    fn export_jwk(&self, handle: KeyHandle) -> Result<String> {
        self.counters.record(Op::Export);
        self.with_key(handle, |stored| match &stored.material {
            Material::RsaPublic(public_key) => rsa::to_jwk(public_key, jwk_alg(&stored.info)),
            Material::Secret(secret) => {
                stored.ensure_extractable()?;
                let jwk = serde_json::json!({
                    "kty": "oct",
                    "alg": jwk_alg(&stored.info),
                    "k": general_purpose::URL_SAFE_NO_PAD.encode(secret.as_slice()),
                    "ext": true
                });
                Ok(jwk.to_string())
            }
            Material::RsaPrivate(_) => Err(Error::Other(
                "JWK export of RSA private keys is not supported".to_string(),
            )),
        })
    }

    fn encrypt(&self, params: CipherParams<'_>, handle: KeyHandle, data: &[u8]) -> Result<Vec<u8>> {
        self.counters.record(Op::Encrypt);
        self.with_key(handle, |stored| {
            stored.permit(params.algorithm(), KeyUsage::Encrypt)?;
            match params {
                CipherParams::AesCbc { iv } => aes::encrypt_cbc(stored.secret()?, iv, data),
                CipherParams::RsaOaep => rsa::oaep_encrypt(stored.rsa_public()?, data),
            }
        })
    }

    fn decrypt(&self, params: CipherParams<'_>, handle: KeyHandle, data: &[u8]) -> Result<Vec<u8>> {
        self.counters.record(Op::Decrypt);
        self.with_key(handle, |stored| {
            stored.permit(params.algorithm(), KeyUsage::Decrypt)?;
            match params {
                CipherParams::AesCbc { iv } => aes::decrypt_cbc(stored.secret()?, iv, data),
                CipherParams::RsaOaep => rsa::oaep_decrypt(stored.rsa_private()?, data),
            }
        })
    }

    fn sign(&self, params: SignatureParams, handle: KeyHandle, data: &[u8]) -> Result<Vec<u8>> {
        self.counters.record(Op::Sign);
        self.with_key(handle, |stored| {
            stored.permit(params.algorithm(), KeyUsage::Sign)?;
            match params {
                SignatureParams::Hmac => hmac::sign(stored.secret()?, data),
                SignatureParams::RsaPss { salt_length } => {
                    rsa::pss_sign(stored.rsa_private()?, data, salt_length)
                }
                SignatureParams::RsassaPkcs1v15 => rsa::pkcs1v15_sign(stored.rsa_private()?, data),
            }
        })
    }

    fn verify(
        &self,
        params: SignatureParams,
        handle: KeyHandle,
        signature: &[u8],
        data: &[u8],
    ) -> Result<bool> {
        self.counters.record(Op::Verify);
        self.with_key(handle, |stored| {
            stored.permit(params.algorithm(), KeyUsage::Verify)?;
            match params {
                SignatureParams::Hmac => hmac::verify(stored.secret()?, signature, data),
                SignatureParams::RsaPss { salt_length } => Ok(rsa::pss_verify(
                    stored.rsa_public()?,
                    data,
                    signature,
                    salt_length,
                )),
                SignatureParams::RsassaPkcs1v15 => {
                    Ok(rsa::pkcs1v15_verify(stored.rsa_public()?, data, signature))
                }
            }
        })
    }

    fn key_info(&self, handle: KeyHandle) -> Result<KeyInfo> {
        self.with_key(handle, |stored| Ok(stored.info.clone()))
    }

    fn fingerprint(&self, handle: KeyHandle) -> Result<[u8; 32]> {
        self.with_key(handle, |stored| match &stored.material {
            Material::RsaPublic(public_key) => rsa::spki_sha256_fingerprint(public_key),
            Material::RsaPrivate(private_key) => {
                rsa::spki_sha256_fingerprint(&private_key.to_public_key())
            }
            Material::Secret(_) => Err(Error::Other(
                "Secret keys have no SPKI fingerprint".to_string(),
            )),
        })
    }

    fn release(&self, handle: KeyHandle) -> Result<()> {
        self.counters.record(Op::Release);
        let mut keys = self.keys.write().map_err(|_| Error::lock_poisoned())?;
        keys.remove(&handle).ok_or_else(|| Error::key_not_found(handle))?;
        tracing::debug!(?handle, "released key");
        Ok(())
    }
}
