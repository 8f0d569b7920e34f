// provider.rs
use crate::{
    error::Result,
    types::{
        Algorithm, CipherParams, KeyHandle, KeyInfo, KeyPair, KeyUsage, RsaKeyGenParams,
        SecretKeyParams, SignatureParams,
    },
};

/// Platform cryptographic primitives
///
/// Keys live inside the provider and are addressed through opaque
/// [`KeyHandle`]s. Every key is bound to one [`Algorithm`] and a set of
/// [`KeyUsage`]s at creation; operations outside that binding fail.
pub trait CryptoProvider: Send + Sync + 'static {
    fn import_secret(
        &self,
        params: SecretKeyParams,
        raw: &[u8],
        extractable: bool,
        usages: &[KeyUsage],
    ) -> Result<KeyHandle>;
    fn generate_secret(
        &self,
        params: SecretKeyParams,
        extractable: bool,
        usages: &[KeyUsage],
    ) -> Result<KeyHandle>;

    /// The public half is always extractable; `extractable` applies to the
    /// private half only
    fn generate_key_pair(
        &self,
        algorithm: Algorithm,
        params: &RsaKeyGenParams,
        extractable: bool,
        usages: &[KeyUsage],
    ) -> Result<KeyPair>;

    fn import_spki(&self, algorithm: Algorithm, der: &[u8], usages: &[KeyUsage])
        -> Result<KeyHandle>;
    /// Imports a private key and derives its public half
    fn import_pkcs8(
        &self,
        algorithm: Algorithm,
        der: &[u8],
        extractable: bool,
        usages: &[KeyUsage],
    ) -> Result<KeyPair>;

    fn export_raw(&self, handle: KeyHandle) -> Result<Vec<u8>>;
    fn export_spki(&self, handle: KeyHandle) -> Result<Vec<u8>>;
    fn export_pkcs8(&self, handle: KeyHandle) -> Result<Vec<u8>>;
    fn export_jwk(&self, handle: KeyHandle) -> Result<String>;

    fn encrypt(&self, params: CipherParams<'_>, handle: KeyHandle, data: &[u8]) -> Result<Vec<u8>>;
    fn decrypt(&self, params: CipherParams<'_>, handle: KeyHandle, data: &[u8]) -> Result<Vec<u8>>;

    fn sign(&self, params: SignatureParams, handle: KeyHandle, data: &[u8]) -> Result<Vec<u8>>;
    /// Mismatching or malformed signatures yield `Ok(false)`
    fn verify(
        &self,
        params: SignatureParams,
        handle: KeyHandle,
        signature: &[u8],
        data: &[u8],
    ) -> Result<bool>;

    fn key_info(&self, handle: KeyHandle) -> Result<KeyInfo>;
    /// SHA-256 over the SPKI encoding of an asymmetric key's public half
    fn fingerprint(&self, handle: KeyHandle) -> Result<[u8; 32]>;

    /// Drop key material; the handle becomes invalid
    fn release(&self, handle: KeyHandle) -> Result<()>;
}
