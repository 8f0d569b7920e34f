//! HMAC with SHA-256 (HS256)

use std::sync::Arc;

use subtlekit_provider::{default_provider, CryptoProvider, KeyHandle, SignatureParams};

use crate::{
    error::Result,
    lazy::release_handle,
    params::{hmac_key_params, SIGNATURE_USAGES},
    source::{SecretKeyRef, SecretSource},
    symmetric::SecretKeyCell,
};

/// Generate a random extractable HMAC key
pub fn generate_key(provider: &dyn CryptoProvider) -> Result<KeyHandle> {
    Ok(provider.generate_secret(hmac_key_params(), true, SIGNATURE_USAGES)?)
}

/// Import raw bytes as a non-extractable HMAC key
pub fn parse_key(provider: &dyn CryptoProvider, raw: &[u8]) -> Result<KeyHandle> {
    Ok(provider.import_secret(hmac_key_params(), raw, false, SIGNATURE_USAGES)?)
}

/// Raw bytes of an extractable HMAC key
pub fn export_key(provider: &dyn CryptoProvider, key: KeyHandle) -> Result<Vec<u8>> {
    Ok(provider.export_raw(key)?)
}

/// Compute a 32-byte tag over `data`
pub fn sign(provider: &dyn CryptoProvider, key: KeyHandle, data: &[u8]) -> Result<Vec<u8>> {
    Ok(provider.sign(SignatureParams::Hmac, key, data)?)
}

/// Check `tag` against `data`
///
/// Raw key bytes are imported for the duration of the call. A mismatching
/// tag is `Ok(false)`, not an error.
pub fn verify<'a>(
    provider: &dyn CryptoProvider,
    key: impl Into<SecretKeyRef<'a>>,
    tag: &[u8],
    data: &[u8],
) -> Result<bool> {
    match key.into() {
        SecretKeyRef::Handle(handle) => {
            Ok(provider.verify(SignatureParams::Hmac, handle, tag, data)?)
        }
        SecretKeyRef::Raw(raw) => {
            let handle = parse_key(provider, raw)?;
            let verified = provider.verify(SignatureParams::Hmac, handle, tag, data);
            release_handle(provider, handle);
            Ok(verified?)
        }
    }
}

/// HMAC-SHA256 wrapper holding raw key bytes or a key handle
pub struct Hmac {
    key: SecretKeyCell,
}

impl Hmac {
    /// Wrap `key` using the process-wide provider
    pub fn new(key: impl Into<SecretSource>) -> Self {
        Self::with_provider(default_provider(), key)
    }

    pub fn with_provider(provider: Arc<dyn CryptoProvider>, key: impl Into<SecretSource>) -> Self {
        Self {
            key: SecretKeyCell::new(provider, key.into(), hmac_key_params(), SIGNATURE_USAGES),
        }
    }

    pub fn generate_key(provider: &dyn CryptoProvider) -> Result<KeyHandle> {
        generate_key(provider)
    }

    pub fn parse_key(provider: &dyn CryptoProvider, raw: &[u8]) -> Result<KeyHandle> {
        parse_key(provider, raw)
    }

    pub fn resolve(&self, force: bool) -> Result<KeyHandle> {
        self.key.resolve(force)
    }

    pub fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.key.with_key(|provider, key| sign(provider, key, data))
    }

    pub fn verify(&self, tag: &[u8], data: &[u8]) -> Result<bool> {
        self.key
            .with_key(|provider, key| verify(provider, key, tag, data))
    }

    /// Export any HMAC key held by this wrapper's provider
    pub fn export_key(&self, key: KeyHandle) -> Result<Vec<u8>> {
        export_key(self.key.provider(), key)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Barrier;

    use subtlekit_provider::{
        Algorithm, CipherParams, Error as ProviderError, KeyInfo, KeyPair, KeyUsage,
        RsaKeyGenParams, SecretKeyParams, SoftwareProvider,
    };

    use super::*;
    use crate::{error::Error, params::HMAC_TAG_LENGTH};

    /// Software provider whose `sign` parks until the test lets it finish
    struct GatedProvider {
        inner: SoftwareProvider,
        entered: Barrier,
        proceed: Barrier,
    }

    impl GatedProvider {
        fn new() -> Self {
            Self {
                inner: SoftwareProvider::new(),
                entered: Barrier::new(2),
                proceed: Barrier::new(2),
            }
        }
    }

    impl CryptoProvider for GatedProvider {
        fn import_secret(
            &self,
            params: SecretKeyParams,
            raw: &[u8],
            extractable: bool,
            usages: &[KeyUsage],
        ) -> subtlekit_provider::Result<KeyHandle> {
            self.inner.import_secret(params, raw, extractable, usages)
        }

        fn generate_secret(
            &self,
            params: SecretKeyParams,
            extractable: bool,
            usages: &[KeyUsage],
        ) -> subtlekit_provider::Result<KeyHandle> {
            self.inner.generate_secret(params, extractable, usages)
        }

        fn generate_key_pair(
            &self,
            algorithm: Algorithm,
            params: &RsaKeyGenParams,
            extractable: bool,
            usages: &[KeyUsage],
        ) -> subtlekit_provider::Result<KeyPair> {
            self.inner
                .generate_key_pair(algorithm, params, extractable, usages)
        }

        fn import_spki(
            &self,
            algorithm: Algorithm,
            der: &[u8],
            usages: &[KeyUsage],
        ) -> subtlekit_provider::Result<KeyHandle> {
            self.inner.import_spki(algorithm, der, usages)
        }

        fn import_pkcs8(
            &self,
            algorithm: Algorithm,
            der: &[u8],
            extractable: bool,
            usages: &[KeyUsage],
        ) -> subtlekit_provider::Result<KeyPair> {
            self.inner.import_pkcs8(algorithm, der, extractable, usages)
        }

        fn export_raw(&self, handle: KeyHandle) -> subtlekit_provider::Result<Vec<u8>> {
            self.inner.export_raw(handle)
        }

        fn export_spki(&self, handle: KeyHandle) -> subtlekit_provider::Result<Vec<u8>> {
            self.inner.export_spki(handle)
        }

        fn export_pkcs8(&self, handle: KeyHandle) -> subtlekit_provider::Result<Vec<u8>> {
            self.inner.export_pkcs8(handle)
        }

        fn export_jwk(&self, handle: KeyHandle) -> subtlekit_provider::Result<String> {
            self.inner.export_jwk(handle)
        }

        fn encrypt(
            &self,
            params: CipherParams<'_>,
            handle: KeyHandle,
            data: &[u8],
        ) -> subtlekit_provider::Result<Vec<u8>> {
            self.inner.encrypt(params, handle, data)
        }

        fn decrypt(
            &self,
            params: CipherParams<'_>,
            handle: KeyHandle,
            data: &[u8],
        ) -> subtlekit_provider::Result<Vec<u8>> {
            self.inner.decrypt(params, handle, data)
        }

        fn sign(
            &self,
            params: SignatureParams,
            handle: KeyHandle,
            data: &[u8],
        ) -> subtlekit_provider::Result<Vec<u8>> {
            self.entered.wait();
            self.proceed.wait();
            self.inner.sign(params, handle, data)
        }

        fn verify(
            &self,
            params: SignatureParams,
            handle: KeyHandle,
            signature: &[u8],
            data: &[u8],
        ) -> subtlekit_provider::Result<bool> {
            self.inner.verify(params, handle, signature, data)
        }

        fn key_info(&self, handle: KeyHandle) -> subtlekit_provider::Result<KeyInfo> {
            self.inner.key_info(handle)
        }

        fn fingerprint(&self, handle: KeyHandle) -> subtlekit_provider::Result<[u8; 32]> {
            self.inner.fingerprint(handle)
        }

        fn release(&self, handle: KeyHandle) -> subtlekit_provider::Result<()> {
            self.inner.release(handle)
        }
    }

    #[test]
    fn test_hello_world() {
        let provider = Arc::new(SoftwareProvider::new());
        let key = generate_key(provider.as_ref()).unwrap();

        let tag = sign(provider.as_ref(), key, b"hello world").unwrap();
        assert_eq!(tag.len(), HMAC_TAG_LENGTH);
        assert!(verify(provider.as_ref(), key, &tag, b"hello world").unwrap());
        assert!(!verify(provider.as_ref(), key, &tag, b"hello worlD").unwrap());
    }

    #[test]
    fn test_imported_key_sign_verify() {
        let hmac = Hmac::new(&[0x42u8; 16]);
        let tag = hmac.sign(b"hello world").unwrap();
        assert!(hmac.verify(&tag, b"hello world").unwrap());
        assert!(!hmac.verify(&tag, b"hello world!").unwrap());
        assert!(!hmac.verify(&tag[..16], b"hello world").unwrap());
        assert!(!hmac.verify(&[], b"hello world").unwrap());
    }

    #[test]
    fn test_verify_with_raw_key() {
        let provider = Arc::new(SoftwareProvider::new());
        let raw = b"shared secret".to_vec();
        let hmac = Hmac::with_provider(provider.clone(), raw.clone());
        let tag = hmac.sign(b"payload").unwrap();

        assert!(verify(provider.as_ref(), &raw, &tag, b"payload").unwrap());
        assert!(!verify(provider.as_ref(), &b"other secret".to_vec(), &tag, b"payload").unwrap());
        // temporary handles are released, only the wrapper's key remains
        assert_eq!(provider.stats().live_keys, 1);
    }

    #[test]
    fn test_export_respects_extractability() {
        let provider = Arc::new(SoftwareProvider::new());
        let hmac = Hmac::with_provider(provider.clone(), b"own key".to_vec());

        let generated = Hmac::generate_key(provider.as_ref()).unwrap();
        assert_eq!(hmac.export_key(generated).unwrap().len(), 64);

        let parsed = Hmac::parse_key(provider.as_ref(), b"server key").unwrap();
        assert!(matches!(
            hmac.export_key(parsed),
            Err(Error::Provider(ProviderError::NotExtractable))
        ));

        let own = hmac.resolve(false).unwrap();
        assert_eq!(hmac.export_key(own).unwrap(), b"own key");
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let provider = Arc::new(SoftwareProvider::new());
        let hmac = Hmac::with_provider(provider.clone(), b"key".to_vec());

        for _ in 0..3 {
            let tag = hmac.sign(b"data").unwrap();
            assert!(hmac.verify(&tag, b"data").unwrap());
        }
        let stats = provider.stats();
        assert_eq!(stats.imports, 1);
        assert_eq!(stats.signatures, 3);
        assert_eq!(stats.verifications, 3);
    }

    #[test]
    fn test_force_without_material() {
        let provider = Arc::new(SoftwareProvider::new());
        let key = generate_key(provider.as_ref()).unwrap();
        let hmac = Hmac::with_provider(provider.clone(), key);

        assert!(matches!(hmac.resolve(true), Err(Error::MissingKeyMaterial)));
        let tag = hmac.sign(b"still usable").unwrap();
        assert!(verify(provider.as_ref(), key, &tag, b"still usable").unwrap());
    }

    #[test]
    fn test_force_during_sign_keeps_key_alive() {
        let provider = Arc::new(GatedProvider::new());
        let hmac = Hmac::with_provider(provider.clone(), b"key".to_vec());
        let first = hmac.resolve(false).unwrap();
        let (hmac, gate) = (&hmac, provider.as_ref());

        let (tag, second) = std::thread::scope(|scope| {
            let signer = scope.spawn(move || hmac.sign(b"data"));
            gate.entered.wait();
            let forcer = scope.spawn(move || hmac.resolve(true));
            std::thread::sleep(std::time::Duration::from_millis(50));
            // the old handle outlives the in-flight sign
            assert_eq!(gate.inner.stats().releases, 0);
            gate.proceed.wait();
            (signer.join().unwrap(), forcer.join().unwrap())
        });

        let second = second.unwrap();
        assert_ne!(first, second);
        assert!(hmac.verify(&tag.unwrap(), b"data").unwrap());
        assert_eq!(gate.inner.stats().releases, 1);
        assert_eq!(gate.inner.stats().live_keys, 1);
    }

    #[test]
    fn test_matches_reference_vector() {
        let hmac = Hmac::new(b"Jefe".to_vec());
        let tag = hmac.sign(b"what do ya want for nothing?").unwrap();
        assert_eq!(
            tag,
            subtlekit_provider::software::hmac::sign(b"Jefe", b"what do ya want for nothing?")
                .unwrap()
        );
    }
}
