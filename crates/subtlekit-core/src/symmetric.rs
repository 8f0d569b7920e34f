use std::sync::Arc;

use subtlekit_provider::{CryptoProvider, KeyHandle, KeyUsage, SecretKeyParams};

use crate::{
    error::{Error, Result},
    lazy::{release_handle, LazyKey},
    source::SecretSource,
};

/// Lazily imported symmetric key shared by the AES and HMAC wrappers
pub(crate) struct SecretKeyCell {
    provider: Arc<dyn CryptoProvider>,
    source: SecretSource,
    params: SecretKeyParams,
    usages: &'static [KeyUsage],
    key: LazyKey<KeyHandle>,
}

impl SecretKeyCell {
    pub(crate) fn new(
        provider: Arc<dyn CryptoProvider>,
        source: SecretSource,
        params: SecretKeyParams,
        usages: &'static [KeyUsage],
    ) -> Self {
        let key = match &source {
            SecretSource::Handle(handle) => LazyKey::resolved(*handle),
            SecretSource::Raw(_) => LazyKey::new(),
        };
        Self {
            provider,
            source,
            params,
            usages,
            key,
        }
    }

    pub(crate) fn provider(&self) -> &dyn CryptoProvider {
        self.provider.as_ref()
    }

    pub(crate) fn resolve(&self, force: bool) -> Result<KeyHandle> {
        self.key.resolve_with(
            force,
            || self.import(),
            |stale| release_handle(self.provider(), stale),
        )
    }

    /// Run `f` with the resolved handle held against forced replacement
    pub(crate) fn with_key<T>(
        &self,
        f: impl FnOnce(&dyn CryptoProvider, KeyHandle) -> Result<T>,
    ) -> Result<T> {
        self.key.with_value(
            || self.import(),
            |stale| release_handle(self.provider(), stale),
            |handle| f(self.provider(), *handle),
        )
    }

    fn import(&self) -> Result<KeyHandle> {
        match &self.source {
            SecretSource::Raw(bytes) => {
                let handle = self
                    .provider
                    .import_secret(self.params, bytes, true, self.usages)?;
                Ok(handle)
            }
            SecretSource::Handle(handle) => {
                tracing::warn!(?handle, "no raw key bytes to re-import");
                Err(Error::MissingKeyMaterial)
            }
        }
    }
}

impl Drop for SecretKeyCell {
    fn drop(&mut self) {
        if let Some(handle) = self.key.take_owned() {
            release_handle(self.provider.as_ref(), handle);
        }
    }
}
