//! Where a wrapper's key comes from

use std::fmt;

use subtlekit_provider::{KeyHandle, KeyPair};
use zeroize::Zeroizing;

/// Symmetric key material: raw bytes or a handle produced by the provider
pub enum SecretSource {
    Raw(Zeroizing<Vec<u8>>),
    Handle(KeyHandle),
}

impl SecretSource {
    pub fn raw(bytes: impl Into<Vec<u8>>) -> Self {
        SecretSource::Raw(Zeroizing::new(bytes.into()))
    }
}

impl fmt::Debug for SecretSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecretSource::Raw(bytes) => write!(f, "Raw([{} bytes])", bytes.len()),
            SecretSource::Handle(handle) => f.debug_tuple("Handle").field(handle).finish(),
        }
    }
}

impl From<Vec<u8>> for SecretSource {
    fn from(value: Vec<u8>) -> Self {
        Self::raw(value)
    }
}

impl From<&[u8]> for SecretSource {
    fn from(value: &[u8]) -> Self {
        Self::raw(value)
    }
}

impl<const N: usize> From<&[u8; N]> for SecretSource {
    fn from(value: &[u8; N]) -> Self {
        Self::raw(value.as_slice())
    }
}

impl From<KeyHandle> for SecretSource {
    fn from(value: KeyHandle) -> Self {
        SecretSource::Handle(value)
    }
}

/// Asymmetric key material
pub enum KeyPairSource {
    /// Generate a fresh pair on first use
    Generate,
    /// PKCS8 DER private key; the public half is derived from it
    Private(Zeroizing<Vec<u8>>),
    /// SPKI DER public key only
    Public(Vec<u8>),
    /// Handles produced by the provider
    Handles(KeyPair),
}

impl KeyPairSource {
    pub fn private_pkcs8(der: impl Into<Vec<u8>>) -> Self {
        KeyPairSource::Private(Zeroizing::new(der.into()))
    }

    pub fn public_spki(der: impl Into<Vec<u8>>) -> Self {
        KeyPairSource::Public(der.into())
    }
}

impl Default for KeyPairSource {
    fn default() -> Self {
        KeyPairSource::Generate
    }
}

impl fmt::Debug for KeyPairSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPairSource::Generate => f.write_str("Generate"),
            KeyPairSource::Private(der) => write!(f, "Private([{} bytes])", der.len()),
            KeyPairSource::Public(der) => write!(f, "Public([{} bytes])", der.len()),
            KeyPairSource::Handles(pair) => f.debug_tuple("Handles").field(pair).finish(),
        }
    }
}

impl From<KeyPair> for KeyPairSource {
    fn from(value: KeyPair) -> Self {
        KeyPairSource::Handles(value)
    }
}

/// A public key given either as a handle or as SPKI DER bytes
#[derive(Clone, Copy, Debug)]
pub enum PublicKeyRef<'a> {
    Handle(KeyHandle),
    Spki(&'a [u8]),
}

impl From<KeyHandle> for PublicKeyRef<'_> {
    fn from(value: KeyHandle) -> Self {
        PublicKeyRef::Handle(value)
    }
}

impl<'a> From<&'a [u8]> for PublicKeyRef<'a> {
    fn from(value: &'a [u8]) -> Self {
        PublicKeyRef::Spki(value)
    }
}

impl<'a> From<&'a Vec<u8>> for PublicKeyRef<'a> {
    fn from(value: &'a Vec<u8>) -> Self {
        PublicKeyRef::Spki(value.as_slice())
    }
}

/// A secret key given either as a handle or as raw bytes
#[derive(Clone, Copy)]
pub enum SecretKeyRef<'a> {
    Handle(KeyHandle),
    Raw(&'a [u8]),
}

impl fmt::Debug for SecretKeyRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecretKeyRef::Handle(handle) => f.debug_tuple("Handle").field(handle).finish(),
            SecretKeyRef::Raw(bytes) => write!(f, "Raw([{} bytes])", bytes.len()),
        }
    }
}

impl From<KeyHandle> for SecretKeyRef<'_> {
    fn from(value: KeyHandle) -> Self {
        SecretKeyRef::Handle(value)
    }
}

impl<'a> From<&'a [u8]> for SecretKeyRef<'a> {
    fn from(value: &'a [u8]) -> Self {
        SecretKeyRef::Raw(value)
    }
}

impl<'a> From<&'a Vec<u8>> for SecretKeyRef<'a> {
    fn from(value: &'a Vec<u8>) -> Self {
        SecretKeyRef::Raw(value.as_slice())
    }
}
