use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque reference to key material held by a provider
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct KeyHandle(pub u64);

/// Algorithm a key is bound to at creation time
///
/// Every algorithm uses SHA-256 where a hash is involved.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    AesCbc,
    Hmac,
    RsaOaep,
    RsaPss,
    RsassaPkcs1v15,
}

impl Algorithm {
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::AesCbc => "AES-CBC",
            Algorithm::Hmac => "HMAC",
            Algorithm::RsaOaep => "RSA-OAEP",
            Algorithm::RsaPss => "RSA-PSS",
            Algorithm::RsassaPkcs1v15 => "RSASSA-PKCS1-v1_5",
        }
    }

    pub fn is_symmetric(&self) -> bool {
        matches!(self, Algorithm::AesCbc | Algorithm::Hmac)
    }

    /// Usages a key of this algorithm may be granted
    pub fn supported_usages(&self) -> &'static [KeyUsage] {
        match self {
            Algorithm::AesCbc | Algorithm::RsaOaep => &[KeyUsage::Encrypt, KeyUsage::Decrypt],
            Algorithm::Hmac | Algorithm::RsaPss | Algorithm::RsassaPkcs1v15 => {
                &[KeyUsage::Sign, KeyUsage::Verify]
            }
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Operation a key may be used for
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyUsage {
    Encrypt,
    Decrypt,
    Sign,
    Verify,
}

impl KeyUsage {
    /// Usages that remain meaningful on the public half of a key pair
    pub fn is_public(&self) -> bool {
        matches!(self, KeyUsage::Encrypt | KeyUsage::Verify)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyType {
    Secret,
    Public,
    Private,
}

/// Parameters for importing or generating a symmetric key
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SecretKeyParams {
    pub algorithm: Algorithm,
    /// Key length in bits; `None` takes the length of the imported bytes,
    /// or the hash block size when generating an HMAC key
    pub length: Option<usize>,
}

impl SecretKeyParams {
    pub fn aes_cbc(length: usize) -> Self {
        Self {
            algorithm: Algorithm::AesCbc,
            length: Some(length),
        }
    }

    pub fn hmac() -> Self {
        Self {
            algorithm: Algorithm::Hmac,
            length: None,
        }
    }
}

/// RSA key pair generation parameters
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RsaKeyGenParams {
    pub modulus_length: usize,
    /// Big-endian public exponent
    pub public_exponent: Vec<u8>,
}

impl Default for RsaKeyGenParams {
    fn default() -> Self {
        Self {
            modulus_length: 2048,
            public_exponent: vec![0x01, 0x00, 0x01],
        }
    }
}

/// Handles for both halves of an asymmetric key
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct KeyPair {
    pub public: KeyHandle,
    pub private: KeyHandle,
}

/// Metadata the provider keeps alongside key material
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyInfo {
    pub algorithm: Algorithm,
    pub key_type: KeyType,
    pub extractable: bool,
    pub usages: Vec<KeyUsage>,
    /// Key size in bits (modulus length for RSA keys)
    pub size_bits: usize,
}

impl KeyInfo {
    pub fn allows(&self, usage: KeyUsage) -> bool {
        self.usages.contains(&usage)
    }
}

/// Algorithm descriptor for encrypt and decrypt calls
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CipherParams<'a> {
    AesCbc { iv: &'a [u8] },
    RsaOaep,
}

impl CipherParams<'_> {
    pub fn algorithm(&self) -> Algorithm {
        match self {
            CipherParams::AesCbc { .. } => Algorithm::AesCbc,
            CipherParams::RsaOaep => Algorithm::RsaOaep,
        }
    }
}

/// Algorithm descriptor for sign and verify calls
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum SignatureParams {
    Hmac,
    RsaPss { salt_length: usize },
    RsassaPkcs1v15,
}

impl SignatureParams {
    pub fn algorithm(&self) -> Algorithm {
        match self {
            SignatureParams::Hmac => Algorithm::Hmac,
            SignatureParams::RsaPss { .. } => Algorithm::RsaPss,
            SignatureParams::RsassaPkcs1v15 => Algorithm::RsassaPkcs1v15,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_usages() {
        assert!(Algorithm::AesCbc
            .supported_usages()
            .contains(&KeyUsage::Decrypt));
        assert!(!Algorithm::Hmac.supported_usages().contains(&KeyUsage::Encrypt));
        assert!(Algorithm::Hmac.is_symmetric());
        assert!(!Algorithm::RsaPss.is_symmetric());
    }

    #[test]
    fn test_default_rsa_params() {
        let params = RsaKeyGenParams::default();
        assert_eq!(params.modulus_length, 2048);
        assert_eq!(params.public_exponent, vec![0x01, 0x00, 0x01]);

        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["modulusLength"], 2048);
    }

    #[test]
    fn test_algorithm_display() {
        assert_eq!(Algorithm::RsassaPkcs1v15.to_string(), "RSASSA-PKCS1-v1_5");
        assert_eq!(
            CipherParams::AesCbc { iv: &[0u8; 16] }.algorithm(),
            Algorithm::AesCbc
        );
        assert_eq!(
            SignatureParams::RsaPss { salt_length: 32 }.algorithm(),
            Algorithm::RsaPss
        );
    }
}
