//! Compiled-in algorithm policy
//!
//! These values are not configurable. Every wrapper in this crate uses
//! exactly these parameters when it creates, imports or uses a key.

use subtlekit_provider::{KeyUsage, RsaKeyGenParams, SecretKeyParams, SignatureParams};

pub const AES_KEY_BITS: usize = 128;
/// AES block size; CBC requires an IV of exactly this length
pub const AES_IV_LENGTH: usize = 16;

pub const SHA256_LENGTH: usize = 32;
pub const HMAC_TAG_LENGTH: usize = SHA256_LENGTH;

pub const RSA_MODULUS_BITS: usize = 2048;
/// 65537, big-endian
pub const RSA_PUBLIC_EXPONENT: [u8; 3] = [0x01, 0x00, 0x01];
pub const PSS_SALT_LENGTH: usize = 32;

/// Longest RSA-OAEP plaintext for the modulus and hash above
pub const OAEP_MAX_PLAINTEXT: usize = RSA_MODULUS_BITS / 8 - 2 * SHA256_LENGTH - 2;

pub const CIPHER_USAGES: &[KeyUsage] = &[KeyUsage::Encrypt, KeyUsage::Decrypt];
pub const SIGNATURE_USAGES: &[KeyUsage] = &[KeyUsage::Sign, KeyUsage::Verify];

pub const PSS: SignatureParams = SignatureParams::RsaPss {
    salt_length: PSS_SALT_LENGTH,
};

pub fn aes_key_params() -> SecretKeyParams {
    SecretKeyParams::aes_cbc(AES_KEY_BITS)
}

pub fn hmac_key_params() -> SecretKeyParams {
    SecretKeyParams::hmac()
}

pub fn rsa_key_gen_params() -> RsaKeyGenParams {
    RsaKeyGenParams {
        modulus_length: RSA_MODULUS_BITS,
        public_exponent: RSA_PUBLIC_EXPONENT.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_values() {
        assert_eq!(OAEP_MAX_PLAINTEXT, 190);
        assert_eq!(rsa_key_gen_params(), RsaKeyGenParams::default());
        assert_eq!(aes_key_params().length, Some(128));
    }
}
