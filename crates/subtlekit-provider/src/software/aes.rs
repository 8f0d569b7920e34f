//! AES-CBC with PKCS#7 padding
//!
//! Provides confidentiality only. There is no authentication tag; pair the
//! ciphertext with a MAC when integrity matters.

use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};

use crate::error::{Error, Result};

/// AES block size, which is also the required IV length
pub const BLOCK_SIZE: usize = 16;

/// Key lengths (in bytes) accepted for AES
pub const KEY_LENGTHS: [usize; 3] = [16, 24, 32];

fn check_iv(iv: &[u8]) -> Result<()> {
    if iv.len() != BLOCK_SIZE {
        return Err(Error::InvalidIvLength {
            expected: BLOCK_SIZE,
            actual: iv.len(),
        });
    }
    Ok(())
}

fn invalid_key(key: &[u8]) -> Error {
    Error::InvalidKeyLength {
        expected: 16,
        actual: key.len(),
    }
}

/// Encrypt `plaintext` under `key` and `iv`
///
/// # Returns
/// Ciphertext padded to a whole number of blocks
pub fn encrypt_cbc(key: &[u8], iv: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    check_iv(iv)?;
    let ciphertext = match key.len() {
        16 => cbc::Encryptor::<aes::Aes128>::new_from_slices(key, iv)
            .map_err(|_| invalid_key(key))?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        24 => cbc::Encryptor::<aes::Aes192>::new_from_slices(key, iv)
            .map_err(|_| invalid_key(key))?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        32 => cbc::Encryptor::<aes::Aes256>::new_from_slices(key, iv)
            .map_err(|_| invalid_key(key))?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        _ => return Err(invalid_key(key)),
    };
    Ok(ciphertext)
}

/// Decrypt `ciphertext` under `key` and `iv`
///
/// Fails with [`Error::DecryptionFailure`] for empty input, input that is not
/// a whole number of blocks, or invalid padding.
pub fn decrypt_cbc(key: &[u8], iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    check_iv(iv)?;
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
        return Err(Error::DecryptionFailure);
    }

    let plaintext = match key.len() {
        16 => cbc::Decryptor::<aes::Aes128>::new_from_slices(key, iv)
            .map_err(|_| invalid_key(key))?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
        24 => cbc::Decryptor::<aes::Aes192>::new_from_slices(key, iv)
            .map_err(|_| invalid_key(key))?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
        32 => cbc::Decryptor::<aes::Aes256>::new_from_slices(key, iv)
            .map_err(|_| invalid_key(key))?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
        _ => return Err(invalid_key(key)),
    };
    plaintext.map_err(|_| Error::DecryptionFailure)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_decrypt() {
        let key = [7u8; 16];
        let iv = [1u8; 16];
        let plaintext = b"Hello, AES-CBC!";

        let ciphertext = encrypt_cbc(&key, &iv, plaintext).unwrap();
        assert_eq!(ciphertext.len(), 16);
        assert_ne!(&ciphertext[..], &plaintext[..]);

        let decrypted = decrypt_cbc(&key, &iv, &ciphertext).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_full_block_gets_padding_block() {
        let key = [0u8; 32];
        let iv = [0u8; 16];
        let ciphertext = encrypt_cbc(&key, &iv, &[0x42; 16]).unwrap();
        assert_eq!(ciphertext.len(), 32);
    }

    #[test]
    fn test_rejects_bad_lengths() {
        let key = [0u8; 16];
        assert!(matches!(
            encrypt_cbc(&key, &[0u8; 12], b"data"),
            Err(Error::InvalidIvLength { expected: 16, actual: 12 })
        ));
        assert!(matches!(
            encrypt_cbc(&[0u8; 20], &[0u8; 16], b"data"),
            Err(Error::InvalidKeyLength { actual: 20, .. })
        ));
        assert!(matches!(
            decrypt_cbc(&key, &[0u8; 16], &[0u8; 17]),
            Err(Error::DecryptionFailure)
        ));
        assert!(matches!(
            decrypt_cbc(&key, &[0u8; 16], &[]),
            Err(Error::DecryptionFailure)
        ));
    }

    #[test]
    fn test_wrong_key_fails_or_garbles() {
        let iv = [3u8; 16];
        let ciphertext = encrypt_cbc(&[1u8; 16], &iv, b"attack at dawn").unwrap();
        match decrypt_cbc(&[2u8; 16], &iv, &ciphertext) {
            Err(Error::DecryptionFailure) => {}
            Ok(garbled) => assert_ne!(garbled, b"attack at dawn"),
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
}
