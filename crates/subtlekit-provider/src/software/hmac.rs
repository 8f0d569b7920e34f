//! HMAC-SHA256

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// Tag length in bytes
pub const TAG_LENGTH: usize = 32;

/// SHA-256 block size, the default generated key length in bytes
pub const BLOCK_SIZE: usize = 64;

fn keyed(key: &[u8]) -> Result<HmacSha256> {
    HmacSha256::new_from_slice(key).map_err(|e| Error::Other(format!("HMAC key rejected: {}", e)))
}

/// Compute the authentication tag of `data`
pub fn sign(key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let mut mac = keyed(key)?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Compare `tag` against the tag of `data` in constant time
pub fn verify(key: &[u8], tag: &[u8], data: &[u8]) -> Result<bool> {
    let mut mac = keyed(key)?;
    mac.update(data);
    Ok(mac.verify_slice(tag).is_ok())
}
