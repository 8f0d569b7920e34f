use base64::{engine::general_purpose, Engine as _};
use pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use rsa::{traits::PublicKeyParts, BigUint, Oaep, Pkcs1v15Sign, Pss, RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::{
    error::{Error, Result},
    types::RsaKeyGenParams,
};

/// SHA-256 output length, used by OAEP overhead calculations
const HASH_LENGTH: usize = 32;

/// Generate a private key with the requested modulus length and exponent
pub fn generate(params: &RsaKeyGenParams) -> Result<RsaPrivateKey> {
    let exponent = BigUint::from_bytes_be(&params.public_exponent);
    let mut rng = rand::thread_rng();
    RsaPrivateKey::new_with_exp(&mut rng, params.modulus_length, &exponent)
        .map_err(|e| Error::KeyGeneration(format!("Failed to generate RSA key: {}", e)))
}

/// Import private key from PKCS8 DER format
pub fn private_key_from_pkcs8_der(der: &[u8]) -> Result<RsaPrivateKey> {
    RsaPrivateKey::from_pkcs8_der(der).map_err(Error::encoding)
}

/// Import public key from SPKI DER format
pub fn public_key_from_spki_der(der: &[u8]) -> Result<RsaPublicKey> {
    RsaPublicKey::from_public_key_der(der).map_err(Error::encoding)
}

/// Export public key to SPKI DER format
pub fn to_spki_der(public_key: &RsaPublicKey) -> Result<Vec<u8>> {
    let der = public_key.to_public_key_der()?;
    Ok(der.as_bytes().to_vec())
}

/// Export private key to PKCS8 DER format
pub fn to_pkcs8_der(private_key: &RsaPrivateKey) -> Result<Zeroizing<Vec<u8>>> {
    let der = private_key.to_pkcs8_der()?;
    Ok(Zeroizing::new(der.as_bytes().to_vec()))
}

/// Modulus size in bits
pub fn size_bits(public_key: &RsaPublicKey) -> usize {
    public_key.size() * 8
}

/// Longest plaintext OAEP with SHA-256 accepts for this key
pub fn oaep_max_message_length(public_key: &RsaPublicKey) -> usize {
    public_key.size().saturating_sub(2 * HASH_LENGTH + 2)
}

/// Encrypt with RSA-OAEP (SHA-256, empty label)
pub fn oaep_encrypt(public_key: &RsaPublicKey, plaintext: &[u8]) -> Result<Vec<u8>> {
    let max = oaep_max_message_length(public_key);
    if plaintext.len() > max {
        return Err(Error::LengthViolation {
            max,
            actual: plaintext.len(),
        });
    }

    let mut rng = rand::thread_rng();
    public_key
        .encrypt(&mut rng, Oaep::new::<Sha256>(), plaintext)
        .map_err(|e| match e {
            rsa::Error::MessageTooLong => Error::LengthViolation {
                max,
                actual: plaintext.len(),
            },
            other => Error::EncryptionFailure(format!("RSA-OAEP encryption failed: {}", other)),
        })
}

/// Decrypt with RSA-OAEP (SHA-256, empty label)
pub fn oaep_decrypt(private_key: &RsaPrivateKey, ciphertext: &[u8]) -> Result<Vec<u8>> {
    private_key
        .decrypt(Oaep::new::<Sha256>(), ciphertext)
        .map_err(|_| Error::DecryptionFailure)
}

/// Sign with RSA-PSS over SHA-256
pub fn pss_sign(private_key: &RsaPrivateKey, message: &[u8], salt_length: usize) -> Result<Vec<u8>> {
    let mut rng = rand::thread_rng();
    let hashed = Sha256::digest(message);
    private_key
        .sign_with_rng(&mut rng, Pss::new_with_salt::<Sha256>(salt_length), &hashed)
        .map_err(|e| Error::SigningFailure(format!("RSA-PSS signing failed: {}", e)))
}

pub fn pss_verify(
    public_key: &RsaPublicKey,
    message: &[u8],
    signature: &[u8],
    salt_length: usize,
) -> bool {
    let hashed = Sha256::digest(message);
    public_key
        .verify(Pss::new_with_salt::<Sha256>(salt_length), &hashed, signature)
        .is_ok()
}

/// Sign using PKCS#1 v1.5 with SHA-256
pub fn pkcs1v15_sign(private_key: &RsaPrivateKey, message: &[u8]) -> Result<Vec<u8>> {
    let mut rng = rand::thread_rng();
    let hashed = Sha256::digest(message);
    private_key
        .sign_with_rng(&mut rng, Pkcs1v15Sign::new::<Sha256>(), &hashed)
        .map_err(|e| Error::SigningFailure(format!("RSA signing failed: {}", e)))
}

pub fn pkcs1v15_verify(public_key: &RsaPublicKey, message: &[u8], signature: &[u8]) -> bool {
    let hashed = Sha256::digest(message);
    public_key
        .verify(Pkcs1v15Sign::new::<Sha256>(), &hashed, signature)
        .is_ok()
}

/// SPKI SHA-256 fingerprint
pub fn spki_sha256_fingerprint(public_key: &RsaPublicKey) -> Result<[u8; 32]> {
    let spki = to_spki_der(public_key)?;
    Ok(Sha256::digest(&spki).into())
}

/// Export the public key as a JWK, using the SPKI fingerprint as `kid`
pub fn to_jwk(public_key: &RsaPublicKey, alg: &str) -> Result<String> {
    let fp = spki_sha256_fingerprint(public_key)?;
    let kid = general_purpose::URL_SAFE_NO_PAD.encode(fp);

    let n = general_purpose::URL_SAFE_NO_PAD.encode(public_key.n().to_bytes_be());
    let e = general_purpose::URL_SAFE_NO_PAD.encode(public_key.e().to_bytes_be());

    let jwk = serde_json::json!({
        "kty": "RSA",
        "alg": alg,
        "n": n,
        "e": e,
        "kid": kid,
        "ext": true
    });
    Ok(jwk.to_string())
}
