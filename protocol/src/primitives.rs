//! Stateless cryptographic building blocks: hash, keyed MAC, HKDF, AEAD, and
//! constant-time comparison. Every operation here is pure except nonce
//! sampling and the implicit RNG dependency of [`aead_seal`].

use crate::constants::{AES256_NONCE_LENGTH, AES256_SECRET_LENGTH, HASH_LENGTH};
use crate::errors::CoreError;
use aes_gcm::aead::{Aead, AeadCore};
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use arrayref::array_ref;
use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// SHA-256 of `data`.
pub fn h(data: &[u8]) -> [u8; HASH_LENGTH] {
    let digest = Sha256::digest(data);
    *array_ref!(digest.as_slice(), 0, HASH_LENGTH)
}

/// HMAC-SHA256 of `data` under `key`.
pub fn mac(key: &[u8], data: &[u8]) -> [u8; HASH_LENGTH] {
    // HmacSha256::new_from_slice only fails for key lengths the variable-key
    // HMAC construction rejects, which never happens for our fixed 32-byte keys.
    let mut hmac =
        <HmacSha256 as Mac>::new_from_slice(key).expect("HMAC accepts any key length");
    hmac.update(data);
    let tag = hmac.finalize().into_bytes();
    *array_ref!(tag.as_slice(), 0, HASH_LENGTH)
}

/// HKDF-Extract then HKDF-Expand over SHA-256, producing `length` bytes.
pub fn hkdf(ikm: &[u8], length: usize, salt: &[u8], info: &[u8]) -> Result<Vec<u8>, CoreError> {
    let hk = Hkdf::<Sha256>::new(Some(salt), ikm);
    let mut okm = vec![0u8; length];
    hk.expand(info, &mut okm)?;
    Ok(okm)
}

/// AES-256-GCM seal with a freshly sampled random 96-bit nonce.
pub fn aead_seal(
    key: &[u8; AES256_SECRET_LENGTH],
    plaintext: &[u8],
) -> Result<([u8; AES256_NONCE_LENGTH], Vec<u8>), CoreError> {
    let cipher = Aes256Gcm::new_from_slice(key).expect("key is exactly 32 bytes");
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
    let ciphertext = cipher.encrypt(&nonce, plaintext)?;
    Ok((*array_ref!(nonce.as_slice(), 0, AES256_NONCE_LENGTH), ciphertext))
}

/// AES-256-GCM open. Fails with [`CoreError::AuthenticationFailure`] on tag mismatch.
pub fn aead_open(
    key: &[u8; AES256_SECRET_LENGTH],
    nonce: &[u8; AES256_NONCE_LENGTH],
    ciphertext: &[u8],
) -> Result<Vec<u8>, CoreError> {
    let cipher = Aes256Gcm::new_from_slice(key).expect("key is exactly 32 bytes");
    let nonce = Nonce::from_slice(nonce);
    Ok(cipher.decrypt(nonce, ciphertext)?)
}

/// Constant-time byte comparison.
pub fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        assert_eq!(h(b"hello"), h(b"hello"));
        assert_ne!(h(b"hello"), h(b"hellp"));
    }

    #[test]
    fn mac_is_keyed() {
        assert_ne!(mac(&[0u8; 32], b"msg"), mac(&[1u8; 32], b"msg"));
    }

    #[test]
    fn hkdf_output_length_matches_request() {
        let okm = hkdf(&[0u8; 32], 48, b"salt", b"info").unwrap();
        assert_eq!(okm.len(), 48);
    }

    #[test]
    fn aead_round_trips() {
        let key = [7u8; 32];
        let (nonce, ct) = aead_seal(&key, b"secret message").unwrap();
        let pt = aead_open(&key, &nonce, &ct).unwrap();
        assert_eq!(pt, b"secret message");
    }

    #[test]
    fn aead_rejects_tampered_ciphertext() {
        let key = [7u8; 32];
        let (nonce, mut ct) = aead_seal(&key, b"secret message").unwrap();
        ct[0] ^= 0xFF;
        assert!(aead_open(&key, &nonce, &ct).is_err());
    }

    #[test]
    fn ct_eq_matches_plain_equality() {
        assert!(ct_eq(b"abc", b"abc"));
        assert!(!ct_eq(b"abc", b"abd"));
        assert!(!ct_eq(b"abc", b"ab"));
    }
}
