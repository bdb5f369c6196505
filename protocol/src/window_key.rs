//! Combines the public checksum and the private release value into the
//! final AEAD key. Both server (at encrypt) and recipient (after release)
//! compute this identically; neither `K_public` nor `K_private` alone is
//! sufficient.

use crate::constants::{AES256_SECRET_LENGTH, HASH_LENGTH, WINDOW_KEY_INFO, WINDOW_KEY_SALT};
use crate::errors::CoreError;
use crate::primitives::hkdf;
use arrayref::array_ref;

/// `K_final = HKDF(K_public || K_private, 32, salt="encryption", info="aes_gcm_key")`.
pub fn derive_window_key(
    k_public: &[u8; HASH_LENGTH],
    k_private: &[u8; HASH_LENGTH],
) -> Result<[u8; AES256_SECRET_LENGTH], CoreError> {
    let mut ikm = Vec::with_capacity(HASH_LENGTH * 2);
    ikm.extend_from_slice(k_public);
    ikm.extend_from_slice(k_private);
    let okm = hkdf(&ikm, AES256_SECRET_LENGTH, WINDOW_KEY_SALT, WINDOW_KEY_INFO)?;
    Ok(*array_ref!(okm, 0, AES256_SECRET_LENGTH))
}
