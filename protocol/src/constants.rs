// byte size of a SHA-256 digest, and of every chain value and secret in this protocol
pub const HASH_LENGTH: usize = 32;
// byte size of an aes256 key
pub const AES256_SECRET_LENGTH: usize = 32;
// byte size of aes256 nonce
pub const AES256_NONCE_LENGTH: usize = 12;
// byte size of the tag AES-256-GCM appends to its ciphertext
pub const AES256_TAG_LENGTH: usize = 16;

/// Default upper bound on how far into the future a window may extend past `current_t`.
pub const MAX_FUTURE_TICKS: u64 = 100;

/// Domain-separation tag prepended to the private chain's evolve-step MAC input.
pub const EVOLVE_TAG: &[u8] = b"EVOLVE";
/// Domain-separation tag used for the release-value MAC.
pub const RELEASE_TAG: &[u8] = b"RELEASE";

pub const RATCHET_SALT: &[u8] = b"ratchet";
pub const RATCHET_INFO: &[u8] = b"server_secret_ratchet";

pub const WINDOW_KEY_SALT: &[u8] = b"encryption";
pub const WINDOW_KEY_INFO: &[u8] = b"aes_gcm_key";
