//! Wire types shared between the server and any recipient speaking its
//! JSON-over-WebSocket RPC: request/response envelopes, the action enum,
//! and the base64 codec helpers every DTO field needs.

pub mod error;

pub use error::AppError;

use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Every request carries an opaque id the server echoes back unexamined;
/// it plays no role in any MAC or AEAD computation.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct RequestWrapper {
    pub request_id: Uuid,
    pub body: Action,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct ResponseWrapper {
    pub request_id: Uuid,
    pub body: Result<Reply, String>,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Encrypt `plaintext` (base64) under the future window `[t_start, t_end]`.
    Encrypt { plaintext_b64: String, t_start: u64, t_end: u64 },
    /// Submit a checksum for `[t_start, t_end]`; release the keys if it is
    /// valid and the window is exactly live.
    Release { checksum_b64: String, t_start: u64, t_end: u64 },
    /// Report the server's current tick and public chain parameters.
    Status,
    /// Discard all state and start a fresh chain. Only served in debug builds.
    Reset,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reply {
    Encrypted { nonce_b64: String, ciphertext_b64: String, t_start: u64, t_end: u64 },
    Released { k_public_b64: String, k_private_b64: String },
    Status { current_t: u64, public_history_len: usize },
    Reset,
}

/// Decodes `value` as base64 into a fixed-size array, failing with
/// [`AppError::Encoding`] naming `field` if the length doesn't match.
pub fn decode_fixed<const N: usize>(value: &str, field: &'static str) -> Result<[u8; N], AppError> {
    let bytes = general_purpose::STANDARD
        .decode(value)
        .map_err(|_| AppError::Encoding(field))?;
    if bytes.len() != N {
        return Err(AppError::Encoding(field));
    }
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes);
    Ok(out)
}

pub fn encode(bytes: &[u8]) -> String {
    general_purpose::STANDARD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_fixed_rejects_wrong_length() {
        let encoded = encode(&[1u8, 2, 3]);
        let result: Result<[u8; 32], _> = decode_fixed(&encoded, "checksum_b64");
        assert!(result.is_err());
    }

    #[test]
    fn decode_fixed_round_trips() {
        let original = [7u8; 32];
        let encoded = encode(&original);
        let decoded: [u8; 32] = decode_fixed(&encoded, "checksum_b64").unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn action_round_trips_through_json() {
        let action = Action::Encrypt { plaintext_b64: "aGVsbG8=".into(), t_start: 1, t_end: 5 };
        let json = serde_json::to_string(&action).unwrap();
        let parsed: Action = serde_json::from_str(&json).unwrap();
        matches!(parsed, Action::Encrypt { t_start: 1, t_end: 5, .. });
    }
}
