//! Error taxonomy for the dual-chain key-evolution engine.
//!
//! Every error the core can produce surfaces here; none are swallowed
//! internally. Variants never carry secret-derived material, only the
//! public ticks/lengths needed to reconstruct the failure.

use std::fmt::{Display, Formatter};

/// Errors produced by the public chain and window-checksum computation.
#[derive(Debug)]
pub enum ChainError {
    /// `t_start > t_end`, or the chain hasn't been extended to `t_end` yet.
    WindowOutOfRange { t_start: u64, t_end: u64 },
}

impl Display for ChainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ChainError::WindowOutOfRange { t_start, t_end } => {
                write!(f, "window [{}, {}] is out of range", t_start, t_end)
            }
        }
    }
}

impl std::error::Error for ChainError {}

/// Errors produced by the protocol engine (`encrypt_for_window`, `verify_and_release`)
/// and the primitives it calls through to.
#[derive(Debug)]
pub enum CoreError {
    /// `t_start > t_end`.
    InvalidWindow { t_start: u64, t_end: u64 },

    /// At encrypt time, `current_t > t_end`.
    WindowPassed { current_t: u64, t_end: u64 },

    /// `t_end - current_t > MAX_FUTURE_TICKS`.
    WindowTooFarInFuture { current_t: u64, t_end: u64, max_future_ticks: u64 },

    /// At release time, `t_end < current_t`: the keys have already been burned.
    WindowExpired { current_t: u64, t_end: u64 },

    /// At release time, `t_end > current_t`: the window is not live yet.
    TooEarly { current_t: u64, t_end: u64 },

    /// The submitted checksum did not match the recomputed `K_public(t_start, t_end)`.
    InvalidChecksum,

    /// AEAD tag verification failed on decrypt.
    AuthenticationFailure,

    /// The snapshot store's `current_t` regressed, or a loaded snapshot failed to decrypt.
    StateCorruption(String),

    /// Propagated from the public chain.
    Chain(ChainError),

    /// HKDF was asked for an output length its implementation rejects. Unreachable
    /// in practice since every call here requests exactly 32 bytes, but the
    /// underlying API is fallible and the error must still be propagated.
    KeyDerivation,
}

impl Display for CoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CoreError::InvalidWindow { t_start, t_end } => {
                write!(f, "invalid window: t_start {} > t_end {}", t_start, t_end)
            }
            CoreError::WindowPassed { current_t, t_end } => write!(
                f,
                "server already passed t_end (current_t={}, t_end={})",
                current_t, t_end
            ),
            CoreError::WindowTooFarInFuture { current_t, t_end, max_future_ticks } => write!(
                f,
                "window too far in the future: t_end={} current_t={} max_future_ticks={}",
                t_end, current_t, max_future_ticks
            ),
            CoreError::WindowExpired { current_t, t_end } => write!(
                f,
                "window expired: server is at t={}, requested keys for t_end={}; the keys are gone",
                current_t, t_end
            ),
            CoreError::TooEarly { current_t, t_end } => write!(
                f,
                "too early: server is at t={}, requested keys for t_end={}; please wait",
                current_t, t_end
            ),
            CoreError::InvalidChecksum => write!(f, "invalid checksum"),
            CoreError::AuthenticationFailure => write!(f, "AEAD authentication failure"),
            CoreError::StateCorruption(reason) => write!(f, "state corruption: {}", reason),
            CoreError::Chain(e) => write!(f, "{}", e),
            CoreError::KeyDerivation => write!(f, "key derivation failed"),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<ChainError> for CoreError {
    fn from(value: ChainError) -> Self {
        CoreError::Chain(value)
    }
}

impl From<hkdf::InvalidLength> for CoreError {
    fn from(_: hkdf::InvalidLength) -> Self {
        CoreError::KeyDerivation
    }
}

impl From<aes_gcm::Error> for CoreError {
    fn from(_: aes_gcm::Error) -> Self {
        CoreError::AuthenticationFailure
    }
}
