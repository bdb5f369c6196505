//! The private, server-only ratcheting chain: `S_t` (the release chain) and
//! `secret_t` (the ratcheting keying material that drives it), advanced
//! together as one unit so neither can be stepped without the other.

use crate::constants::{EVOLVE_TAG, HASH_LENGTH, RATCHET_INFO, RATCHET_SALT, RELEASE_TAG};
use crate::errors::CoreError;
use crate::primitives::{hkdf, mac};
use crate::public_chain::PublicChain;
use arrayref::array_ref;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// `(S, secret, current_t)`, moved and persisted as a single unit.
///
/// Invariant: `current_t` never decreases across the process lifetime or
/// across snapshot restores. Invariant: `S` and `secret` together determine
/// all future `(S', secret')`; neither alone suffices.
#[derive(Clone, Zeroize, ZeroizeOnDrop, Serialize, Deserialize)]
pub struct PrivateState {
    s: [u8; HASH_LENGTH],
    secret: [u8; HASH_LENGTH],
    #[zeroize(skip)]
    current_t: u64,
}

impl std::fmt::Debug for PrivateState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateState")
            .field("s", &"<redacted>")
            .field("secret", &"<redacted>")
            .field("current_t", &self.current_t)
            .finish()
    }
}

impl PrivateState {
    pub fn new(s: [u8; HASH_LENGTH], secret: [u8; HASH_LENGTH], current_t: u64) -> Self {
        Self { s, secret, current_t }
    }

    pub fn current_t(&self) -> u64 {
        self.current_t
    }

    pub fn s(&self) -> [u8; HASH_LENGTH] {
        self.s
    }

    pub fn secret(&self) -> [u8; HASH_LENGTH] {
        self.secret
    }

    /// One ratchet step, advancing `(s, secret)` from tick `t` to `t + 1`.
    ///
    /// `S_{t+1} = MAC(S_t, "EVOLVE" || X_t || secret_t || encode_u64_be(t))`
    /// `secret_{t+1} = HKDF(secret_t, 32, salt="ratchet", info="server_secret_ratchet")`
    fn step(
        s: [u8; HASH_LENGTH],
        secret: [u8; HASH_LENGTH],
        x_t: [u8; HASH_LENGTH],
        t: u64,
    ) -> Result<([u8; HASH_LENGTH], [u8; HASH_LENGTH]), CoreError> {
        let mut msg = Vec::with_capacity(EVOLVE_TAG.len() + HASH_LENGTH * 2 + 8);
        msg.extend_from_slice(EVOLVE_TAG);
        msg.extend_from_slice(&x_t);
        msg.extend_from_slice(&secret);
        msg.extend_from_slice(&t.to_be_bytes());
        let next_s = mac(&s, &msg);

        let expanded = hkdf(&secret, HASH_LENGTH, RATCHET_SALT, RATCHET_INFO)?;
        let next_secret = *array_ref!(expanded, 0, HASH_LENGTH);

        Ok((next_s, next_secret))
    }

    /// Pure projection of `(s, secret, current_t)` forward to `target_t`,
    /// pulling public-chain values from `chain` as needed. Used both by
    /// `advance_to` (written back to `self`) and by the protocol engine's
    /// encrypt-time simulation (discarded after use), so the two paths
    /// cannot diverge.
    pub fn project(
        mut s: [u8; HASH_LENGTH],
        mut secret: [u8; HASH_LENGTH],
        current_t: u64,
        target_t: u64,
        chain: &mut PublicChain,
    ) -> Result<([u8; HASH_LENGTH], [u8; HASH_LENGTH]), CoreError> {
        let mut t = current_t;
        while t < target_t {
            let x_t = chain.get(t);
            let (next_s, next_secret) = Self::step(s, secret, x_t, t)?;
            s = next_s;
            secret = next_secret;
            t += 1;
        }
        Ok((s, secret))
    }

    /// Advances `(S, secret, current_t)` to `target_t`. A no-op if
    /// `target_t <= current_t` (monotonicity). Post-condition:
    /// `self.current_t() >= target_t`.
    pub fn advance_to(&mut self, target_t: u64, chain: &mut PublicChain) -> Result<(), CoreError> {
        if target_t <= self.current_t {
            return Ok(());
        }
        let (s, secret) = Self::project(self.s, self.secret, self.current_t, target_t, chain)?;
        self.s = s;
        self.secret = secret;
        self.current_t = target_t;
        Ok(())
    }

    /// `release(t) = MAC(S_t, "RELEASE")`, evaluated at the current `S`.
    pub fn release_value(&self) -> [u8; HASH_LENGTH] {
        mac(&self.s, RELEASE_TAG)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::public_chain::{PublicChain, PublicParams};

    fn chain() -> PublicChain {
        PublicChain::new(PublicParams::new([0u8; HASH_LENGTH], [0u8; HASH_LENGTH]))
    }

    #[test]
    fn advance_to_past_tick_is_noop() {
        let mut chain = chain();
        let mut state = PrivateState::new([0u8; HASH_LENGTH], [0u8; HASH_LENGTH], 5);
        let s_before = state.s();
        state.advance_to(3, &mut chain).unwrap();
        assert_eq!(state.current_t(), 5);
        assert_eq!(state.s(), s_before);
    }

    #[test]
    fn advance_to_reaches_at_least_target() {
        let mut chain = chain();
        let mut state = PrivateState::new([0u8; HASH_LENGTH], [0u8; HASH_LENGTH], 0);
        state.advance_to(7, &mut chain).unwrap();
        assert_eq!(state.current_t(), 7);
    }

    #[test]
    fn project_matches_stepwise_advance() {
        let mut chain_a = chain();
        let mut chain_b = chain();
        let mut state = PrivateState::new([0u8; HASH_LENGTH], [0u8; HASH_LENGTH], 0);
        state.advance_to(4, &mut chain_a).unwrap();

        let (s, secret) =
            PrivateState::project([0u8; HASH_LENGTH], [0u8; HASH_LENGTH], 0, 4, &mut chain_b)
                .unwrap();
        assert_eq!(state.s(), s);
        assert_eq!(state.secret(), secret);
    }

    #[test]
    fn secret_evolves_each_step() {
        let mut chain = chain();
        let mut state = PrivateState::new([0u8; HASH_LENGTH], [1u8; HASH_LENGTH], 0);
        let secret0 = state.secret();
        state.advance_to(1, &mut chain).unwrap();
        assert_ne!(state.secret(), secret0);
    }

    #[test]
    fn evolve_and_release_domains_are_separate() {
        // "EVOLVE" and "RELEASE" have distinct prefixes, so for any reachable S
        // their MAC outputs diverge with overwhelming probability; a direct
        // equality check over many S values is the practical proxy.
        let mut chain = chain();
        let mut state = PrivateState::new([3u8; HASH_LENGTH], [4u8; HASH_LENGTH], 0);
        for t in 0..10u64 {
            let release = state.release_value();
            state.advance_to(t + 1, &mut chain).unwrap();
            assert_ne!(release, state.s());
        }
    }
}
