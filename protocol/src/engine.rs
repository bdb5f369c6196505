//! The Protocol Engine: the only entry point a host (the `server` binary)
//! talks to. Owns the public chain cache and the private ratcheting state,
//! and is the sole place that decides whether an encrypt or a release is
//! permitted at a given tick.

use crate::constants::{AES256_NONCE_LENGTH, HASH_LENGTH};
use crate::errors::CoreError;
use crate::primitives::{aead_open, aead_seal, ct_eq, mac};
use crate::private_state::PrivateState;
use crate::public_chain::{PublicChain, PublicParams};
use crate::snapshot::{Snapshot, SnapshotStore};
use crate::window_key::derive_window_key;
use log::{debug, info, warn};

/// Everything a recipient needs to decrypt once the window's keys are released.
#[derive(Debug)]
pub struct EncryptedBundle {
    pub nonce: [u8; AES256_NONCE_LENGTH],
    pub ciphertext: Vec<u8>,
    pub t_start: u64,
    pub t_end: u64,
}

/// The two halves released to a recipient holding a valid checksum at the right tick.
#[derive(Debug)]
pub struct ReleasedKeys {
    pub k_public: [u8; HASH_LENGTH],
    pub k_private: [u8; HASH_LENGTH],
}

/// Drives the dual-chain state machine forward and gates every encrypt/release
/// through the preconditions in this module's doc comments.
pub struct ProtocolEngine<S: SnapshotStore> {
    chain: PublicChain,
    private: PrivateState,
    store: S,
    max_future_ticks: u64,
}

impl<S: SnapshotStore> ProtocolEngine<S> {
    /// Starts a fresh engine at `t = 0` with freshly generated chain/secret seeds.
    pub fn new(
        params: PublicParams,
        initial_secret: [u8; HASH_LENGTH],
        store: S,
        max_future_ticks: u64,
    ) -> Self {
        Self {
            chain: PublicChain::new(params),
            private: PrivateState::new([0u8; HASH_LENGTH], initial_secret, 0),
            store,
            max_future_ticks,
        }
    }

    /// Restores an engine from whatever the store currently holds, falling
    /// back to a fresh one if the store is empty.
    pub fn restore_or_new(
        params: PublicParams,
        initial_secret: [u8; HASH_LENGTH],
        mut store: S,
        max_future_ticks: u64,
    ) -> Result<Self, CoreError>
    where
        S::Error: std::fmt::Display,
    {
        let loaded = store
            .load()
            .map_err(|e| CoreError::StateCorruption(e.to_string()))?;
        match loaded {
            Some(snap) => {
                info!("restored protocol state at t={}", snap.current_t);
                let restored_params = PublicParams::new(snap.public_seed, snap.public_salt);
                Ok(Self {
                    chain: PublicChain::new(restored_params),
                    private: PrivateState::new(snap.s, snap.secret, snap.current_t),
                    store,
                    max_future_ticks,
                })
            }
            None => {
                info!("no snapshot found, starting fresh at t=0");
                Ok(Self::new(params, initial_secret, store, max_future_ticks))
            }
        }
    }

    pub fn current_t(&self) -> u64 {
        self.private.current_t()
    }

    pub fn params(&self) -> &PublicParams {
        self.chain.params()
    }

    /// How many public chain entries (`X_0 ..= X_{len-1}`) are currently cached.
    pub fn public_history_len(&self) -> usize {
        self.chain.len()
    }

    /// Advances the server's own clock by one tick, evolving the private
    /// chain in lock-step and persisting the result.
    pub fn tick(&mut self) -> Result<(), CoreError>
    where
        S::Error: std::fmt::Display,
    {
        let next_t = self.private.current_t() + 1;
        self.private.advance_to(next_t, &mut self.chain)?;
        self.persist()
    }

    /// Discards all chain and ratchet state and starts over at `t = 0` with
    /// fresh seeds. Irreversible: any outstanding window becomes impossible
    /// to verify. Hosts should gate calling this to trusted/debug contexts.
    pub fn reset(&mut self, params: PublicParams, initial_secret: [u8; HASH_LENGTH]) -> Result<(), CoreError>
    where
        S::Error: std::fmt::Display,
    {
        self.chain = PublicChain::new(params);
        self.private = PrivateState::new([0u8; HASH_LENGTH], initial_secret, 0);
        self.persist()
    }

    /// Encrypts `plaintext` under the future window `[t_start, t_end]`.
    ///
    /// Preconditions, in order:
    /// - `InvalidWindow` if `t_start > t_end`
    /// - `WindowPassed` if `current_t > t_end`
    /// - `WindowTooFarInFuture` if `t_end > current_t + max_future_ticks`
    ///
    /// Does not mutate the canonical private chain: `K_private` is derived
    /// from a pure projection of `(S, secret)` forward to `t_end`, discarded
    /// after use, via the same [`PrivateState::project`] the real advance uses.
    pub fn encrypt_for_window(
        &mut self,
        plaintext: &[u8],
        t_start: u64,
        t_end: u64,
    ) -> Result<EncryptedBundle, CoreError> {
        if t_start > t_end {
            return Err(CoreError::InvalidWindow { t_start, t_end });
        }
        let current_t = self.private.current_t();
        if current_t > t_end {
            return Err(CoreError::WindowPassed { current_t, t_end });
        }
        if t_end > current_t + self.max_future_ticks {
            return Err(CoreError::WindowTooFarInFuture {
                current_t,
                t_end,
                max_future_ticks: self.max_future_ticks,
            });
        }

        let k_public = self.chain.window_checksum(t_start, t_end)?;
        let (simulated_s, _) =
            PrivateState::project(self.private.s(), self.private.secret(), current_t, t_end, &mut self.chain)?;
        let k_private = mac(&simulated_s, crate::constants::RELEASE_TAG);

        let key = derive_window_key(&k_public, &k_private)?;
        let (nonce, ciphertext) = aead_seal(&key, plaintext)?;

        debug!("encrypted {} bytes for window [{}, {}]", plaintext.len(), t_start, t_end);
        Ok(EncryptedBundle { nonce, ciphertext, t_start, t_end })
    }

    /// Decrypts a bundle once its window's keys have already been released
    /// (e.g. on the server's own side, or by a recipient that reconstructs
    /// `K_final` from the released halves). Exposed mainly for tests and for
    /// hosts that want to verify a round trip before releasing for real.
    pub fn decrypt_with_keys(
        bundle: &EncryptedBundle,
        keys: &ReleasedKeys,
    ) -> Result<Vec<u8>, CoreError> {
        let key = derive_window_key(&keys.k_public, &keys.k_private)?;
        aead_open(&key, &bundle.nonce, &bundle.ciphertext)
    }

    /// Verifies a recipient-submitted checksum against the window
    /// `[t_start, t_end]` and, if valid and the window is exactly live,
    /// releases both key halves and burns the private chain forward so the
    /// release can never be reproduced.
    ///
    /// Preconditions, in order (spec order: checksum before liveness):
    /// - `WindowTooFarInFuture` if `t_end > current_t + max_future_ticks`
    /// - `InvalidChecksum` if `checksum != K_public(t_start, t_end)`
    /// - `WindowExpired` if `t_end < current_t`
    /// - `TooEarly` if `t_end > current_t`
    ///
    /// Release is permitted only when `t_end == current_t` exactly.
    pub fn verify_and_release(
        &mut self,
        checksum: &[u8; HASH_LENGTH],
        t_start: u64,
        t_end: u64,
    ) -> Result<ReleasedKeys, CoreError>
    where
        S::Error: std::fmt::Display,
    {
        let current_t = self.private.current_t();
        if t_end > current_t + self.max_future_ticks {
            return Err(CoreError::WindowTooFarInFuture {
                current_t,
                t_end,
                max_future_ticks: self.max_future_ticks,
            });
        }

        let expected = self.chain.window_checksum(t_start, t_end)?;
        if !ct_eq(checksum, &expected) {
            warn!("rejected release request for window [{}, {}]: bad checksum", t_start, t_end);
            return Err(CoreError::InvalidChecksum);
        }

        if t_end < current_t {
            return Err(CoreError::WindowExpired { current_t, t_end });
        }
        if t_end > current_t {
            return Err(CoreError::TooEarly { current_t, t_end });
        }

        // t_end == current_t: the window is exactly live. Capture the release
        // value at this tick, then burn forward so it can never recur.
        let k_private = self.private.release_value();
        self.private.advance_to(t_end + 1, &mut self.chain)?;
        self.persist()?;

        info!("released window [{}, {}] and burned state to t={}", t_start, t_end, t_end + 1);
        Ok(ReleasedKeys { k_public: expected, k_private })
    }

    fn persist(&mut self) -> Result<(), CoreError>
    where
        S::Error: std::fmt::Display,
    {
        let snapshot = Snapshot {
            public_seed: self.chain.params().public_seed,
            public_salt: self.chain.params().public_salt,
            secret: self.private.secret(),
            s: self.private.s(),
            current_t: self.private.current_t(),
        };
        self.store
            .save(&snapshot)
            .map_err(|e| CoreError::StateCorruption(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MAX_FUTURE_TICKS;
    use crate::snapshot::InMemorySnapshotStore;

    fn engine() -> ProtocolEngine<InMemorySnapshotStore> {
        let params = PublicParams::new([1u8; HASH_LENGTH], [2u8; HASH_LENGTH]);
        ProtocolEngine::new(params, [3u8; HASH_LENGTH], InMemorySnapshotStore::new(), MAX_FUTURE_TICKS)
    }

    #[test]
    fn encrypt_rejects_inverted_window() {
        let mut e = engine();
        let err = e.encrypt_for_window(b"hi", 5, 2).unwrap_err();
        assert!(matches!(err, CoreError::InvalidWindow { .. }));
    }

    #[test]
    fn encrypt_rejects_window_already_passed() {
        let mut e = engine();
        e.tick().unwrap();
        e.tick().unwrap();
        let err = e.encrypt_for_window(b"hi", 0, 1).unwrap_err();
        assert!(matches!(err, CoreError::WindowPassed { .. }));
    }

    #[test]
    fn encrypt_rejects_window_too_far_in_future() {
        let mut e = engine();
        let err = e.encrypt_for_window(b"hi", 0, MAX_FUTURE_TICKS + 1).unwrap_err();
        assert!(matches!(err, CoreError::WindowTooFarInFuture { .. }));
    }

    #[test]
    fn release_rejects_bad_checksum() {
        let mut e = engine();
        let err = e.verify_and_release(&[0u8; HASH_LENGTH], 0, 0).unwrap_err();
        assert!(matches!(err, CoreError::InvalidChecksum));
    }

    #[test]
    fn release_rejects_too_early() {
        let mut e = engine();
        let checksum = e.chain.window_checksum(0, 3).unwrap();
        let err = e.verify_and_release(&checksum, 0, 3).unwrap_err();
        assert!(matches!(err, CoreError::TooEarly { .. }));
    }

    #[test]
    fn release_rejects_expired_window() {
        let mut e = engine();
        let checksum = e.chain.window_checksum(0, 0).unwrap();
        e.tick().unwrap();
        e.tick().unwrap();
        let err = e.verify_and_release(&checksum, 0, 0).unwrap_err();
        assert!(matches!(err, CoreError::WindowExpired { .. }));
    }

    #[test]
    fn release_at_exact_tick_succeeds_and_burns_state() {
        let mut e = engine();
        let checksum = e.chain.window_checksum(0, 0).unwrap();
        let released = e.verify_and_release(&checksum, 0, 0).unwrap();
        assert_eq!(released.k_public, checksum);
        assert_eq!(e.current_t(), 1);

        // Re-releasing the same window now fails: it has expired.
        let err = e.verify_and_release(&checksum, 0, 0).unwrap_err();
        assert!(matches!(err, CoreError::WindowExpired { .. }));
    }

    #[test]
    fn encrypt_then_release_round_trips() {
        let mut e = engine();
        let bundle = e.encrypt_for_window(b"hello window", 0, 2).unwrap();
        e.tick().unwrap();
        e.tick().unwrap();
        let checksum = e.chain.window_checksum(0, 2).unwrap();
        let released = e.verify_and_release(&checksum, 0, 2).unwrap();
        let plaintext = ProtocolEngine::<InMemorySnapshotStore>::decrypt_with_keys(&bundle, &released).unwrap();
        assert_eq!(plaintext, b"hello window");
    }

    #[test]
    fn tick_persists_state_across_restore() {
        let params = PublicParams::new([1u8; HASH_LENGTH], [2u8; HASH_LENGTH]);
        let mut e = ProtocolEngine::new(params.clone(), [3u8; HASH_LENGTH], InMemorySnapshotStore::new(), MAX_FUTURE_TICKS);
        e.tick().unwrap();
        e.tick().unwrap();
        e.tick().unwrap();

        let restored =
            ProtocolEngine::restore_or_new(params, [3u8; HASH_LENGTH], e.store, MAX_FUTURE_TICKS).unwrap();
        assert_eq!(restored.current_t(), 3);
    }
}
