//! The public, non-Markovian hash chain and its window checksum.
//!
//! `X_{t+1} = H( X_t || X_{t-1} || public_salt || encode_u64_be(t) )`, with
//! `X_{-1}` fixed at thirty-two zero bytes. Dependence on *two* previous
//! values is deliberate: a later entry cannot be produced without computing
//! every earlier one first.

use crate::constants::HASH_LENGTH;
use crate::errors::ChainError;
use crate::primitives::h;
use serde::{Deserialize, Serialize};

/// Immutable per-server-lifetime parameters seeding the public chain.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PublicParams {
    pub public_seed: [u8; HASH_LENGTH],
    pub public_salt: [u8; HASH_LENGTH],
}

impl PublicParams {
    pub fn new(public_seed: [u8; HASH_LENGTH], public_salt: [u8; HASH_LENGTH]) -> Self {
        Self { public_seed, public_salt }
    }
}

/// An in-memory memoization of the chain prefix computed so far. Pure
/// derived state: it may be dropped and rebuilt from [`PublicParams`] at any
/// time without affecting correctness.
#[derive(Clone, Debug)]
pub struct PublicChain {
    params: PublicParams,
    // history[0] == X_0, history[t] == X_t
    history: Vec<[u8; HASH_LENGTH]>,
}

impl PublicChain {
    /// Creates a chain cache seeded with `X_0 = public_seed`.
    pub fn new(params: PublicParams) -> Self {
        let x0 = params.public_seed;
        Self { params, history: vec![x0] }
    }

    pub fn params(&self) -> &PublicParams {
        &self.params
    }

    /// How many entries (`X_0 ..= X_{len-1}`) are currently cached.
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Extends the cache, if necessary, so that `X_t` is available. Pure and
    /// idempotent: calling it twice with the same or smaller `t` is a no-op.
    pub fn extend_to(&mut self, t: u64) {
        let target_len = t as usize + 1;
        if target_len <= self.history.len() {
            return;
        }

        let zero_prev = [0u8; HASH_LENGTH];
        let mut prev = if self.history.len() >= 2 {
            self.history[self.history.len() - 2]
        } else {
            zero_prev
        };
        let mut curr = *self.history.last().expect("history always has X_0");

        // history currently holds X_0 ..= X_{k}; step index for producing
        // X_{k+1} is k.
        let mut k = self.history.len() as u64 - 1;
        while (self.history.len() as u64) <= t {
            let next = step(&curr, &prev, &self.params.public_salt, k);
            self.history.push(next);
            prev = curr;
            curr = next;
            k += 1;
        }
    }

    /// `X_t`, extending the cache first if needed.
    pub fn get(&mut self, t: u64) -> [u8; HASH_LENGTH] {
        self.extend_to(t);
        self.history[t as usize]
    }

    /// `K_public(t_start, t_end) = H( X_{t_start} || ... || X_{t_end} )`.
    ///
    /// Extends the cache to `t_end` first; fails if `t_start > t_end`.
    pub fn window_checksum(
        &mut self,
        t_start: u64,
        t_end: u64,
    ) -> Result<[u8; HASH_LENGTH], ChainError> {
        if t_start > t_end {
            return Err(ChainError::WindowOutOfRange { t_start, t_end });
        }
        self.extend_to(t_end);

        let mut buf = Vec::with_capacity((t_end - t_start + 1) as usize * HASH_LENGTH);
        for t in t_start..=t_end {
            buf.extend_from_slice(&self.history[t as usize]);
        }
        Ok(h(&buf))
    }
}

fn step(
    curr: &[u8; HASH_LENGTH],
    prev: &[u8; HASH_LENGTH],
    public_salt: &[u8; HASH_LENGTH],
    t: u64,
) -> [u8; HASH_LENGTH] {
    let mut buf = Vec::with_capacity(HASH_LENGTH * 3 + 8);
    buf.extend_from_slice(curr);
    buf.extend_from_slice(prev);
    buf.extend_from_slice(public_salt);
    buf.extend_from_slice(&t.to_be_bytes());
    h(&buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> PublicParams {
        PublicParams::new([0u8; HASH_LENGTH], [0u8; HASH_LENGTH])
    }

    #[test]
    fn deterministic_for_same_seed_and_salt() {
        let mut c1 = PublicChain::new(params());
        let mut c2 = PublicChain::new(params());
        assert_eq!(c1.get(10), c2.get(10));
    }

    #[test]
    fn extend_to_is_idempotent() {
        let mut chain = PublicChain::new(params());
        let x5 = chain.get(5);
        chain.extend_to(2);
        assert_eq!(chain.get(5), x5);
    }

    #[test]
    fn checksum_depends_only_on_seed_salt_and_window() {
        let mut c1 = PublicChain::new(params());
        let mut c2 = PublicChain::new(params());
        assert_eq!(c1.window_checksum(3, 7).unwrap(), c2.window_checksum(3, 7).unwrap());
    }

    #[test]
    fn checksum_rejects_inverted_window() {
        let mut chain = PublicChain::new(params());
        assert!(chain.window_checksum(5, 2).is_err());
    }

    #[test]
    fn non_markovian_dependency_on_second_predecessor() {
        // X_2 for salt A should differ if X_0 changes, holding X_1 fixed is not
        // directly testable without breaking the hash, but we can at least
        // confirm two different seeds diverge beyond X_0.
        let mut a = PublicChain::new(PublicParams::new([1u8; HASH_LENGTH], [0u8; HASH_LENGTH]));
        let mut b = PublicChain::new(PublicParams::new([2u8; HASH_LENGTH], [0u8; HASH_LENGTH]));
        assert_ne!(a.get(3), b.get(3));
    }
}
