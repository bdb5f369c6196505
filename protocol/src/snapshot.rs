//! Abstract persistence for [`PrivateState`](crate::private_state::PrivateState).
//!
//! The core depends only on this opaque pair of operations; it does not
//! know or care whether the concrete implementation is a file, a database,
//! or memory. The contract (spec §4.F): `save` is serialized with respect
//! to itself, a `load` after a successful `save` yields those exact
//! fields, and `current_t` never regresses across successive saves.

use crate::constants::HASH_LENGTH;
use serde::{Deserialize, Serialize};

/// The full persisted record: public params plus the private chain state.
/// `secret`/`s` are given to the store in the clear (it is the store's
/// job to seal them, e.g. under a master key, before they touch disk).
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Snapshot {
    pub public_seed: [u8; HASH_LENGTH],
    pub public_salt: [u8; HASH_LENGTH],
    pub secret: [u8; HASH_LENGTH],
    pub s: [u8; HASH_LENGTH],
    pub current_t: u64,
}

/// Implemented by whatever host embeds the engine (a file, a KV store, a
/// test double). `save`/`load` are the only points where the core's state
/// crosses a trust or process boundary.
pub trait SnapshotStore: Send {
    type Error: std::error::Error + Send + Sync + 'static;

    fn save(&mut self, snapshot: &Snapshot) -> Result<(), Self::Error>;
    fn load(&mut self) -> Result<Option<Snapshot>, Self::Error>;
}

/// A `Mutex`-free, process-local store backed by a single `Option<Snapshot>`.
/// Used by the engine's own tests and as the default when no durable store
/// is configured.
#[derive(Default)]
pub struct InMemorySnapshotStore {
    slot: Option<Snapshot>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug)]
pub struct Infallible;

impl std::fmt::Display for Infallible {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unreachable")
    }
}

impl std::error::Error for Infallible {}

impl SnapshotStore for InMemorySnapshotStore {
    type Error = Infallible;

    fn save(&mut self, snapshot: &Snapshot) -> Result<(), Self::Error> {
        self.slot = Some(snapshot.clone());
        Ok(())
    }

    fn load(&mut self) -> Result<Option<Snapshot>, Self::Error> {
        Ok(self.slot.clone())
    }
}
