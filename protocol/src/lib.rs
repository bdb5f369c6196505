//! Core cryptographic engine for the time-bound release protocol: a public
//! hash chain, a private ratcheting chain, and the window-key derivation and
//! gating logic that ties the two together.

pub mod constants;
pub mod engine;
pub mod errors;
pub mod primitives;
pub mod private_state;
pub mod public_chain;
pub mod snapshot;
pub mod window_key;

pub use engine::{EncryptedBundle, ProtocolEngine, ReleasedKeys};
pub use errors::{ChainError, CoreError};
pub use private_state::PrivateState;
pub use public_chain::{PublicChain, PublicParams};
pub use snapshot::{InMemorySnapshotStore, Snapshot, SnapshotStore};
