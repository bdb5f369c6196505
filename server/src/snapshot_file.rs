//! A [`SnapshotStore`] backed by a single file, sealed under a master key.
//!
//! Grounded in the original server's `_encrypt_blob`/`_decrypt_blob`/
//! `_save_state`/`_load_state` pattern: the secret fields never touch disk
//! unsealed. Where the original used SQLite, this writes to a temp file and
//! renames it over the target, which is atomic on the same filesystem and
//! avoids adding a database dependency the rest of this crate has no other
//! use for.

use protocol::constants::HASH_LENGTH;
use protocol::errors::CoreError;
use protocol::primitives::{aead_open, aead_seal, h};
use protocol::snapshot::{Snapshot, SnapshotStore};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;

#[derive(Debug)]
pub enum FileSnapshotError {
    Io(io::Error),
    Serialize(bincode::Error),
    Decrypt(CoreError),
}

impl std::fmt::Display for FileSnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileSnapshotError::Io(e) => write!(f, "i/o error: {}", e),
            FileSnapshotError::Serialize(e) => write!(f, "serialization error: {}", e),
            FileSnapshotError::Decrypt(e) => write!(f, "failed to decrypt snapshot: {}", e),
        }
    }
}

impl std::error::Error for FileSnapshotError {}

impl From<io::Error> for FileSnapshotError {
    fn from(value: io::Error) -> Self {
        FileSnapshotError::Io(value)
    }
}

impl From<bincode::Error> for FileSnapshotError {
    fn from(value: bincode::Error) -> Self {
        FileSnapshotError::Serialize(value)
    }
}

// Plaintext wire shape sealed under the master key; `current_t` stays
// separate from the AEAD payload so a restore can sanity-check monotonicity
// even if the master key were ever rotated (it is never served in the clear).
#[derive(Serialize, Deserialize)]
struct SealedFields {
    secret: [u8; HASH_LENGTH],
    s: [u8; HASH_LENGTH],
}

pub struct EncryptedFileSnapshotStore {
    path: PathBuf,
    master_key: [u8; HASH_LENGTH],
    last_t: Option<u64>,
}

impl EncryptedFileSnapshotStore {
    pub fn new(path: PathBuf, master_key_material: &[u8]) -> Self {
        Self { path, master_key: h(master_key_material), last_t: None }
    }
}

impl SnapshotStore for EncryptedFileSnapshotStore {
    type Error = FileSnapshotError;

    fn save(&mut self, snapshot: &Snapshot) -> Result<(), Self::Error> {
        if let Some(last_t) = self.last_t {
            if snapshot.current_t < last_t {
                return Err(FileSnapshotError::Decrypt(CoreError::StateCorruption(format!(
                    "current_t regressed: had {}, got {}",
                    last_t, snapshot.current_t
                ))));
            }
        }

        let sealed = SealedFields { secret: snapshot.secret, s: snapshot.s };
        let plaintext = bincode::serialize(&sealed)?;
        let (nonce, ciphertext) = aead_seal(&self.master_key, &plaintext)
            .map_err(FileSnapshotError::Decrypt)?;

        let on_disk = OnDiskSnapshot {
            public_seed: snapshot.public_seed,
            public_salt: snapshot.public_salt,
            current_t: snapshot.current_t,
            nonce,
            ciphertext,
        };
        let bytes = bincode::serialize(&on_disk)?;

        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, bytes)?;
        fs::rename(&tmp_path, &self.path)?;

        self.last_t = Some(snapshot.current_t);
        Ok(())
    }

    fn load(&mut self) -> Result<Option<Snapshot>, Self::Error> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let on_disk: OnDiskSnapshot = bincode::deserialize(&bytes)?;
        let plaintext = aead_open(&self.master_key, &on_disk.nonce, &on_disk.ciphertext)
            .map_err(FileSnapshotError::Decrypt)?;
        let sealed: SealedFields = bincode::deserialize(&plaintext)?;

        self.last_t = Some(on_disk.current_t);
        Ok(Some(Snapshot {
            public_seed: on_disk.public_seed,
            public_salt: on_disk.public_salt,
            secret: sealed.secret,
            s: sealed.s,
            current_t: on_disk.current_t,
        }))
    }
}

#[derive(Serialize, Deserialize)]
struct OnDiskSnapshot {
    public_seed: [u8; HASH_LENGTH],
    public_salt: [u8; HASH_LENGTH],
    current_t: u64,
    nonce: [u8; protocol::constants::AES256_NONCE_LENGTH],
    ciphertext: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_disk() {
        let path = std::env::temp_dir().join("snapshot-roundtrip-test.bin");
        let _ = fs::remove_file(&path);

        let mut store = EncryptedFileSnapshotStore::new(path.clone(), b"test master key");
        assert!(store.load().unwrap().is_none());

        let snap = Snapshot {
            public_seed: [1u8; HASH_LENGTH],
            public_salt: [2u8; HASH_LENGTH],
            secret: [3u8; HASH_LENGTH],
            s: [4u8; HASH_LENGTH],
            current_t: 12,
        };
        store.save(&snap).unwrap();

        let mut reloaded = EncryptedFileSnapshotStore::new(path.clone(), b"test master key");
        let loaded = reloaded.load().unwrap().unwrap();
        assert_eq!(loaded.current_t, 12);
        assert_eq!(loaded.s, [4u8; HASH_LENGTH]);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn rejects_current_t_regression() {
        let path = std::env::temp_dir().join("snapshot-regress-test.bin");
        let _ = fs::remove_file(&path);

        let mut store = EncryptedFileSnapshotStore::new(path.clone(), b"test master key");
        store
            .save(&Snapshot {
                public_seed: [0u8; HASH_LENGTH],
                public_salt: [0u8; HASH_LENGTH],
                secret: [0u8; HASH_LENGTH],
                s: [0u8; HASH_LENGTH],
                current_t: 10,
            })
            .unwrap();

        let result = store.save(&Snapshot {
            public_seed: [0u8; HASH_LENGTH],
            public_salt: [0u8; HASH_LENGTH],
            secret: [0u8; HASH_LENGTH],
            s: [0u8; HASH_LENGTH],
            current_t: 5,
        });
        assert!(result.is_err());

        let _ = fs::remove_file(&path);
    }
}
