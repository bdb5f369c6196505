//! Per-connection request dispatch: turns an [`Action`] into a [`Reply`] by
//! driving the shared [`ProtocolEngine`].

use crate::errors::ServerError;
use crate::snapshot_file::EncryptedFileSnapshotStore;
use base64::Engine as _;
use common::{decode_fixed, encode, Action, AppError, Reply};
use protocol::constants::HASH_LENGTH;
use protocol::public_chain::PublicParams;
use protocol::ProtocolEngine;
use rand::RngCore;
use std::sync::Arc;
use tokio::sync::Mutex;

pub type SharedEngine = Arc<Mutex<ProtocolEngine<EncryptedFileSnapshotStore>>>;

pub async fn dispatch(engine: &SharedEngine, action: Action) -> Result<Reply, ServerError> {
    match action {
        Action::Encrypt { plaintext_b64, t_start, t_end } => {
            let plaintext = base64::engine::general_purpose::STANDARD
                .decode(&plaintext_b64)
                .map_err(|_| AppError::Encoding("plaintext_b64"))?;
            let mut engine = engine.lock().await;
            let bundle = engine.encrypt_for_window(&plaintext, t_start, t_end)?;
            Ok(Reply::Encrypted {
                nonce_b64: encode(&bundle.nonce),
                ciphertext_b64: encode(&bundle.ciphertext),
                t_start: bundle.t_start,
                t_end: bundle.t_end,
            })
        }
        Action::Release { checksum_b64, t_start, t_end } => {
            let checksum: [u8; HASH_LENGTH] = decode_fixed(&checksum_b64, "checksum_b64")?;
            let mut engine = engine.lock().await;
            let released = engine.verify_and_release(&checksum, t_start, t_end)?;
            Ok(Reply::Released {
                k_public_b64: encode(&released.k_public),
                k_private_b64: encode(&released.k_private),
            })
        }
        Action::Status => {
            let engine = engine.lock().await;
            Ok(Reply::Status {
                current_t: engine.current_t(),
                public_history_len: engine.public_history_len(),
            })
        }
        Action::Reset => {
            if !cfg!(debug_assertions) {
                return Err(ServerError::App(AppError::InvalidRequest));
            }
            let mut seed = [0u8; HASH_LENGTH];
            let mut salt = [0u8; HASH_LENGTH];
            let mut secret = [0u8; HASH_LENGTH];
            rand::rngs::OsRng.fill_bytes(&mut seed);
            rand::rngs::OsRng.fill_bytes(&mut salt);
            rand::rngs::OsRng.fill_bytes(&mut secret);

            let mut engine = engine.lock().await;
            engine.reset(PublicParams::new(seed, salt), secret)?;
            Ok(Reply::Reset)
        }
    }
}
