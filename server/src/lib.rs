#![allow(warnings)]
pub mod conn;
pub mod errors;
pub mod snapshot_file;
pub mod ticker;

use common::{RequestWrapper, ResponseWrapper};
use config::ServerConfig;
use conn::SharedEngine;
use futures_util::{SinkExt, StreamExt};
use log::error;
use protocol::public_chain::PublicParams;
use protocol::ProtocolEngine;
use snapshot_file::EncryptedFileSnapshotStore;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;

/// Builds the shared engine and binds the listening socket, without
/// accepting any connections yet. Split out from [`accept_loop`] so tests
/// can bind to an ephemeral port and learn the real address before serving.
pub async fn bind(cfg: &ServerConfig, master_key: &[u8]) -> anyhow::Result<(TcpListener, SharedEngine)> {
    let store = EncryptedFileSnapshotStore::new(PathBuf::from(&cfg.snapshot_path), master_key);
    let params = PublicParams::new(cfg.public_seed_bytes()?, cfg.public_salt_bytes()?);
    let engine =
        ProtocolEngine::restore_or_new(params, cfg.initial_secret_bytes()?, store, cfg.max_future_ticks)?;
    let engine: SharedEngine = Arc::new(Mutex::new(engine));

    let listener = TcpListener::bind(&cfg.bind_addr).await?;
    Ok((listener, engine))
}

/// Accepts connections forever, spawning one task per connection. Never returns.
pub async fn accept_loop(listener: TcpListener, engine: SharedEngine) -> anyhow::Result<()> {
    loop {
        let (stream, peer_addr) = listener.accept().await?;
        let engine = engine.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, engine).await {
                error!("connection from {} ended with error: {}", peer_addr, e);
            }
        });
    }
}

async fn handle_connection(stream: TcpStream, engine: SharedEngine) -> anyhow::Result<()> {
    let ws_stream = tokio_tungstenite::accept_async(stream).await?;
    let (mut write, mut read) = ws_stream.split();

    while let Some(msg) = read.next().await {
        let msg = msg?;
        let text = match msg {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };

        let request: RequestWrapper = match serde_json::from_str(text.as_str()) {
            Ok(req) => req,
            Err(e) => {
                error!("failed to parse request: {}", e);
                continue;
            }
        };

        let body = match conn::dispatch(&engine, request.body).await {
            Ok(reply) => Ok(reply),
            Err(e) => Err(e.to_string()),
        };
        let response = ResponseWrapper { request_id: request.request_id, body };
        let response_text = serde_json::to_string(&response)?;
        write.send(Message::Text(response_text.into())).await?;
    }

    Ok(())
}
