//! Regenerates the public chain seed/salt and the initial private secret in
//! `config.toml`, in place. Run once before a server's first launch, or to
//! rotate to a brand-new chain (which invalidates every outstanding window).

use base64::{engine::general_purpose, Engine as _};
use config::ServerConfig;
use rand::RngCore;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = ServerConfig::default_path();
    let mut cfg = ServerConfig::load(path)?;

    let mut public_seed = [0u8; 32];
    let mut public_salt = [0u8; 32];
    let mut initial_secret = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut public_seed);
    rand::rngs::OsRng.fill_bytes(&mut public_salt);
    rand::rngs::OsRng.fill_bytes(&mut initial_secret);

    cfg.public_seed = general_purpose::STANDARD.encode(public_seed);
    cfg.public_salt = general_purpose::STANDARD.encode(public_salt);
    cfg.initial_secret = general_purpose::STANDARD.encode(initial_secret);

    cfg.save(path)?;
    println!("chain seeds regenerated in {}", path);
    Ok(())
}
