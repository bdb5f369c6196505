//! TOML configuration for the server host: network bind address, tick
//! cadence, chain seeds, and snapshot location. Grounded in the teacher's
//! `config.toml` read/modify/write pattern, generalized to cover every
//! field the server binary needs instead of just the key pair.

use protocol::constants::HASH_LENGTH;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Serialize(toml::ser::Error),
    InvalidBase64(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "i/o error: {}", e),
            ConfigError::Parse(e) => write!(f, "failed to parse config: {}", e),
            ConfigError::Serialize(e) => write!(f, "failed to serialize config: {}", e),
            ConfigError::InvalidBase64(field) => write!(f, "field '{}' is not valid base64 of the expected length", field),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(e: toml::ser::Error) -> Self {
        ConfigError::Serialize(e)
    }
}

/// On-disk server configuration. `public_seed`, `public_salt` and
/// `initial_secret` are base64-encoded 32-byte values; `keygen` is the
/// only tool that should ever overwrite them.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub tick_interval_seconds: u64,
    pub max_future_ticks: u64,
    pub snapshot_path: String,
    pub public_seed: String,
    pub public_salt: String,
    pub initial_secret: String,
    pub log_level: String,
    /// Name of the environment variable holding the snapshot master key,
    /// analogous to the original server's `SERVER_MASTER_KEY`.
    pub master_key_env_var: String,
}

impl ServerConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn public_seed_bytes(&self) -> Result<[u8; HASH_LENGTH], ConfigError> {
        decode_32(&self.public_seed, "public_seed")
    }

    pub fn public_salt_bytes(&self) -> Result<[u8; HASH_LENGTH], ConfigError> {
        decode_32(&self.public_salt, "public_salt")
    }

    pub fn initial_secret_bytes(&self) -> Result<[u8; HASH_LENGTH], ConfigError> {
        decode_32(&self.initial_secret, "initial_secret")
    }

    /// Path used when running inside the container image built for this service.
    pub fn default_path() -> &'static str {
        if Path::new("/.dockerenv").exists() {
            "/app/config/config.toml"
        } else {
            "config/config.toml"
        }
    }
}

fn decode_32(value: &str, field: &'static str) -> Result<[u8; HASH_LENGTH], ConfigError> {
    use base64::{engine::general_purpose, Engine as _};
    let bytes = general_purpose::STANDARD
        .decode(value)
        .map_err(|_| ConfigError::InvalidBase64(field))?;
    if bytes.len() != HASH_LENGTH {
        return Err(ConfigError::InvalidBase64(field));
    }
    let mut out = [0u8; HASH_LENGTH];
    out.copy_from_slice(&bytes);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;

    #[test]
    fn round_trips_through_toml() {
        let cfg = ServerConfig {
            bind_addr: "127.0.0.1:9000".into(),
            tick_interval_seconds: 1,
            max_future_ticks: 100,
            snapshot_path: "state.bin".into(),
            public_seed: base64::engine::general_purpose::STANDARD.encode([1u8; 32]),
            public_salt: base64::engine::general_purpose::STANDARD.encode([2u8; 32]),
            initial_secret: base64::engine::general_purpose::STANDARD.encode([3u8; 32]),
            log_level: "info".into(),
            master_key_env_var: "SERVER_MASTER_KEY".into(),
        };
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: ServerConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.public_seed_bytes().unwrap(), [1u8; 32]);
    }

    #[test]
    fn rejects_bad_base64() {
        let cfg = ServerConfig {
            bind_addr: "x".into(),
            tick_interval_seconds: 1,
            max_future_ticks: 1,
            snapshot_path: "x".into(),
            public_seed: "not base64!!".into(),
            public_salt: "".into(),
            initial_secret: "".into(),
            log_level: "info".into(),
            master_key_env_var: "SERVER_MASTER_KEY".into(),
        };
        assert!(cfg.public_seed_bytes().is_err());
    }
}
