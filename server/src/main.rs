use config::ServerConfig;
use log::{info, warn};
use std::env;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = ServerConfig::load(ServerConfig::default_path())?;
    env::set_var("RUST_LOG", &cfg.log_level);
    env_logger::init();

    let master_key = env::var(&cfg.master_key_env_var).unwrap_or_else(|_| {
        warn!("{} not set; using an insecure default for local runs", cfg.master_key_env_var);
        "insecure_default_master_key_32b".to_string()
    });

    let (listener, engine) = server::bind(&cfg, master_key.as_bytes()).await?;
    info!("listening on {}", listener.local_addr()?);

    tokio::spawn(server::ticker::run(engine.clone(), Duration::from_secs(cfg.tick_interval_seconds)));

    server::accept_loop(listener, engine).await
}
