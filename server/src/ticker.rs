//! Background task that advances the server's own clock by one tick on a
//! fixed interval, independent of any request traffic.

use crate::conn::SharedEngine;
use log::error;
use std::time::Duration;

pub async fn run(engine: SharedEngine, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        let mut engine = engine.lock().await;
        if let Err(e) = engine.tick() {
            error!("ticker error: {}", e);
        }
    }
}
