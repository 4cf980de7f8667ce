//! Config command - show or initialize configuration.

use anyhow::Result;
use portman_core::ConfigStore;

pub async fn run(json: bool, init: bool) -> Result<()> {
    let store = ConfigStore::new()?;

    if init {
        if store.init().await? {
            println!("Wrote defaults to {}", store.config_path().display());
        } else {
            println!("Config already exists at {}", store.config_path().display());
        }
    }

    let config = store.load().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    println!("Config file: {}", store.config_path().display());
    println!();
    println!("Grace timeout:  {} ms", config.grace_timeout_ms);
    println!("Poll interval:  {} ms", config.poll_interval_ms);
    println!("Tick rate:      {} ms", config.tick_rate_ms);

    Ok(())
}
