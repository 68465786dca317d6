use anyhow::{Context, Result};
use colored::Colorize;
use eventsearch::config::Config;
use eventsearch::database;

use crate::utils;

pub async fn execute(config: Config) -> Result<()> {
    eprintln!("{}", "Checking event store...".bold());
    eprintln!();

    let store = database::initialize(&config.store)
        .await
        .with_context(|| format!("Failed to initialize {} event store", config.store.driver))?;

    utils::success(&format!("Connected to {}", store.name()));

    store.ping().await.context("Ping failed")?;
    utils::success("Ping succeeded");

    match store.pool_health() {
        Some(health) => {
            eprintln!(
                "  Pool: size={}, idle={}, max={}, utilization={:.1}%",
                health.size, health.idle, health.max_size, health.utilization_percent
            );
            if health.healthy {
                utils::success("Connection pool is healthy");
            } else {
                utils::warning("Connection pool is saturated");
            }
            println!("{}", serde_json::to_string_pretty(&health)?);
        }
        None => utils::warning("Store does not report pool metrics"),
    }

    Ok(())
}
