//! Defaults command implementation

use anyhow::{Context, Result};

use strategy_launcher::{OrderConfiguration, OrderVariant};

pub fn run(order_type: OrderVariant) -> Result<()> {
    let config = OrderConfiguration::defaults_for(order_type);
    let json = serde_json::to_string_pretty(&config).context("Failed to encode defaults")?;
    println!("{}", json);
    Ok(())
}
