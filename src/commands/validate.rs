//! Validate command implementation

use anyhow::Result;
use tracing::{info, warn};

use strategy_launcher::{LaunchError, LauncherConfig, OrderVariant};

use super::build_controller;

pub fn run(
    config_path: String,
    order_type: Option<OrderVariant>,
    assignments: Vec<(String, String)>,
) -> Result<()> {
    let config = LauncherConfig::load(&config_path)?;
    info!("Loaded configuration from: {}", config_path);

    let controller = build_controller(&config, order_type, &assignments)?;

    match controller.validate_active() {
        Ok(order) => {
            println!("Configuration is valid:");
            println!("{}", serde_json::to_string_pretty(&order)?);
            Ok(())
        }
        Err(LaunchError::Validation(errors)) => {
            warn!("Validation failed with {} error(s)", errors.len());
            for error in errors.iter() {
                println!("  {:<30} {}", error.field, error.reason);
            }
            anyhow::bail!("Configuration is invalid")
        }
        Err(other) => Err(other.into()),
    }
}
