//! Launch command implementation

use anyhow::{Context, Result};
use tracing::{error, info};

use strategy_launcher::{
    HttpStrategyClient, LaunchError, LaunchSession, LauncherConfig, OrderVariant,
};

use super::build_controller;

pub fn run(
    config_path: String,
    order_type: Option<OrderVariant>,
    assignments: Vec<(String, String)>,
    api_url: Option<String>,
) -> Result<()> {
    info!("Starting launch");

    let mut config = LauncherConfig::load(&config_path)?;
    info!("Loaded configuration from: {}", config_path);

    if let Some(url) = api_url {
        info!("Overriding backend URL to: {}", url);
        config.api.base_url = url;
    }

    let controller = build_controller(&config, order_type, &assignments)?;
    let client = HttpStrategyClient::with_config(&config.api.base_url, config.api.client_config())
        .context("Failed to create HTTP client")?;
    let session = LaunchSession::with_controller(client, controller);

    let rt = tokio::runtime::Runtime::new()?;
    let outcome = rt.block_on(session.submit());

    println!("\n{}", "=".repeat(60));
    println!("LAUNCH RESULT");
    println!("{}", "=".repeat(60));
    println!("Backend:            {}", config.api.base_url);

    match outcome {
        Ok(receipt) => {
            println!("Order Type:         {}", receipt.configuration.variant());
            println!("Symbol:             {}", receipt.configuration.symbol());
            println!("Status:             started");
            println!("update_params:      {}", receipt.update_response);
            println!("start:              {}", receipt.start_response);
            println!("Completed At:       {}", receipt.completed_at.to_rfc3339());
            println!("{}", "=".repeat(60));
            info!("Launch completed successfully");
            Ok(())
        }
        Err(err) => {
            let stage = err
                .stage()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!("Status:             failed");
            println!("Failed Stage:       {}", stage);
            println!("Reason:             {}", err);
            if err.parameters_applied() {
                println!("NOTE: parameters were applied on the backend but the strategy did not start");
            }
            if let LaunchError::Validation(errors) = &err {
                for field_error in errors.iter() {
                    println!("  {:<30} {}", field_error.field, field_error.reason);
                }
            }
            println!("{}", "=".repeat(60));
            error!("Launch failed: {}", err);
            Err(err).context("Launch failed")
        }
    }
}
