//! Subcommand implementations

pub mod defaults;
pub mod launch;
pub mod validate;

use anyhow::{Context, Result};
use tracing::info;

use strategy_launcher::{LauncherConfig, OrderVariant, VariantController};

/// Parse a `FIELD=VALUE` assignment
pub fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{}'", raw))?;
    let field = field.trim();
    if field.is_empty() {
        return Err(format!("missing field name in '{}'", raw));
    }
    Ok((field.to_string(), value.to_string()))
}

/// Build the controller from the preset, the selected order type and the
/// operator's field assignments, in that order.
pub fn build_controller(
    config: &LauncherConfig,
    order_type: Option<OrderVariant>,
    assignments: &[(String, String)],
) -> Result<VariantController> {
    let mut controller = config.controller();

    if let Some(variant) = order_type {
        controller.select_variant(variant);
    }
    if controller.active_variant().is_none() {
        anyhow::bail!("No order type selected. Pass --order-type or set \"order\" in the config file");
    }

    for (field, value) in assignments {
        controller
            .set_field(field, value)
            .with_context(|| format!("Cannot set {}={}", field, value))?;
        info!("Set {} = {}", field, value);
    }

    Ok(controller)
}
