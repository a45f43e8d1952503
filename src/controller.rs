//! Variant controller
//!
//! Holds the operator's order type selection and one live parameter object
//! per variant. Objects are created with defaults on first selection and kept
//! when the operator switches away, so returning to a variant restores its
//! in-progress edits.

use tracing::{debug, info};

use crate::error::{LaunchError, LaunchResult};
use crate::fields::{ParameterField, ParameterSet};
use crate::schema;
use crate::types::{
    BracketParameters, LimitParameters, MarketParameters, OrderConfiguration, OrderVariant,
};

#[derive(Debug, Clone, Default)]
pub struct VariantController {
    active: Option<OrderVariant>,
    bracket: Option<BracketParameters>,
    limit: Option<LimitParameters>,
    market: Option<MarketParameters>,
}

impl VariantController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a controller from a stored configuration; its variant becomes active
    pub fn from_preset(preset: OrderConfiguration) -> Self {
        let mut controller = Self::new();
        controller.active = Some(preset.variant());
        controller.store(preset);
        controller
    }

    pub fn active_variant(&self) -> Option<OrderVariant> {
        self.active
    }

    /// Make `variant` active, creating its defaults on first selection
    pub fn select_variant(&mut self, variant: OrderVariant) {
        if self.active == Some(variant) {
            return;
        }

        let created = match variant {
            OrderVariant::Bracket => init_slot(&mut self.bracket),
            OrderVariant::Limit => init_slot(&mut self.limit),
            OrderVariant::Market => init_slot(&mut self.market),
        };
        info!(from = ?self.active, to = %variant, fresh = created, "Order type selected");
        self.active = Some(variant);
    }

    /// Configuration of the active variant
    pub fn active_configuration(&self) -> LaunchResult<OrderConfiguration> {
        let variant = self.active.ok_or(LaunchError::NoVariantSelected)?;
        let config = match variant {
            OrderVariant::Bracket => self.bracket.clone().map(OrderConfiguration::Bracket),
            OrderVariant::Limit => self.limit.clone().map(OrderConfiguration::Limit),
            OrderVariant::Market => self.market.clone().map(OrderConfiguration::Market),
        };
        // select_variant always fills the slot before activating it
        Ok(config.unwrap_or_else(|| OrderConfiguration::defaults_for(variant)))
    }

    /// Coerce `raw` and assign it to `field` on the active variant
    ///
    /// Accepts a field's wire name; values are not range checked here, that
    /// happens when the configuration is validated or submitted.
    pub fn set_field(&mut self, field: &str, raw: &str) -> LaunchResult<()> {
        let field: ParameterField = field.parse()?;
        let value = schema::coerce(field, raw)?;
        let params = self.active_params_mut()?;
        params.set(field, value)?;
        debug!(%field, raw, "Field updated");
        Ok(())
    }

    /// Restore the active variant's defaults, discarding its edits
    pub fn reset_active(&mut self) -> LaunchResult<()> {
        let variant = self.active.ok_or(LaunchError::NoVariantSelected)?;
        self.store(OrderConfiguration::defaults_for(variant));
        Ok(())
    }

    /// Validate the active configuration without submitting it
    pub fn validate_active(&self) -> LaunchResult<OrderConfiguration> {
        let config = self.active_configuration()?;
        schema::validate(&config)?;
        Ok(config)
    }

    fn active_params_mut(&mut self) -> LaunchResult<&mut dyn ParameterSet> {
        let variant = self.active.ok_or(LaunchError::NoVariantSelected)?;
        let params: &mut dyn ParameterSet = match variant {
            OrderVariant::Bracket => self.bracket.get_or_insert_with(Default::default),
            OrderVariant::Limit => self.limit.get_or_insert_with(Default::default),
            OrderVariant::Market => self.market.get_or_insert_with(Default::default),
        };
        Ok(params)
    }

    fn store(&mut self, config: OrderConfiguration) {
        match config {
            OrderConfiguration::Bracket(p) => self.bracket = Some(p),
            OrderConfiguration::Limit(p) => self.limit = Some(p),
            OrderConfiguration::Market(p) => self.market = Some(p),
        }
    }
}

fn init_slot<T: Default>(slot: &mut Option<T>) -> bool {
    if slot.is_some() {
        return false;
    }
    *slot = Some(T::default());
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LimitOrderExpiry;

    #[test]
    fn test_no_selection_is_an_error() {
        let mut controller = VariantController::new();
        assert_eq!(controller.active_variant(), None);
        assert_eq!(
            controller.active_configuration(),
            Err(LaunchError::NoVariantSelected)
        );
        assert_eq!(
            controller.set_field("symbol", "AAPL"),
            Err(LaunchError::NoVariantSelected)
        );
    }

    #[test]
    fn test_first_selection_applies_defaults() {
        let mut controller = VariantController::new();
        controller.select_variant(OrderVariant::Bracket);

        let config = controller.active_configuration().unwrap();
        assert_eq!(config, OrderConfiguration::defaults_for(OrderVariant::Bracket));
    }

    #[test]
    fn test_switching_back_preserves_edits() {
        let mut controller = VariantController::new();
        controller.select_variant(OrderVariant::Limit);
        controller.set_field("buyLimitMultiplier", "1.05").unwrap();
        controller.set_field("symbol", "MSFT").unwrap();

        controller.select_variant(OrderVariant::Market);
        assert_eq!(controller.active_configuration().unwrap().symbol(), "SPY");

        controller.select_variant(OrderVariant::Limit);
        match controller.active_configuration().unwrap() {
            OrderConfiguration::Limit(p) => {
                assert_eq!(p.buy_limit_multiplier, 1.05);
                assert_eq!(p.common.symbol, "MSFT");
            }
            other => panic!("expected limit, got {}", other.variant()),
        }
    }

    #[test]
    fn test_reselecting_active_variant_is_noop() {
        let mut controller = VariantController::new();
        controller.select_variant(OrderVariant::Market);
        controller.set_field("sentimentTimeToConsiderDays", "7").unwrap();

        controller.select_variant(OrderVariant::Market);
        let config = controller.active_configuration().unwrap();
        assert_eq!(config.common().sentiment_time_to_consider_days, 7.0);
    }

    #[test]
    fn test_returned_tag_matches_selection() {
        let mut controller = VariantController::new();
        for variant in [
            OrderVariant::Market,
            OrderVariant::Bracket,
            OrderVariant::Limit,
            OrderVariant::Bracket,
        ] {
            controller.select_variant(variant);
            assert_eq!(controller.active_variant(), Some(variant));
            assert_eq!(controller.active_configuration().unwrap().variant(), variant);
        }
    }

    #[test]
    fn test_set_field_rejects_bad_input() {
        let mut controller = VariantController::new();
        controller.select_variant(OrderVariant::Market);

        let err = controller.set_field("sentimentConfidenceThreshold", "high").unwrap_err();
        match err {
            LaunchError::Validation(errors) => {
                assert!(errors.contains("sentimentConfidenceThreshold"))
            }
            other => panic!("unexpected error: {other}"),
        }

        assert!(controller.set_field("buyLimitMultiplier", "1.1").is_err());
        assert!(controller.set_field("leverage", "2").is_err());
        assert_eq!(
            controller.active_configuration().unwrap(),
            OrderConfiguration::defaults_for(OrderVariant::Market)
        );
    }

    #[test]
    fn test_out_of_range_value_is_stored_but_fails_validation() {
        let mut controller = VariantController::new();
        controller.select_variant(OrderVariant::Market);
        controller.set_field("sentimentConfidenceThreshold", "1.5").unwrap();

        assert!(matches!(
            controller.validate_active(),
            Err(LaunchError::Validation(_))
        ));
    }

    #[test]
    fn test_reset_active_restores_defaults_only_for_active() {
        let mut controller = VariantController::new();
        controller.select_variant(OrderVariant::Bracket);
        controller.set_field("buyStopLossMultiplier", "0.9").unwrap();
        controller.select_variant(OrderVariant::Limit);
        controller.set_field("limitOrderExpiry", "gtc").unwrap();

        controller.reset_active().unwrap();
        match controller.active_configuration().unwrap() {
            OrderConfiguration::Limit(p) => assert_eq!(p.limit_order_expiry, LimitOrderExpiry::Day),
            _ => unreachable!(),
        }

        controller.select_variant(OrderVariant::Bracket);
        match controller.active_configuration().unwrap() {
            OrderConfiguration::Bracket(p) => assert_eq!(p.buy_stop_loss_multiplier, 0.9),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_from_preset_activates_its_variant() {
        let mut preset = LimitParameters::default();
        preset.common.symbol = "AAPL".to_string();
        let controller = VariantController::from_preset(preset.into());

        assert_eq!(controller.active_variant(), Some(OrderVariant::Limit));
        assert_eq!(controller.active_configuration().unwrap().symbol(), "AAPL");
    }

    #[test]
    fn test_padded_symbol_is_stored_trimmed() {
        let mut controller = VariantController::new();
        controller.select_variant(OrderVariant::Market);
        controller.set_field("symbol", "  AAPL ").unwrap();

        let config = controller.validate_active().unwrap();
        assert_eq!(config.symbol(), "AAPL");
        assert_eq!(
            serde_json::to_value(&config).unwrap()["symbol"],
            serde_json::json!("AAPL")
        );
    }
}
