//! Parameter schema: validation rules per order variant
//!
//! Rules are declared as static tables, one shared table plus one table per
//! variant, and looked up by variant tag. Operator text is turned into typed
//! values by [`coerce`] before any rule runs.

use tracing::debug;

use crate::error::{FieldError, ValidationErrors};
use crate::fields::{FieldKind, FieldValue, ParameterField, ParameterSet};
use crate::types::{LimitOrderExpiry, OrderConfiguration, OrderVariant};

/// A pure predicate over one field value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    /// Finite and `>= 0`
    NonNegative,
    /// Finite and within `[0, 1]`
    UnitInterval,
    /// Text that is not blank
    NonEmpty,
}

impl Check {
    /// Apply the check, returning the human-readable reason on failure
    pub fn apply(&self, value: &FieldValue) -> Result<(), String> {
        match (self, value) {
            (Check::NonNegative | Check::UnitInterval, FieldValue::Number(n)) if !n.is_finite() => {
                Err("must be a finite number".to_string())
            }
            (Check::NonNegative, FieldValue::Number(n)) => {
                if *n >= 0.0 {
                    Ok(())
                } else {
                    Err(format!("must be greater than or equal to 0 (got {})", n))
                }
            }
            (Check::UnitInterval, FieldValue::Number(n)) => {
                if (0.0..=1.0).contains(n) {
                    Ok(())
                } else {
                    Err(format!("must be between 0 and 1 (got {})", n))
                }
            }
            (Check::NonEmpty, FieldValue::Text(s)) => {
                if s.trim().is_empty() {
                    Err("must not be empty".to_string())
                } else {
                    Ok(())
                }
            }
            (Check::NonEmpty, _) => Err("expected text".to_string()),
            (_, _) => Err("expected a number".to_string()),
        }
    }
}

/// One validation rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub field: ParameterField,
    pub check: Check,
}

const fn rule(field: ParameterField, check: Check) -> Rule {
    Rule { field, check }
}

const COMMON_RULES: &[Rule] = &[
    rule(ParameterField::SentimentTimeToConsiderDays, Check::NonNegative),
    rule(ParameterField::SentimentConfidenceThreshold, Check::UnitInterval),
    rule(ParameterField::Symbol, Check::NonEmpty),
];

const BRACKET_RULES: &[Rule] = &[
    rule(ParameterField::BuyTakeProfitMultiplier, Check::NonNegative),
    rule(ParameterField::SellTakeProfitMultiplier, Check::NonNegative),
    rule(ParameterField::BuyStopLossMultiplier, Check::NonNegative),
    rule(ParameterField::SellStopLossMultiplier, Check::NonNegative),
];

// limitOrderExpiry membership is enforced by its type and by `coerce`
const LIMIT_RULES: &[Rule] = &[
    rule(ParameterField::BuyLimitMultiplier, Check::NonNegative),
    rule(ParameterField::SellLimitMultiplier, Check::NonNegative),
];

const MARKET_RULES: &[Rule] = &[];

/// Rule set for exactly one variant: shared rules followed by variant rules
pub fn rules_for(variant: OrderVariant) -> impl Iterator<Item = &'static Rule> {
    let variant_rules = match variant {
        OrderVariant::Bracket => BRACKET_RULES,
        OrderVariant::Limit => LIMIT_RULES,
        OrderVariant::Market => MARKET_RULES,
    };
    COMMON_RULES.iter().chain(variant_rules.iter())
}

/// Validate a configuration against its variant's rules, reporting every
/// violation found.
pub fn validate(config: &OrderConfiguration) -> Result<(), ValidationErrors> {
    let variant = config.variant();
    let errors: Vec<FieldError> = rules_for(variant)
        .filter_map(|rule| {
            let outcome = match config.get(rule.field) {
                Some(value) => rule.check.apply(&value),
                None => Err("is missing".to_string()),
            };
            outcome
                .err()
                .map(|reason| FieldError::new(rule.field.name(), reason))
        })
        .collect();

    match ValidationErrors::from_vec(errors) {
        Some(errors) => {
            debug!(%variant, %errors, "Configuration failed validation");
            Err(errors)
        }
        None => Ok(()),
    }
}

/// Convert operator text into a typed value for `field`
///
/// Numbers must parse completely as a finite decimal; blank or partial input
/// is an error rather than a silent zero. Text is stored trimmed.
pub fn coerce(field: ParameterField, raw: &str) -> Result<FieldValue, FieldError> {
    match field.kind() {
        FieldKind::Number => coerce_number(field, raw).map(FieldValue::Number),
        FieldKind::Text => Ok(FieldValue::Text(raw.trim().to_string())),
        FieldKind::Expiry => raw
            .parse::<LimitOrderExpiry>()
            .map(FieldValue::Expiry)
            .map_err(|e| FieldError::new(field.name(), e.to_string())),
    }
}

fn coerce_number(field: ParameterField, raw: &str) -> Result<f64, FieldError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FieldError::new(field.name(), "expected a number, got empty input"));
    }

    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(n),
        Ok(_) => Err(FieldError::new(field.name(), "must be a finite number")),
        Err(_) => Err(FieldError::new(
            field.name(),
            format!("expected a number, got '{}'", trimmed),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BracketParameters, LimitParameters, MarketParameters};
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults_pass_for_every_variant() {
        for variant in OrderVariant::ALL {
            let config = OrderConfiguration::defaults_for(variant);
            assert!(validate(&config).is_ok(), "defaults for {} failed", variant);
        }
    }

    #[test]
    fn test_rules_cover_exactly_the_variant_fields() {
        for variant in OrderVariant::ALL {
            let ruled: Vec<ParameterField> = rules_for(variant).map(|r| r.field).collect();
            for field in &ruled {
                assert!(field.applies_to(variant));
            }
        }
        assert_eq!(rules_for(OrderVariant::Market).count(), 3);
        assert_eq!(rules_for(OrderVariant::Bracket).count(), 7);
    }

    #[test]
    fn test_confidence_threshold_out_of_range() {
        for bad in [1.5, -0.1] {
            let mut params = MarketParameters::default();
            params.common.sentiment_confidence_threshold = bad;
            let errors = validate(&params.into()).unwrap_err();

            assert_eq!(errors.len(), 1);
            assert!(errors.contains("sentimentConfidenceThreshold"));
        }
    }

    #[test]
    fn test_confidence_threshold_bounds_are_inclusive() {
        for edge in [0.0, 1.0] {
            let mut params = MarketParameters::default();
            params.common.sentiment_confidence_threshold = edge;
            assert!(validate(&params.into()).is_ok());
        }
    }

    #[test]
    fn test_negative_multipliers_are_reported_together() {
        let params = BracketParameters {
            buy_take_profit_multiplier: -1.0,
            sell_stop_loss_multiplier: -0.5,
            ..BracketParameters::default()
        };
        let errors = validate(&params.into()).unwrap_err();

        assert_eq!(errors.len(), 2);
        assert!(errors.contains("buyTakeProfitMultiplier"));
        assert!(errors.contains("sellStopLossMultiplier"));
    }

    #[test]
    fn test_negative_day_window_fails() {
        let mut params = LimitParameters::default();
        params.common.sentiment_time_to_consider_days = -1.0;
        let errors = validate(&params.into()).unwrap_err();
        assert!(errors.contains("sentimentTimeToConsiderDays"));
    }

    #[test]
    fn test_blank_symbol_fails() {
        let mut params = LimitParameters::default();
        params.common.symbol = "   ".to_string();
        let errors = validate(&params.into()).unwrap_err();
        assert!(errors.contains("symbol"));
    }

    #[test]
    fn test_non_finite_numbers_fail() {
        let params = LimitParameters {
            buy_limit_multiplier: f64::NAN,
            sell_limit_multiplier: f64::INFINITY,
            ..LimitParameters::default()
        };
        let errors = validate(&params.into()).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_coerce_numeric_text() {
        match coerce(ParameterField::BuyLimitMultiplier, " 1.02 ").unwrap() {
            FieldValue::Number(n) => assert_relative_eq!(n, 1.02),
            other => panic!("expected a number, got {:?}", other),
        }
        assert_eq!(
            coerce(ParameterField::SentimentTimeToConsiderDays, "5").unwrap(),
            FieldValue::Number(5.0)
        );
    }

    #[test]
    fn test_coerce_rejects_non_numeric_text() {
        for bad in ["abc", "", "  ", "1.0x", "NaN", "inf"] {
            let err = coerce(ParameterField::SellLimitMultiplier, bad).unwrap_err();
            assert_eq!(err.field, "sellLimitMultiplier");
        }
    }

    #[test]
    fn test_coerce_does_not_range_check() {
        let value = coerce(ParameterField::SentimentConfidenceThreshold, "1.5").unwrap();
        assert_eq!(value, FieldValue::Number(1.5));
    }

    #[test]
    fn test_coerce_expiry_and_text() {
        assert_eq!(
            coerce(ParameterField::LimitOrderExpiry, "day").unwrap(),
            FieldValue::Expiry(LimitOrderExpiry::Day)
        );
        assert!(coerce(ParameterField::LimitOrderExpiry, "month").is_err());
        assert_eq!(
            coerce(ParameterField::Symbol, "AAPL").unwrap(),
            FieldValue::Text("AAPL".to_string())
        );
    }

    #[test]
    fn test_coerce_trims_symbol() {
        assert_eq!(
            coerce(ParameterField::Symbol, "  AAPL \t").unwrap(),
            FieldValue::Text("AAPL".to_string())
        );
        assert_eq!(
            coerce(ParameterField::Symbol, "   ").unwrap(),
            FieldValue::Text(String::new())
        );
    }
}
