//! Field-level access to order parameters
//!
//! Every parameter is addressable by its wire name so that operator edits
//! and validation rules can refer to fields without knowing the concrete
//! parameter struct.

use std::fmt;
use std::str::FromStr;

use crate::error::FieldError;
use crate::types::{
    BracketParameters, CommonParameters, LimitOrderExpiry, LimitParameters, MarketParameters,
    OrderConfiguration, OrderVariant,
};

/// Kind of value a field holds, used to pick a coercion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Number,
    Text,
    Expiry,
}

/// Every parameter known to any variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterField {
    SentimentTimeToConsiderDays,
    SentimentConfidenceThreshold,
    Symbol,
    BuyTakeProfitMultiplier,
    SellTakeProfitMultiplier,
    BuyStopLossMultiplier,
    SellStopLossMultiplier,
    BuyLimitMultiplier,
    SellLimitMultiplier,
    LimitOrderExpiry,
}

impl ParameterField {
    pub const COMMON: [ParameterField; 3] = [
        ParameterField::SentimentTimeToConsiderDays,
        ParameterField::SentimentConfidenceThreshold,
        ParameterField::Symbol,
    ];

    pub const BRACKET: [ParameterField; 4] = [
        ParameterField::BuyTakeProfitMultiplier,
        ParameterField::SellTakeProfitMultiplier,
        ParameterField::BuyStopLossMultiplier,
        ParameterField::SellStopLossMultiplier,
    ];

    pub const LIMIT: [ParameterField; 3] = [
        ParameterField::BuyLimitMultiplier,
        ParameterField::SellLimitMultiplier,
        ParameterField::LimitOrderExpiry,
    ];

    /// Wire name (camelCase, as in the JSON payload)
    pub fn name(&self) -> &'static str {
        match self {
            ParameterField::SentimentTimeToConsiderDays => "sentimentTimeToConsiderDays",
            ParameterField::SentimentConfidenceThreshold => "sentimentConfidenceThreshold",
            ParameterField::Symbol => "symbol",
            ParameterField::BuyTakeProfitMultiplier => "buyTakeProfitMultiplier",
            ParameterField::SellTakeProfitMultiplier => "sellTakeProfitMultiplier",
            ParameterField::BuyStopLossMultiplier => "buyStopLossMultiplier",
            ParameterField::SellStopLossMultiplier => "sellStopLossMultiplier",
            ParameterField::BuyLimitMultiplier => "buyLimitMultiplier",
            ParameterField::SellLimitMultiplier => "sellLimitMultiplier",
            ParameterField::LimitOrderExpiry => "limitOrderExpiry",
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            ParameterField::Symbol => FieldKind::Text,
            ParameterField::LimitOrderExpiry => FieldKind::Expiry,
            _ => FieldKind::Number,
        }
    }

    /// Fields owned by a variant, shared fields first
    pub fn for_variant(variant: OrderVariant) -> Vec<ParameterField> {
        let extra: &[ParameterField] = match variant {
            OrderVariant::Bracket => &Self::BRACKET,
            OrderVariant::Limit => &Self::LIMIT,
            OrderVariant::Market => &[],
        };
        Self::COMMON.iter().chain(extra).copied().collect()
    }

    pub fn applies_to(&self, variant: OrderVariant) -> bool {
        Self::for_variant(variant).contains(self)
    }
}

impl fmt::Display for ParameterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ParameterField {
    type Err = FieldError;

    /// Accepts wire names plus the older form names that lacked the `Days`
    /// suffix or carried a `bracket` prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let field = match s.trim() {
            "sentimentTimeToConsiderDays" | "sentimentTimeToConsider" => {
                ParameterField::SentimentTimeToConsiderDays
            }
            "sentimentConfidenceThreshold" => ParameterField::SentimentConfidenceThreshold,
            "symbol" => ParameterField::Symbol,
            "buyTakeProfitMultiplier" | "bracketBuyTakeProfitMultiplier" => {
                ParameterField::BuyTakeProfitMultiplier
            }
            "sellTakeProfitMultiplier" | "bracketSellTakeProfitMultiplier" => {
                ParameterField::SellTakeProfitMultiplier
            }
            "buyStopLossMultiplier" | "bracketBuyStopLossMultiplier" => {
                ParameterField::BuyStopLossMultiplier
            }
            "sellStopLossMultiplier" | "bracketSellStopLossMultiplier" => {
                ParameterField::SellStopLossMultiplier
            }
            "buyLimitMultiplier" => ParameterField::BuyLimitMultiplier,
            "sellLimitMultiplier" => ParameterField::SellLimitMultiplier,
            "limitOrderExpiry" => ParameterField::LimitOrderExpiry,
            other => return Err(FieldError::unknown_field(other)),
        };
        Ok(field)
    }
}

/// A typed field value, produced by coercion
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    Expiry(LimitOrderExpiry),
}

impl FieldValue {
    fn into_number(self, field: ParameterField) -> Result<f64, FieldError> {
        match self {
            FieldValue::Number(n) => Ok(n),
            _ => Err(FieldError::new(field.name(), "expected a number")),
        }
    }

    fn into_text(self, field: ParameterField) -> Result<String, FieldError> {
        match self {
            FieldValue::Text(s) => Ok(s),
            _ => Err(FieldError::new(field.name(), "expected text")),
        }
    }

    fn into_expiry(self, field: ParameterField) -> Result<LimitOrderExpiry, FieldError> {
        match self {
            FieldValue::Expiry(e) => Ok(e),
            _ => Err(FieldError::new(field.name(), "expected an expiry policy")),
        }
    }
}

/// Read and write access to a parameter shape by field name
pub trait ParameterSet {
    /// Current value, or `None` when the field is not part of this shape
    fn get(&self, field: ParameterField) -> Option<FieldValue>;

    fn set(&mut self, field: ParameterField, value: FieldValue) -> Result<(), FieldError>;
}

impl CommonParameters {
    fn get(&self, field: ParameterField) -> Option<FieldValue> {
        match field {
            ParameterField::SentimentTimeToConsiderDays => {
                Some(FieldValue::Number(self.sentiment_time_to_consider_days))
            }
            ParameterField::SentimentConfidenceThreshold => {
                Some(FieldValue::Number(self.sentiment_confidence_threshold))
            }
            ParameterField::Symbol => Some(FieldValue::Text(self.symbol.clone())),
            _ => None,
        }
    }

    fn set(
        &mut self,
        field: ParameterField,
        value: FieldValue,
        owner: OrderVariant,
    ) -> Result<(), FieldError> {
        match field {
            ParameterField::SentimentTimeToConsiderDays => {
                self.sentiment_time_to_consider_days = value.into_number(field)?
            }
            ParameterField::SentimentConfidenceThreshold => {
                self.sentiment_confidence_threshold = value.into_number(field)?
            }
            ParameterField::Symbol => self.symbol = value.into_text(field)?,
            other => return Err(FieldError::not_applicable(other.name(), owner)),
        }
        Ok(())
    }
}

impl ParameterSet for BracketParameters {
    fn get(&self, field: ParameterField) -> Option<FieldValue> {
        let n = match field {
            ParameterField::BuyTakeProfitMultiplier => self.buy_take_profit_multiplier,
            ParameterField::SellTakeProfitMultiplier => self.sell_take_profit_multiplier,
            ParameterField::BuyStopLossMultiplier => self.buy_stop_loss_multiplier,
            ParameterField::SellStopLossMultiplier => self.sell_stop_loss_multiplier,
            _ => return self.common.get(field),
        };
        Some(FieldValue::Number(n))
    }

    fn set(&mut self, field: ParameterField, value: FieldValue) -> Result<(), FieldError> {
        let slot = match field {
            ParameterField::BuyTakeProfitMultiplier => &mut self.buy_take_profit_multiplier,
            ParameterField::SellTakeProfitMultiplier => &mut self.sell_take_profit_multiplier,
            ParameterField::BuyStopLossMultiplier => &mut self.buy_stop_loss_multiplier,
            ParameterField::SellStopLossMultiplier => &mut self.sell_stop_loss_multiplier,
            _ => return self.common.set(field, value, OrderVariant::Bracket),
        };
        *slot = value.into_number(field)?;
        Ok(())
    }
}

impl ParameterSet for LimitParameters {
    fn get(&self, field: ParameterField) -> Option<FieldValue> {
        match field {
            ParameterField::BuyLimitMultiplier => {
                Some(FieldValue::Number(self.buy_limit_multiplier))
            }
            ParameterField::SellLimitMultiplier => {
                Some(FieldValue::Number(self.sell_limit_multiplier))
            }
            ParameterField::LimitOrderExpiry => Some(FieldValue::Expiry(self.limit_order_expiry)),
            _ => self.common.get(field),
        }
    }

    fn set(&mut self, field: ParameterField, value: FieldValue) -> Result<(), FieldError> {
        match field {
            ParameterField::BuyLimitMultiplier => {
                self.buy_limit_multiplier = value.into_number(field)?
            }
            ParameterField::SellLimitMultiplier => {
                self.sell_limit_multiplier = value.into_number(field)?
            }
            ParameterField::LimitOrderExpiry => {
                self.limit_order_expiry = value.into_expiry(field)?
            }
            _ => return self.common.set(field, value, OrderVariant::Limit),
        }
        Ok(())
    }
}

impl ParameterSet for MarketParameters {
    fn get(&self, field: ParameterField) -> Option<FieldValue> {
        self.common.get(field)
    }

    fn set(&mut self, field: ParameterField, value: FieldValue) -> Result<(), FieldError> {
        self.common.set(field, value, OrderVariant::Market)
    }
}

impl ParameterSet for OrderConfiguration {
    fn get(&self, field: ParameterField) -> Option<FieldValue> {
        match self {
            OrderConfiguration::Bracket(p) => p.get(field),
            OrderConfiguration::Limit(p) => p.get(field),
            OrderConfiguration::Market(p) => p.get(field),
        }
    }

    fn set(&mut self, field: ParameterField, value: FieldValue) -> Result<(), FieldError> {
        match self {
            OrderConfiguration::Bracket(p) => p.set(field, value),
            OrderConfiguration::Limit(p) => p.set(field, value),
            OrderConfiguration::Market(p) => p.set(field, value),
        }
    }
}
