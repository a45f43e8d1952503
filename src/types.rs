//! Core data types for order configuration
//!
//! An [`OrderConfiguration`] is a tagged union: the variant tag travels on the
//! wire as `orderType` and each variant owns exactly one parameter shape, so a
//! bracket tag can never carry limit parameters.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::error::FieldError;
use crate::fields::ParameterField;

/// Errors raised when parsing enumerated values from operator text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseEnumError {
    #[error("unknown order type '{0}' (expected bracket, limit or market)")]
    UnknownVariant(String),

    #[error("unknown limit order expiry '{0}' (expected one of day, gtc, opg, cls, ioc, fok)")]
    UnknownExpiry(String),
}

/// The three mutually-exclusive order variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderVariant {
    Bracket,
    Limit,
    Market,
}

impl OrderVariant {
    pub const ALL: [OrderVariant; 3] = [
        OrderVariant::Bracket,
        OrderVariant::Limit,
        OrderVariant::Market,
    ];

    /// Wire name, as sent in `orderType`
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderVariant::Bracket => "bracket",
            OrderVariant::Limit => "limit",
            OrderVariant::Market => "market",
        }
    }
}

impl fmt::Display for OrderVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderVariant {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bracket" => Ok(OrderVariant::Bracket),
            "limit" => Ok(OrderVariant::Limit),
            "market" => Ok(OrderVariant::Market),
            _ => Err(ParseEnumError::UnknownVariant(s.to_string())),
        }
    }
}

/// Time-in-force policy for limit orders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LimitOrderExpiry {
    /// Expires at the end of the trading day
    #[default]
    Day,
    /// Good till cancelled
    Gtc,
    /// Market on open
    Opg,
    /// Market on close
    Cls,
    /// Immediate or cancel
    Ioc,
    /// Fill or kill
    Fok,
}

impl LimitOrderExpiry {
    pub const ALL: [LimitOrderExpiry; 6] = [
        LimitOrderExpiry::Day,
        LimitOrderExpiry::Gtc,
        LimitOrderExpiry::Opg,
        LimitOrderExpiry::Cls,
        LimitOrderExpiry::Ioc,
        LimitOrderExpiry::Fok,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LimitOrderExpiry::Day => "day",
            LimitOrderExpiry::Gtc => "gtc",
            LimitOrderExpiry::Opg => "opg",
            LimitOrderExpiry::Cls => "cls",
            LimitOrderExpiry::Ioc => "ioc",
            LimitOrderExpiry::Fok => "fok",
        }
    }
}

impl fmt::Display for LimitOrderExpiry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LimitOrderExpiry {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|expiry| expiry.as_str() == wanted)
            .ok_or_else(|| ParseEnumError::UnknownExpiry(s.to_string()))
    }
}

/// Sentiment gating parameters shared by every variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonParameters {
    /// Days of news considered when scoring sentiment
    #[serde(serialize_with = "serialize_whole_as_integer")]
    pub sentiment_time_to_consider_days: f64,
    /// Minimum sentiment probability before a signal is acted upon
    pub sentiment_confidence_threshold: f64,
    /// Ticker to trade
    pub symbol: String,
}

impl Default for CommonParameters {
    fn default() -> Self {
        CommonParameters {
            sentiment_time_to_consider_days: 3.0,
            sentiment_confidence_threshold: 0.999,
            symbol: "SPY".to_string(),
        }
    }
}

/// Bracket order: independent take-profit and stop-loss legs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketParameters {
    #[serde(flatten)]
    pub common: CommonParameters,
    pub buy_take_profit_multiplier: f64,
    pub sell_take_profit_multiplier: f64,
    pub buy_stop_loss_multiplier: f64,
    pub sell_stop_loss_multiplier: f64,
}

impl Default for BracketParameters {
    fn default() -> Self {
        BracketParameters {
            common: CommonParameters::default(),
            buy_take_profit_multiplier: 1.01,
            sell_take_profit_multiplier: 0.99,
            buy_stop_loss_multiplier: 0.98,
            sell_stop_loss_multiplier: 1.02,
        }
    }
}

/// Limit order: price multipliers plus an expiry policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitParameters {
    #[serde(flatten)]
    pub common: CommonParameters,
    pub buy_limit_multiplier: f64,
    pub sell_limit_multiplier: f64,
    pub limit_order_expiry: LimitOrderExpiry,
}

impl Default for LimitParameters {
    fn default() -> Self {
        LimitParameters {
            common: CommonParameters::default(),
            buy_limit_multiplier: 1.01,
            sell_limit_multiplier: 0.99,
            limit_order_expiry: LimitOrderExpiry::Day,
        }
    }
}

/// Market order: shared parameters only
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketParameters {
    #[serde(flatten)]
    pub common: CommonParameters,
}

/// Whole day counts go on the wire as integers (`5`, not `5.0`)
fn serialize_whole_as_integer<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0; // 2^53
    if value.is_finite() && value.fract() == 0.0 && value.abs() <= MAX_EXACT {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

/// A complete order configuration, serialized as a flat JSON object
///
/// Deserialization goes through a JSON object so that keys belonging to
/// another variant are rejected instead of dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "orderType",
    rename_all = "lowercase",
    try_from = "Map<String, Value>"
)]
pub enum OrderConfiguration {
    Bracket(BracketParameters),
    Limit(LimitParameters),
    Market(MarketParameters),
}

impl OrderConfiguration {
    /// Fresh configuration for a variant with every documented default applied
    pub fn defaults_for(variant: OrderVariant) -> Self {
        match variant {
            OrderVariant::Bracket => OrderConfiguration::Bracket(BracketParameters::default()),
            OrderVariant::Limit => OrderConfiguration::Limit(LimitParameters::default()),
            OrderVariant::Market => OrderConfiguration::Market(MarketParameters::default()),
        }
    }

    pub fn variant(&self) -> OrderVariant {
        match self {
            OrderConfiguration::Bracket(_) => OrderVariant::Bracket,
            OrderConfiguration::Limit(_) => OrderVariant::Limit,
            OrderConfiguration::Market(_) => OrderVariant::Market,
        }
    }

    pub fn common(&self) -> &CommonParameters {
        match self {
            OrderConfiguration::Bracket(p) => &p.common,
            OrderConfiguration::Limit(p) => &p.common,
            OrderConfiguration::Market(p) => &p.common,
        }
    }

    pub fn common_mut(&mut self) -> &mut CommonParameters {
        match self {
            OrderConfiguration::Bracket(p) => &mut p.common,
            OrderConfiguration::Limit(p) => &mut p.common,
            OrderConfiguration::Market(p) => &mut p.common,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.common().symbol
    }
}

impl TryFrom<Map<String, Value>> for OrderConfiguration {
    type Error = FieldError;

    fn try_from(mut object: Map<String, Value>) -> Result<Self, Self::Error> {
        let variant = match object.remove("orderType") {
            Some(Value::String(tag)) => tag
                .parse::<OrderVariant>()
                .map_err(|e| FieldError::new("orderType", e.to_string()))?,
            Some(other) => {
                return Err(FieldError::new(
                    "orderType",
                    format!("expected a string, got {}", other),
                ))
            }
            None => return Err(FieldError::new("orderType", "is missing")),
        };

        let allowed = ParameterField::for_variant(variant);
        for key in object.keys() {
            if allowed.iter().any(|f| f.name() == key) {
                continue;
            }
            return Err(match key.parse::<ParameterField>() {
                Ok(field) if field.applies_to(variant) => {
                    FieldError::new(key.as_str(), format!("use the name '{}'", field.name()))
                }
                Ok(_) => FieldError::not_applicable(key.as_str(), variant),
                Err(_) => FieldError::unknown_field(key),
            });
        }

        let shape = |e: serde_json::Error| {
            FieldError::new("orderType", format!("malformed {} parameters: {}", variant, e))
        };
        let params = Value::Object(object);
        let config = match variant {
            OrderVariant::Bracket => {
                OrderConfiguration::Bracket(serde_json::from_value(params).map_err(shape)?)
            }
            OrderVariant::Limit => {
                OrderConfiguration::Limit(serde_json::from_value(params).map_err(shape)?)
            }
            OrderVariant::Market => {
                OrderConfiguration::Market(serde_json::from_value(params).map_err(shape)?)
            }
        };
        Ok(config)
    }
}

impl From<BracketParameters> for OrderConfiguration {
    fn from(params: BracketParameters) -> Self {
        OrderConfiguration::Bracket(params)
    }
}

impl From<LimitParameters> for OrderConfiguration {
    fn from(params: LimitParameters) -> Self {
        OrderConfiguration::Limit(params)
    }
}

impl From<MarketParameters> for OrderConfiguration {
    fn from(params: MarketParameters) -> Self {
        OrderConfiguration::Market(params)
    }
}
