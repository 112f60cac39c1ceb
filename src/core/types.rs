use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TypesError {
    #[error("Invalid currency: {0}")]
    InvalidCurrency(String),
    #[error("Invalid currency pair: {0}")]
    InvalidPair(String),
    #[error("Invalid trade side: {0}")]
    InvalidTradeSide(String),
}

/// Upper-case currency code such as `BTC` or `CNY`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Currency(String);

impl Currency {
    pub fn new(code: impl AsRef<str>) -> Result<Self, TypesError> {
        let code = code.as_ref().trim();
        if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(TypesError::InvalidCurrency(code.to_string()));
        }
        Ok(Self(code.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Currency {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Base/quote market identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyPair {
    pub base: Currency,
    pub quote: Currency,
}

impl CurrencyPair {
    pub fn new(base: Currency, quote: Currency) -> Self {
        Self { base, quote }
    }

    /// `BTC_CNY` style symbol with the given separator
    pub fn to_symbol(&self, separator: &str) -> String {
        format!("{}{}{}", self.base, separator, self.quote)
    }

    /// Lower-case underscore symbol used by the OKCoin v1 API, e.g. `btc_cny`
    pub fn okcoin_symbol(&self) -> String {
        self.to_symbol("_").to_lowercase()
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

impl FromStr for CurrencyPair {
    type Err = TypesError;

    /// Parses `btc_cny`, `BTC-CNY` or `BTC/CNY`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(['_', '-', '/']);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(base), Some(quote), None) => Ok(Self::new(
                Currency::new(base).map_err(|_| TypesError::InvalidPair(s.to_string()))?,
                Currency::new(quote).map_err(|_| TypesError::InvalidPair(s.to_string()))?,
            )),
            _ => Err(TypesError::InvalidPair(s.to_string())),
        }
    }
}

/// Tolerant numeric coercion for loosely typed exchange payloads.
///
/// Each helper accepts a JSON number or a finite numeric string and returns
/// `None` for anything else, including `"NaN"` and `"inf"`.
pub mod conversion {
    use serde_json::Value;

    #[inline]
    pub fn value_to_f64(value: &Value) -> Option<f64> {
        match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        }
    }

    #[inline]
    pub fn value_to_i64(value: &Value) -> Option<i64> {
        match value {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Value::String(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| {
                        s.parse::<f64>()
                            .ok()
                            .filter(|f| f.is_finite())
                            .map(|f| f as i64)
                    })
            }
            _ => None,
        }
    }

    #[inline]
    pub fn value_to_u64(value: &Value) -> Option<u64> {
        value_to_i64(value).and_then(|v| u64::try_from(v).ok())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ticker {
    pub date: u64,
    pub last: f64,
    pub buy: f64,
    pub sell: f64,
    pub low: f64,
    pub high: f64,
    pub vol: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DepthRecord {
    pub price: f64,
    pub amount: f64,
}

/// Order book levels in the order the exchange sent them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Depth {
    pub ask_list: Vec<DepthRecord>,
    pub bid_list: Vec<DepthRecord>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    #[default]
    Unknown,
    Unfinished,
    PartFinished,
    Finished,
    Cancelled,
    Cancelling,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderSide {
    #[default]
    Unknown,
    Buy,
    Sell,
    BuyMarket,
    SellMarket,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: i64,
    pub price: f64,
    pub amount: f64,
    pub deal_amount: f64,
    pub avg_price: f64,
    /// Creation time in epoch seconds
    pub order_time: i64,
    pub currency: CurrencyPair,
    pub status: OrderStatus,
    pub side: OrderSide,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubAccount {
    pub currency: Currency,
    /// Free balance
    pub amount: f64,
    pub frozen_amount: f64,
    pub loan_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub exchange: String,
    pub asset: f64,
    pub net_asset: f64,
    pub sub_accounts: HashMap<Currency, SubAccount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub tid: i64,
    pub price: f64,
    pub amount: f64,
    /// Epoch milliseconds
    pub date: i64,
    /// `buy` or `sell`
    #[serde(rename = "type")]
    pub trade_type: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Kline {
    /// Unix seconds
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub vol: f64,
}

/// Kline bucket sizes offered by the spot API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KlineInterval {
    Minutes1,
    Minutes5,
    Minutes15,
    Minutes30,
    Hours1,
    Hours4,
    Days1,
    Weeks1,
}

impl fmt::Display for KlineInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let description = match self {
            Self::Minutes1 => "1 minute",
            Self::Minutes5 => "5 minutes",
            Self::Minutes15 => "15 minutes",
            Self::Minutes30 => "30 minutes",
            Self::Hours1 => "1 hour",
            Self::Hours4 => "4 hours",
            Self::Days1 => "1 day",
            Self::Weeks1 => "1 week",
        };
        write!(f, "{}", description)
    }
}

/// Order placement side as sent in the `type` form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeSide {
    Buy,
    Sell,
    BuyMarket,
    SellMarket,
}

impl TradeSide {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
            Self::BuyMarket => "buy_market",
            Self::SellMarket => "sell_market",
        }
    }
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradeSide {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buy" => Ok(Self::Buy),
            "sell" => Ok(Self::Sell),
            "buy_market" => Ok(Self::BuyMarket),
            "sell_market" => Ok(Self::SellMarket),
            other => Err(TypesError::InvalidTradeSide(other.to_string())),
        }
    }
}
