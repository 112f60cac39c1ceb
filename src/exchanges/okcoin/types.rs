use crate::core::types::{CurrencyPair, KlineInterval};
use std::collections::HashMap;
use std::fmt;

pub const EXCHANGE_NAME: &str = "okcoin.cn";
pub const API_BASE_URL: &str = "https://www.okcoin.cn/api/v1/";
pub const WS_URL: &str = "wss://real.okcoin.cn:10440/websocket/okcoinapi";

pub const URL_TICKER: &str = "ticker.do";
pub const URL_DEPTH: &str = "depth.do";
pub const URL_TRADES: &str = "trades.do";
pub const URL_KLINE: &str = "kline.do";
pub const URL_USERINFO: &str = "userinfo.do";
pub const URL_TRADE: &str = "trade.do";
pub const URL_CANCEL_ORDER: &str = "cancel_order.do";
pub const URL_ORDER_INFO: &str = "order_info.do";
pub const URL_ORDER_HISTORY: &str = "order_history.do";
pub const URL_TRADE_HISTORY: &str = "trade_history.do";

/// `status` value for `order_history.do` selecting finished orders
pub const ORDER_HISTORY_FINISHED: &str = "1";

/// WebSocket feeds available per pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OkcoinFeed {
    Depth,
    Deals,
}

impl OkcoinFeed {
    const fn suffix(self) -> &'static str {
        match self {
            Self::Depth => "depth",
            Self::Deals => "deals",
        }
    }

    /// Channel name such as `ok_sub_spot_btc_cny_depth`
    pub fn topic(self, pair: &CurrencyPair) -> String {
        format!("ok_sub_spot_{}_{}", pair.okcoin_symbol(), self.suffix())
    }
}

impl fmt::Display for OkcoinFeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Kline `type` strings accepted by `kline.do`.
///
/// Built once and handed to the market data connector; never mutated after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KlineIntervalTable {
    entries: HashMap<KlineInterval, String>,
}

impl KlineIntervalTable {
    pub fn new(entries: impl IntoIterator<Item = (KlineInterval, String)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn get(&self, interval: KlineInterval) -> Option<&str> {
        self.entries.get(&interval).map(String::as_str)
    }
}

impl Default for KlineIntervalTable {
    fn default() -> Self {
        Self::new([
            (KlineInterval::Minutes1, "1min".to_string()),
            (KlineInterval::Minutes5, "5min".to_string()),
            (KlineInterval::Minutes15, "15min".to_string()),
            (KlineInterval::Minutes30, "30min".to_string()),
            (KlineInterval::Hours1, "1hour".to_string()),
            (KlineInterval::Hours4, "4hour".to_string()),
            (KlineInterval::Days1, "1day".to_string()),
            (KlineInterval::Weeks1, "1week".to_string()),
        ])
    }
}
