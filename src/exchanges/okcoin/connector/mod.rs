use crate::core::errors::ExchangeError;
use crate::core::kernel::{RestClient, StreamHandle, WsConfig};
use crate::core::traits::{
    AccountInfo, ExchangeConnector, MarketDataSource, MarketStreams, OrderPlacer,
};
use crate::core::types::{
    CurrencyPair, Depth, Kline, KlineInterval, Order, Ticker, Trade, TradeSide,
};
use crate::exchanges::okcoin::rest::OkcoinRest;
use crate::exchanges::okcoin::types::{KlineIntervalTable, EXCHANGE_NAME};
use async_trait::async_trait;

pub mod account;
pub mod market_data;
pub mod trading;

pub use account::Account;
pub use market_data::MarketData;
pub use trading::Trading;

/// OKCoin connector that composes all sub-trait implementations
pub struct OkcoinConnector<R: RestClient> {
    pub market: MarketData<R>,
    pub trading: Trading<R>,
    pub account: Account<R>,
    can_authenticate: bool,
}

impl<R: RestClient + Clone> OkcoinConnector<R> {
    pub fn new(
        rest: OkcoinRest<R>,
        kline_intervals: KlineIntervalTable,
        ws_url: String,
        ws_config: WsConfig,
    ) -> Self {
        Self {
            market: MarketData::new(&rest, kline_intervals, ws_url, ws_config),
            trading: Trading::new(&rest),
            account: Account::new(&rest),
            can_authenticate: rest.can_authenticate(),
        }
    }

    /// Whether private endpoints can be called
    pub fn can_authenticate(&self) -> bool {
        self.can_authenticate
    }
}

// Implement traits for the connector by delegating to sub-components
#[async_trait]
impl<R: RestClient> MarketDataSource for OkcoinConnector<R> {
    async fn get_ticker(&self, pair: &CurrencyPair) -> Result<Ticker, ExchangeError> {
        self.market.get_ticker(pair).await
    }

    async fn get_depth(&self, size: u32, pair: &CurrencyPair) -> Result<Depth, ExchangeError> {
        self.market.get_depth(size, pair).await
    }

    async fn get_trades(
        &self,
        pair: &CurrencyPair,
        since: Option<i64>,
    ) -> Result<Vec<Trade>, ExchangeError> {
        self.market.get_trades(pair, since).await
    }

    async fn get_klines(
        &self,
        pair: &CurrencyPair,
        interval: KlineInterval,
        size: u32,
        since: i64,
    ) -> Result<Vec<Kline>, ExchangeError> {
        self.market.get_klines(pair, interval, size, since).await
    }
}

#[async_trait]
impl<R: RestClient> OrderPlacer for OkcoinConnector<R> {
    async fn place_order(
        &self,
        side: TradeSide,
        amount: &str,
        price: &str,
        pair: &CurrencyPair,
    ) -> Result<Order, ExchangeError> {
        self.trading.place_order(side, amount, price, pair).await
    }

    async fn cancel_order(
        &self,
        order_id: &str,
        pair: &CurrencyPair,
    ) -> Result<bool, ExchangeError> {
        self.trading.cancel_order(order_id, pair).await
    }

    async fn get_orders(
        &self,
        order_id: &str,
        pair: &CurrencyPair,
    ) -> Result<Vec<Order>, ExchangeError> {
        self.trading.get_orders(order_id, pair).await
    }

    async fn get_order_history(
        &self,
        pair: &CurrencyPair,
        current_page: u32,
        page_size: u32,
    ) -> Result<Vec<Order>, ExchangeError> {
        self.trading
            .get_order_history(pair, current_page, page_size)
            .await
    }

    async fn get_trade_history(
        &self,
        pair: &CurrencyPair,
        since: i64,
    ) -> Result<Vec<Trade>, ExchangeError> {
        self.trading.get_trade_history(pair, since).await
    }
}

#[async_trait]
impl<R: RestClient> AccountInfo for OkcoinConnector<R> {
    async fn get_account(&self) -> Result<crate::core::types::Account, ExchangeError> {
        self.account.get_account().await
    }
}

#[async_trait]
impl<R: RestClient> MarketStreams for OkcoinConnector<R> {
    async fn depth_stream(&self, pair: &CurrencyPair) -> Result<StreamHandle<Depth>, ExchangeError> {
        self.market.depth_stream(pair).await
    }

    async fn trade_stream(
        &self,
        pair: &CurrencyPair,
    ) -> Result<StreamHandle<Vec<Trade>>, ExchangeError> {
        self.market.trade_stream(pair).await
    }

    fn get_websocket_url(&self) -> String {
        self.market.get_websocket_url()
    }
}

impl<R: RestClient> ExchangeConnector for OkcoinConnector<R> {
    fn exchange_name(&self) -> &'static str {
        EXCHANGE_NAME
    }
}
