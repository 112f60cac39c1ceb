use crate::core::{
    errors::ExchangeError,
    kernel::ws::StreamHandle,
    types::{Account, CurrencyPair, Depth, Kline, KlineInterval, Order, Ticker, Trade, TradeSide},
};
use async_trait::async_trait;

#[async_trait]
pub trait MarketDataSource {
    /// Latest ticker snapshot for a pair
    async fn get_ticker(&self, pair: &CurrencyPair) -> Result<Ticker, ExchangeError>;

    /// Order book with at most `size` levels per side
    async fn get_depth(&self, size: u32, pair: &CurrencyPair) -> Result<Depth, ExchangeError>;

    /// Recent public trades, optionally only those after trade id `since`
    async fn get_trades(
        &self,
        pair: &CurrencyPair,
        since: Option<i64>,
    ) -> Result<Vec<Trade>, ExchangeError>;

    async fn get_klines(
        &self,
        pair: &CurrencyPair,
        interval: KlineInterval,
        size: u32,
        since: i64,
    ) -> Result<Vec<Kline>, ExchangeError>;
}

#[async_trait]
pub trait OrderPlacer {
    /// Place an order. `amount` and `price` are decimal strings.
    async fn place_order(
        &self,
        side: TradeSide,
        amount: &str,
        price: &str,
        pair: &CurrencyPair,
    ) -> Result<Order, ExchangeError>;

    async fn limit_buy(
        &self,
        amount: &str,
        price: &str,
        pair: &CurrencyPair,
    ) -> Result<Order, ExchangeError> {
        self.place_order(TradeSide::Buy, amount, price, pair).await
    }

    async fn limit_sell(
        &self,
        amount: &str,
        price: &str,
        pair: &CurrencyPair,
    ) -> Result<Order, ExchangeError> {
        self.place_order(TradeSide::Sell, amount, price, pair).await
    }

    async fn market_buy(
        &self,
        amount: &str,
        price: &str,
        pair: &CurrencyPair,
    ) -> Result<Order, ExchangeError> {
        self.place_order(TradeSide::BuyMarket, amount, price, pair).await
    }

    async fn market_sell(
        &self,
        amount: &str,
        price: &str,
        pair: &CurrencyPair,
    ) -> Result<Order, ExchangeError> {
        self.place_order(TradeSide::SellMarket, amount, price, pair).await
    }

    async fn cancel_order(&self, order_id: &str, pair: &CurrencyPair)
        -> Result<bool, ExchangeError>;

    /// Query orders by id; `"-1"` lists all unfinished orders
    async fn get_orders(
        &self,
        order_id: &str,
        pair: &CurrencyPair,
    ) -> Result<Vec<Order>, ExchangeError>;

    async fn get_one_order(
        &self,
        order_id: &str,
        pair: &CurrencyPair,
    ) -> Result<Option<Order>, ExchangeError> {
        Ok(self.get_orders(order_id, pair).await?.into_iter().next())
    }

    async fn get_unfinished_orders(&self, pair: &CurrencyPair) -> Result<Vec<Order>, ExchangeError> {
        self.get_orders("-1", pair).await
    }

    async fn get_order_history(
        &self,
        pair: &CurrencyPair,
        current_page: u32,
        page_size: u32,
    ) -> Result<Vec<Order>, ExchangeError>;

    /// Authenticated trade history starting after trade id `since`
    async fn get_trade_history(
        &self,
        pair: &CurrencyPair,
        since: i64,
    ) -> Result<Vec<Trade>, ExchangeError>;
}

#[async_trait]
pub trait AccountInfo {
    async fn get_account(&self) -> Result<Account, ExchangeError>;
}

/// Long-lived WebSocket feeds. Each call owns one connection.
#[async_trait]
pub trait MarketStreams {
    async fn depth_stream(&self, pair: &CurrencyPair) -> Result<StreamHandle<Depth>, ExchangeError>;

    async fn trade_stream(
        &self,
        pair: &CurrencyPair,
    ) -> Result<StreamHandle<Vec<Trade>>, ExchangeError>;

    fn get_websocket_url(&self) -> String;
}

#[async_trait]
pub trait ExchangeConnector: MarketDataSource + OrderPlacer + AccountInfo + MarketStreams {
    fn exchange_name(&self) -> &'static str;
}
