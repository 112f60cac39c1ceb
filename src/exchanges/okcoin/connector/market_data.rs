use crate::core::errors::ExchangeError;
use crate::core::kernel::{RestClient, StreamHandle, WsConfig, WsSession};
use crate::core::traits::{MarketDataSource, MarketStreams};
use crate::core::types::{CurrencyPair, Depth, Kline, KlineInterval, Ticker, Trade};
use crate::exchanges::okcoin::codec::{OkcoinDepthCodec, OkcoinTradeCodec};
use crate::exchanges::okcoin::conversions::{parse_depth, parse_klines, parse_ticker, parse_trades};
use crate::exchanges::okcoin::rest::OkcoinRest;
use crate::exchanges::okcoin::types::{KlineIntervalTable, OkcoinFeed};
use async_trait::async_trait;
use tracing::instrument;

/// Public market data and streams for OKCoin
pub struct MarketData<R: RestClient> {
    rest: OkcoinRest<R>,
    kline_intervals: KlineIntervalTable,
    ws_url: String,
    ws_config: WsConfig,
}

impl<R: RestClient + Clone> MarketData<R> {
    pub fn new(
        rest: &OkcoinRest<R>,
        kline_intervals: KlineIntervalTable,
        ws_url: String,
        ws_config: WsConfig,
    ) -> Self {
        Self {
            rest: rest.clone(),
            kline_intervals,
            ws_url,
            ws_config,
        }
    }
}

#[async_trait]
impl<R: RestClient> MarketDataSource for MarketData<R> {
    #[instrument(skip(self), fields(pair = %pair))]
    async fn get_ticker(&self, pair: &CurrencyPair) -> Result<Ticker, ExchangeError> {
        let body = self.rest.get_ticker(&pair.okcoin_symbol()).await?;
        parse_ticker(&body)
    }

    #[instrument(skip(self), fields(pair = %pair))]
    async fn get_depth(&self, size: u32, pair: &CurrencyPair) -> Result<Depth, ExchangeError> {
        let body = self.rest.get_depth(&pair.okcoin_symbol(), size).await?;
        parse_depth(&body)
    }

    #[instrument(skip(self), fields(pair = %pair))]
    async fn get_trades(
        &self,
        pair: &CurrencyPair,
        since: Option<i64>,
    ) -> Result<Vec<Trade>, ExchangeError> {
        let body = self.rest.get_trades(&pair.okcoin_symbol(), since).await?;
        parse_trades(&body)
    }

    #[instrument(skip(self), fields(pair = %pair, interval = %interval))]
    async fn get_klines(
        &self,
        pair: &CurrencyPair,
        interval: KlineInterval,
        size: u32,
        since: i64,
    ) -> Result<Vec<Kline>, ExchangeError> {
        let kline_type = self.kline_intervals.get(interval).ok_or_else(|| {
            ExchangeError::InvalidParameters(format!("Unsupported kline interval: {}", interval))
        })?;

        let body = self
            .rest
            .get_klines(&pair.okcoin_symbol(), kline_type, size, since)
            .await?;
        parse_klines(&body)
    }
}

#[async_trait]
impl<R: RestClient> MarketStreams for MarketData<R> {
    async fn depth_stream(&self, pair: &CurrencyPair) -> Result<StreamHandle<Depth>, ExchangeError> {
        let topic = OkcoinFeed::Depth.topic(pair);
        WsSession::connect(&self.ws_url, &topic, OkcoinDepthCodec, &self.ws_config).await
    }

    async fn trade_stream(
        &self,
        pair: &CurrencyPair,
    ) -> Result<StreamHandle<Vec<Trade>>, ExchangeError> {
        let topic = OkcoinFeed::Deals.topic(pair);
        WsSession::connect(&self.ws_url, &topic, OkcoinTradeCodec, &self.ws_config).await
    }

    fn get_websocket_url(&self) -> String {
        self.ws_url.clone()
    }
}
