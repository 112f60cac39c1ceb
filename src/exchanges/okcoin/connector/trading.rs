use crate::core::errors::ExchangeError;
use crate::core::kernel::RestClient;
use crate::core::traits::OrderPlacer;
use crate::core::types::{CurrencyPair, Order, Trade, TradeSide};
use crate::exchanges::okcoin::conversions::{
    parse_cancel, parse_orders, parse_placed_order, parse_trades,
};
use crate::exchanges::okcoin::rest::OkcoinRest;
use async_trait::async_trait;
use tracing::{info, instrument};

/// Order placement and order queries for OKCoin
pub struct Trading<R: RestClient> {
    rest: OkcoinRest<R>,
}

impl<R: RestClient + Clone> Trading<R> {
    pub fn new(rest: &OkcoinRest<R>) -> Self {
        Self { rest: rest.clone() }
    }
}

fn parse_decimal(field: &str, value: &str) -> Result<f64, ExchangeError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ExchangeError::InvalidParameters(format!("Invalid {}: {:?}", field, value)))
}

/// Fields actually transmitted for a side: market buys carry no price,
/// market sells carry no amount.
fn transmitted<'a>(side: TradeSide, amount: &'a str, price: &'a str) -> (Option<&'a str>, Option<&'a str>) {
    match side {
        TradeSide::Buy | TradeSide::Sell => (Some(amount), Some(price)),
        TradeSide::BuyMarket => (Some(amount), None),
        TradeSide::SellMarket => (None, Some(price)),
    }
}

#[async_trait]
impl<R: RestClient> OrderPlacer for Trading<R> {
    #[instrument(skip(self), fields(pair = %pair, side = %side))]
    async fn place_order(
        &self,
        side: TradeSide,
        amount: &str,
        price: &str,
        pair: &CurrencyPair,
    ) -> Result<Order, ExchangeError> {
        let (amount, price) = transmitted(side, amount, price);

        let amount_value = amount.map(|a| parse_decimal("amount", a)).transpose()?;
        let price_value = price.map(|p| parse_decimal("price", p)).transpose()?;

        let body = self
            .rest
            .place_order(&pair.okcoin_symbol(), side.as_str(), amount, price)
            .await?;

        let order = parse_placed_order(
            &body,
            side,
            amount_value.unwrap_or_default(),
            price_value.unwrap_or_default(),
            pair,
        )?;
        info!(order_id = order.order_id, "order placed");
        Ok(order)
    }

    #[instrument(skip(self), fields(pair = %pair))]
    async fn cancel_order(
        &self,
        order_id: &str,
        pair: &CurrencyPair,
    ) -> Result<bool, ExchangeError> {
        let body = self.rest.cancel_order(&pair.okcoin_symbol(), order_id).await?;
        parse_cancel(&body)
    }

    #[instrument(skip(self), fields(pair = %pair))]
    async fn get_orders(
        &self,
        order_id: &str,
        pair: &CurrencyPair,
    ) -> Result<Vec<Order>, ExchangeError> {
        let body = self.rest.get_order_info(&pair.okcoin_symbol(), order_id).await?;
        parse_orders(&body, pair)
    }

    #[instrument(skip(self), fields(pair = %pair))]
    async fn get_order_history(
        &self,
        pair: &CurrencyPair,
        current_page: u32,
        page_size: u32,
    ) -> Result<Vec<Order>, ExchangeError> {
        let body = self
            .rest
            .get_order_history(&pair.okcoin_symbol(), current_page, page_size)
            .await?;
        parse_orders(&body, pair)
    }

    #[instrument(skip(self), fields(pair = %pair))]
    async fn get_trade_history(
        &self,
        pair: &CurrencyPair,
        since: i64,
    ) -> Result<Vec<Trade>, ExchangeError> {
        let body = self
            .rest
            .get_trade_history(&pair.okcoin_symbol(), since)
            .await?;
        parse_trades(&body)
    }
}
