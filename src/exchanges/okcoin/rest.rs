use crate::core::errors::ExchangeError;
use crate::core::kernel::{FormParams, RestClient, Signer};
use crate::exchanges::okcoin::types::{
    ORDER_HISTORY_FINISHED, URL_CANCEL_ORDER, URL_DEPTH, URL_KLINE, URL_ORDER_HISTORY,
    URL_ORDER_INFO, URL_TICKER, URL_TRADE, URL_TRADES, URL_TRADE_HISTORY, URL_USERINFO,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Thin wrapper around `RestClient` for the OKCoin v1 endpoints
///
/// Public endpoints are plain GETs. Private endpoints are form POSTs signed
/// with the injected signer; without one they fail before any request.
#[derive(Clone)]
pub struct OkcoinRest<R: RestClient> {
    client: R,
    signer: Option<Arc<dyn Signer>>,
}

impl<R: RestClient> OkcoinRest<R> {
    pub fn new(client: R, signer: Option<Arc<dyn Signer>>) -> Self {
        Self { client, signer }
    }

    pub fn can_authenticate(&self) -> bool {
        self.signer.is_some()
    }

    async fn signed_post(&self, endpoint: &str, mut form: FormParams) -> Result<Value, ExchangeError> {
        let signer = self.signer.as_ref().ok_or_else(|| {
            ExchangeError::AuthError(format!("{} requires API credentials", endpoint))
        })?;
        signer.sign_form(&mut form)?;

        debug!(endpoint, "signed request");
        let body = self.client.post_form(endpoint, &form).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    pub async fn get_ticker(&self, symbol: &str) -> Result<Value, ExchangeError> {
        self.client.get(URL_TICKER, &[("symbol", symbol)]).await
    }

    pub async fn get_depth(&self, symbol: &str, size: u32) -> Result<Value, ExchangeError> {
        let size = size.to_string();
        self.client
            .get(URL_DEPTH, &[("symbol", symbol), ("size", size.as_str())])
            .await
    }

    pub async fn get_trades(&self, symbol: &str, since: Option<i64>) -> Result<Value, ExchangeError> {
        let mut params = vec![("symbol", symbol)];

        let since_str;
        if let Some(since) = since {
            since_str = since.to_string();
            params.push(("since", since_str.as_str()));
        }

        self.client.get(URL_TRADES, &params).await
    }

    /// `kline_type` is the exchange's interval string, e.g. `1min`
    pub async fn get_klines(
        &self,
        symbol: &str,
        kline_type: &str,
        size: u32,
        since: i64,
    ) -> Result<Value, ExchangeError> {
        let size = size.to_string();
        let since = since.to_string();
        self.client
            .get(
                URL_KLINE,
                &[
                    ("symbol", symbol),
                    ("type", kline_type),
                    ("size", size.as_str()),
                    ("since", since.as_str()),
                ],
            )
            .await
    }

    /// Place an order; a `None` amount or price is left out of the form
    pub async fn place_order(
        &self,
        symbol: &str,
        trade_type: &str,
        amount: Option<&str>,
        price: Option<&str>,
    ) -> Result<Value, ExchangeError> {
        let mut form = FormParams::new();
        form.insert("symbol".to_string(), symbol.to_string());
        form.insert("type".to_string(), trade_type.to_string());
        if let Some(amount) = amount {
            form.insert("amount".to_string(), amount.to_string());
        }
        if let Some(price) = price {
            form.insert("price".to_string(), price.to_string());
        }

        self.signed_post(URL_TRADE, form).await
    }

    pub async fn cancel_order(&self, symbol: &str, order_id: &str) -> Result<Value, ExchangeError> {
        let mut form = FormParams::new();
        form.insert("order_id".to_string(), order_id.to_string());
        form.insert("symbol".to_string(), symbol.to_string());

        self.signed_post(URL_CANCEL_ORDER, form).await
    }

    pub async fn get_order_info(&self, symbol: &str, order_id: &str) -> Result<Value, ExchangeError> {
        let mut form = FormParams::new();
        form.insert("order_id".to_string(), order_id.to_string());
        form.insert("symbol".to_string(), symbol.to_string());

        self.signed_post(URL_ORDER_INFO, form).await
    }

    /// Finished orders, one page at a time
    pub async fn get_order_history(
        &self,
        symbol: &str,
        current_page: u32,
        page_length: u32,
    ) -> Result<Value, ExchangeError> {
        let mut form = FormParams::new();
        form.insert("status".to_string(), ORDER_HISTORY_FINISHED.to_string());
        form.insert("symbol".to_string(), symbol.to_string());
        form.insert("current_page".to_string(), current_page.to_string());
        form.insert("page_length".to_string(), page_length.to_string());

        self.signed_post(URL_ORDER_HISTORY, form).await
    }

    pub async fn get_trade_history(&self, symbol: &str, since: i64) -> Result<Value, ExchangeError> {
        let mut form = FormParams::new();
        form.insert("symbol".to_string(), symbol.to_string());
        form.insert("since".to_string(), since.to_string());

        self.signed_post(URL_TRADE_HISTORY, form).await
    }

    pub async fn get_user_info(&self) -> Result<Value, ExchangeError> {
        self.signed_post(URL_USERINFO, FormParams::new()).await
    }
}
