use async_trait::async_trait;
use okcoinx::core::config::ExchangeConfig;
use okcoinx::core::errors::ExchangeError;
use okcoinx::core::kernel::{FormParams, RestClient};
use okcoinx::exchanges::okcoin::{KlineIntervalTable, OkcoinBuilder, OkcoinConnector};
use okcoinx::{
    AccountInfo, CurrencyPair, ExchangeConnector, KlineInterval, MarketDataSource, OrderPlacer,
    OrderSide, OrderStatus,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

/// What the recording transport answers with
#[derive(Clone)]
enum Reply {
    Json(Value),
    Raw(Vec<u8>),
    Fail(String),
}

/// Transport that records every request and answers with a canned reply
#[derive(Clone)]
struct RecordingRest {
    reply: Reply,
    gets: Arc<Mutex<Vec<(String, Vec<(String, String)>)>>>,
    posts: Arc<Mutex<Vec<(String, FormParams)>>>,
}

impl RecordingRest {
    fn with_reply(reply: Reply) -> Self {
        Self {
            reply,
            gets: Arc::default(),
            posts: Arc::default(),
        }
    }

    fn new(response: Value) -> Self {
        Self::with_reply(Reply::Json(response))
    }

    fn body(&self) -> Result<Vec<u8>, ExchangeError> {
        match &self.reply {
            Reply::Json(value) => Ok(serde_json::to_vec(value)?),
            Reply::Raw(bytes) => Ok(bytes.clone()),
            Reply::Fail(message) => Err(ExchangeError::NetworkError(message.clone())),
        }
    }

    fn gets(&self) -> Vec<(String, Vec<(String, String)>)> {
        self.gets.lock().unwrap().clone()
    }

    fn posts(&self) -> Vec<(String, FormParams)> {
        self.posts.lock().unwrap().clone()
    }

    fn last_form(&self) -> FormParams {
        self.posts().pop().expect("no POST recorded").1
    }
}

#[async_trait]
impl RestClient for RecordingRest {
    async fn get(
        &self,
        endpoint: &str,
        query_params: &[(&str, &str)],
    ) -> Result<Value, ExchangeError> {
        let params = query_params
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        self.gets.lock().unwrap().push((endpoint.to_string(), params));
        Ok(serde_json::from_slice(&self.body()?)?)
    }

    async fn post_form(&self, endpoint: &str, form: &FormParams) -> Result<Vec<u8>, ExchangeError> {
        self.posts
            .lock()
            .unwrap()
            .push((endpoint.to_string(), form.clone()));
        self.body()
    }
}

fn btc_cny() -> CurrencyPair {
    "btc_cny".parse().unwrap()
}

fn credentials() -> ExchangeConfig {
    ExchangeConfig::new("test_api_key".to_string(), "test_secret_key".to_string())
}

fn connector(config: ExchangeConfig, rest: &RecordingRest) -> OkcoinConnector<RecordingRest> {
    OkcoinBuilder::new(config).build_with_rest(rest.clone())
}

#[tokio::test]
async fn test_exchange_name() {
    let rest = RecordingRest::new(json!({}));
    let okcoin = connector(ExchangeConfig::read_only(), &rest);
    assert_eq!(okcoin.exchange_name(), "okcoin.cn");
}

#[tokio::test]
async fn test_market_buy_omits_price() {
    let rest = RecordingRest::new(json!({"result": true, "order_id": 777}));
    let okcoin = connector(credentials(), &rest);

    let order = okcoin.market_buy("0.5", "3000", &btc_cny()).await.unwrap();

    let (endpoint, form) = rest.posts().pop().unwrap();
    assert_eq!(endpoint, "trade.do");
    assert_eq!(form["type"], "buy_market");
    assert_eq!(form["amount"], "0.5");
    assert_eq!(form["symbol"], "btc_cny");
    assert!(!form.contains_key("price"));
    assert!(form.contains_key("sign"));
    assert_eq!(form["api_key"], "test_api_key");

    assert_eq!(order.order_id, 777);
    assert_eq!(order.amount, 0.5);
    assert_eq!(order.price, 0.0);
    assert_eq!(order.side, OrderSide::BuyMarket);
    assert_eq!(order.status, OrderStatus::Unfinished);
    assert_eq!(order.currency, btc_cny());
}

#[tokio::test]
async fn test_market_sell_omits_amount() {
    let rest = RecordingRest::new(json!({"result": true, "order_id": 778}));
    let okcoin = connector(credentials(), &rest);

    let order = okcoin.market_sell("2", "3100.5", &btc_cny()).await.unwrap();

    let form = rest.last_form();
    assert_eq!(form["type"], "sell_market");
    assert_eq!(form["price"], "3100.5");
    assert!(!form.contains_key("amount"));

    assert_eq!(order.amount, 0.0);
    assert_eq!(order.price, 3100.5);
    assert_eq!(order.side, OrderSide::SellMarket);
}

#[tokio::test]
async fn test_limit_order_sends_amount_and_price() {
    let rest = RecordingRest::new(json!({"result": true, "order_id": 779}));
    let okcoin = connector(credentials(), &rest);

    let order = okcoin.limit_sell("1.25", "3200", &btc_cny()).await.unwrap();

    let form = rest.last_form();
    assert_eq!(form["type"], "sell");
    assert_eq!(form["amount"], "1.25");
    assert_eq!(form["price"], "3200");
    assert!(!form.contains_key("secret_key"));
    assert_eq!(order.side, OrderSide::Sell);
    assert_eq!(order.amount, 1.25);
    assert_eq!(order.price, 3200.0);
}

#[tokio::test]
async fn test_invalid_amount_fails_before_request() {
    let rest = RecordingRest::new(json!({"result": true, "order_id": 1}));
    let okcoin = connector(credentials(), &rest);

    let result = okcoin.limit_buy("lots", "3000", &btc_cny()).await;
    assert!(matches!(result, Err(ExchangeError::InvalidParameters(_))));
    assert!(rest.posts().is_empty());
}

#[tokio::test]
async fn test_market_buy_ignores_unsent_price() {
    let rest = RecordingRest::new(json!({"result": true, "order_id": 5}));
    let okcoin = connector(credentials(), &rest);

    // The price is never transmitted for a market buy, so it is not validated either
    let order = okcoin.market_buy("1", "", &btc_cny()).await.unwrap();
    assert_eq!(order.order_id, 5);
}

#[tokio::test]
async fn test_error_code_yields_failure_without_entity() {
    let rest = RecordingRest::new(json!({"result": false, "error_code": 10010}));
    let okcoin = connector(credentials(), &rest);

    let err = okcoin.limit_buy("1", "3000", &btc_cny()).await.unwrap_err();
    assert_eq!(err.api_code(), Some(10010));

    let err = okcoin.get_orders("42", &btc_cny()).await.unwrap_err();
    assert!(matches!(err, ExchangeError::ApiError { code: 10010, .. }));

    let err = okcoin.get_account().await.unwrap_err();
    assert_eq!(err.api_code(), Some(10010));
}

#[tokio::test]
async fn test_unfinished_orders_query_all() {
    let rest = RecordingRest::new(json!({"result": true, "orders": []}));
    let okcoin = connector(credentials(), &rest);

    let orders = okcoin.get_unfinished_orders(&btc_cny()).await.unwrap();
    assert!(orders.is_empty());

    let (endpoint, form) = rest.posts().pop().unwrap();
    assert_eq!(endpoint, "order_info.do");
    assert_eq!(form["order_id"], "-1");
    assert_eq!(form["symbol"], "btc_cny");
}

#[tokio::test]
async fn test_get_one_order() {
    let rest = RecordingRest::new(json!({
        "result": true,
        "orders": [{
            "amount": 0.1, "avg_price": 3000.5, "create_date": 1418008467000_i64,
            "deal_amount": 0.1, "order_id": 42, "price": 3000, "status": 2, "type": "buy"
        }]
    }));
    let okcoin = connector(credentials(), &rest);

    let order = okcoin.get_one_order("42", &btc_cny()).await.unwrap().unwrap();
    assert_eq!(order.order_id, 42);
    assert_eq!(order.status, OrderStatus::Finished);
    assert_eq!(order.side, OrderSide::Buy);
    assert_eq!(order.deal_amount, 0.1);
    assert_eq!(order.order_time, 1_418_008_467);

    let empty = RecordingRest::new(json!({"result": true, "orders": []}));
    let okcoin = connector(credentials(), &empty);
    assert!(okcoin.get_one_order("42", &btc_cny()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_order_history_params() {
    let rest = RecordingRest::new(json!({"result": true, "orders": []}));
    let okcoin = connector(credentials(), &rest);

    okcoin.get_order_history(&btc_cny(), 2, 20).await.unwrap();

    let (endpoint, form) = rest.posts().pop().unwrap();
    assert_eq!(endpoint, "order_history.do");
    assert_eq!(form["status"], "1");
    assert_eq!(form["current_page"], "2");
    assert_eq!(form["page_length"], "20");
    assert_eq!(form["symbol"], "btc_cny");
}

#[tokio::test]
async fn test_cancel_order() {
    let rest = RecordingRest::new(json!({"result": true, "order_id": "42"}));
    let okcoin = connector(credentials(), &rest);

    assert!(okcoin.cancel_order("42", &btc_cny()).await.unwrap());

    let (endpoint, form) = rest.posts().pop().unwrap();
    assert_eq!(endpoint, "cancel_order.do");
    assert_eq!(form["order_id"], "42");
}

#[tokio::test]
async fn test_trade_history_is_signed() {
    let rest = RecordingRest::new(json!([
        {"date": 1367130137, "price": 787.71, "amount": 0.003, "tid": 230433, "type": "sell"}
    ]));
    let okcoin = connector(credentials(), &rest);

    let trades = okcoin.get_trade_history(&btc_cny(), 230000).await.unwrap();
    assert_eq!(trades.len(), 1);

    let (endpoint, form) = rest.posts().pop().unwrap();
    assert_eq!(endpoint, "trade_history.do");
    assert_eq!(form["since"], "230000");
    assert!(form.contains_key("sign"));
}

#[tokio::test]
async fn test_private_calls_without_credentials_fail_before_io() {
    let rest = RecordingRest::new(json!({"result": true, "order_id": 1}));
    let okcoin = connector(ExchangeConfig::read_only(), &rest);

    assert!(matches!(
        okcoin.get_account().await,
        Err(ExchangeError::AuthError(_))
    ));
    assert!(matches!(
        okcoin.limit_buy("1", "1", &btc_cny()).await,
        Err(ExchangeError::AuthError(_))
    ));
    assert!(matches!(
        okcoin.cancel_order("1", &btc_cny()).await,
        Err(ExchangeError::AuthError(_))
    ));
    assert!(rest.posts().is_empty());
}

#[tokio::test]
async fn test_get_account() {
    let rest = RecordingRest::new(json!({
        "info": {"funds": {
            "asset": {"net": "100.5", "total": "120.5"},
            "free": {"btc": "0.5", "cny": "20"},
            "freezed": {"btc": "0", "cny": "10"}
        }},
        "result": true
    }));
    let okcoin = connector(credentials(), &rest);

    let account = okcoin.get_account().await.unwrap();
    assert_eq!(account.exchange, "okcoin.cn");
    assert_eq!(account.asset, 120.5);
    assert_eq!(account.net_asset, 100.5);
    assert_eq!(account.sub_accounts.len(), 2);

    let (endpoint, form) = rest.posts().pop().unwrap();
    assert_eq!(endpoint, "userinfo.do");
    assert_eq!(form.len(), 2);
}

#[tokio::test]
async fn test_kline_query_order() {
    let rest = RecordingRest::new(json!([[1_609_459_200_000_i64, 1, 2, 0.5, 1.5, 10]]));
    let okcoin = connector(ExchangeConfig::read_only(), &rest);

    let klines = okcoin
        .get_klines(&btc_cny(), KlineInterval::Hours1, 100, 1_609_459_000_000)
        .await
        .unwrap();
    assert_eq!(klines[0].timestamp, 1_609_459_200);

    let (endpoint, params) = rest.gets().pop().unwrap();
    assert_eq!(endpoint, "kline.do");
    let keys: Vec<&str> = params.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys, vec!["symbol", "type", "size", "since"]);
    assert_eq!(params[1].1, "1hour");
    assert_eq!(params[3].1, "1609459000000");
}

#[tokio::test]
async fn test_kline_interval_missing_from_table() {
    let rest = RecordingRest::new(json!([]));
    let okcoin = OkcoinBuilder::new(ExchangeConfig::read_only())
        .with_kline_intervals(KlineIntervalTable::new([(
            KlineInterval::Days1,
            "1day".to_string(),
        )]))
        .build_with_rest(rest.clone());

    let result = okcoin
        .get_klines(&btc_cny(), KlineInterval::Minutes5, 10, 0)
        .await;
    assert!(matches!(result, Err(ExchangeError::InvalidParameters(_))));
    assert!(rest.gets().is_empty());

    okcoin
        .get_klines(&btc_cny(), KlineInterval::Days1, 10, 0)
        .await
        .unwrap();
    assert_eq!(rest.gets().len(), 1);
}

#[tokio::test]
async fn test_public_trades_since_is_optional() {
    let rest = RecordingRest::new(json!([]));
    let okcoin = connector(ExchangeConfig::read_only(), &rest);

    okcoin.get_trades(&btc_cny(), None).await.unwrap();
    okcoin.get_trades(&btc_cny(), Some(600)).await.unwrap();

    let gets = rest.gets();
    assert_eq!(gets[0].1, vec![("symbol".to_string(), "btc_cny".to_string())]);
    assert_eq!(gets[1].1[1], ("since".to_string(), "600".to_string()));
}

#[tokio::test]
async fn test_ticker_and_depth() {
    let rest = RecordingRest::new(json!({
        "date": "1410431279",
        "ticker": {"buy": "33.15", "high": "34.15", "last": "33.15",
                   "low": "32.05", "sell": "33.16", "vol": "100"},
        "asks": [[34, 1]],
        "bids": [[33, 2]]
    }));
    let okcoin = connector(ExchangeConfig::read_only(), &rest);

    let ticker = okcoin.get_ticker(&btc_cny()).await.unwrap();
    assert_eq!(ticker.date, 1_410_431_279);
    assert_eq!(ticker.sell, 33.16);

    let depth = okcoin.get_depth(5, &btc_cny()).await.unwrap();
    assert_eq!(depth.ask_list[0].price, 34.0);
    assert_eq!(depth.bid_list[0].amount, 2.0);

    let gets = rest.gets();
    assert_eq!(gets[0].0, "ticker.do");
    assert_eq!(gets[1].0, "depth.do");
    assert_eq!(gets[1].1[1], ("size".to_string(), "5".to_string()));
}

#[tokio::test]
async fn test_transport_error_propagates_unchanged() {
    let rest = RecordingRest::with_reply(Reply::Fail("HTTP 502 Bad Gateway: upstream".to_string()));
    let okcoin = connector(credentials(), &rest);

    let err = okcoin.limit_buy("1", "3000", &btc_cny()).await.unwrap_err();
    assert!(matches!(&err, ExchangeError::NetworkError(m) if m == "HTTP 502 Bad Gateway: upstream"));

    let err = okcoin.get_account().await.unwrap_err();
    assert!(matches!(&err, ExchangeError::NetworkError(m) if m == "HTTP 502 Bad Gateway: upstream"));

    let err = okcoin.get_ticker(&btc_cny()).await.unwrap_err();
    assert!(matches!(&err, ExchangeError::NetworkError(m) if m == "HTTP 502 Bad Gateway: upstream"));

    // The request still went out; the failure came back from the transport
    assert_eq!(rest.posts().len(), 2);
    assert_eq!(rest.gets().len(), 1);
}

#[tokio::test]
async fn test_non_json_body_is_json_error() {
    let rest = RecordingRest::with_reply(Reply::Raw(b"<html>maintenance</html>".to_vec()));
    let okcoin = connector(credentials(), &rest);

    assert!(matches!(
        okcoin.limit_buy("1", "3000", &btc_cny()).await,
        Err(ExchangeError::JsonError(_))
    ));
    assert!(matches!(
        okcoin.get_account().await,
        Err(ExchangeError::JsonError(_))
    ));
    assert!(matches!(
        okcoin.get_orders("42", &btc_cny()).await,
        Err(ExchangeError::JsonError(_))
    ));
}

#[tokio::test]
async fn test_order_without_id_is_an_error_not_an_empty_list() {
    let rest = RecordingRest::new(json!({
        "result": true,
        "orders": [{
            "amount": 0.1, "avg_price": 0, "create_date": 1418008467000_i64,
            "deal_amount": 0, "price": 3000, "status": 0, "type": "buy"
        }]
    }));
    let okcoin = connector(credentials(), &rest);

    assert!(matches!(
        okcoin.get_one_order("42", &btc_cny()).await,
        Err(ExchangeError::InvalidResponseFormat(_))
    ));
    assert!(matches!(
        okcoin.get_unfinished_orders(&btc_cny()).await,
        Err(ExchangeError::InvalidResponseFormat(_))
    ));
}
