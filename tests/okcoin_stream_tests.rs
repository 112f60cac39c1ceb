use futures::channel::mpsc;
use futures::StreamExt;
use okcoinx::core::config::ExchangeConfig;
use okcoinx::core::kernel::{WsConfig, WsSession};
use okcoinx::exchanges::okcoin::{OkcoinDepthCodec, OkcoinFeed, OkcoinTradeCodec};
use okcoinx::{build_connector, CurrencyPair, DepthRecord, MarketStreams};
use serde_json::{json, Value};
use std::env;
use std::time::Duration;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;

fn btc_cny() -> CurrencyPair {
    "btc_cny".parse().unwrap()
}

fn frame(value: &Value) -> Result<Message, String> {
    Ok(Message::Text(value.to_string()))
}

fn parse(message: &Message) -> Value {
    serde_json::from_str(message.to_text().unwrap()).unwrap()
}

#[tokio::test]
async fn test_depth_session_over_memory_transport() {
    let (sink_tx, mut sink_rx) = mpsc::unbounded::<Message>();
    let (in_tx, in_rx) = mpsc::unbounded::<Result<Message, String>>();

    let topic = OkcoinFeed::Depth.topic(&btc_cny());
    let mut handle = WsSession::spawn(sink_tx, in_rx, &topic, OkcoinDepthCodec, &WsConfig::default())
        .await
        .unwrap();

    let subscribe = parse(&sink_rx.next().await.unwrap());
    assert_eq!(
        subscribe,
        json!({"event": "addChannel", "channel": "ok_sub_spot_btc_cny_depth"})
    );

    // Acknowledgement and pong carry no update; the malformed frame is skipped
    in_tx
        .unbounded_send(frame(&json!([{"channel": "addChannel", "data": {"result": true}}])))
        .unwrap();
    in_tx.unbounded_send(frame(&json!({"event": "pong"}))).unwrap();
    in_tx.unbounded_send(frame(&json!([]))).unwrap();
    in_tx
        .unbounded_send(frame(&json!([{
            "channel": "ok_sub_spot_btc_cny_depth",
            "data": {"asks": [["3001", "0.4"]], "bids": [["2999", "1.5"]]}
        }])))
        .unwrap();

    let depth = timeout(Duration::from_secs(1), handle.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(depth.ask_list, vec![DepthRecord { price: 3001.0, amount: 0.4 }]);
    assert_eq!(depth.bid_list, vec![DepthRecord { price: 2999.0, amount: 1.5 }]);

    in_tx.unbounded_send(Ok(Message::Close(None))).unwrap();
    let done = timeout(Duration::from_secs(1), &mut handle.done).await;
    assert!(matches!(done, Ok(Ok(()))));
    assert!(handle.recv().await.is_none());
}

#[tokio::test]
async fn test_deals_session_pings_and_closes() {
    let (sink_tx, mut sink_rx) = mpsc::unbounded::<Message>();
    let (in_tx, in_rx) = mpsc::unbounded::<Result<Message, String>>();

    let config = WsConfig::default().with_ping_interval(Duration::from_millis(20));
    let topic = OkcoinFeed::Deals.topic(&btc_cny());
    let mut handle = WsSession::spawn(sink_tx, in_rx, &topic, OkcoinTradeCodec, &config)
        .await
        .unwrap();

    in_tx
        .unbounded_send(frame(&json!([{
            "channel": "ok_sub_spot_btc_cny_deals",
            "data": [["501", "3000.1", "0.01", "12:00:00", "ask"], ["502", "3000.2", "0.02", "12:00:01", "bid"]]
        }])))
        .unwrap();

    let trades = timeout(Duration::from_secs(1), handle.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(trades.len(), 2);
    assert_eq!(trades[1].tid, 502);
    assert_eq!(trades[0].date + 1000, trades[1].date);

    let subscribe = parse(&sink_rx.next().await.unwrap());
    assert_eq!(subscribe["channel"], "ok_sub_spot_btc_cny_deals");
    let ping = timeout(Duration::from_secs(1), sink_rx.next())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(parse(&ping), json!({"event": "ping"}));

    handle.close();
    let done = timeout(Duration::from_secs(1), &mut handle.done).await;
    assert!(matches!(done, Ok(Ok(()))));
}

#[tokio::test]
async fn test_stream_dial_failure_returns_error() {
    let config = ExchangeConfig::read_only().ws_url("ws://127.0.0.1:1/".to_string());
    let okcoin = build_connector(config).unwrap();

    let result = okcoin.depth_stream(&btc_cny()).await;
    assert!(result.is_err());
}

/// Live feed check, only with `RUN_INTEGRATION_TESTS=true`
#[tokio::test]
async fn test_live_depth_stream() {
    if env::var("RUN_INTEGRATION_TESTS").unwrap_or_default() != "true" {
        return;
    }

    let okcoin = build_connector(ExchangeConfig::read_only()).unwrap();
    match okcoin.depth_stream(&btc_cny()).await {
        Ok(mut handle) => {
            match timeout(Duration::from_secs(30), handle.recv()).await {
                Ok(Some(depth)) => println!(
                    "✅ OKCoin depth: {} asks, {} bids",
                    depth.ask_list.len(),
                    depth.bid_list.len()
                ),
                Ok(None) => println!("⚠️ OKCoin depth stream ended"),
                Err(_) => println!("⚠️ OKCoin depth stream timed out"),
            }
            handle.close();
        }
        Err(e) => println!("⚠️ OKCoin depth stream failed: {}", e),
    }
}
