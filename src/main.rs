use anyhow::Context;
use okcoinx::core::config::ExchangeConfig;
use okcoinx::{build_connector, CurrencyPair, ExchangeConnector, MarketDataSource, MarketStreams};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    // Credentials are optional; public endpoints work without them
    let config = ExchangeConfig::from_env("OKCOIN").unwrap_or_else(|_| ExchangeConfig::read_only());
    let okcoin = build_connector(config).context("failed to build connector")?;
    let pair: CurrencyPair = "btc_cny".parse()?;

    info!(exchange = okcoin.exchange_name(), "fetching ticker for {}", pair);
    match okcoin.get_ticker(&pair).await {
        Ok(ticker) => info!(
            "last={} buy={} sell={} high={} low={} vol={}",
            ticker.last, ticker.buy, ticker.sell, ticker.high, ticker.low, ticker.vol
        ),
        Err(e) => warn!("Error fetching ticker: {}", e),
    }

    match okcoin.get_depth(5, &pair).await {
        Ok(depth) => info!(
            "depth: {} asks, {} bids",
            depth.ask_list.len(),
            depth.bid_list.len()
        ),
        Err(e) => warn!("Error fetching depth: {}", e),
    }

    let mut deals = okcoin
        .trade_stream(&pair)
        .await
        .context("failed to open deals stream")?;

    for _ in 0..5 {
        match deals.recv().await {
            Some(trades) => {
                for trade in trades {
                    info!(
                        "deal {} {} {} @ {}",
                        trade.tid, trade.trade_type, trade.amount, trade.price
                    );
                }
            }
            None => break,
        }
    }

    deals.close();
    let _ = deals.done.await;
    Ok(())
}
