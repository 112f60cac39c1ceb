pub mod core;
pub mod exchanges;

pub use crate::core::{
    config::ExchangeConfig,
    errors::ExchangeError,
    traits::{AccountInfo, ExchangeConnector, MarketDataSource, MarketStreams, OrderPlacer},
    types::*,
};
pub use crate::exchanges::okcoin::{build_connector, OkcoinBuilder, OkcoinConnector};
