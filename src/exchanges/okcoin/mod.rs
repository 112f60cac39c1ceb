pub mod builder;
pub mod codec;
pub mod connector;
pub mod conversions;
pub mod rest;
pub mod signer;
pub mod types;

// Re-export main types for easier importing
pub use builder::{build_connector, OkcoinBuilder, DEFAULT_PING_INTERVAL};
pub use codec::{OkcoinDepthCodec, OkcoinTradeCodec};
pub use connector::OkcoinConnector;
pub use rest::OkcoinRest;
pub use signer::OkcoinSigner;
pub use types::{KlineIntervalTable, OkcoinFeed, EXCHANGE_NAME};
