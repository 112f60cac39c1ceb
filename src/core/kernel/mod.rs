//! Exchange-agnostic transport layer
//!
//! - `RestClient` / `ReqwestRest`: GET and form POST over reqwest
//! - `Signer`: pluggable request authentication over form parameters
//! - `WsCodec`: per-feed frame encoding and decoding
//! - `WsSession`: one subscribed WebSocket with independent keepalive and
//!   read tasks
//!
//! Nothing in here knows about a particular exchange's payloads.
pub mod codec;
pub mod rest;
pub mod signer;
pub mod ws;

pub use codec::WsCodec;
pub use rest::{ReqwestRest, RestClient, RestClientBuilder, RestClientConfig};
pub use signer::{encode_form, FormParams, Signer};
pub use ws::{StreamHandle, WsConfig, WsSession};
