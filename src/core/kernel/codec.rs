use crate::core::errors::ExchangeError;
use tokio_tungstenite::tungstenite::Message;

/// Codec trait for handling exchange-specific WebSocket message encoding/decoding
///
/// A codec serves one feed. The session asks it for the subscribe and
/// keepalive frames and hands it every inbound data frame.
pub trait WsCodec: Send + Sync + 'static {
    /// The typed update produced from one inbound frame
    type Message: Send + 'static;

    /// Encode the subscription request for `topic`
    fn encode_subscription(&self, topic: &str) -> Result<Message, ExchangeError>;

    /// Encode the application-level keepalive frame
    fn encode_ping(&self) -> Result<Message, ExchangeError>;

    /// Decode a raw WebSocket message into a typed update
    ///
    /// Control frames (ping, pong, close) are handled by the session and never
    /// reach the codec.
    ///
    /// # Returns
    /// - `Ok(Some(update))` - Successfully decoded update
    /// - `Ok(None)` - Frame carried no update (acknowledgement, pong)
    /// - `Err(error)` - Frame was malformed
    fn decode_message(&self, message: Message) -> Result<Option<Self::Message>, ExchangeError>;
}
