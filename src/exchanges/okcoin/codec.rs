use crate::core::errors::ExchangeError;
use crate::core::kernel::WsCodec;
use crate::core::types::{Depth, Trade};
use crate::exchanges::okcoin::conversions::{parse_stream_depth, parse_trade_tuples};
use chrono::Local;
use serde_json::{json, Value};
use tokio_tungstenite::tungstenite::Message;

const ADD_CHANNEL: &str = "addChannel";

fn subscription_frame(topic: &str) -> Message {
    Message::Text(json!({"event": ADD_CHANNEL, "channel": topic}).to_string())
}

fn ping_frame() -> Message {
    Message::Text(json!({"event": "ping"}).to_string())
}

/// Pull the `data` payload out of an OKCoin v1 push frame.
///
/// Pushes look like `[{"channel": "...", "data": ...}]`. Pong replies and
/// `addChannel` acknowledgements carry nothing and yield `None`.
fn frame_data(message: Message) -> Result<Option<Value>, ExchangeError> {
    let text = match message {
        Message::Text(text) => text,
        Message::Binary(bytes) => String::from_utf8(bytes).map_err(|e| {
            ExchangeError::InvalidResponseFormat(format!("Invalid UTF-8 in binary frame: {}", e))
        })?,
        _ => return Ok(None),
    };

    let value: Value = serde_json::from_str(&text)?;

    match value {
        Value::Object(object) => match object.get("event").and_then(Value::as_str) {
            Some("pong") => Ok(None),
            _ => Err(ExchangeError::InvalidResponseFormat(format!(
                "Unexpected frame: {}",
                text
            ))),
        },
        Value::Array(entries) => {
            let Some(Value::Object(mut entry)) = entries.into_iter().next() else {
                return Err(ExchangeError::InvalidResponseFormat(format!(
                    "Push frame has no channel entry: {}",
                    text
                )));
            };

            if entry.get("channel").and_then(Value::as_str) == Some(ADD_CHANNEL) {
                return Ok(None);
            }

            entry.remove("data").map(Some).ok_or_else(|| {
                ExchangeError::InvalidResponseFormat(format!("Push frame has no data: {}", text))
            })
        }
        _ => Err(ExchangeError::InvalidResponseFormat(format!(
            "Unexpected frame: {}",
            text
        ))),
    }
}

/// Codec for `ok_sub_spot_<pair>_depth`
#[derive(Debug, Clone, Copy, Default)]
pub struct OkcoinDepthCodec;

impl WsCodec for OkcoinDepthCodec {
    type Message = Depth;

    fn encode_subscription(&self, topic: &str) -> Result<Message, ExchangeError> {
        Ok(subscription_frame(topic))
    }

    fn encode_ping(&self) -> Result<Message, ExchangeError> {
        Ok(ping_frame())
    }

    fn decode_message(&self, message: Message) -> Result<Option<Self::Message>, ExchangeError> {
        frame_data(message)?
            .map(|data| parse_stream_depth(&data))
            .transpose()
    }
}

/// Codec for `ok_sub_spot_<pair>_deals`
///
/// Deal tuples only carry a time of day, so the date comes from the local
/// clock at decode time.
#[derive(Debug, Clone, Copy, Default)]
pub struct OkcoinTradeCodec;

impl WsCodec for OkcoinTradeCodec {
    type Message = Vec<Trade>;

    fn encode_subscription(&self, topic: &str) -> Result<Message, ExchangeError> {
        Ok(subscription_frame(topic))
    }

    fn encode_ping(&self) -> Result<Message, ExchangeError> {
        Ok(ping_frame())
    }

    fn decode_message(&self, message: Message) -> Result<Option<Self::Message>, ExchangeError> {
        frame_data(message)?
            .map(|data| parse_trade_tuples(&data, &Local::now()))
            .transpose()
    }
}
