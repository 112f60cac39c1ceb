use crate::core::errors::ExchangeError;
use crate::core::kernel::codec::WsCodec;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch, Mutex};
use tokio::time::{Interval, MissedTickBehavior};
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};
use tracing::{debug, error, info, instrument, warn};

/// WebSocket session configuration
#[derive(Debug, Clone)]
pub struct WsConfig {
    /// Connection timeout in milliseconds
    pub connect_timeout_ms: u64,
    /// Interval between application-level pings in milliseconds
    pub ping_interval_ms: u64,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 10_000,
            ping_interval_ms: 30_000,
        }
    }
}

impl WsConfig {
    pub fn with_ping_interval(mut self, interval: Duration) -> Self {
        self.ping_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_ms = timeout.as_millis() as u64;
        self
    }
}

/// Owner side of a running stream session.
///
/// `updates` yields decoded frames. `done` resolves once the session has shut
/// down and released its connection. Calling [`StreamHandle::close`] or
/// dropping the handle cancels the session.
#[derive(Debug)]
pub struct StreamHandle<T> {
    pub updates: mpsc::Receiver<T>,
    pub done: oneshot::Receiver<()>,
    cancel: watch::Sender<bool>,
    topic: String,
}

impl<T> StreamHandle<T> {
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Receive the next update; `None` once the session has ended
    pub async fn recv(&mut self) -> Option<T> {
        self.updates.recv().await
    }

    /// Ask the session to shut down. Idempotent.
    pub fn close(&self) {
        let _ = self.cancel.send(true);
    }
}

/// One WebSocket connection carrying one subscription.
///
/// Once subscribed, two tasks share the connection: a keepalive task that
/// writes a ping every `ping_interval_ms`, and a read task that decodes frames
/// and forwards them. Writes go through a mutex around the sink, so the reader
/// blocking on the network or on a slow consumer never holds up the pings.
pub struct WsSession;

impl WsSession {
    /// Dial `url`, subscribe to `topic` and start streaming.
    ///
    /// A dial failure returns an error and starts nothing.
    #[instrument(skip(codec, config), fields(url = %url, topic = %topic))]
    pub async fn connect<C: WsCodec>(
        url: &str,
        topic: &str,
        codec: C,
        config: &WsConfig,
    ) -> Result<StreamHandle<C::Message>, ExchangeError> {
        let connect_timeout = Duration::from_millis(config.connect_timeout_ms);

        let (ws_stream, _) = tokio::time::timeout(connect_timeout, connect_async(url))
            .await
            .map_err(|_| {
                ExchangeError::ConnectionTimeout(format!("WebSocket connection to {} timed out", url))
            })?
            .map_err(|e| {
                ExchangeError::NetworkError(format!("WebSocket connection failed: {}", e))
            })?;

        let (sink, stream) = ws_stream.split();
        Self::spawn(sink, stream, topic, codec, config).await
    }

    /// Subscribe over an already established transport and start streaming.
    pub async fn spawn<C, Si, St, E>(
        mut sink: Si,
        stream: St,
        topic: &str,
        codec: C,
        config: &WsConfig,
    ) -> Result<StreamHandle<C::Message>, ExchangeError>
    where
        C: WsCodec,
        Si: Sink<Message> + Unpin + Send + 'static,
        Si::Error: Display,
        St: Stream<Item = Result<Message, E>> + Unpin + Send + 'static,
        E: Display + Send + 'static,
    {
        let subscribe = codec.encode_subscription(topic)?;
        let ping = codec.encode_ping()?;

        sink.send(subscribe).await.map_err(|e| {
            ExchangeError::WebSocketError(format!("Failed to send subscription: {}", e))
        })?;
        debug!(topic, "subscribed");

        let sink = Arc::new(Mutex::new(sink));
        let (update_tx, update_rx) = mpsc::channel(1);
        let (done_tx, done_rx) = oneshot::channel();
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let ping_interval = Duration::from_millis(config.ping_interval_ms.max(1));

        let keepalive = tokio::spawn(keepalive_loop(
            Arc::clone(&sink),
            ping,
            ping_interval,
            cancel_rx.clone(),
            topic.to_string(),
        ));

        let reader_topic = topic.to_string();
        tokio::spawn(async move {
            read_loop(stream, codec, update_tx, cancel_rx, &reader_topic).await;

            keepalive.abort();
            let mut sink = sink.lock().await;
            if let Err(e) = sink.send(Message::Close(None)).await {
                debug!(topic = %reader_topic, "close frame not sent: {}", e);
            }
            let _ = sink.close().await;
            drop(sink);

            info!(topic = %reader_topic, "stream session closed");
            let _ = done_tx.send(());
        });

        Ok(StreamHandle {
            updates: update_rx,
            done: done_rx,
            cancel: cancel_tx,
            topic: topic.to_string(),
        })
    }
}

/// Resolves once the owner cancels or drops the handle
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    while !*cancel.borrow_and_update() {
        if cancel.changed().await.is_err() {
            return;
        }
    }
}

/// Ping timer; ticks missed behind a slow sink are not replayed in a burst
fn keepalive_interval(period: Duration) -> Interval {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

async fn keepalive_loop<Si>(
    sink: Arc<Mutex<Si>>,
    ping: Message,
    period: Duration,
    mut cancel: watch::Receiver<bool>,
    topic: String,
) where
    Si: Sink<Message> + Unpin + Send,
    Si::Error: Display,
{
    let mut interval = keepalive_interval(period);
    // The first tick completes immediately
    interval.tick().await;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let mut writer = sink.lock().await;
                match writer.send(ping.clone()).await {
                    Ok(()) => debug!(topic = %topic, "ping sent"),
                    Err(e) => warn!(topic = %topic, "Failed to send ping: {}", e),
                }
            }
            () = cancelled(&mut cancel) => return,
        }
    }
}

async fn read_loop<C, St, E>(
    mut stream: St,
    codec: C,
    updates: mpsc::Sender<C::Message>,
    mut cancel: watch::Receiver<bool>,
    topic: &str,
) where
    C: WsCodec,
    St: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    loop {
        let frame = tokio::select! {
            frame = stream.next() => frame,
            () = cancelled(&mut cancel) => {
                debug!(topic, "stream cancelled by owner");
                return;
            }
        };

        let message = match frame {
            Some(Ok(Message::Close(close))) => {
                info!(topic, "WebSocket closed by server: {:?}", close);
                return;
            }
            Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => continue,
            Some(Ok(message)) => message,
            Some(Err(e)) => {
                error!(topic, "WebSocket read failed: {}", e);
                return;
            }
            None => {
                info!(topic, "WebSocket stream ended");
                return;
            }
        };

        match codec.decode_message(message) {
            Ok(Some(update)) => {
                tokio::select! {
                    sent = updates.send(update) => {
                        if sent.is_err() {
                            debug!(topic, "update receiver dropped");
                            return;
                        }
                    }
                    () = cancelled(&mut cancel) => return,
                }
            }
            Ok(None) => {}
            Err(e) => warn!(topic, "Skipping malformed frame: {}", e),
        }
    }
}
