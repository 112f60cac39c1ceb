use crate::core::config::ExchangeConfig;
use crate::core::errors::ExchangeError;
use crate::core::kernel::{ReqwestRest, RestClient, RestClientBuilder, RestClientConfig, Signer, WsConfig};
use crate::exchanges::okcoin::connector::OkcoinConnector;
use crate::exchanges::okcoin::rest::OkcoinRest;
use crate::exchanges::okcoin::signer::OkcoinSigner;
use crate::exchanges::okcoin::types::{KlineIntervalTable, API_BASE_URL, EXCHANGE_NAME, WS_URL};
use std::sync::Arc;
use std::time::Duration;

/// The exchange drops idle feeds quickly, so pings go out every second
pub const DEFAULT_PING_INTERVAL: Duration = Duration::from_secs(1);

/// Assembles an [`OkcoinConnector`] from an [`ExchangeConfig`] plus transport
/// tuning.
pub struct OkcoinBuilder {
    config: ExchangeConfig,
    rest_timeout_seconds: u64,
    ws_config: WsConfig,
    kline_intervals: KlineIntervalTable,
}

impl OkcoinBuilder {
    pub fn new(config: ExchangeConfig) -> Self {
        Self {
            config,
            rest_timeout_seconds: 30,
            ws_config: WsConfig::default().with_ping_interval(DEFAULT_PING_INTERVAL),
            kline_intervals: KlineIntervalTable::default(),
        }
    }

    pub fn with_rest_timeout(mut self, timeout_seconds: u64) -> Self {
        self.rest_timeout_seconds = timeout_seconds;
        self
    }

    pub fn with_ws_ping_interval(mut self, interval: Duration) -> Self {
        self.ws_config = self.ws_config.with_ping_interval(interval);
        self
    }

    pub fn with_ws_connect_timeout(mut self, timeout: Duration) -> Self {
        self.ws_config = self.ws_config.with_connect_timeout(timeout);
        self
    }

    /// Replace the kline interval strings; intervals left out become unsupported
    pub fn with_kline_intervals(mut self, kline_intervals: KlineIntervalTable) -> Self {
        self.kline_intervals = kline_intervals;
        self
    }

    /// Base URL with a trailing slash so endpoints can be appended directly
    fn base_url(&self) -> String {
        let base_url = self.config.base_url.as_deref().unwrap_or(API_BASE_URL);
        if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        }
    }

    fn signer(&self) -> Option<Arc<dyn Signer>> {
        if !self.config.has_credentials() {
            return None;
        }
        let signer: Arc<dyn Signer> = Arc::new(OkcoinSigner::new(
            self.config.api_key().to_string(),
            self.config.secret_key().to_string(),
        ));
        Some(signer)
    }

    /// Build over the reqwest transport
    pub fn build(self) -> Result<OkcoinConnector<ReqwestRest>, ExchangeError> {
        let rest_config = RestClientConfig::new(self.base_url(), EXCHANGE_NAME.to_string())
            .with_timeout(self.rest_timeout_seconds);
        let rest = RestClientBuilder::new(rest_config).build()?;

        Ok(self.build_with_rest(rest))
    }

    /// Build over any transport, e.g. a recording client in tests
    pub fn build_with_rest<R: RestClient + Clone>(self, rest: R) -> OkcoinConnector<R> {
        let rest = OkcoinRest::new(rest, self.signer());
        let ws_url = self
            .config
            .ws_url
            .clone()
            .unwrap_or_else(|| WS_URL.to_string());

        OkcoinConnector::new(rest, self.kline_intervals, ws_url, self.ws_config)
    }
}

/// Create an OKCoin connector with default transport settings
pub fn build_connector(
    config: ExchangeConfig,
) -> Result<OkcoinConnector<ReqwestRest>, ExchangeError> {
    OkcoinBuilder::new(config).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::MarketStreams;

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let builder = OkcoinBuilder::new(
            ExchangeConfig::read_only().base_url("http://localhost:8080/api/v1".to_string()),
        );
        assert_eq!(builder.base_url(), "http://localhost:8080/api/v1/");

        let builder = OkcoinBuilder::new(ExchangeConfig::read_only());
        assert_eq!(builder.base_url(), API_BASE_URL);
    }

    #[test]
    fn test_read_only_connector_cannot_authenticate() {
        let connector = build_connector(ExchangeConfig::read_only()).unwrap();
        assert!(!connector.can_authenticate());
        assert_eq!(connector.get_websocket_url(), WS_URL);
    }

    #[test]
    fn test_credentials_enable_signing() {
        let config = ExchangeConfig::new("key".to_string(), "secret".to_string())
            .ws_url("ws://localhost:9000".to_string());
        let connector = OkcoinBuilder::new(config)
            .with_ws_ping_interval(Duration::from_millis(250))
            .build()
            .unwrap();
        assert!(connector.can_authenticate());
        assert_eq!(connector.get_websocket_url(), "ws://localhost:9000");
    }
}
