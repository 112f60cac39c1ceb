use crate::core::errors::ExchangeError;
use crate::core::kernel::signer::FormParams;
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;
use std::time::Duration;
use tracing::{instrument, trace};

/// REST transport used by exchange connectors
///
/// The transport knows nothing about authentication or response shapes; it
/// issues the request and hands back the decoded (GET) or raw (POST) body.
#[async_trait]
pub trait RestClient: Send + Sync {
    /// Issue a GET request and decode the body as JSON
    ///
    /// # Arguments
    /// * `endpoint` - Path relative to the configured base URL
    /// * `query_params` - Query parameters, sent in the given order
    async fn get(
        &self,
        endpoint: &str,
        query_params: &[(&str, &str)],
    ) -> Result<Value, ExchangeError>;

    /// Issue a form-encoded POST request and return the raw body
    ///
    /// # Arguments
    /// * `endpoint` - Path relative to the configured base URL
    /// * `form` - Form fields, already signed when the endpoint requires it
    async fn post_form(&self, endpoint: &str, form: &FormParams) -> Result<Vec<u8>, ExchangeError>;
}

/// Configuration for the REST client
#[derive(Clone, Debug)]
pub struct RestClientConfig {
    /// Base URL for the API, including the trailing slash
    pub base_url: String,
    /// Exchange name for logging and tracing
    pub exchange_name: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string to include in requests
    pub user_agent: String,
}

impl RestClientConfig {
    pub fn new(base_url: String, exchange_name: String) -> Self {
        Self {
            base_url,
            exchange_name,
            timeout_seconds: 30,
            user_agent: "okcoinx/0.1".to_string(),
        }
    }

    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }
}

/// Builder for creating REST client instances
pub struct RestClientBuilder {
    config: RestClientConfig,
}

impl RestClientBuilder {
    pub fn new(config: RestClientConfig) -> Self {
        Self { config }
    }

    pub fn build(self) -> Result<ReqwestRest, ExchangeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(self.config.timeout_seconds))
            .user_agent(&self.config.user_agent)
            .build()?;

        Ok(ReqwestRest {
            client,
            config: self.config,
        })
    }
}

/// Implementation of `RestClient` using reqwest
#[derive(Clone)]
pub struct ReqwestRest {
    client: Client,
    config: RestClientConfig,
}

impl std::fmt::Debug for ReqwestRest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestRest")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ReqwestRest {
    pub fn new(base_url: String, exchange_name: String) -> Result<Self, ExchangeError> {
        RestClientBuilder::new(RestClientConfig::new(base_url, exchange_name)).build()
    }

    pub fn config(&self) -> &RestClientConfig {
        &self.config
    }

    fn build_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.config.base_url, endpoint)
    }

    /// Read the body, turning non-success statuses into network errors
    async fn read_body(&self, response: Response) -> Result<Vec<u8>, ExchangeError> {
        let status = response.status();
        let body = response.bytes().await?;

        trace!(
            exchange = %self.config.exchange_name,
            status = %status,
            "Response body: {}",
            String::from_utf8_lossy(&body)
        );

        if status.is_success() {
            Ok(body.to_vec())
        } else {
            Err(ExchangeError::NetworkError(format!(
                "HTTP {}: {}",
                status,
                String::from_utf8_lossy(&body)
            )))
        }
    }
}

#[async_trait]
impl RestClient for ReqwestRest {
    #[instrument(skip(self, query_params), fields(exchange = %self.config.exchange_name, endpoint = %endpoint, param_count = query_params.len()))]
    async fn get(
        &self,
        endpoint: &str,
        query_params: &[(&str, &str)],
    ) -> Result<Value, ExchangeError> {
        let response = self
            .client
            .get(self.build_url(endpoint))
            .query(query_params)
            .send()
            .await?;

        let body = self.read_body(response).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    #[instrument(skip(self, form), fields(exchange = %self.config.exchange_name, endpoint = %endpoint, param_count = form.len()))]
    async fn post_form(&self, endpoint: &str, form: &FormParams) -> Result<Vec<u8>, ExchangeError> {
        let response = self
            .client
            .post(self.build_url(endpoint))
            .form(form)
            .send()
            .await?;

        self.read_body(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url_joins_base_and_endpoint() {
        let rest = ReqwestRest::new(
            "https://www.okcoin.cn/api/v1/".to_string(),
            "okcoin.cn".to_string(),
        )
        .unwrap();
        assert_eq!(
            rest.build_url("ticker.do"),
            "https://www.okcoin.cn/api/v1/ticker.do"
        );
    }

    #[test]
    fn test_config_builder() {
        let config = RestClientConfig::new("http://localhost/".to_string(), "test".to_string())
            .with_timeout(5)
            .with_user_agent("agent".to_string());
        assert_eq!(config.timeout_seconds, 5);
        assert_eq!(config.user_agent, "agent");
    }
}
