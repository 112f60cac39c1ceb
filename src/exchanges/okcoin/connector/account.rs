use crate::core::errors::ExchangeError;
use crate::core::kernel::RestClient;
use crate::core::traits::AccountInfo;
use crate::exchanges::okcoin::conversions::parse_account;
use crate::exchanges::okcoin::rest::OkcoinRest;
use crate::exchanges::okcoin::types::EXCHANGE_NAME;
use async_trait::async_trait;
use tracing::instrument;

/// Account snapshot for OKCoin
pub struct Account<R: RestClient> {
    rest: OkcoinRest<R>,
}

impl<R: RestClient + Clone> Account<R> {
    pub fn new(rest: &OkcoinRest<R>) -> Self {
        Self { rest: rest.clone() }
    }
}

#[async_trait]
impl<R: RestClient> AccountInfo for Account<R> {
    #[instrument(skip(self))]
    async fn get_account(&self) -> Result<crate::core::types::Account, ExchangeError> {
        let body = self.rest.get_user_info().await?;
        parse_account(&body, EXCHANGE_NAME)
    }
}
