//! Account API: read the current balance.

use std::sync::Arc;

use reqwest::Method;
use serde::Deserialize;

use crate::auth::{AuthKind, BasicPlacement};
use crate::client::{AltavoxError, RequestExecutor};
use crate::domain::ValidationError;
use crate::endpoint::{parse_json, BodyKind, EndpointDescriptor, Operation};
use crate::transport::{ApiHost, TransportConfig, WireRequest};

#[derive(Debug, Clone, Copy, Default)]
/// The balance endpoint takes no request data of its own.
pub struct BalanceRequest;

fn build_balance(
    _request: &BalanceRequest,
    config: &TransportConfig,
    descriptor: &EndpointDescriptor,
) -> Result<WireRequest, ValidationError> {
    let url = config.resolve(descriptor.host, descriptor.path)?;
    Ok(WireRequest::new(descriptor.method.clone(), url))
}

/// `GET /account/get-balance` on the legacy REST host. Credentials ride in
/// the query string, as that host expects.
pub static BALANCE: Operation<BalanceRequest, AccountBalance> = Operation {
    descriptor: EndpointDescriptor {
        method: Method::GET,
        host: ApiHost::Rest,
        path: "/account/get-balance",
        auth: &[AuthKind::Basic],
        basic_placement: BasicPlacement::Params,
        body: BodyKind::None,
        accept: None,
    },
    build: build_balance,
    parse: parse_json::<AccountBalance>,
};

#[derive(Debug, Clone, PartialEq, Deserialize)]
/// Current account balance in EUR.
pub struct AccountBalance {
    pub value: f64,
    #[serde(rename = "autoReload")]
    pub auto_reload: bool,
}

#[derive(Clone)]
/// Account API client, obtained from [`crate::AltavoxClient::account`].
pub struct AccountClient {
    executor: Arc<RequestExecutor>,
}

impl AccountClient {
    pub(crate) fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    /// Read the current balance.
    pub async fn balance(&self) -> Result<AccountBalance, AltavoxError> {
        self.executor.execute(&BALANCE, &BalanceRequest).await
    }
}
