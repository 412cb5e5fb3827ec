//! Client layer: the builder, the shared executor, and the error taxonomy.

mod error;
mod executor;

use std::sync::Arc;
use std::time::Duration;

pub use error::{AltavoxError, ApiFailure, ErrorCategory};
pub(crate) use executor::RequestExecutor;

use crate::account::AccountClient;
use crate::auth::{Clock, Credential, CredentialRegistry, SystemClock};
use crate::domain::ValidationError;
use crate::endpoint::Operation;
use crate::insight::InsightClient;
use crate::sms::SmsClient;
use crate::transport::{
    HttpTransport, ReqwestTransport, TransportConfig, TransportFailure, DEFAULT_API_BASE_URL,
    DEFAULT_NOTIFY_BASE_URL, DEFAULT_REST_BASE_URL,
};
use crate::verify::VerifyClient;
use crate::voice::VoiceClient;

const DEFAULT_USER_AGENT: &str = concat!("altavox-rust/", env!("CARGO_PKG_VERSION"));

#[derive(Clone)]
/// Builder for [`AltavoxClient`].
///
/// Collects credentials and transport settings; [`build`](Self::build) is
/// where credential registration and HTTP client construction can fail.
pub struct AltavoxClientBuilder {
    credentials: Vec<Credential>,
    api_base_url: String,
    rest_base_url: String,
    notify_base_url: String,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    proxy_url: Option<String>,
    clock: Arc<dyn Clock>,
}

impl Default for AltavoxClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AltavoxClientBuilder {
    pub fn new() -> Self {
        Self {
            credentials: Vec::new(),
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            rest_base_url: DEFAULT_REST_BASE_URL.to_owned(),
            notify_base_url: DEFAULT_NOTIFY_BASE_URL.to_owned(),
            timeout: None,
            user_agent: None,
            proxy_url: None,
            clock: Arc::new(SystemClock),
        }
    }

    /// Register a credential. At most one credential per auth kind; a
    /// duplicate kind makes [`build`](Self::build) fail.
    pub fn credential(mut self, credential: Credential) -> Self {
        self.credentials.push(credential);
        self
    }

    /// Override the primary API base URI.
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Override the legacy REST base URI.
    pub fn rest_base_url(mut self, url: impl Into<String>) -> Self {
        self.rest_base_url = url.into();
        self
    }

    /// Override the notification base URI.
    pub fn notify_base_url(mut self, url: impl Into<String>) -> Self {
        self.notify_base_url = url.into();
        self
    }

    /// Set a timeout applied to each request as a whole.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Route all requests through the given proxy URL.
    pub fn proxy_url(mut self, url: impl Into<String>) -> Self {
        self.proxy_url = Some(url.into());
        self
    }

    /// Replace the time source used for signature timestamps and token
    /// expiry checks.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Build an [`AltavoxClient`].
    pub fn build(self) -> Result<AltavoxClient, AltavoxError> {
        let registry = CredentialRegistry::new(self.credentials, Arc::clone(&self.clock))?;
        let config = TransportConfig::from_parts(
            self.api_base_url,
            self.rest_base_url,
            self.notify_base_url,
            self.timeout,
            self.user_agent,
            self.proxy_url,
        );

        let mut builder = reqwest::Client::builder()
            .user_agent(config.user_agent().unwrap_or(DEFAULT_USER_AGENT).to_owned());
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        if let Some(proxy_url) = config.proxy_url() {
            let proxy = reqwest::Proxy::all(proxy_url).map_err(|_| {
                AltavoxError::Validation(ValidationError::InvalidUrl {
                    input: proxy_url.to_owned(),
                })
            })?;
            builder = builder.proxy(proxy);
        }
        let client = builder
            .build()
            .map_err(|err| AltavoxError::Transport(TransportFailure::from_reqwest(err)))?;

        Ok(AltavoxClient::from_parts(
            config,
            registry,
            Arc::new(ReqwestTransport::new(client)),
        ))
    }

    #[cfg(test)]
    pub(crate) fn build_with_transport(
        self,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<AltavoxClient, AltavoxError> {
        let registry = CredentialRegistry::new(self.credentials, Arc::clone(&self.clock))?;
        let config = TransportConfig::from_parts(
            self.api_base_url,
            self.rest_base_url,
            self.notify_base_url,
            self.timeout,
            self.user_agent,
            self.proxy_url,
        );
        Ok(AltavoxClient::from_parts(config, registry, transport))
    }
}

#[derive(Clone)]
/// Entry point to the Altavox APIs.
///
/// Cheap to clone and safe to share across tasks: all state behind it is
/// immutable except the bearer token cache, which handles its own locking.
pub struct AltavoxClient {
    executor: Arc<RequestExecutor>,
}

impl AltavoxClient {
    /// Start building a client.
    pub fn builder() -> AltavoxClientBuilder {
        AltavoxClientBuilder::new()
    }

    fn from_parts(
        config: TransportConfig,
        registry: CredentialRegistry,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            executor: Arc::new(RequestExecutor::new(config, registry, transport)),
        }
    }

    /// Execute any [`Operation`], including ones defined outside this crate.
    pub async fn execute<Req, Res>(
        &self,
        operation: &Operation<Req, Res>,
        request: &Req,
    ) -> Result<Res, AltavoxError> {
        self.executor.execute(operation, request).await
    }

    /// SMS API client.
    pub fn sms(&self) -> SmsClient {
        SmsClient::new(Arc::clone(&self.executor))
    }

    /// Verification API client.
    pub fn verify(&self) -> VerifyClient {
        VerifyClient::new(Arc::clone(&self.executor))
    }

    /// Number insight API client.
    pub fn insight(&self) -> InsightClient {
        InsightClient::new(Arc::clone(&self.executor))
    }

    /// Account API client.
    pub fn account(&self) -> AccountClient {
        AccountClient::new(Arc::clone(&self.executor))
    }

    /// Voice API client.
    pub fn voice(&self) -> VoiceClient {
        VoiceClient::new(Arc::clone(&self.executor))
    }
}
