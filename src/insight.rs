//! Number insight API: look up what the platform knows about a phone number.

use std::sync::Arc;

use reqwest::Method;
use serde::Deserialize;

use crate::auth::{AuthKind, BasicPlacement};
use crate::client::{AltavoxError, RequestExecutor};
use crate::domain::{Msisdn, ValidationError};
use crate::endpoint::{parse_json, BodyKind, EndpointDescriptor, Operation};
use crate::transport::{ApiHost, TransportConfig, WireBody, WireRequest};

#[derive(Debug, Clone)]
/// Look up basic facts about a number.
pub struct BasicInsightRequest {
    number: Msisdn,
    country: Option<String>,
}

impl BasicInsightRequest {
    pub fn new(number: Msisdn) -> Self {
        Self {
            number,
            country: None,
        }
    }

    /// Two-letter country hint for nationally formatted numbers.
    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }
}

fn build_basic(
    request: &BasicInsightRequest,
    config: &TransportConfig,
    descriptor: &EndpointDescriptor,
) -> Result<WireRequest, ValidationError> {
    let url = config.resolve(descriptor.host, descriptor.path)?;
    let mut wire = WireRequest::new(descriptor.method.clone(), url);

    let mut form = vec![("number".to_owned(), request.number.as_str().to_owned())];
    if let Some(country) = &request.country {
        form.push(("country".to_owned(), country.clone()));
    }
    wire.body = WireBody::Form(form);
    Ok(wire)
}

/// `POST /ni/basic/json` on the primary API host.
pub static BASIC: Operation<BasicInsightRequest, BasicInsight> = Operation {
    descriptor: EndpointDescriptor {
        method: Method::POST,
        host: ApiHost::Api,
        path: "/ni/basic/json",
        auth: &[AuthKind::Signature, AuthKind::Basic],
        basic_placement: BasicPlacement::Params,
        body: BodyKind::Form,
        accept: None,
    },
    build: build_basic,
    parse: parse_json::<BasicInsight>,
};

#[derive(Debug, Clone, PartialEq, Deserialize)]
/// Basic lookup result. `status` is `0` on success; anything else comes
/// with `status_message`.
pub struct BasicInsight {
    pub status: i64,
    pub status_message: Option<String>,
    pub request_id: Option<String>,
    pub international_format_number: Option<String>,
    pub national_format_number: Option<String>,
    pub country_code: Option<String>,
    pub country_code_iso3: Option<String>,
    pub country_name: Option<String>,
    pub country_prefix: Option<String>,
}

#[derive(Clone)]
/// Number insight API client, obtained from [`crate::AltavoxClient::insight`].
pub struct InsightClient {
    executor: Arc<RequestExecutor>,
}

impl InsightClient {
    pub(crate) fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    /// Run a basic lookup.
    pub async fn basic(&self, request: &BasicInsightRequest) -> Result<BasicInsight, AltavoxError> {
        self.executor.execute(&BASIC, request).await
    }
}
