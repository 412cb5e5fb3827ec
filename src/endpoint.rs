//! Endpoint descriptions: one [`Operation`] value per API operation.
//!
//! An operation is plain data plus two functions. The descriptor says where
//! the request goes and which auth kinds are acceptable; `build` turns a
//! typed request into a [`WireRequest`]; `parse` turns a [`WireResponse`]
//! into the typed result. The executor owns everything in between, so new
//! endpoints (including out-of-tree ones) add no control flow.

use reqwest::Method;

use crate::auth::{AuthKind, BasicPlacement};
use crate::domain::ValidationError;
use crate::transport::{ApiHost, TransportConfig, WireRequest, WireResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Body an endpoint sends, declared up front so the executor can set the
/// matching `Content-Type`.
pub enum BodyKind {
    None,
    Json,
    Form,
}

#[derive(Debug, Clone)]
/// Static description of one API endpoint.
pub struct EndpointDescriptor {
    /// HTTP verb.
    pub method: Method,
    /// Which configured base URI the path resolves against.
    pub host: ApiHost,
    /// Path under the host's base URI; `build` may append path parameters.
    pub path: &'static str,
    /// Acceptable auth kinds, most preferred first.
    pub auth: &'static [AuthKind],
    /// Where basic credentials go if the basic kind is selected.
    pub basic_placement: BasicPlacement,
    /// Declared request body kind.
    pub body: BodyKind,
    /// `Accept` header override; `application/json` when `None`.
    pub accept: Option<&'static str>,
}

impl EndpointDescriptor {
    pub fn accept(&self) -> &'static str {
        self.accept.unwrap_or("application/json")
    }
}

#[derive(Debug, thiserror::Error)]
#[error("response body does not match the expected shape: {source}")]
/// A 2xx response whose body did not decode as the operation's result type.
pub struct ResponseParseError {
    #[source]
    source: serde_json::Error,
}

impl From<serde_json::Error> for ResponseParseError {
    fn from(source: serde_json::Error) -> Self {
        Self { source }
    }
}

/// An endpoint descriptor bundled with its request builder and response
/// parser. Defined as `static` values by the service modules and executed
/// through [`crate::AltavoxClient::execute`].
pub struct Operation<Req, Res> {
    pub descriptor: EndpointDescriptor,
    pub build:
        fn(&Req, &TransportConfig, &EndpointDescriptor) -> Result<WireRequest, ValidationError>,
    pub parse: fn(&WireResponse) -> Result<Res, ResponseParseError>,
}

/// Decode a JSON response body; shared by most `parse` functions.
pub fn parse_json<Res: serde::de::DeserializeOwned>(
    response: &WireResponse,
) -> Result<Res, ResponseParseError> {
    Ok(serde_json::from_slice(&response.body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accept_defaults_to_json() {
        let descriptor = EndpointDescriptor {
            method: Method::GET,
            host: ApiHost::Api,
            path: "/v1/calls",
            auth: &[AuthKind::Bearer],
            basic_placement: BasicPlacement::Header,
            body: BodyKind::None,
            accept: None,
        };
        assert_eq!(descriptor.accept(), "application/json");

        let overridden = EndpointDescriptor {
            accept: Some("text/plain"),
            ..descriptor
        };
        assert_eq!(overridden.accept(), "text/plain");
    }
}
