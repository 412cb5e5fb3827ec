//! Transport layer: wire-level request/response types and the HTTP transport.
//!
//! Everything above this layer works with [`WireRequest`] and [`WireResponse`]
//! values; only [`ReqwestTransport`] touches the network.

use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use url::Url;

use crate::domain::ValidationError;

/// Default base URI for the primary API host.
pub const DEFAULT_API_BASE_URL: &str = "https://api.altavox.com";
/// Default base URI for the legacy REST host.
pub const DEFAULT_REST_BASE_URL: &str = "https://rest.altavox.com";
/// Default base URI for the notification host.
pub const DEFAULT_NOTIFY_BASE_URL: &str = "https://notify.altavox.com";

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Which configured base URI an endpoint resolves its path against.
pub enum ApiHost {
    /// Primary API host (`https://api.altavox.com`).
    Api,
    /// Legacy REST host (`https://rest.altavox.com`).
    Rest,
    /// Notification host (`https://notify.altavox.com`).
    Notify,
}

#[derive(Debug, Clone)]
/// Read-only transport settings shared by every call made through a client.
///
/// Built once by [`crate::AltavoxClientBuilder`]; base URIs are kept as
/// strings and parsed when a request is resolved, so an unusable override
/// surfaces as a [`ValidationError`] on the first call that uses it.
pub struct TransportConfig {
    api_base_url: String,
    rest_base_url: String,
    notify_base_url: String,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    proxy_url: Option<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            rest_base_url: DEFAULT_REST_BASE_URL.to_owned(),
            notify_base_url: DEFAULT_NOTIFY_BASE_URL.to_owned(),
            timeout: None,
            user_agent: None,
            proxy_url: None,
        }
    }
}

impl TransportConfig {
    pub(crate) fn from_parts(
        api_base_url: String,
        rest_base_url: String,
        notify_base_url: String,
        timeout: Option<Duration>,
        user_agent: Option<String>,
        proxy_url: Option<String>,
    ) -> Self {
        Self {
            api_base_url,
            rest_base_url,
            notify_base_url,
            timeout,
            user_agent,
            proxy_url,
        }
    }

    /// Base URI configured for `host`.
    pub fn base_url(&self, host: ApiHost) -> &str {
        match host {
            ApiHost::Api => &self.api_base_url,
            ApiHost::Rest => &self.rest_base_url,
            ApiHost::Notify => &self.notify_base_url,
        }
    }

    /// Per-call timeout, if one was configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// `User-Agent` override, if one was configured.
    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    /// Proxy URL, if one was configured.
    pub fn proxy_url(&self) -> Option<&str> {
        self.proxy_url.as_deref()
    }

    /// Resolve `path` against the base URI configured for `host`.
    ///
    /// `path` must start with `/`; it is appended to the base, so overrides
    /// that carry a path prefix keep it.
    pub fn resolve(&self, host: ApiHost, path: &str) -> Result<Url, ValidationError> {
        let joined = format!("{}{}", self.base_url(host).trim_end_matches('/'), path);
        Url::parse(&joined).map_err(|_| ValidationError::InvalidUrl { input: joined })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request body as it goes on the wire.
pub enum WireBody {
    Empty,
    /// Already-serialized JSON document.
    Json(Vec<u8>),
    /// URL-encoded form pairs, in insertion order.
    Form(Vec<(String, String)>),
}

#[derive(Debug, Clone)]
/// A fully assembled HTTP request, independent of any HTTP client library.
///
/// Headers live in a `BTreeMap` so iteration order is deterministic.
pub struct WireRequest {
    pub method: reqwest::Method,
    pub url: Url,
    pub headers: BTreeMap<String, String>,
    pub body: WireBody,
}

impl WireRequest {
    pub fn new(method: reqwest::Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: BTreeMap::new(),
            body: WireBody::Empty,
        }
    }

    /// Set a header, replacing any previous value under the same name.
    pub fn header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name.into(), value.into());
    }

    /// Attach a request parameter: a form pair when the body is a form,
    /// otherwise a query-string pair.
    pub fn push_request_param(&mut self, name: &str, value: &str) {
        match &mut self.body {
            WireBody::Form(pairs) => pairs.push((name.to_owned(), value.to_owned())),
            WireBody::Empty | WireBody::Json(_) => {
                self.url.query_pairs_mut().append_pair(name, value);
            }
        }
    }

    /// All request parameters: the form pairs when the body is a form,
    /// otherwise the query-string pairs.
    pub fn request_params(&self) -> Vec<(String, String)> {
        match &self.body {
            WireBody::Form(pairs) => pairs.clone(),
            WireBody::Empty | WireBody::Json(_) => self
                .url
                .query_pairs()
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone)]
/// An HTTP response reduced to what the client layer needs.
pub struct WireResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

impl WireResponse {
    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }

    /// Body decoded as UTF-8, lossily.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Coarse classification of a transport failure.
pub enum TransportFailureKind {
    /// The configured timeout elapsed.
    Timeout,
    /// The connection could not be established (DNS, TCP, TLS).
    Connect,
    /// The request or response body could not be transferred or decoded.
    Body,
    Other,
}

impl fmt::Display for TransportFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Timeout => "request timed out",
            Self::Connect => "connection failed",
            Self::Body => "body transfer failed",
            Self::Other => "transport failed",
        };
        f.write_str(text)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
/// A failure between the client and the server, before any HTTP status was
/// interpreted. The underlying cause is preserved as the error source.
pub struct TransportFailure {
    pub kind: TransportFailureKind,
    #[source]
    pub source: Box<dyn StdError + Send + Sync>,
}

impl TransportFailure {
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            TransportFailureKind::Timeout
        } else if err.is_connect() {
            TransportFailureKind::Connect
        } else if err.is_body() || err.is_decode() {
            TransportFailureKind::Body
        } else {
            TransportFailureKind::Other
        };
        Self {
            kind,
            source: Box::new(err),
        }
    }
}

/// Object-safe HTTP transport with a single send operation.
pub trait HttpTransport: Send + Sync {
    fn send<'a>(
        &'a self,
        request: WireRequest,
    ) -> BoxFuture<'a, Result<WireResponse, TransportFailure>>;
}

#[derive(Debug, Clone)]
/// Production transport backed by a shared `reqwest::Client`.
///
/// `reqwest::Client` owns the connection pool and is safe to share across
/// tasks, so this type is cheap to clone.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl HttpTransport for ReqwestTransport {
    fn send<'a>(
        &'a self,
        request: WireRequest,
    ) -> BoxFuture<'a, Result<WireResponse, TransportFailure>> {
        Box::pin(async move {
            let mut builder = self.client.request(request.method, request.url);
            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }
            builder = match request.body {
                WireBody::Empty => builder,
                WireBody::Json(bytes) => builder.body(bytes),
                WireBody::Form(pairs) => builder.form(&pairs),
            };

            let response = builder.send().await.map_err(TransportFailure::from_reqwest)?;
            let status = response.status().as_u16();
            let mut headers = BTreeMap::new();
            for (name, value) in response.headers() {
                if let Ok(value) = value.to_str() {
                    headers.insert(name.as_str().to_owned(), value.to_owned());
                }
            }
            let body = response
                .bytes()
                .await
                .map_err(TransportFailure::from_reqwest)?
                .to_vec();

            Ok(WireResponse {
                status,
                headers,
                body,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_resolves_against_the_three_hosts() {
        let config = TransportConfig::default();
        assert_eq!(
            config.resolve(ApiHost::Api, "/v1/calls").unwrap().as_str(),
            "https://api.altavox.com/v1/calls"
        );
        assert_eq!(
            config.resolve(ApiHost::Rest, "/sms/json").unwrap().as_str(),
            "https://rest.altavox.com/sms/json"
        );
        assert_eq!(
            config.resolve(ApiHost::Notify, "/ping").unwrap().as_str(),
            "https://notify.altavox.com/ping"
        );
    }

    #[test]
    fn resolve_keeps_a_path_prefix_on_an_overridden_base() {
        let config = TransportConfig::from_parts(
            "https://gateway.example/vapi/".to_owned(),
            DEFAULT_REST_BASE_URL.to_owned(),
            DEFAULT_NOTIFY_BASE_URL.to_owned(),
            None,
            None,
            None,
        );
        assert_eq!(
            config.resolve(ApiHost::Api, "/v1/calls").unwrap().as_str(),
            "https://gateway.example/vapi/v1/calls"
        );
    }

    #[test]
    fn resolve_reports_an_unparseable_base() {
        let config = TransportConfig::from_parts(
            "not a url".to_owned(),
            DEFAULT_REST_BASE_URL.to_owned(),
            DEFAULT_NOTIFY_BASE_URL.to_owned(),
            None,
            None,
            None,
        );
        let err = config.resolve(ApiHost::Api, "/v1/calls").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidUrl { .. }));
    }

    #[test]
    fn request_params_go_to_the_form_when_present() {
        let url = Url::parse("https://rest.altavox.com/sms/json").unwrap();
        let mut request = WireRequest::new(reqwest::Method::POST, url);
        request.body = WireBody::Form(vec![("to".to_owned(), "+447700900001".to_owned())]);

        request.push_request_param("api_key", "abcd1234");

        assert_eq!(request.url.query(), None);
        assert_eq!(
            request.request_params(),
            vec![
                ("to".to_owned(), "+447700900001".to_owned()),
                ("api_key".to_owned(), "abcd1234".to_owned()),
            ]
        );
    }

    #[test]
    fn request_params_fall_back_to_the_query_string() {
        let url = Url::parse("https://rest.altavox.com/account/get-balance").unwrap();
        let mut request = WireRequest::new(reqwest::Method::GET, url);

        request.push_request_param("api_key", "abcd1234");
        request.push_request_param("api_secret", "s3cr3t");

        assert_eq!(
            request.url.as_str(),
            "https://rest.altavox.com/account/get-balance?api_key=abcd1234&api_secret=s3cr3t"
        );
        assert_eq!(request.request_params().len(), 2);
    }

    #[test]
    fn header_replaces_previous_value() {
        let url = Url::parse("https://api.altavox.com/v1/calls").unwrap();
        let mut request = WireRequest::new(reqwest::Method::POST, url);
        request.header("Accept", "application/json");
        request.header("Accept", "application/xml");
        assert_eq!(
            request.headers.get("Accept").map(String::as_str),
            Some("application/xml")
        );
    }
}
