use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;

use crate::domain::{ApiKey, ApiSecret};
use crate::transport::WireRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Where an endpoint expects basic credentials.
pub enum BasicPlacement {
    /// `Authorization: Basic base64(key:secret)` request header.
    Header,
    /// `api_key` / `api_secret` request parameters.
    Params,
}

#[derive(Debug, Clone)]
/// Key/secret pair attached per the endpoint's declared placement.
pub struct BasicAuth {
    key: ApiKey,
    secret: ApiSecret,
}

impl BasicAuth {
    pub(crate) fn new(key: ApiKey, secret: ApiSecret) -> Self {
        Self { key, secret }
    }

    pub fn apply(&self, request: &mut WireRequest, placement: BasicPlacement) {
        match placement {
            BasicPlacement::Header => {
                let raw = format!("{}:{}", self.key.as_str(), self.secret.as_str());
                let header = format!("Basic {}", BASE64_STANDARD.encode(raw));
                request.header("Authorization", header);
            }
            BasicPlacement::Params => {
                request.push_request_param(ApiKey::FIELD, self.key.as_str());
                request.push_request_param(ApiSecret::FIELD, self.secret.as_str());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::assert_param;
    use crate::transport::{WireBody, WireRequest};
    use url::Url;

    fn auth() -> BasicAuth {
        BasicAuth::new(ApiKey::new("k").unwrap(), ApiSecret::new("s").unwrap())
    }

    #[test]
    fn header_placement_sets_a_basic_authorization_header() {
        let url = Url::parse("https://api.altavox.com/verify/json").unwrap();
        let mut request = WireRequest::new(reqwest::Method::POST, url);
        auth().apply(&mut request, BasicPlacement::Header);

        // base64("k:s")
        assert_eq!(
            request.headers.get("Authorization").map(String::as_str),
            Some("Basic azpz")
        );
        assert!(request.request_params().is_empty());
    }

    #[test]
    fn params_placement_attaches_key_and_secret() {
        let url = Url::parse("https://rest.altavox.com/sms/json").unwrap();
        let mut request = WireRequest::new(reqwest::Method::POST, url);
        request.body = WireBody::Form(vec![("to".to_owned(), "+447700900001".to_owned())]);
        auth().apply(&mut request, BasicPlacement::Params);

        let params = request.request_params();
        assert_param(&params, "api_key", "k");
        assert_param(&params, "api_secret", "s");
        assert!(!request.headers.contains_key("Authorization"));
    }
}
