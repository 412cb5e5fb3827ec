use std::fmt::Write as _;
use std::sync::Arc;

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::auth::Clock;
use crate::domain::{ApiKey, SignatureSecret};
use crate::transport::WireRequest;

type HmacSha256 = Hmac<Sha256>;

/// Request parameter carrying the Unix timestamp the signature covers.
pub(crate) const TIMESTAMP_FIELD: &str = "timestamp";
/// Request parameter carrying the hex-encoded signature.
pub(crate) const SIG_FIELD: &str = "sig";

/// HMAC-SHA256 request signing.
///
/// Appends `api_key` and `timestamp` to the request parameters, then signs
/// the sorted parameter set and appends the digest as `sig`. The signed
/// parameters are the form pairs when the body is a form, otherwise the
/// query string.
pub struct SignatureAuth {
    key: ApiKey,
    secret: SignatureSecret,
    clock: Arc<dyn Clock>,
}

impl SignatureAuth {
    pub(crate) fn new(key: ApiKey, secret: SignatureSecret, clock: Arc<dyn Clock>) -> Self {
        Self { key, secret, clock }
    }

    pub fn apply(&self, request: &mut WireRequest) {
        request.push_request_param(ApiKey::FIELD, self.key.as_str());
        request.push_request_param(TIMESTAMP_FIELD, &self.clock.unix_now().to_string());

        let digest = self.digest(&request.request_params());
        request.push_request_param(SIG_FIELD, &digest);
    }

    /// Hex-encoded HMAC-SHA256 over the canonical `&name=value` form of the
    /// parameters, sorted by name then value.
    fn digest(&self, params: &[(String, String)]) -> String {
        let mut sorted: Vec<&(String, String)> = params.iter().collect();
        sorted.sort();

        let mut canonical = String::new();
        for (name, value) in sorted {
            canonical.push('&');
            canonical.push_str(name);
            canonical.push('=');
            canonical.push_str(value);
        }

        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(canonical.as_bytes());

        let bytes = mac.finalize().into_bytes();
        let mut hex = String::with_capacity(bytes.len() * 2);
        for byte in bytes {
            let _ = write!(hex, "{byte:02x}");
        }
        hex
    }
}
