//! Verification API: start a phone number verification and check the code
//! the user typed back.

use std::sync::Arc;

use reqwest::Method;
use serde::Deserialize;

use crate::auth::{AuthKind, BasicPlacement};
use crate::client::{AltavoxError, RequestExecutor};
use crate::domain::{Msisdn, RequestId, ValidationError};
use crate::endpoint::{parse_json, BodyKind, EndpointDescriptor, Operation};
use crate::transport::{ApiHost, TransportConfig, WireBody, WireRequest};

/// Longest brand string the platform renders in the verification message.
pub const MAX_BRAND_LENGTH: usize = 18;

#[derive(Debug, Clone)]
/// Start verifying a phone number.
pub struct VerifyRequest {
    number: Msisdn,
    brand: String,
    code_length: Option<u8>,
}

impl VerifyRequest {
    /// `brand` is shown to the user inside the verification message; it must
    /// be non-empty and at most [`MAX_BRAND_LENGTH`] characters.
    pub fn new(number: Msisdn, brand: impl Into<String>) -> Result<Self, ValidationError> {
        let brand = brand.into();
        let trimmed = brand.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "brand" });
        }
        let actual = trimmed.chars().count();
        if actual > MAX_BRAND_LENGTH {
            return Err(ValidationError::BrandTooLong {
                max: MAX_BRAND_LENGTH,
                actual,
            });
        }
        Ok(Self {
            number,
            brand: trimmed.to_owned(),
            code_length: None,
        })
    }

    /// Ask for a code of this many digits instead of the platform default.
    pub fn code_length(mut self, code_length: u8) -> Self {
        self.code_length = Some(code_length);
        self
    }
}

#[derive(Debug, Clone)]
/// Check the code the user received against an in-flight verification.
pub struct CheckRequest {
    request_id: RequestId,
    code: String,
}

impl CheckRequest {
    pub fn new(request_id: RequestId, code: impl Into<String>) -> Result<Self, ValidationError> {
        let code = code.into();
        let trimmed = code.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "code" });
        }
        Ok(Self {
            request_id,
            code: trimmed.to_owned(),
        })
    }
}

fn build_request(
    request: &VerifyRequest,
    config: &TransportConfig,
    descriptor: &EndpointDescriptor,
) -> Result<WireRequest, ValidationError> {
    let url = config.resolve(descriptor.host, descriptor.path)?;
    let mut wire = WireRequest::new(descriptor.method.clone(), url);

    let mut form = vec![
        ("number".to_owned(), request.number.as_str().to_owned()),
        ("brand".to_owned(), request.brand.clone()),
    ];
    if let Some(code_length) = request.code_length {
        form.push(("code_length".to_owned(), code_length.to_string()));
    }
    wire.body = WireBody::Form(form);
    Ok(wire)
}

fn build_check(
    request: &CheckRequest,
    config: &TransportConfig,
    descriptor: &EndpointDescriptor,
) -> Result<WireRequest, ValidationError> {
    let url = config.resolve(descriptor.host, descriptor.path)?;
    let mut wire = WireRequest::new(descriptor.method.clone(), url);
    wire.body = WireBody::Form(vec![
        (
            RequestId::FIELD.to_owned(),
            request.request_id.as_str().to_owned(),
        ),
        ("code".to_owned(), request.code.clone()),
    ]);
    Ok(wire)
}

/// `POST /verify/json` on the primary API host.
pub static REQUEST: Operation<VerifyRequest, VerifyInitiated> = Operation {
    descriptor: EndpointDescriptor {
        method: Method::POST,
        host: ApiHost::Api,
        path: "/verify/json",
        auth: &[AuthKind::Basic],
        basic_placement: BasicPlacement::Header,
        body: BodyKind::Form,
        accept: None,
    },
    build: build_request,
    parse: parse_json::<VerifyInitiated>,
};

/// `POST /verify/check/json` on the primary API host.
pub static CHECK: Operation<CheckRequest, VerifyChecked> = Operation {
    descriptor: EndpointDescriptor {
        method: Method::POST,
        host: ApiHost::Api,
        path: "/verify/check/json",
        auth: &[AuthKind::Basic],
        basic_placement: BasicPlacement::Header,
        body: BodyKind::Form,
        accept: None,
    },
    build: build_check,
    parse: parse_json::<VerifyChecked>,
};

#[derive(Debug, Clone, PartialEq, Deserialize)]
/// A verification was started; keep `request_id` to check the code later.
pub struct VerifyInitiated {
    pub request_id: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
/// Outcome of a code check. `status` is `"0"` when the code matched.
pub struct VerifyChecked {
    pub request_id: Option<String>,
    pub status: String,
    pub price: Option<String>,
    pub currency: Option<String>,
}

#[derive(Clone)]
/// Verification API client, obtained from [`crate::AltavoxClient::verify`].
pub struct VerifyClient {
    executor: Arc<RequestExecutor>,
}

impl VerifyClient {
    pub(crate) fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    /// Start a verification.
    pub async fn request(&self, request: &VerifyRequest) -> Result<VerifyInitiated, AltavoxError> {
        self.executor.execute(&REQUEST, request).await
    }

    /// Check a received code.
    pub async fn check(&self, request: &CheckRequest) -> Result<VerifyChecked, AltavoxError> {
        self.executor.execute(&CHECK, request).await
    }
}
