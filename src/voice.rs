//! Voice API: create outbound calls and fetch call details.

use std::sync::Arc;

use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::auth::{AuthKind, BasicPlacement};
use crate::client::{AltavoxError, RequestExecutor};
use crate::domain::{CallUuid, Msisdn, ValidationError};
use crate::endpoint::{parse_json, BodyKind, EndpointDescriptor, Operation};
use crate::transport::{ApiHost, TransportConfig, WireBody, WireRequest};

#[derive(Debug, Clone)]
/// Place an outbound call. The platform fetches call-control instructions
/// from `answer_url` once the callee picks up.
pub struct CreateCallRequest {
    to: Msisdn,
    from: Msisdn,
    answer_url: String,
}

impl CreateCallRequest {
    pub fn new(
        to: Msisdn,
        from: Msisdn,
        answer_url: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let answer_url = answer_url.into();
        if url::Url::parse(&answer_url).is_err() {
            return Err(ValidationError::InvalidUrl { input: answer_url });
        }
        Ok(Self {
            to,
            from,
            answer_url,
        })
    }
}

#[derive(Debug, Clone)]
/// Fetch one call by its uuid.
pub struct GetCallRequest {
    uuid: CallUuid,
}

impl GetCallRequest {
    pub fn new(uuid: CallUuid) -> Self {
        Self { uuid }
    }
}

#[derive(Debug, Serialize)]
struct PhoneEndpoint<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    number: &'a str,
}

impl<'a> PhoneEndpoint<'a> {
    fn new(number: &'a Msisdn) -> Self {
        Self {
            kind: "phone",
            number: number.as_str(),
        }
    }
}

#[derive(Debug, Serialize)]
struct CreateCallBody<'a> {
    to: [PhoneEndpoint<'a>; 1],
    from: PhoneEndpoint<'a>,
    answer_url: [&'a str; 1],
}

fn build_create(
    request: &CreateCallRequest,
    config: &TransportConfig,
    descriptor: &EndpointDescriptor,
) -> Result<WireRequest, ValidationError> {
    let url = config.resolve(descriptor.host, descriptor.path)?;
    let mut wire = WireRequest::new(descriptor.method.clone(), url);

    let body = CreateCallBody {
        to: [PhoneEndpoint::new(&request.to)],
        from: PhoneEndpoint::new(&request.from),
        answer_url: [request.answer_url.as_str()],
    };
    let bytes = serde_json::to_vec(&body).map_err(|err| ValidationError::UnserializableBody {
        message: err.to_string(),
    })?;
    wire.body = WireBody::Json(bytes);
    Ok(wire)
}

fn build_get(
    request: &GetCallRequest,
    config: &TransportConfig,
    descriptor: &EndpointDescriptor,
) -> Result<WireRequest, ValidationError> {
    let path = format!("{}/{}", descriptor.path, request.uuid.as_str());
    let url = config.resolve(descriptor.host, &path)?;
    Ok(WireRequest::new(descriptor.method.clone(), url))
}

/// `POST /v1/calls` on the primary API host.
pub static CREATE_CALL: Operation<CreateCallRequest, CallCreated> = Operation {
    descriptor: EndpointDescriptor {
        method: Method::POST,
        host: ApiHost::Api,
        path: "/v1/calls",
        auth: &[AuthKind::Bearer],
        basic_placement: BasicPlacement::Header,
        body: BodyKind::Json,
        accept: None,
    },
    build: build_create,
    parse: parse_json::<CallCreated>,
};

/// `GET /v1/calls/{uuid}` on the primary API host.
pub static GET_CALL: Operation<GetCallRequest, CallDetails> = Operation {
    descriptor: EndpointDescriptor {
        method: Method::GET,
        host: ApiHost::Api,
        path: "/v1/calls",
        auth: &[AuthKind::Bearer],
        basic_placement: BasicPlacement::Header,
        body: BodyKind::None,
        accept: None,
    },
    build: build_get,
    parse: parse_json::<CallDetails>,
};

#[derive(Debug, Clone, PartialEq, Deserialize)]
/// A call was created.
pub struct CallCreated {
    pub uuid: String,
    pub status: String,
    pub direction: String,
    pub conversation_uuid: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
/// Details of one call.
pub struct CallDetails {
    pub uuid: String,
    pub conversation_uuid: Option<String>,
    pub status: String,
    pub direction: Option<String>,
    pub duration: Option<String>,
    pub price: Option<String>,
}

#[derive(Clone)]
/// Voice API client, obtained from [`crate::AltavoxClient::voice`].
pub struct VoiceClient {
    executor: Arc<RequestExecutor>,
}

impl VoiceClient {
    pub(crate) fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    /// Place an outbound call.
    pub async fn create_call(
        &self,
        request: &CreateCallRequest,
    ) -> Result<CallCreated, AltavoxError> {
        self.executor.execute(&CREATE_CALL, request).await
    }

    /// Fetch one call by uuid.
    pub async fn get_call(&self, request: &GetCallRequest) -> Result<CallDetails, AltavoxError> {
        self.executor.execute(&GET_CALL, request).await
    }
}
