//! SMS API: send a message over the legacy REST host and inspect the
//! per-message submission result.

use std::sync::Arc;

use reqwest::Method;
use serde::Deserialize;

use crate::auth::{AuthKind, BasicPlacement};
use crate::client::{AltavoxError, RequestExecutor};
use crate::domain::{MessageText, Msisdn, SenderId, ValidationError};
use crate::endpoint::{parse_json, BodyKind, EndpointDescriptor, Operation};
use crate::transport::{ApiHost, TransportConfig, WireBody, WireRequest};

#[derive(Debug, Clone)]
/// A single text message to submit.
pub struct SendSmsRequest {
    from: SenderId,
    to: Msisdn,
    text: MessageText,
    client_ref: Option<String>,
    ttl_ms: Option<u64>,
}

impl SendSmsRequest {
    pub fn new(from: SenderId, to: Msisdn, text: MessageText) -> Self {
        Self {
            from,
            to,
            text,
            client_ref: None,
            ttl_ms: None,
        }
    }

    /// Attach your own reference, echoed back in delivery receipts.
    pub fn client_ref(mut self, client_ref: impl Into<String>) -> Self {
        self.client_ref = Some(client_ref.into());
        self
    }

    /// Abandon delivery after this many milliseconds.
    pub fn ttl_ms(mut self, ttl_ms: u64) -> Self {
        self.ttl_ms = Some(ttl_ms);
        self
    }
}

fn build_send(
    request: &SendSmsRequest,
    config: &TransportConfig,
    descriptor: &EndpointDescriptor,
) -> Result<WireRequest, ValidationError> {
    let url = config.resolve(descriptor.host, descriptor.path)?;
    let mut wire = WireRequest::new(descriptor.method.clone(), url);

    let mut form = vec![
        (SenderId::FIELD.to_owned(), request.from.as_str().to_owned()),
        ("to".to_owned(), request.to.as_str().to_owned()),
        (MessageText::FIELD.to_owned(), request.text.as_str().to_owned()),
    ];
    if let Some(client_ref) = &request.client_ref {
        form.push(("client-ref".to_owned(), client_ref.clone()));
    }
    if let Some(ttl_ms) = request.ttl_ms {
        form.push(("ttl".to_owned(), ttl_ms.to_string()));
    }
    wire.body = WireBody::Form(form);
    Ok(wire)
}

/// `POST /sms/json` on the legacy REST host.
pub static SEND: Operation<SendSmsRequest, SmsSubmission> = Operation {
    descriptor: EndpointDescriptor {
        method: Method::POST,
        host: ApiHost::Rest,
        path: "/sms/json",
        auth: &[AuthKind::Signature, AuthKind::Basic],
        basic_placement: BasicPlacement::Params,
        body: BodyKind::Form,
        accept: None,
    },
    build: build_send,
    parse: parse_json::<SmsSubmission>,
};

#[derive(Debug, Clone, PartialEq, Deserialize)]
/// Result of a submission. One request can fan out into several parts, each
/// reported separately.
pub struct SmsSubmission {
    #[serde(rename = "message-count")]
    pub message_count: String,
    pub messages: Vec<SmsSubmissionMessage>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
/// Per-part submission status. `status` is `"0"` on acceptance; anything
/// else comes with `error_text`.
pub struct SmsSubmissionMessage {
    pub status: String,
    pub to: Option<String>,
    #[serde(rename = "message-id")]
    pub message_id: Option<String>,
    #[serde(rename = "remaining-balance")]
    pub remaining_balance: Option<String>,
    #[serde(rename = "message-price")]
    pub message_price: Option<String>,
    pub network: Option<String>,
    #[serde(rename = "error-text")]
    pub error_text: Option<String>,
}

#[derive(Clone)]
/// SMS API client, obtained from [`crate::AltavoxClient::sms`].
pub struct SmsClient {
    executor: Arc<RequestExecutor>,
}

impl SmsClient {
    pub(crate) fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    /// Submit a message.
    pub async fn send(&self, request: &SendSmsRequest) -> Result<SmsSubmission, AltavoxError> {
        self.executor.execute(&SEND, request).await
    }
}
