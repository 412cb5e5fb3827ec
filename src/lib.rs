//! Typed Rust client for the Altavox cloud communications APIs.
//!
//! The crate is layered: a domain layer of validated values, a transport
//! layer for wire-level request/response handling, an auth layer that picks
//! one of several mutually exclusive strategies per call, and thin service
//! clients (SMS, verification, number insight, account, voice) over a shared
//! request pipeline. Endpoints are plain [`Operation`] values, so new ones
//! can be defined outside this crate and run through
//! [`AltavoxClient::execute`].
//!
//! ```rust,no_run
//! use altavox::{AltavoxClient, Credential, MessageText, Msisdn, SenderId};
//! use altavox::sms::SendSmsRequest;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), altavox::AltavoxError> {
//!     let client = AltavoxClient::builder()
//!         .credential(Credential::basic("api-key", "api-secret")?)
//!         .build()?;
//!
//!     let request = SendSmsRequest::new(
//!         SenderId::new("Altavox")?,
//!         Msisdn::new("+447700900001")?,
//!         MessageText::new("hello")?,
//!     );
//!     let submission = client.sms().send(&request).await?;
//!     println!("accepted {} part(s)", submission.message_count);
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod account;
pub mod auth;
pub mod client;
pub mod domain;
pub mod endpoint;
pub mod insight;
pub mod sms;
pub mod transport;
pub mod verify;
pub mod voice;

#[cfg(test)]
pub(crate) mod testutil;

pub use auth::{
    AuthKind, BasicPlacement, Clock, ConfigurationError, Credential, SystemClock, TokenMinter,
};
pub use client::{AltavoxClient, AltavoxClientBuilder, AltavoxError, ApiFailure, ErrorCategory};
pub use domain::{
    ApiKey, ApiSecret, ApplicationId, BearerToken, CallUuid, MessageText, Msisdn, PrivateKeyPem,
    RequestId, SenderId, SignatureSecret, ValidationError,
};
pub use endpoint::{BodyKind, EndpointDescriptor, Operation, ResponseParseError};
pub use transport::{
    ApiHost, HttpTransport, TransportConfig, TransportFailure, TransportFailureKind, WireBody,
    WireRequest, WireResponse,
};
