use std::sync::Arc;

use crate::auth::CredentialRegistry;
use crate::client::{AltavoxError, ApiFailure};
use crate::endpoint::{BodyKind, Operation};
use crate::transport::{HttpTransport, TransportConfig};

/// The shared request pipeline: build, select auth, apply auth, send, map.
///
/// Validation and configuration failures surface before the transport is
/// touched; the send is the only step that performs I/O, and each call is a
/// single attempt.
pub(crate) struct RequestExecutor {
    config: TransportConfig,
    registry: CredentialRegistry,
    transport: Arc<dyn HttpTransport>,
}

impl RequestExecutor {
    pub(crate) fn new(
        config: TransportConfig,
        registry: CredentialRegistry,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            config,
            registry,
            transport,
        }
    }

    pub(crate) async fn execute<Req, Res>(
        &self,
        operation: &Operation<Req, Res>,
        request: &Req,
    ) -> Result<Res, AltavoxError> {
        let descriptor = &operation.descriptor;

        let mut wire = (operation.build)(request, &self.config, descriptor)?;
        wire.header("Accept", descriptor.accept());
        match descriptor.body {
            BodyKind::Json => wire.header("Content-Type", "application/json"),
            BodyKind::Form => wire.header("Content-Type", "application/x-www-form-urlencoded"),
            BodyKind::None => {}
        }

        let strategy = self.registry.select(descriptor.auth)?;
        strategy.apply(&mut wire, descriptor.basic_placement)?;

        tracing::debug!(
            method = %wire.method,
            url = %wire.url,
            auth = %strategy.kind(),
            "sending request"
        );
        let response = self.transport.send(wire).await?;

        if response.is_success() {
            Ok((operation.parse)(&response)?)
        } else {
            let failure = ApiFailure::from_response(response.status, &response.body);
            tracing::warn!(
                status = failure.status,
                category = %failure.category,
                code = failure.code.as_deref().unwrap_or(""),
                "API call failed"
            );
            Err(AltavoxError::Api(failure))
        }
    }
}
