//! Request body deserialization.
//!
//! Runs as the last pre-handler stage. It buffers the body, resolves the
//! schema of the matched resource for the request method, and stores the
//! loaded value in the inbound slot of the context.
//!
//! ```text
//! Request → JsonEnforcement → EmptyBody → [Deserialize] → Handler
//! ```

use crate::{
    context::MiddlewareContext,
    marshal::MarshalOptions,
    middleware::{BoxFuture, Middleware, Next},
    types::{buffer_body, Request, Response, ResponseExt},
};
use mallow_core::resolve_schema;
use std::sync::Arc;

/// Deserializes request bodies into the inbound slot.
///
/// Decode failures short-circuit with `400 Bad Request`, schema rejections
/// with `422 Unprocessable Entity`.
#[derive(Debug, Clone)]
pub struct DeserializeMiddleware {
    options: Arc<MarshalOptions>,
}

impl DeserializeMiddleware {
    /// Creates the stage from shared options.
    #[must_use]
    pub fn new(options: Arc<MarshalOptions>) -> Self {
        Self { options }
    }

    /// Returns the options this stage runs with.
    #[must_use]
    pub fn options(&self) -> &MarshalOptions {
        &self.options
    }
}

impl Default for DeserializeMiddleware {
    fn default() -> Self {
        Self::new(Arc::new(MarshalOptions::new()))
    }
}

impl Middleware for DeserializeMiddleware {
    fn name(&self) -> &'static str {
        "deserialize"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            ctx.payloads_mut().rename(
                self.options.inbound_key_name(),
                self.options.outbound_key_name(),
            );

            let (request, body) = buffer_body(request).await;
            if body.is_empty() {
                tracing::debug!(request_id = %ctx.request_id(), "empty body, nothing to deserialize");
                return next.run(ctx, request).await;
            }

            let schema = ctx
                .resource()
                .and_then(|resource| resolve_schema(resource.as_ref(), request.method()));

            match self.options.deserialize(schema.as_deref(), &body) {
                Ok(Some(value)) => {
                    tracing::debug!(
                        request_id = %ctx.request_id(),
                        key = self.options.inbound_key_name(),
                        with_schema = schema.is_some(),
                        "stored request body"
                    );
                    ctx.payloads_mut().set_inbound(value);
                }
                Ok(None) => {}
                Err(error) => {
                    tracing::warn!(
                        request_id = %ctx.request_id(),
                        method = %request.method(),
                        error = %error,
                        "rejected request body"
                    );
                    return Response::from_error(&error, ctx.request_id());
                }
            }

            next.run(ctx, request).await
        })
    }
}
