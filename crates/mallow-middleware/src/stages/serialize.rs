//! Response body serialization.
//!
//! Runs after the handler. Reads the outbound slot, dumps it through the
//! schema resolved for the request method, and writes the encoded body and
//! content type onto the handler's response.
//!
//! ## Pipeline Position
//!
//! ```text
//! Handler → [Serialize] → Response
//! ```
//!
//! The handler's status code is kept, including error statuses: a handler
//! that answers 404 or 409 with an outbound value gets that value serialized.

use crate::{
    context::MiddlewareContext,
    marshal::{Encoded, MarshalOptions},
    middleware::{BoxFuture, Middleware, Next},
    types::{Request, Response, ResponseExt},
};
use http::{header, HeaderValue};
use http_body_util::Full;
use mallow_core::{resolve_schema, MallowError};
use std::sync::Arc;

/// Serializes the outbound slot into the response body.
#[derive(Debug, Clone)]
pub struct SerializeMiddleware {
    options: Arc<MarshalOptions>,
}

impl SerializeMiddleware {
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

impl Default for SerializeMiddleware {
    fn default() -> Self {
        Self::new(Arc::new(MarshalOptions::new()))
    }
}

/// Replaces the body and content type of `response`.
fn write_body(response: Response, encoded: Encoded) -> Result<Response, MallowError> {
    let content_type = HeaderValue::from_str(&encoded.content_type).map_err(|e| {
        MallowError::internal_with_source("Codec declared an invalid content type", e)
    })?;

    let (mut parts, _) = response.into_parts();
    parts.headers.insert(header::CONTENT_TYPE, content_type);
    parts.headers.remove(header::CONTENT_LENGTH);
    Ok(Response::from_parts(parts, Full::new(encoded.body)))
}

impl Middleware for SerializeMiddleware {
    fn name(&self) -> &'static str {
        "serialize"
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
            let method = request.method().clone();

            let response = next.run(ctx, request).await;

            let Some(value) = ctx.payloads().outbound() else {
                tracing::debug!(request_id = %ctx.request_id(), "no outbound value, response untouched");
                return response;
            };

            let schema = ctx
                .resource()
                .and_then(|resource| resolve_schema(resource.as_ref(), &method));

            let written = match self.options.serialize(schema.as_deref(), value) {
                Ok(Some(encoded)) => {
                    tracing::debug!(
                        request_id = %ctx.request_id(),
                        key = self.options.outbound_key_name(),
                        with_schema = schema.is_some(),
                        bytes = encoded.body.len(),
                        elapsed = ?ctx.elapsed(),
                        "serialized response body"
                    );
                    write_body(response, encoded)
                }
                Ok(None) => Ok(response),
                Err(error) => Err(error),
            };

            written.unwrap_or_else(|error| {
                tracing::error!(
                    request_id = %ctx.request_id(),
                    method = %method,
                    error = %error,
                    "failed to serialize response"
                );
                Response::from_error(&error, ctx.request_id())
            })
        })
    }
}
