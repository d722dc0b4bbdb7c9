//! Empty body guard.
//!
//! Rejects requests that declare a non-zero `Content-Length` but arrive with
//! an empty body.
//!
//! ## Pipeline Position
//!
//! ```text
//! Request → JsonEnforcement → [EmptyBody] → Deserialize → Handler
//! ```

use crate::{
    context::MiddlewareContext,
    middleware::{BoxFuture, Middleware, Next},
    types::{buffer_body, Request, Response, ResponseExt},
};
use http::header;
use mallow_core::MallowError;

/// Message for requests whose declared body is missing.
pub const EMPTY_BODY_MESSAGE: &str = "Empty request body. A valid JSON document is required.";

/// Guard against declared-but-missing request bodies.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyBodyMiddleware;

impl EmptyBodyMiddleware {
    /// Creates the guard.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

/// Reads the declared `Content-Length`, treating an absent header as zero.
fn declared_length(request: &Request) -> Result<u64, MallowError> {
    let Some(value) = request.headers().get(header::CONTENT_LENGTH) else {
        return Ok(0);
    };

    value
        .to_str()
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .ok_or_else(|| MallowError::bad_request("Content-Length header is not a valid length"))
}

impl Middleware for EmptyBodyMiddleware {
    fn name(&self) -> &'static str {
        "empty_body"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let declared = match declared_length(&request) {
                Ok(0) => return next.run(ctx, request).await,
                Ok(declared) => declared,
                Err(error) => {
                    tracing::warn!(request_id = %ctx.request_id(), "unparseable Content-Length");
                    return Response::from_error(&error, ctx.request_id());
                }
            };

            let (request, body) = buffer_body(request).await;
            if body.is_empty() {
                tracing::warn!(
                    request_id = %ctx.request_id(),
                    declared,
                    "declared body is empty"
                );
                let error = MallowError::bad_request(EMPTY_BODY_MESSAGE);
                return Response::from_error(&error, ctx.request_id());
            }

            next.run(ctx, request).await
        })
    }
}
