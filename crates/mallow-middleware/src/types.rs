//! Common types used throughout the middleware pipeline.
//!
//! This module defines the HTTP request and response types used by middleware,
//! plus helpers for buffering bodies and rendering errors.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use mallow_core::{MallowError, RequestId};

/// The HTTP request type used in the middleware pipeline.
///
/// This is a standard `http::Request` with a `Full<Bytes>` body.
pub type Request = http::Request<Full<Bytes>>;

/// The HTTP response type used in the middleware pipeline.
///
/// This is a standard `http::Response` with a `Full<Bytes>` body.
pub type Response = http::Response<Full<Bytes>>;

/// Extension trait for building error responses.
pub trait ResponseExt {
    /// Creates a JSON error response.
    fn json_error(status: http::StatusCode, code: &str, message: &str) -> Response;

    /// Renders a [`MallowError`] as a JSON error envelope.
    fn from_error(error: &MallowError, request_id: RequestId) -> Response;
}

impl ResponseExt for Response {
    fn json_error(status: http::StatusCode, code: &str, message: &str) -> Response {
        let body = serde_json::json!({
            "error": {
                "code": code,
                "message": message
            }
        });

        let mut response = http::Response::new(Full::new(Bytes::from(body.to_string())));
        *response.status_mut() = status;
        response.headers_mut().insert(
            http::header::CONTENT_TYPE,
            http::HeaderValue::from_static("application/json"),
        );
        response
    }

    fn from_error(error: &MallowError, request_id: RequestId) -> Response {
        let envelope = error.to_envelope(Some(&request_id.to_string()));
        let body = match serde_json::to_vec(&envelope) {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(error = %e, "failed to encode error envelope");
                return Self::json_error(
                    error.status_code(),
                    error.kind().code(),
                    error.message(),
                );
            }
        };

        let mut response = http::Response::new(Full::new(Bytes::from(body)));
        *response.status_mut() = error.status_code();
        response.headers_mut().insert(
            http::header::CONTENT_TYPE,
            http::HeaderValue::from_static("application/json"),
        );
        response
    }
}

/// Buffers the request body and rebuilds the request around the same bytes.
///
/// Returns the rebuilt request and the body bytes. Cloning `Bytes` is a
/// reference-count bump, so both halves share one buffer.
pub async fn buffer_body(request: Request) -> (Request, Bytes) {
    let (parts, body) = request.into_parts();
    let bytes = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(never) => match never {},
    };
    (Request::from_parts(parts, Full::new(bytes.clone())), bytes)
}

/// Reads the full body of a response. Used by tests and host integrations.
pub async fn response_bytes(response: Response) -> Bytes {
    match response.into_body().collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(never) => match never {},
    }
}
