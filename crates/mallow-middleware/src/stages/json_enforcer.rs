//! JSON content negotiation guard.
//!
//! Rejects requests whose `Accept` header excludes JSON, and requests with a
//! body-bearing method whose `Content-Type` is not JSON.
//!
//! ## Pipeline Position
//!
//! ```text
//! Request → [JsonEnforcement] → EmptyBody → Deserialize → Handler
//! ```
//!
//! ## Negotiation rules
//!
//! - No `Accept` header accepts everything
//! - `*/*`, `application/*`, `application/json` and `+json` suffixes accept JSON
//! - Ranges with `q=0` are ignored
//! - Content types match on the essence; parameters like `charset` are ignored

use crate::{
    context::MiddlewareContext,
    middleware::{BoxFuture, Middleware, Next},
    types::{Request, Response, ResponseExt},
};
use http::{header, HeaderMap, Method};
use mallow_core::{ContentTypePolicy, MallowError};
use mime::Mime;
use std::collections::HashSet;

/// Message for requests that do not accept JSON responses.
pub const NOT_ACCEPTABLE_MESSAGE: &str = "This server only supports responses encoded as JSON. \
     Please update your \"Accept\" header to include \"application/json\".";

/// Methods whose requests must declare a JSON content type by default.
pub const DEFAULT_GUARDED_METHODS: [Method; 3] = [Method::POST, Method::PUT, Method::PATCH];

/// Guard enforcing JSON on both sides of the exchange.
///
/// # Example
///
/// ```
/// use http::Method;
/// use mallow_core::ContentTypePolicy;
/// use mallow_middleware::stages::JsonEnforcerMiddleware;
///
/// let guard = JsonEnforcerMiddleware::new()
///     .methods([Method::POST])
///     .policy(ContentTypePolicy::BadRequest);
///
/// assert!(guard.guards(&Method::POST));
/// assert!(!guard.guards(&Method::PUT));
/// ```
#[derive(Debug, Clone)]
pub struct JsonEnforcerMiddleware {
    methods: HashSet<Method>,
    policy: ContentTypePolicy,
}

impl JsonEnforcerMiddleware {
    /// Creates the guard for `POST`, `PUT` and `PATCH` with the
    /// `415 Unsupported Media Type` policy.
    #[must_use]
    pub fn new() -> Self {
        Self {
            methods: DEFAULT_GUARDED_METHODS.into_iter().collect(),
            policy: ContentTypePolicy::default(),
        }
    }

    /// Replaces the set of methods that must carry a JSON content type.
    #[must_use]
    pub fn methods(mut self, methods: impl IntoIterator<Item = Method>) -> Self {
        self.methods = methods.into_iter().collect();
        self
    }

    /// Sets which error a non-JSON content type receives.
    #[must_use]
    pub fn policy(mut self, policy: ContentTypePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns whether requests with `method` must declare a JSON content type.
    #[must_use]
    pub fn guards(&self, method: &Method) -> bool {
        self.methods.contains(method)
    }

    fn check(&self, request: &Request) -> Result<(), MallowError> {
        if !accepts_json(request.headers()) {
            return Err(MallowError::not_acceptable(NOT_ACCEPTABLE_MESSAGE));
        }

        if self.guards(request.method()) && !has_json_content_type(request.headers()) {
            return Err(self.policy.rejection(format!(
                "{} requests must have \"application/json\" in their \"Content-Type\" header.",
                request.method()
            )));
        }

        Ok(())
    }
}

impl Default for JsonEnforcerMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl Middleware for JsonEnforcerMiddleware {
    fn name(&self) -> &'static str {
        "json_enforcement"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            if let Err(error) = self.check(&request) {
                tracing::warn!(
                    request_id = %ctx.request_id(),
                    method = %request.method(),
                    status = error.status_code().as_u16(),
                    "request rejected by JSON guard"
                );
                return Response::from_error(&error, ctx.request_id());
            }

            next.run(ctx, request).await
        })
    }
}

/// Returns whether `mime` is `application/json` or carries a `+json` suffix.
fn is_json(mime: &Mime) -> bool {
    mime.type_() == mime::APPLICATION
        && (mime.subtype() == mime::JSON || mime.suffix() == Some(mime::JSON))
}

/// Parses one `Accept` media range. A bare `*` is read as `*/*`.
fn parse_range(range: &str) -> Option<Mime> {
    let range = range.trim().to_ascii_lowercase();
    let (essence, params) = range.split_once(';').unwrap_or((range.as_str(), ""));
    if essence.trim() == "*" {
        let wildcard = if params.is_empty() {
            "*/*".to_string()
        } else {
            format!("*/*;{params}")
        };
        return wildcard.parse().ok();
    }
    range.parse().ok()
}

/// Returns whether a client with these headers accepts a JSON response.
pub fn accepts_json(headers: &HeaderMap) -> bool {
    let Some(accept) = headers.get(header::ACCEPT) else {
        return true;
    };
    let Ok(accept) = accept.to_str() else {
        return false;
    };
    if accept.trim().is_empty() {
        return true;
    }

    accept
        .split(',')
        .filter_map(parse_range)
        .filter(|range| {
            range
                .get_param("q")
                .and_then(|q| q.as_str().parse::<f32>().ok())
                .map_or(true, |q| q > 0.0)
        })
        .any(|range| {
            range.type_() == mime::STAR
                || (range.type_() == mime::APPLICATION && range.subtype() == mime::STAR)
                || is_json(&range)
        })
}

/// Returns whether the request declares a JSON content type.
pub fn has_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().to_ascii_lowercase().parse::<Mime>().ok())
        .is_some_and(|mime| is_json(&mime))
}
