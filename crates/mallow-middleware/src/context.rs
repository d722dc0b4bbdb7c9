//! Middleware context types.
//!
//! The [`MiddlewareContext`] carries per-request state through the pipeline:
//! the request id, the resource matched by the host's router, and the typed
//! [`Payloads`] the marshal stages share with the handler.

use mallow_core::{Payloads, RequestId, Resource};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Context that flows through the middleware pipeline.
///
/// Created by the host at request start and dropped when the response has
/// been produced. Nothing in it is shared across requests.
///
/// # Example
///
/// ```
/// use mallow_core::SchemaSet;
/// use mallow_middleware::MiddlewareContext;
/// use serde_json::json;
/// use std::sync::Arc;
///
/// let mut ctx = MiddlewareContext::new().with_resource(Arc::new(SchemaSet::new()));
/// ctx.payloads_mut().set_outbound(json!({"id": 12}));
///
/// assert!(ctx.resource().is_some());
/// assert_eq!(ctx.payloads().get("result"), Some(&json!({"id": 12})));
/// ```
pub struct MiddlewareContext {
    /// Unique identifier for this request.
    request_id: RequestId,

    /// The resource the router matched, if any.
    resource: Option<Arc<dyn Resource>>,

    /// Inbound and outbound payload slots.
    payloads: Payloads,

    /// When the request started processing.
    started_at: Instant,

    /// Type-erased extension data.
    extensions: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl MiddlewareContext {
    /// Creates a new context with a fresh request ID and no resource.
    #[must_use]
    pub fn new() -> Self {
        Self::with_request_id(RequestId::new())
    }

    /// Creates a context with a specific request ID.
    #[must_use]
    pub fn with_request_id(request_id: RequestId) -> Self {
        Self {
            request_id,
            resource: None,
            payloads: Payloads::new(),
            started_at: Instant::now(),
            extensions: HashMap::new(),
        }
    }

    /// Attaches the resource that will handle this request.
    #[must_use]
    pub fn with_resource(mut self, resource: Arc<dyn Resource>) -> Self {
        self.resource = Some(resource);
        self
    }

    /// Returns the request ID.
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the resource handling this request.
    #[must_use]
    pub fn resource(&self) -> Option<&Arc<dyn Resource>> {
        self.resource.as_ref()
    }

    /// Sets the resource handling this request.
    pub fn set_resource(&mut self, resource: Arc<dyn Resource>) {
        self.resource = Some(resource);
    }

    /// Returns the payload slots.
    #[must_use]
    pub fn payloads(&self) -> &Payloads {
        &self.payloads
    }

    /// Returns the payload slots for modification.
    pub fn payloads_mut(&mut self) -> &mut Payloads {
        &mut self.payloads
    }

    /// Returns the elapsed time since the request started.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }

    /// Stores a typed extension value.
    pub fn set_extension<T: Send + Sync + 'static>(&mut self, value: T) {
        self.extensions.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Retrieves a typed extension value.
    #[must_use]
    pub fn get_extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Removes and returns a typed extension value.
    pub fn remove_extension<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        self.extensions
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|b| *b)
    }
}

impl Default for MiddlewareContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MiddlewareContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareContext")
            .field("request_id", &self.request_id)
            .field("has_resource", &self.resource.is_some())
            .field("payloads", &self.payloads)
            .field("extensions", &self.extensions.len())
            .finish_non_exhaustive()
    }
}
