//! Fixed-order middleware pipeline.
//!
//! ## Pipeline Stages
//!
//! The standard pipeline runs up to four stages in a fixed order:
//!
//! 1. **JSON Enforcement** - `Accept` / `Content-Type` guard (optional)
//! 2. **Empty Body** - declared-but-missing body guard (optional)
//! 3. **Deserialize** - body → schema `load` → inbound slot
//! 4. **Serialize** - outbound slot → schema `dump` → response body (post-handler)
//!
//! Guards may short-circuit; when they do, neither the handler nor the
//! later stages run.

use crate::context::MiddlewareContext;
use crate::marshal::MarshalOptions;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::stages::{
    DeserializeMiddleware, EmptyBodyMiddleware, JsonEnforcerMiddleware, SerializeMiddleware,
};
use crate::types::{Request, Response};
use std::fmt;
use std::sync::Arc;

/// A type-erased middleware that can be stored in a vector.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// The fixed-order middleware pipeline.
///
/// # Example
///
/// ```
/// use mallow_middleware::{MarshalOptions, Pipeline};
/// use mallow_middleware::stages::JsonEnforcerMiddleware;
///
/// let pipeline = Pipeline::standard(
///     MarshalOptions::new(),
///     Some(JsonEnforcerMiddleware::new()),
///     true,
/// );
///
/// assert_eq!(
///     pipeline.stage_names(),
///     vec!["json_enforcement", "empty_body", "deserialize", "serialize"]
/// );
/// ```
pub struct Pipeline {
    /// Stages that run before the handler.
    pre_handler_stages: Vec<BoxedMiddleware>,

    /// Stages that wrap the handler's response.
    post_handler_stages: Vec<BoxedMiddleware>,
}

impl Pipeline {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Assembles the standard stages in [`Stage::all`] order.
    ///
    /// The marshal stages share one copy of `options`. The JSON guard runs
    /// when given, the empty-body guard when `reject_empty_body` is set.
    #[must_use]
    pub fn standard(
        options: MarshalOptions,
        mut json_enforcer: Option<JsonEnforcerMiddleware>,
        reject_empty_body: bool,
    ) -> Self {
        let options = Arc::new(options);

        Stage::all()
            .into_iter()
            .fold(Self::builder(), |builder, stage| {
                let middleware: Option<BoxedMiddleware> = match stage {
                    Stage::JsonEnforcement => json_enforcer
                        .take()
                        .map(|guard| Arc::new(guard) as BoxedMiddleware),
                    Stage::EmptyBody => reject_empty_body
                        .then(|| Arc::new(EmptyBodyMiddleware::new()) as BoxedMiddleware),
                    Stage::Deserialize => Some(Arc::new(DeserializeMiddleware::new(Arc::clone(
                        &options,
                    ))) as BoxedMiddleware),
                    Stage::Serialize => Some(Arc::new(SerializeMiddleware::new(Arc::clone(
                        &options,
                    ))) as BoxedMiddleware),
                };
                match middleware {
                    Some(middleware) => builder.add_stage(stage, middleware),
                    None => builder,
                }
            })
            .build()
    }

    /// Processes a request through the entire pipeline.
    ///
    /// The request flows through the pre-handler stages, then to the
    /// handler, then back out through the post-handler stages. The context
    /// stays with the caller, so the payload slots can be inspected
    /// afterwards.
    pub async fn process<H>(
        &self,
        ctx: &mut MiddlewareContext,
        request: Request,
        handler: H,
    ) -> Response
    where
        H: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, Response> + Send + 'static,
    {
        tracing::debug!(
            request_id = %ctx.request_id(),
            method = %request.method(),
            uri = %request.uri(),
            "processing request"
        );
        let next = self.build_chain(handler);
        next.run(ctx, request).await
    }

    fn build_chain<'a, H>(&'a self, handler: H) -> Next<'a>
    where
        H: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, Response> + Send + 'a,
    {
        let mut next = Next::handler(handler);

        // Post-handler stages wrap the handler directly so they see its response first.
        for middleware in self.post_handler_stages.iter().rev() {
            next = Next::new(middleware.as_ref(), next);
        }
        for middleware in self.pre_handler_stages.iter().rev() {
            next = Next::new(middleware.as_ref(), next);
        }

        next
    }

    /// Returns the names of all middleware stages in order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.pre_handler_stages
            .iter()
            .chain(&self.post_handler_stages)
            .map(|mw| mw.name())
            .collect()
    }

    /// Returns the number of middleware stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.pre_handler_stages.len() + self.post_handler_stages.len()
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}

/// Builder for constructing a [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    pre_handler_stages: Vec<BoxedMiddleware>,
    post_handler_stages: Vec<BoxedMiddleware>,
}

impl PipelineBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a stage that runs before the handler.
    #[must_use]
    pub fn add_pre_handler_stage<M: Middleware>(mut self, middleware: M) -> Self {
        self.pre_handler_stages.push(Arc::new(middleware));
        self
    }

    /// Adds a stage that processes the handler's response.
    #[must_use]
    pub fn add_post_handler_stage<M: Middleware>(mut self, middleware: M) -> Self {
        self.post_handler_stages.push(Arc::new(middleware));
        self
    }

    /// Places `middleware` before or after the handler according to `stage`.
    fn add_stage(mut self, stage: Stage, middleware: BoxedMiddleware) -> Self {
        debug_assert_eq!(middleware.name(), stage.name());
        if stage.is_pre_handler() {
            self.pre_handler_stages.push(middleware);
        } else {
            self.post_handler_stages.push(middleware);
        }
        self
    }

    /// Builds the pipeline.
    #[must_use]
    pub fn build(self) -> Pipeline {
        Pipeline {
            pre_handler_stages: self.pre_handler_stages,
            post_handler_stages: self.post_handler_stages,
        }
    }
}

/// Middleware stage marker for the fixed ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Stage {
    /// Stage 1: JSON content negotiation guard
    JsonEnforcement = 1,
    /// Stage 2: Empty body guard
    EmptyBody = 2,
    /// Stage 3: Request body deserialization
    Deserialize = 3,
    /// --- Handler invocation ---
    /// Stage 4: Response body serialization
    Serialize = 4,
}

impl Stage {
    /// Returns true if this is a pre-handler stage.
    #[must_use]
    pub const fn is_pre_handler(self) -> bool {
        (self as u8) <= 3
    }

    /// Returns true if this is a post-handler stage.
    #[must_use]
    pub const fn is_post_handler(self) -> bool {
        (self as u8) >= 4
    }

    /// Returns the stage name, as reported by [`Middleware::name`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::JsonEnforcement => "json_enforcement",
            Self::EmptyBody => "empty_body",
            Self::Deserialize => "deserialize",
            Self::Serialize => "serialize",
        }
    }

    /// Returns all stages in order.
    #[must_use]
    pub const fn all() -> [Stage; 4] {
        [
            Self::JsonEnforcement,
            Self::EmptyBody,
            Self::Deserialize,
            Self::Serialize,
        ]
    }
}
