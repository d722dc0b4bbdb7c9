//! # Mallow
//!
//! **Schema-driven request and response body marshalling for HTTP services**
//!
//! Resource handlers declare a schema; Mallow turns the raw request body into
//! validated data before the handler runs and turns the handler's result back
//! into an encoded body afterwards. Decoding and validation failures become
//! JSON error responses with the right status code.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mallow::prelude::*;
//!
//! let config = ConfigLoader::new().with_env_prefix("MALLOW").load()?;
//! mallow::init_logging(&config)?;
//! let pipeline = mallow::build_pipeline(&config)?;
//!
//! let philosophers = Arc::new(SchemaSet::new().with_schema(
//!     FieldSchema::builder()
//!         .field("name", Field::string().required())
//!         .field("birth", Field::date())
//!         .build(),
//! ));
//!
//! let mut ctx = MiddlewareContext::new().with_resource(philosophers);
//! let response = pipeline.process(&mut ctx, request, |ctx, _req| {
//!     let philosopher = ctx.payloads_mut().take_inbound();
//!     ctx.payloads_mut().set_outbound(store(philosopher));
//!     Box::pin(async { created() })
//! }).await;
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Request → JsonEnforcement → EmptyBody → Deserialize → Handler
//!                                                          ↓
//! Response ←──────────────────────────────── Serialize ←───┘
//! ```

#![doc(html_root_url = "https://docs.rs/mallow/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod setup;

// Re-export core types
pub use mallow_core as core;

// Re-export middleware types
pub use mallow_middleware as middleware;

// Re-export configuration types
pub use mallow_config as config;

// Re-export telemetry types
pub use mallow_telemetry as telemetry;

pub use setup::{build_pipeline, init_logging, json_enforcer, marshal_options};

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust,ignore
/// use mallow::prelude::*;
/// ```
pub mod prelude {
    pub use mallow_core::{
        Codec, ContentTypePolicy, Field, FieldErrors, FieldSchema, JsonCodec, MallowError,
        MallowResult, Payloads, RequestId, Resource, Schema, SchemaError, SchemaSet, TypedSchema,
        UnknownPolicy,
    };

    pub use mallow_middleware::stages::{
        DeserializeMiddleware, EmptyBodyMiddleware, JsonEnforcerMiddleware, SerializeMiddleware,
    };
    pub use mallow_middleware::{
        BoxFuture, MarshalOptions, Middleware, MiddlewareContext, Next, Pipeline, Request,
        Response, ResponseExt,
    };

    pub use mallow_config::{ConfigError, ConfigLoader, MallowConfig};

    pub use std::sync::Arc;
}
