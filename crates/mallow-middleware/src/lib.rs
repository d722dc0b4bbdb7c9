//! # Mallow Middleware
//!
//! The request pipeline that turns raw HTTP bodies into schema-validated
//! values and back.
//!
//! ## Pipeline Stages
//!
//! ```text
//! Request → JsonEnforcement → EmptyBody → Deserialize → Handler
//!                                                          ↓
//! Response ←──────────────────────────────── Serialize ←───┘
//! ```
//!
//! | Stage | Middleware        | Purpose                                        |
//! |-------|-------------------|------------------------------------------------|
//! | 1     | JSON Enforcement  | Reject non-JSON `Accept` / `Content-Type`      |
//! | 2     | Empty Body        | Reject declared-but-missing bodies             |
//! | 3     | Deserialize       | Decode and `load` the body into the inbound slot |
//! | 4     | Serialize         | `dump` and encode the outbound slot            |
//!
//! The guards are optional; the marshal stages share one [`MarshalOptions`].
//!
//! ## Example
//!
//! ```
//! use mallow_middleware::pipeline::Stage;
//!
//! let stages = Stage::all();
//! assert_eq!(stages.len(), 4);
//! assert_eq!(stages[0].name(), "json_enforcement");
//! assert_eq!(stages[3].name(), "serialize");
//! ```

#![doc(html_root_url = "https://docs.rs/mallow-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod context;
pub mod marshal;
pub mod middleware;
pub mod pipeline;
pub mod stages;
pub mod types;

// Re-export main types at crate root
pub use context::MiddlewareContext;
pub use marshal::{Encoded, MarshalOptions};
pub use middleware::{BoxFuture, Middleware, Next};
pub use pipeline::{Pipeline, PipelineBuilder, Stage};
pub use types::{buffer_body, response_bytes, Request, Response, ResponseExt};
