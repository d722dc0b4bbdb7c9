//! Middleware stages.
//!
//! ## Pre-Handler Stages (1-3)
//!
//! 1. [`json_enforcer`] - `Accept` / `Content-Type` guard
//! 2. [`empty_body`] - declared-but-missing body guard
//! 3. [`deserialize`] - body → schema `load` → inbound slot
//!
//! ## Post-Handler Stages (4)
//!
//! 4. [`serialize`] - outbound slot → schema `dump` → response body

pub mod deserialize;
pub mod empty_body;
pub mod json_enforcer;
pub mod serialize;

pub use deserialize::DeserializeMiddleware;
pub use empty_body::{EmptyBodyMiddleware, EMPTY_BODY_MESSAGE};
pub use json_enforcer::{
    accepts_json, has_json_content_type, JsonEnforcerMiddleware, DEFAULT_GUARDED_METHODS,
    NOT_ACCEPTABLE_MESSAGE,
};
pub use serialize::SerializeMiddleware;
