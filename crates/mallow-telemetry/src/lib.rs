//! Structured logging for Mallow.
//!
//! Every stage of the Mallow pipeline logs through [`tracing`]: `debug!` for
//! routine decisions, `warn!` for rejected requests and `error!` for
//! responses that could not be serialized. This crate installs the
//! subscriber that turns those events into output.
//!
//! ```rust,ignore
//! use mallow_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::production())?;
//! ```

#![doc(html_root_url = "https://docs.rs/mallow-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
