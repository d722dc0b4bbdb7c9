//! Typed configuration system for Mallow.
//!
//! This crate provides strongly-typed configuration for the Mallow pipeline
//! with support for:
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict validation (fails on unknown fields)
//! - Layered configuration (defaults → file → env)
//!
//! # Overview
//!
//! [`MallowConfig`] contains three sections:
//!
//! - [`MarshalConfig`] - payload slot names, `force_json`, output indentation
//! - [`GuardConfig`] - which request guards run and how they reject
//! - [`LoggingConfig`] - log level and format
//!
//! # Example
//!
//! ```no_run
//! use mallow_config::ConfigLoader;
//!
//! # fn main() -> Result<(), mallow_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_defaults()
//!     .with_file("mallow.toml")?
//!     .with_env_prefix("MALLOW")
//!     .load()?;
//!
//! println!("request bodies land in {:?}", config.marshal.inbound_key);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [marshal]
//! inbound_key = "json"
//! outbound_key = "result"
//! force_json = true
//! pretty = false
//!
//! [guards]
//! enforce_json = true
//! json_methods = ["POST", "PUT", "PATCH"]
//! content_type_policy = "unsupported_media_type"
//! reject_empty_body = true
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```
//!
//! # Environment Variable Overrides
//!
//! Values can be overridden with variables of the form `PREFIX__SECTION__KEY`:
//!
//! - `MALLOW__MARSHAL__FORCE_JSON=false`
//! - `MALLOW__GUARDS__JSON_METHODS=POST,PUT`
//! - `MALLOW__LOGGING__LEVEL=debug`

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::*;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
