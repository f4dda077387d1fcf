//! Settings validation module.
//!
//! Provides schema-driven validation for adapter and connection settings:
//! - Single-value coercion against a declared type/enum
//! - File-setting resolution through an injected uploader
//! - Whole-config parsing with required/default handling

pub mod coerce;
pub mod config;
pub mod convert;
pub mod upload;

pub use config::*;
pub use convert::*;
pub use upload::FileUploader;
