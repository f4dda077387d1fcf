//! Axonius API core - response normalization and settings validation
//!
//! This crate turns raw adapter, connection and field schema payloads from
//! the Axonius REST API into typed records, and validates caller-supplied
//! configuration against the platform's settings schemas before it is sent
//! back. It is usable as a Rust library and, with the `python` feature, as a
//! Python extension module.
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `model` - Raw payload shapes, normalized records, sentinel values
//! - `normalize` - Adapter/connection and field catalog normalization
//! - `validation` - Schema type coercion, config parsing, file uploads
//! - `report` - CSV rendering for the reporting binary
//! - `logging` - Structured logging with parse run context
//! - `error` - Error taxonomy

pub mod context;
pub mod error;
pub mod logging;
pub mod model;
pub mod normalize;
pub mod report;
pub mod validation;

#[cfg(feature = "python")]
mod python;

use serde_json::Value;

pub use error::{ParseError, Result, UploadError};
pub use model::{
    find_adapter, is_unchanged, unchanged_value, AdapterRecord, AdapterTarget, CoercedValue,
    ConnectionRecord, FieldCatalog, FieldInfo, FileRef, RawAdapters, RawFieldCatalog, RawSchema,
    ResolvedConfig, SettingCatalog, SettingSchema, HIDDEN, NOTSET, SETTING_UNCHANGED,
};
pub use normalize::{parse_adapters, parse_fields, resolve_settings};
pub use validation::{parse_config, ConfigParser, FileUploader};

/// Initialize the logger at `level`. `RUST_LOG` still takes precedence.
///
/// Safe to call more than once; only the first call installs the logger.
pub fn init_logger_with_level(level: log::LevelFilter) {
    let _ = env_logger::builder()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp_millis()
        .try_init();
}

/// Initialize the logger at `Info`.
pub fn init_logger() {
    init_logger_with_level(log::LevelFilter::Info);
}

/// [`parse_fields`] on an untyped payload.
pub fn parse_fields_json(raw: &Value) -> Result<FieldCatalog> {
    let raw: RawFieldCatalog = serde_json::from_value(raw.clone())?;
    parse_fields(&raw)
}

/// [`parse_adapters`] on an untyped payload.
pub fn parse_adapters_json(raw: &Value) -> Result<Vec<AdapterRecord>> {
    let raw: RawAdapters = serde_json::from_value(raw.clone())?;
    Ok(parse_adapters(&raw))
}
