//! Raw payload normalization.
//!
//! Adapter status payloads become [`AdapterRecord`](crate::model::AdapterRecord)s,
//! field schema payloads become a [`FieldCatalog`](crate::model::FieldCatalog).

pub mod adapters;
pub mod fields;
pub mod names;
pub mod settings;

pub use adapters::parse_adapters;
pub use fields::parse_fields;
pub use settings::resolve_settings;
