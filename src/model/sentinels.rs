//! Marker values shared with the platform and with callers.
//!
//! These strings are a stable contract: other layers pattern-match on them.

use serde_json::Value;

/// Value the platform sends (and accepts) in place of a stored secret.
pub const SETTING_UNCHANGED: [&str; 1] = ["unchanged"];

/// Display value for a connection setting whose secret is hidden.
pub const HIDDEN: &str = "__HIDDEN__";

/// Display value for a connection setting missing from the raw config.
pub const NOTSET: &str = "__NOTSET__";

/// Config blob key holding the generic adapter-level settings.
pub const ADAPTER_BASE: &str = "AdapterBase";

/// Suffix the platform appends to adapter names.
pub const ADAPTER_SUFFIX: &str = "_adapter";

/// Prefix of the cross-adapter field namespace.
pub const GENERIC_PREFIX: &str = "specific_data";

/// Prefix generic field names are stored under.
pub const GENERIC_DATA_PREFIX: &str = "specific_data.data";

/// Catalog key for the generic fields.
pub const GENERIC_KEY: &str = "generic";

/// Prefix of one adapter's field namespace, e.g. `adapters_data.csv_adapter`.
pub fn adapter_field_prefix(raw_adapter_name: &str) -> String {
    format!("adapters_data.{}", raw_adapter_name)
}

/// The UNCHANGED marker as a JSON value.
pub fn unchanged_value() -> Value {
    Value::Array(
        SETTING_UNCHANGED
            .iter()
            .map(|s| Value::String((*s).to_string()))
            .collect(),
    )
}

/// Whether `value` is the UNCHANGED marker.
pub fn is_unchanged(value: &Value) -> bool {
    match value {
        Value::Array(items) => {
            items.len() == SETTING_UNCHANGED.len()
                && items
                    .iter()
                    .zip(SETTING_UNCHANGED.iter())
                    .all(|(item, marker)| item.as_str() == Some(*marker))
        }
        _ => false,
    }
}
