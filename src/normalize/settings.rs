//! Settings schema resolution.
//!
//! Turns `{items, required}` schema blobs into ordered setting catalogs, for
//! connection settings and for the adapter-level base/advanced blobs.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::logging::structured::LogContext;
use crate::model::raw::{RawConfigBlob, RawSchema};
use crate::model::sentinels::ADAPTER_BASE;
use crate::model::settings::{SettingCatalog, SettingSchema, SettingValue};

/// Resolve a schema blob into a catalog keyed by setting name.
///
/// Declared keys are copied verbatim; `required` comes from the blob's
/// required list. A later item with a repeated name replaces the earlier.
pub fn resolve_settings(raw_schema: &RawSchema) -> SettingCatalog {
    let mut settings = SettingCatalog::with_capacity(raw_schema.items.len());
    for item in &raw_schema.items {
        let mut schema: SettingSchema = item.clone();
        schema.required = raw_schema.required.iter().any(|r| *r == item.name);
        settings.insert(item.name.clone(), schema);
    }
    settings
}

/// Attach current values from `config` to every setting of `raw_schema`.
///
/// Settings missing from `config` get `null`.
pub fn settings_with_values(
    raw_schema: &RawSchema,
    config: &Map<String, Value>,
) -> IndexMap<String, SettingValue> {
    resolve_settings(raw_schema)
        .into_iter()
        .map(|(name, schema)| {
            let value = config.get(&name).cloned().unwrap_or(Value::Null);
            (name, SettingValue { schema, value })
        })
        .collect()
}

/// Adapter-level settings from the `config` blobs.
///
/// `advanced = true` selects among `AdapterBase` blobs, otherwise among the
/// adapter-specific ones. The first blob that declares any settings wins;
/// an empty blob does not stop the search.
pub fn adapter_settings(
    blobs: &IndexMap<String, RawConfigBlob>,
    advanced: bool,
    ctx: &LogContext,
) -> IndexMap<String, SettingValue> {
    let mut chosen: Option<(&str, IndexMap<String, SettingValue>)> = None;

    for (blob_name, blob) in blobs {
        if (blob_name == ADAPTER_BASE) != advanced {
            continue;
        }
        if let Some((used, _)) = &chosen {
            crate::log_warn!(
                ctx,
                "ADAPTER_SETTINGS_EXTRA_BLOB_IGNORED",
                used = used,
                ignored = blob_name,
                advanced = advanced,
            );
            continue;
        }

        let settings = settings_with_values(&blob.schema, &blob.config);
        if settings.is_empty() {
            crate::log_debug!(ctx, "ADAPTER_SETTINGS_EMPTY_BLOB_SKIPPED", blob = blob_name);
        } else {
            chosen = Some((blob_name.as_str(), settings));
        }
    }

    chosen.map(|(_, settings)| settings).unwrap_or_default()
}
