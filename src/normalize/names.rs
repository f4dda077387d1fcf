//! Name prefix/suffix helpers.

use crate::model::sentinels::ADAPTER_SUFFIX;

/// Remove `prefix` from the start of `name` if present.
pub fn strip_left<'a>(name: &'a str, prefix: &str) -> &'a str {
    name.strip_prefix(prefix).unwrap_or(name)
}

/// Remove `suffix` from the end of `name` if present.
pub fn strip_right<'a>(name: &'a str, suffix: &str) -> &'a str {
    name.strip_suffix(suffix).unwrap_or(name)
}

/// Display name of an adapter: `csv_adapter` -> `csv`.
pub fn adapter_short_name(raw_name: &str) -> &str {
    strip_right(raw_name, ADAPTER_SUFFIX)
}

/// Field key relative to its namespace prefix, without separator dots.
pub fn short_field_name<'a>(name: &'a str, prefix: &str) -> &'a str {
    strip_left(name, prefix).trim_matches('.')
}
