//! Field catalog normalization.
//!
//! Builds the per-adapter field catalog from the raw field schema payload.
//! Short names must be unique within an adapter and adapter short names
//! must be unique across the catalog; a collision is a hard error.

use indexmap::map::Entry;
use indexmap::IndexMap;

use crate::context::ParseContext;
use crate::error::{ParseError, Result};
use crate::model::fields::{FieldCatalog, FieldInfo};
use crate::model::raw::RawFieldCatalog;
use crate::model::sentinels::{
    adapter_field_prefix, GENERIC_DATA_PREFIX, GENERIC_KEY, GENERIC_PREFIX,
};

use super::names::{adapter_short_name, short_field_name};

/// Normalize the raw field payload into a [`FieldCatalog`].
pub fn parse_fields(raw: &RawFieldCatalog) -> Result<FieldCatalog> {
    let run = ParseContext::new();
    let ctx = run.log_context();

    let mut catalog = IndexMap::with_capacity(raw.specific.len() + 1);
    catalog.insert(GENERIC_KEY.to_string(), generic_fields(&raw.generic)?);

    for (name, raw_fields) in &raw.specific {
        let (short_name, fields) = adapter_fields(name, raw_fields)?;
        insert_unique(&mut catalog, short_name, fields, || format!("Adapter {}", name))?;
    }

    crate::log_info!(
        ctx,
        "FIELDS_PARSE_COMPLETE",
        adapters = catalog.len().saturating_sub(1),
        generic_fields = raw.generic.len(),
        elapsed_ms = run.elapsed_ms(),
    );

    Ok(FieldCatalog::new(catalog))
}

fn generic_fields(raw_fields: &[FieldInfo]) -> Result<IndexMap<String, FieldInfo>> {
    let mut fields = IndexMap::with_capacity(raw_fields.len() + 2);
    fields.insert(
        "all_data".to_string(),
        FieldInfo::synthetic(
            GENERIC_DATA_PREFIX,
            "All data subsets for generic adapter",
            GENERIC_PREFIX,
        ),
    );
    fields.insert(
        "all".to_string(),
        FieldInfo::synthetic(GENERIC_PREFIX, "All data for generic adapter", GENERIC_PREFIX),
    );

    for raw in raw_fields {
        let mut field = raw.clone();
        field.adapter_prefix = GENERIC_PREFIX.to_string();
        let short = short_field_name(&field.name, GENERIC_DATA_PREFIX).to_string();
        insert_unique(&mut fields, short, field, || "Generic field".to_string())?;
    }

    Ok(fields)
}

fn adapter_fields(
    name: &str,
    raw_fields: &[FieldInfo],
) -> Result<(String, IndexMap<String, FieldInfo>)> {
    let short_name = adapter_short_name(name);
    let prefix = adapter_field_prefix(name);

    let mut fields = IndexMap::with_capacity(raw_fields.len() + 1);
    fields.insert(
        "all".to_string(),
        FieldInfo::synthetic(&prefix, &format!("All data for {} adapter", prefix), &prefix),
    );

    for raw in raw_fields {
        let mut field = raw.clone();
        field.adapter_prefix = prefix.clone();
        let short = short_field_name(&field.name, &prefix).to_string();
        insert_unique(&mut fields, short, field, || format!("Adapter {} field", short_name))?;
    }

    Ok((short_name.to_string(), fields))
}

fn insert_unique<V>(
    map: &mut IndexMap<String, V>,
    key: String,
    value: V,
    desc: impl FnOnce() -> String,
) -> Result<()> {
    match map.entry(key) {
        Entry::Occupied(entry) => Err(ParseError::DuplicateDefinition {
            desc: desc(),
            name: entry.key().clone(),
        }),
        Entry::Vacant(entry) => {
            entry.insert(value);
            Ok(())
        }
    }
}
