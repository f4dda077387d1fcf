//! CSV rendering of normalized records.
//!
//! List-valued cells are joined with newlines so one record stays one row.

use std::io::Write;

use serde::Serialize;

use crate::model::fields::FieldCatalog;
use crate::model::records::{AdapterRecord, ConnectionRecord};
use crate::model::settings::ResolvedConfig;
use crate::validation::convert::value_to_string;

/// Join list cells one per line.
pub fn join_cr<S: AsRef<str>>(items: &[S]) -> String {
    items.iter().map(AsRef::as_ref).collect::<Vec<_>>().join("\n")
}

#[derive(Debug, Serialize)]
struct AdapterRow<'a> {
    name: &'a str,
    node_name: &'a str,
    status: Option<bool>,
    status_raw: &'a str,
    cnx_count: usize,
    cnx_count_ok: usize,
    cnx_count_bad: usize,
    features: String,
}

#[derive(Debug, Serialize)]
struct ConnectionRow<'a> {
    adapter_name: &'a str,
    node_name: &'a str,
    id: &'a str,
    uuid: &'a str,
    status: bool,
    status_raw: &'a str,
    error: &'a str,
    date_fetched: &'a str,
    config: String,
}

#[derive(Debug, Serialize)]
struct FieldRow<'a> {
    adapter: &'a str,
    short_name: &'a str,
    name: &'a str,
    #[serde(rename = "type")]
    type_str: &'a str,
    title: &'a str,
}

/// One row per adapter: identity, status and connection counts.
pub fn write_adapters<W: Write>(out: W, adapters: &[AdapterRecord]) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for adapter in adapters {
        writer.serialize(AdapterRow {
            name: &adapter.name,
            node_name: &adapter.node_name,
            status: adapter.status,
            status_raw: &adapter.status_raw,
            cnx_count: adapter.cnx_count,
            cnx_count_ok: adapter.cnx_count_ok,
            cnx_count_bad: adapter.cnx_count_bad,
            features: join_cr(&adapter.features),
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// One row per connection, config rendered `name: value` per line.
pub fn write_connections<'a, W, I>(out: W, connections: I) -> csv::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a ConnectionRecord>,
{
    let mut writer = csv::Writer::from_writer(out);
    for cnx in connections {
        let config: Vec<String> = cnx
            .config
            .iter()
            .map(|(name, setting)| format!("{}: {}", name, value_to_string(&setting.value)))
            .collect();
        writer.serialize(ConnectionRow {
            adapter_name: &cnx.adapter_name,
            node_name: &cnx.node_name,
            id: &cnx.id,
            uuid: &cnx.uuid,
            status: cnx.status,
            status_raw: &cnx.status_raw,
            error: cnx.error.as_deref().unwrap_or(""),
            date_fetched: &cnx.date_fetched,
            config: join_cr(&config),
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// One row per field, optionally limited to one adapter.
pub fn write_fields<W: Write>(
    out: W,
    catalog: &FieldCatalog,
    adapter: Option<&str>,
) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for (adapter_name, fields) in catalog.iter() {
        if adapter.map_or(false, |wanted| wanted != adapter_name) {
            continue;
        }
        for (short_name, info) in fields {
            writer.serialize(FieldRow {
                adapter: adapter_name,
                short_name: short_name.as_str(),
                name: &info.name,
                type_str: &info.type_str,
                title: &info.title,
            })?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// One `name,value` row per resolved setting.
pub fn write_resolved<W: Write>(out: W, resolved: &ResolvedConfig) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["name", "value"])?;
    for (name, value) in resolved.iter() {
        writer.write_record([name.as_str(), value_to_string(&value.to_json()).as_str()])?;
    }
    writer.flush()?;
    Ok(())
}
