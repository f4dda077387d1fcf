//! Adapter and connection normalization.
//!
//! Turns the adapter status payload (raw adapter name -> one entry per node)
//! into flat [`AdapterRecord`]s:
//! 1. Name/identity mapping and tri-state status
//! 2. Connection schema resolution
//! 3. Connection display parse and ok/bad partitioning
//! 4. Base/advanced adapter settings

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::context::ParseContext;
use crate::logging::structured::LogContext;
use crate::model::raw::{RawAdapter, RawAdapters, RawClient};
use crate::model::records::{AdapterRecord, ConnectionRecord};
use crate::model::sentinels::{is_unchanged, HIDDEN, NOTSET};
use crate::model::settings::{SettingCatalog, SettingValue};

use super::names::adapter_short_name;
use super::settings::{adapter_settings, resolve_settings};

const STATUS_SUCCESS: &str = "success";
const STATUS_WARNING: &str = "warning";

/// Normalize every adapter instance in `raw`, in payload order.
pub fn parse_adapters(raw: &RawAdapters) -> Vec<AdapterRecord> {
    let run = ParseContext::new();
    let ctx = run.log_context();

    crate::log_info!(ctx, "ADAPTERS_PARSE_START", adapter_names = raw.len());

    let mut parsed = Vec::new();
    for (name, instances) in raw {
        for instance in instances {
            parsed.push(parse_adapter(name, instance, &ctx));
        }
    }

    crate::log_info!(
        ctx,
        "ADAPTERS_PARSE_COMPLETE",
        adapters = parsed.len(),
        elapsed_ms = run.elapsed_ms(),
    );

    parsed
}

/// Normalize one adapter instance on one node.
pub fn parse_adapter(name_raw: &str, raw: &RawAdapter, ctx: &LogContext) -> AdapterRecord {
    let name = adapter_short_name(name_raw).to_string();
    let source = format!("adapter {:?} on node {:?}", name, raw.node_name);
    let ctx = ctx.with_source(&source);

    let status = adapter_status(&raw.status);
    if status.is_none() {
        crate::log_warn!(ctx, "ADAPTER_STATUS_UNKNOWN", status = raw.status);
    }

    let cnx_settings = resolve_settings(&raw.schema);

    let cnx: Vec<ConnectionRecord> = raw
        .clients
        .iter()
        .map(|client| {
            parse_cnx(
                client,
                &cnx_settings,
                ConnectionParent {
                    name: &name,
                    name_raw,
                    status,
                    adapter: raw,
                },
            )
        })
        .collect();

    let (cnx_ok, cnx_bad): (Vec<ConnectionRecord>, Vec<ConnectionRecord>) =
        cnx.iter().cloned().partition(|c| c.status);

    let settings = adapter_settings(&raw.config, false, &ctx);
    let adv_settings = adapter_settings(&raw.config, true, &ctx);

    crate::log_debug!(
        ctx,
        "ADAPTER_PARSED",
        status = raw.status,
        cnx = cnx.len(),
        cnx_ok = cnx_ok.len(),
        cnx_bad = cnx_bad.len(),
        settings = settings.len(),
        adv_settings = adv_settings.len(),
    );

    AdapterRecord {
        name,
        name_raw: name_raw.to_string(),
        name_plugin: raw.unique_plugin_name.clone(),
        node_id: raw.node_id.clone(),
        node_name: raw.node_name.clone(),
        features: raw.supported_features.clone(),
        status,
        status_raw: raw.status.clone(),
        cnx_count: cnx.len(),
        cnx_count_ok: cnx_ok.len(),
        cnx_count_bad: cnx_bad.len(),
        cnx,
        cnx_ok,
        cnx_bad,
        cnx_settings,
        settings,
        adv_settings,
    }
}

/// `success` -> healthy, `warning` -> degraded, anything else unknown.
pub fn adapter_status(raw_status: &str) -> Option<bool> {
    match raw_status {
        STATUS_SUCCESS => Some(true),
        STATUS_WARNING => Some(false),
        _ => None,
    }
}

struct ConnectionParent<'a> {
    name: &'a str,
    name_raw: &'a str,
    status: Option<bool>,
    adapter: &'a RawAdapter,
}

fn parse_cnx(
    client: &RawClient,
    settings: &SettingCatalog,
    parent: ConnectionParent<'_>,
) -> ConnectionRecord {
    ConnectionRecord {
        id: client.client_id.clone(),
        uuid: client.uuid.clone(),
        adapter_name: parent.name.to_string(),
        adapter_name_raw: parent.name_raw.to_string(),
        adapter_status: parent.status,
        node_id: parent.adapter.node_id.clone(),
        node_name: parent.adapter.node_name.clone(),
        status: client.status == STATUS_SUCCESS,
        status_raw: client.status.clone(),
        error: client.error.clone(),
        date_fetched: client.date_fetched.clone(),
        config: display_config(&client.client_config, settings),
        config_raw: client.client_config.clone(),
    }
}

/// Display values for a connection config. No coercion happens here.
pub fn display_config(
    raw: &Map<String, Value>,
    settings: &SettingCatalog,
) -> IndexMap<String, SettingValue> {
    settings
        .iter()
        .map(|(name, schema)| {
            let value = match raw.get(name) {
                None => Value::String(NOTSET.to_string()),
                Some(value) if is_unchanged(value) => Value::String(HIDDEN.to_string()),
                Some(value) => value.clone(),
            };
            (
                name.clone(),
                SettingValue {
                    schema: schema.clone(),
                    value,
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_adapters(value: Value) -> RawAdapters {
        serde_json::from_value(value).unwrap()
    }

    fn client(id: &str, status: &str, config: Value) -> Value {
        json!({
            "client_id": id,
            "uuid": format!("uuid-{}", id),
            "status": status,
            "date_fetched": "2020-01-01T00:00:00+00:00",
            "error": if status == "success" { Value::Null } else { json!("timeout") },
            "client_config": config
        })
    }

    fn adapter(status: &str, clients: Vec<Value>) -> Value {
        json!({
            "unique_plugin_name": "active_directory_adapter_0",
            "node_name": "master",
            "node_id": "node-1",
            "status": status,
            "supported_features": ["Adapter"],
            "schema": {
                "items": [
                    {"name": "dc_name", "title": "DC Address", "type": "string"},
                    {
                        "name": "password",
                        "title": "Password",
                        "type": "string",
                        "format": "password"
                    },
                    {"name": "port", "title": "Port", "type": "integer"}
                ],
                "required": ["dc_name", "password"]
            },
            "clients": clients,
            "config": {}
        })
    }

    #[test]
    fn test_adapter_identity_and_status() {
        let raw = raw_adapters(json!({
            "active_directory_adapter": [
                adapter("success", vec![]),
                adapter("warning", vec![]),
                adapter("error", vec![])
            ]
        }));

        let parsed = parse_adapters(&raw);

        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0].name, "active_directory");
        assert_eq!(parsed[0].name_raw, "active_directory_adapter");
        assert_eq!(parsed[0].name_plugin, "active_directory_adapter_0");
        assert_eq!(parsed[0].features, vec!["Adapter".to_string()]);
        assert_eq!(parsed[0].status, Some(true));
        assert_eq!(parsed[1].status, Some(false));
        assert_eq!(parsed[2].status, None);
        assert_eq!(parsed[2].status_raw, "error");
    }

    #[test]
    fn test_connection_display_values() {
        let raw = raw_adapters(json!({
            "active_directory_adapter": [adapter("success", vec![
                client("c1", "success", json!({"dc_name": "dc1", "password": ["unchanged"]}))
            ])]
        }));

        let parsed = parse_adapters(&raw);
        let cnx = &parsed[0].cnx[0];

        assert_eq!(cnx.config.get("dc_name").unwrap().value, json!("dc1"));
        assert_eq!(cnx.config.get("password").unwrap().value, json!(HIDDEN));
        assert_eq!(cnx.config.get("port").unwrap().value, json!(NOTSET));
        assert!(cnx.config.get("dc_name").unwrap().schema.required);
        assert_eq!(cnx.config_raw.get("password"), Some(&json!(["unchanged"])));
        assert_eq!(cnx.adapter_name, "active_directory");
        assert_eq!(cnx.adapter_status, Some(true));
        assert_eq!(cnx.node_id, "node-1");
    }

    #[test]
    fn test_connection_partition() {
        let raw = raw_adapters(json!({
            "active_directory_adapter": [adapter("warning", vec![
                client("c1", "success", json!({})),
                client("c2", "error", json!({})),
                client("c3", "success", json!({}))
            ])]
        }));

        let parsed = parse_adapters(&raw);
        let record = &parsed[0];

        assert_eq!(record.cnx_count, 3);
        assert_eq!(record.cnx_count_ok, 2);
        assert_eq!(record.cnx_count_bad, 1);
        assert!(record.cnx_ok.iter().all(|c| c.status));
        assert!(record.cnx_bad.iter().all(|c| !c.status));
        assert_eq!(record.cnx_bad[0].id, "c2");
        assert_eq!(record.cnx_bad[0].error.as_deref(), Some("timeout"));
        assert_eq!(
            record.cnx.iter().map(|c| c.id.as_str()).collect::<Vec<_>>(),
            vec!["c1", "c2", "c3"]
        );
    }

    #[test]
    fn test_adapter_settings_attached() {
        let mut raw_adapter = adapter("success", vec![]);
        raw_adapter["config"] = json!({
            "ActiveDirectorySettings": {
                "schema": {
                    "items": [{"name": "sync_resources", "title": "Sync", "type": "bool"}],
                    "required": ["sync_resources"]
                },
                "config": {"sync_resources": true}
            },
            "AdapterBase": {
                "schema": {
                    "items": [{"name": "user_lastseen_hours", "title": "Hours", "type": "integer"}],
                    "required": []
                },
                "config": {}
            }
        });
        let raw = raw_adapters(json!({"active_directory_adapter": [raw_adapter]}));

        let parsed = parse_adapters(&raw);

        let sync = parsed[0].settings.get("sync_resources").unwrap();
        assert_eq!(sync.value, json!(true));
        assert!(sync.schema.required);
        let hours = parsed[0].adv_settings.get("user_lastseen_hours").unwrap();
        assert_eq!(hours.value, Value::Null);
        assert!(!hours.schema.required);
    }

    #[test]
    fn test_parse_adapters_is_repeatable() {
        let raw = raw_adapters(json!({
            "active_directory_adapter": [adapter("success", vec![
                client("c1", "success", json!({"dc_name": "dc1"}))
            ])]
        }));
        assert_eq!(parse_adapters(&raw), parse_adapters(&raw));
    }
}
