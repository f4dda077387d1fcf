//! Normalized adapter and connection records.
//!
//! Records are derived fresh from the raw payload on every parse and are
//! never mutated afterwards.

use chrono::{DateTime, NaiveDateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::settings::{ResolvedConfig, SettingCatalog, SettingValue};
use crate::error::{ParseError, Result};
use crate::validation::config::ConfigParser;
use crate::validation::upload::FileUploader;

/// Adapter identity handed to the upload collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterTarget {
    pub name: String,
    pub name_raw: String,
    pub name_plugin: String,
    pub node_id: String,
    pub node_name: String,
}

/// One configured connection of an adapter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionRecord {
    pub id: String,
    pub uuid: String,
    pub adapter_name: String,
    pub adapter_name_raw: String,
    pub adapter_status: Option<bool>,
    pub node_id: String,
    pub node_name: String,
    pub status: bool,
    pub status_raw: String,
    pub error: Option<String>,
    pub date_fetched: String,
    /// Display config: hidden secrets and missing keys are replaced by
    /// the `__HIDDEN__` / `__NOTSET__` markers.
    pub config: IndexMap<String, SettingValue>,
    pub config_raw: Map<String, Value>,
}

impl ConnectionRecord {
    /// Parse `date_fetched`. The platform has used several formats.
    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.date_fetched.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        for fmt in ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%:z"] {
            if let Ok(dt) = DateTime::parse_from_str(raw, fmt) {
                return Some(dt.with_timezone(&Utc));
            }
        }
        if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }
}

/// One adapter instance on one node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdapterRecord {
    pub name: String,
    pub name_raw: String,
    pub name_plugin: String,
    pub node_id: String,
    pub node_name: String,
    pub features: Vec<String>,
    /// `Some(true)` healthy, `Some(false)` warning, `None` unrecognized.
    pub status: Option<bool>,
    pub status_raw: String,
    pub cnx: Vec<ConnectionRecord>,
    pub cnx_ok: Vec<ConnectionRecord>,
    pub cnx_bad: Vec<ConnectionRecord>,
    pub cnx_count: usize,
    pub cnx_count_ok: usize,
    pub cnx_count_bad: usize,
    pub cnx_settings: SettingCatalog,
    pub settings: IndexMap<String, SettingValue>,
    pub adv_settings: IndexMap<String, SettingValue>,
}

impl AdapterRecord {
    /// Label used in setting errors and log lines.
    pub fn source(&self) -> String {
        format!("adapter {:?} on node {:?}", self.name, self.node_name)
    }

    pub fn target(&self) -> AdapterTarget {
        AdapterTarget {
            name: self.name.clone(),
            name_raw: self.name_raw.clone(),
            name_plugin: self.name_plugin.clone(),
            node_id: self.node_id.clone(),
            node_name: self.node_name.clone(),
        }
    }

    /// Find a connection by id or uuid.
    pub fn find_cnx(&self, id: &str) -> Result<&ConnectionRecord> {
        self.cnx
            .iter()
            .find(|cnx| cnx.id == id || cnx.uuid == id)
            .ok_or_else(|| ParseError::ObjectNotFound {
                kind: format!("connection of {}", self.source()),
                value: id.to_string(),
            })
    }

    /// Most recent fetch across all connections.
    pub fn last_fetched(&self) -> Option<DateTime<Utc>> {
        self.cnx.iter().filter_map(ConnectionRecord::fetched_at).max()
    }

    /// Validate a new connection config against this adapter's connection
    /// schema.
    pub fn check_cnx_config(
        &self,
        raw: &Map<String, Value>,
        uploader: Option<&dyn FileUploader>,
    ) -> Result<ResolvedConfig> {
        let source = format!("connection config of {}", self.source());
        let target = self.target();
        self.parser(&source, &target, uploader)
            .parse(raw, &self.cnx_settings)
    }

    /// Validate new adapter-level settings against the basic (`advanced =
    /// false`) or advanced settings schema.
    pub fn check_settings(
        &self,
        raw: &Map<String, Value>,
        advanced: bool,
        uploader: Option<&dyn FileUploader>,
    ) -> Result<ResolvedConfig> {
        let (label, current) = if advanced {
            ("advanced settings", &self.adv_settings)
        } else {
            ("settings", &self.settings)
        };
        let source = format!("{} of {}", label, self.source());
        let schemas = schema_catalog(current);
        let target = self.target();
        self.parser(&source, &target, uploader).parse(raw, &schemas)
    }

    fn parser<'a>(
        &self,
        source: &'a str,
        target: &'a AdapterTarget,
        uploader: Option<&'a dyn FileUploader>,
    ) -> ConfigParser<'a> {
        let parser = ConfigParser::new(source).with_adapter(target);
        match uploader {
            Some(uploader) => parser.with_uploader(uploader),
            None => parser,
        }
    }
}

/// Strip current values, keeping only the schemas.
pub fn schema_catalog(values: &IndexMap<String, SettingValue>) -> SettingCatalog {
    values
        .iter()
        .map(|(name, value)| (name.clone(), value.schema.clone()))
        .collect()
}

/// Find an adapter by display or raw name on a node given by name or id.
pub fn find_adapter<'a>(
    adapters: &'a [AdapterRecord],
    name: &str,
    node: &str,
) -> Result<&'a AdapterRecord> {
    adapters
        .iter()
        .find(|a| {
            (a.name == name || a.name_raw == name) && (a.node_name == node || a.node_id == node)
        })
        .ok_or_else(|| ParseError::ObjectNotFound {
            kind: "adapter".to_string(),
            value: format!("{} on node {}", name, node),
        })
}
