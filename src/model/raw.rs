//! Raw payload shapes as returned by the platform.
//!
//! Deserializing into these at the boundary means a payload missing an
//! expected key fails once, with a serde error naming the key, instead of
//! half-building a record.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::fields::FieldInfo;
use super::settings::SettingSchema;

/// Schema blob: ordered items plus the names of the required ones.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawSchema {
    #[serde(default)]
    pub items: Vec<SettingSchema>,
    #[serde(default)]
    pub required: Vec<String>,
}

/// One adapter-level settings blob under `config`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawConfigBlob {
    pub schema: RawSchema,
    #[serde(default)]
    pub config: Map<String, Value>,
}

/// One connection ("client") of an adapter.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawClient {
    pub client_id: String,
    pub uuid: String,
    pub status: String,
    pub date_fetched: String,
    #[serde(default)]
    pub error: Option<String>,
    pub client_config: Map<String, Value>,
}

/// One adapter instance on one node.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawAdapter {
    pub unique_plugin_name: String,
    pub node_name: String,
    pub node_id: String,
    pub status: String,
    #[serde(default)]
    pub supported_features: Vec<String>,
    pub schema: RawSchema,
    #[serde(default)]
    pub clients: Vec<RawClient>,
    #[serde(default)]
    pub config: IndexMap<String, RawConfigBlob>,
}

/// Adapter status payload: raw adapter name -> one entry per node.
pub type RawAdapters = IndexMap<String, Vec<RawAdapter>>;

/// Field schema payload for one asset type.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawFieldCatalog {
    #[serde(default)]
    pub generic: Vec<FieldInfo>,
    #[serde(default)]
    pub specific: IndexMap<String, Vec<FieldInfo>>,
}
