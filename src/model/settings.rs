//! Settings schemas and resolved setting values.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use super::sentinels::unchanged_value;

/// Closed set of setting types the platform declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingType {
    String,
    Integer,
    Number,
    Bool,
    Array,
    File,
}

impl SettingType {
    /// Parse a schema `type` token. Unknown tokens yield `None`.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "string" => Some(SettingType::String),
            "integer" => Some(SettingType::Integer),
            "number" => Some(SettingType::Number),
            "bool" => Some(SettingType::Bool),
            "array" => Some(SettingType::Array),
            "file" => Some(SettingType::File),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SettingType::String => "string",
            SettingType::Integer => "integer",
            SettingType::Number => "number",
            SettingType::Bool => "bool",
            SettingType::Array => "array",
            SettingType::File => "file",
        }
    }
}

impl fmt::Display for SettingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keeps an explicit `null` distinct from an absent key.
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

/// One declared configuration field.
///
/// Keys the platform declares beyond the ones modelled here (`items`,
/// `source`, ...) are carried verbatim in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingSchema {
    pub name: String,
    /// Raw type token. Kept as a string so a malformed schema surfaces as
    /// `SettingUnknownType` at coercion time instead of failing the whole
    /// payload.
    #[serde(rename = "type")]
    pub type_str: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub default: Option<Value>,
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SettingSchema {
    pub fn new(name: &str, type_str: &str) -> Self {
        Self {
            name: name.to_string(),
            type_str: type_str.to_string(),
            title: None,
            required: false,
            default: None,
            enum_values: Vec::new(),
            format: None,
            description: None,
            extra: Map::new(),
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_enum(mut self, values: Vec<Value>) -> Self {
        self.enum_values = values;
        self
    }

    pub fn setting_type(&self) -> Option<SettingType> {
        SettingType::parse(&self.type_str)
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    pub fn is_secret(&self) -> bool {
        self.format.as_deref() == Some("password")
            || self.setting_type() == Some(SettingType::File)
    }
}

/// Settings schema collection keyed by setting name, in declaration order.
pub type SettingCatalog = IndexMap<String, SettingSchema>;

/// A setting schema together with its current (or display) value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettingValue {
    #[serde(flatten)]
    pub schema: SettingSchema,
    pub value: Value,
}

/// Reference to a file already uploaded to the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    pub uuid: String,
    pub filename: String,
}

/// A value that passed schema coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum CoercedValue {
    /// Caller keeps the stored secret as-is.
    Unchanged,
    Bool(bool),
    Integer(i64),
    Array(Vec<String>),
    String(String),
    File(FileRef),
}

impl CoercedValue {
    pub fn to_json(&self) -> Value {
        match self {
            CoercedValue::Unchanged => unchanged_value(),
            CoercedValue::Bool(b) => Value::Bool(*b),
            CoercedValue::Integer(i) => Value::from(*i),
            CoercedValue::Array(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
            CoercedValue::String(s) => Value::String(s.clone()),
            CoercedValue::File(file) => {
                let mut obj = Map::new();
                obj.insert("uuid".to_string(), Value::String(file.uuid.clone()));
                obj.insert("filename".to_string(), Value::String(file.filename.clone()));
                Value::Object(obj)
            }
        }
    }
}

impl Serialize for CoercedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Fully resolved configuration, keyed by setting name.
///
/// Optional settings with neither a value nor a default are absent.
pub type ResolvedConfig = IndexMap<String, CoercedValue>;
