//! Field schema catalog.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::sentinels::GENERIC_KEY;
use crate::error::{ParseError, Result};

/// Schema of an array field's elements. Complex (table) fields nest a list
/// of sub-fields here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldItems {
    #[serde(rename = "type", default)]
    pub type_str: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branched: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<NestedItems>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NestedItems {
    One(Box<FieldItems>),
    Many(Vec<FieldItems>),
}

impl FieldItems {
    fn collect_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        if let Some(name) = &self.name {
            out.push(name);
        }
        match &self.items {
            Some(NestedItems::One(item)) => item.collect_names(out),
            Some(NestedItems::Many(items)) => {
                for item in items {
                    item.collect_names(out);
                }
            }
            None => {}
        }
    }
}

/// Metadata for one queryable field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldInfo {
    /// Fully qualified name, e.g. `specific_data.data.hostname`.
    pub name: String,
    #[serde(rename = "type")]
    pub type_str: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub adapter_prefix: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<FieldItems>,
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branched: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FieldInfo {
    /// Synthetic array field covering a whole namespace.
    pub fn synthetic(name: &str, title: &str, adapter_prefix: &str) -> Self {
        Self {
            name: name.to_string(),
            type_str: "array".to_string(),
            title: title.to_string(),
            adapter_prefix: adapter_prefix.to_string(),
            items: None,
            enum_values: Vec::new(),
            format: None,
            description: None,
            sort: None,
            unique: None,
            branched: None,
            dynamic: None,
            extra: Map::new(),
        }
    }

    /// Names of nested sub-fields, depth first.
    pub fn sub_field_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        if let Some(items) = &self.items {
            match &items.items {
                Some(NestedItems::One(item)) => item.collect_names(&mut names),
                Some(NestedItems::Many(list)) => {
                    for item in list {
                        item.collect_names(&mut names);
                    }
                }
                None => {}
            }
        }
        names
    }
}

/// Adapter short name (or `generic`) -> field short name -> metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldCatalog {
    adapters: IndexMap<String, IndexMap<String, FieldInfo>>,
}

impl FieldCatalog {
    pub(crate) fn new(adapters: IndexMap<String, IndexMap<String, FieldInfo>>) -> Self {
        Self { adapters }
    }

    pub fn generic(&self) -> Option<&IndexMap<String, FieldInfo>> {
        self.adapters.get(GENERIC_KEY)
    }

    pub fn adapter_names(&self) -> impl Iterator<Item = &str> {
        self.adapters.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &IndexMap<String, FieldInfo>)> {
        self.adapters.iter().map(|(name, fields)| (name.as_str(), fields))
    }

    pub fn adapter(&self, name: &str) -> Result<&IndexMap<String, FieldInfo>> {
        self.adapters
            .get(name)
            .ok_or_else(|| ParseError::ObjectNotFound {
                kind: "adapter fields".to_string(),
                value: name.to_string(),
            })
    }

    /// Look a field up by short name or fully qualified name.
    pub fn field(&self, adapter: &str, field: &str) -> Result<&FieldInfo> {
        let fields = self.adapter(adapter)?;
        fields
            .get(field)
            .or_else(|| fields.values().find(|info| info.name == field))
            .ok_or_else(|| ParseError::ObjectNotFound {
                kind: format!("field of adapter {:?}", adapter),
                value: field.to_string(),
            })
    }

    pub fn full_names(&self, adapter: &str) -> Result<Vec<&str>> {
        Ok(self
            .adapter(adapter)?
            .values()
            .map(|info| info.name.as_str())
            .collect())
    }
}
