//! Raw schema definition: resource name -> table definition, as read from JSON,
//! from Postgres introspection, or inferred from a json-server document.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default = "default_true")]
    pub nullable: bool,
    #[serde(default, alias = "primaryKey")]
    pub primary_key: bool,
}

/// Column spec when columns are given as an object keyed by column name.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ColumnSpec {
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default = "default_true")]
    pub nullable: bool,
    #[serde(default, alias = "primaryKey")]
    pub primary_key: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnsConfig {
    List(Vec<ColumnDefinition>),
    Keyed(BTreeMap<String, ColumnSpec>),
}

/// An entry that passed the table capability check.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TableDefinition {
    /// Logical (storage) table name.
    pub name: String,
    pub columns: ColumnsConfig,
}

fn default_true() -> bool {
    true
}

impl TableDefinition {
    /// Capability check: an entry is a table when it carries name metadata and an
    /// enumerable column set. Anything else yields `None`.
    pub fn recognize(entry: &Value) -> Option<TableDefinition> {
        let obj = entry.as_object()?;
        if !obj.get("name").is_some_and(Value::is_string) {
            return None;
        }
        if !obj.get("columns").is_some_and(|c| c.is_array() || c.is_object()) {
            return None;
        }
        serde_json::from_value(entry.clone()).ok()
    }

    /// Columns in declaration order (keyed columns come out sorted by name).
    pub fn column_list(&self) -> Vec<ColumnDefinition> {
        match &self.columns {
            ColumnsConfig::List(cols) => cols.clone(),
            ColumnsConfig::Keyed(map) => map
                .iter()
                .map(|(name, spec)| ColumnDefinition {
                    name: name.clone(),
                    type_: spec.type_.clone(),
                    nullable: spec.nullable,
                    primary_key: spec.primary_key,
                })
                .collect(),
        }
    }
}

/// Resource name -> raw entry. Entries are only interpreted by the inspector.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaDefinition {
    pub entries: Map<String, Value>,
}

impl SchemaDefinition {
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Object(entries) => Some(SchemaDefinition { entries }),
            _ => None,
        }
    }

    pub fn insert(&mut self, resource: impl Into<String>, table: &TableDefinition) {
        if let Ok(v) = serde_json::to_value(table) {
            self.entries.insert(resource.into(), v);
        }
    }

    /// Entries that pass the table capability check, in resource-name order.
    pub fn tables(&self) -> Vec<(String, TableDefinition)> {
        self.entries
            .iter()
            .filter_map(|(resource, entry)| {
                TableDefinition::recognize(entry).map(|t| (resource.clone(), t))
            })
            .collect()
    }

    /// Infers a definition from a json-server document `{ "resource": [rows...] }`.
    /// Columns are the union of row keys; a column's type comes from its first non-null
    /// value; a column is nullable when some row has null or lacks it. No column is
    /// flagged primary, so the `id` fallback applies. Non-array entries are skipped.
    pub fn infer_from_document(document: &Value) -> Self {
        let mut def = SchemaDefinition::default();
        let Some(collections) = document.as_object() else {
            return def;
        };
        for (resource, rows) in collections {
            let Some(rows) = rows.as_array() else {
                continue;
            };
            let objects: Vec<&Map<String, Value>> = rows.iter().filter_map(Value::as_object).collect();
            let mut columns: Vec<ColumnDefinition> = Vec::new();
            for row in &objects {
                for (key, value) in row.iter() {
                    match columns.iter_mut().find(|c| c.name == *key) {
                        Some(col) => {
                            if col.type_ == UNKNOWN_TYPE && !value.is_null() {
                                col.type_ = json_type_name(value).to_string();
                            }
                            if value.is_null() {
                                col.nullable = true;
                            }
                        }
                        None => columns.push(ColumnDefinition {
                            name: key.clone(),
                            type_: json_type_name(value).to_string(),
                            nullable: value.is_null(),
                            primary_key: false,
                        }),
                    }
                }
            }
            for col in &mut columns {
                if objects.iter().any(|row| !row.contains_key(&col.name)) {
                    col.nullable = true;
                }
                if col.type_ == UNKNOWN_TYPE {
                    col.type_ = "text".into();
                }
            }
            def.insert(
                resource.clone(),
                &TableDefinition {
                    name: resource.clone(),
                    columns: ColumnsConfig::List(columns),
                },
            );
        }
        def
    }
}

const UNKNOWN_TYPE: &str = "unknown";

fn json_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => UNKNOWN_TYPE,
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "text",
        Value::Array(_) | Value::Object(_) => "json",
    }
}
