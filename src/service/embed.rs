//! Embed resolver: attaches related rows under request-supplied embed keys.
//!
//! One fetch per resolved key. belongs_to fetches only the referenced rows; has_many
//! fetches the whole related table and groups it in memory. Each key is resolved against
//! the input rows as given, so keys never observe one another's attachments.

use crate::config::NamingConvention;
use crate::error::StoreError;
use crate::query::{FilterValue, Operator, Predicate};
use crate::schema::{Catalog, ColumnType, RelationDescriptor, RelationKind, TableDescriptor};
use crate::store::{Row, Store};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

pub async fn resolve(
    store: &dyn Store,
    catalog: &Catalog,
    table: &TableDescriptor,
    rows: Vec<Row>,
    keys: &[String],
    naming: &NamingConvention,
) -> Result<Vec<Row>, StoreError> {
    let mut attachments: Vec<(&str, Vec<Value>)> = Vec::new();
    for key in keys {
        let Some(relation) = find_relation(table, catalog, key, naming) else {
            tracing::debug!(table = %table.resource, key = %key, "embed key unresolved");
            continue;
        };
        let related = catalog.table(&relation.related_table);
        let values = match relation.kind {
            RelationKind::BelongsTo => embed_belongs_to(store, related, relation, &rows).await?,
            RelationKind::HasMany => embed_has_many(store, related, relation, &rows).await?,
        };
        attachments.push((key.as_str(), values));
    }

    let mut rows = rows;
    for (key, values) in attachments {
        for (row, value) in rows.iter_mut().zip(values) {
            row.insert(key.to_string(), value);
        }
    }
    Ok(rows)
}

/// Canonical relation name first, then the related table's name or its
/// singular/plural forms.
pub fn find_relation<'a>(
    table: &'a TableDescriptor,
    catalog: &Catalog,
    key: &str,
    naming: &NamingConvention,
) -> Option<&'a RelationDescriptor> {
    if let Some(r) = table.relations.iter().find(|r| r.name == key) {
        return Some(r);
    }
    let variants = naming.variants(key);
    table.relations.iter().find(|r| {
        let logical = catalog.table(&r.related_table).map(|t| t.name.to_lowercase());
        variants
            .iter()
            .any(|v| *v == r.related_table.to_lowercase() || Some(v) == logical.as_ref())
    })
}

/// Join key for in-memory lookups: strings as-is, other scalars in JSON form, so `"1"`
/// and `1` meet. Null has no key.
fn value_key(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn distinct_keys(rows: &[Row], column: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    rows.iter()
        .filter_map(|r| r.get(column).and_then(value_key))
        .filter(|k| seen.insert(k.clone()))
        .collect()
}

async fn embed_belongs_to(
    store: &dyn Store,
    related: Option<&TableDescriptor>,
    relation: &RelationDescriptor,
    rows: &[Row],
) -> Result<Vec<Value>, StoreError> {
    let nulls = vec![Value::Null; rows.len()];
    let Some(related) = related else {
        return Ok(nulls);
    };
    let keys = distinct_keys(rows, &relation.our_key);
    if keys.is_empty() {
        return Ok(nulls);
    }
    let column_type = related
        .column(relation.related_key())
        .map_or(ColumnType::Text, |c| c.column_type);
    let predicate = Predicate {
        column: relation.related_key().to_string(),
        op: Operator::In,
        values: keys.iter().map(|k| FilterValue::coerce(column_type, k)).collect(),
    };
    let fetched = store.fetch_related(related, &[predicate]).await?;

    let mut lookup: HashMap<String, Row> = HashMap::new();
    for row in fetched {
        if let Some(k) = row.get(relation.related_key()).and_then(value_key) {
            lookup.entry(k).or_insert(row);
        }
    }
    Ok(rows
        .iter()
        .map(|r| {
            r.get(&relation.our_key)
                .and_then(value_key)
                .and_then(|k| lookup.get(&k))
                .map_or(Value::Null, |found| Value::Object(found.clone()))
        })
        .collect())
}

async fn embed_has_many(
    store: &dyn Store,
    related: Option<&TableDescriptor>,
    relation: &RelationDescriptor,
    rows: &[Row],
) -> Result<Vec<Value>, StoreError> {
    let empty = vec![Value::Array(Vec::new()); rows.len()];
    let Some(related) = related else {
        return Ok(empty);
    };
    if distinct_keys(rows, &relation.our_key).is_empty() {
        return Ok(empty);
    }
    // TODO: restrict to rows whose foreign key is among the source keys.
    let fetched = store.fetch_related(related, &[]).await?;

    let mut groups: HashMap<String, Vec<Value>> = HashMap::new();
    for row in fetched {
        if let Some(k) = row.get(relation.foreign_key()).and_then(value_key) {
            groups.entry(k).or_default().push(Value::Object(row));
        }
    }
    Ok(rows
        .iter()
        .map(|r| {
            r.get(&relation.our_key)
                .and_then(value_key)
                .and_then(|k| groups.get(&k))
                .map_or_else(|| Value::Array(Vec::new()), |group| Value::Array(group.clone()))
        })
        .collect())
}
