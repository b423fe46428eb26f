//! In-memory store over a json-server style document: `{ "resource": [rows...] }`.

use crate::error::StoreError;
use crate::query::{parse_timestamp, CountPlan, FilterValue, Operator, Predicate, RetrievalPlan, SortDirection, SortField, Window};
use crate::schema::TableDescriptor;
use crate::store::{Row, Store};
use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;

/// Rows per collection in document order, which is the natural order for unsorted reads.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    collections: HashMap<String, Vec<Row>>,
}

impl MemoryStore {
    pub fn from_document(document: &Value) -> Result<Self, StoreError> {
        let obj = document
            .as_object()
            .ok_or_else(|| StoreError::Document("expected a JSON object of collections".into()))?;
        let collections = obj
            .iter()
            .filter_map(|(name, rows)| {
                let rows = rows.as_array()?;
                Some((
                    name.clone(),
                    rows.iter().filter_map(Value::as_object).cloned().collect(),
                ))
            })
            .collect();
        Ok(MemoryStore { collections })
    }

    pub async fn load(path: &Path) -> Result<(Self, Value), StoreError> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| StoreError::Document(format!("{}: {}", path.display(), e)))?;
        let document: Value =
            serde_json::from_str(&raw).map_err(|e| StoreError::Document(format!("{}: {}", path.display(), e)))?;
        Ok((Self::from_document(&document)?, document))
    }

    fn rows(&self, table: &TableDescriptor) -> &[Row] {
        self.collections
            .get(&table.name)
            .or_else(|| self.collections.get(&table.resource))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn filtered(&self, table: &TableDescriptor, predicates: &[Predicate]) -> Vec<Row> {
        self.rows(table)
            .iter()
            .filter(|row| predicates.iter().all(|p| matches(row, p)))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn fetch(&self, table: &TableDescriptor, plan: &RetrievalPlan) -> Result<Vec<Row>, StoreError> {
        let mut rows = self.filtered(table, &plan.predicates);
        sort_rows(&mut rows, &plan.sort);
        Ok(apply_window(rows, plan.window))
    }

    async fn count(&self, table: &TableDescriptor, plan: &CountPlan) -> Result<u64, StoreError> {
        Ok(self.filtered(table, &plan.predicates).len() as u64)
    }

    async fn fetch_related(&self, table: &TableDescriptor, predicates: &[Predicate]) -> Result<Vec<Row>, StoreError> {
        Ok(self.filtered(table, predicates))
    }
}

fn apply_window(rows: Vec<Row>, window: Window) -> Vec<Row> {
    let skipped = rows.into_iter().skip(window.start as usize);
    match window.limit() {
        Some(n) => skipped.take(n as usize).collect(),
        None => skipped.collect(),
    }
}

/// Stable sort; nulls sort after values ascending and before them descending.
fn sort_rows(rows: &mut [Row], sort: &[SortField]) {
    if sort.is_empty() {
        return;
    }
    rows.sort_by(|a, b| {
        for field in sort {
            let ord = compare_cells(
                a.get(&field.column).unwrap_or(&Value::Null),
                b.get(&field.column).unwrap_or(&Value::Null),
            );
            let ord = match field.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
}

fn compare_cells(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => x
                .as_f64()
                .partial_cmp(&y.as_f64())
                .unwrap_or(Ordering::Equal),
        },
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => cell_text(a).cmp(&cell_text(b)),
    }
}

fn cell_text(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Compares a cell with an operand. Null cells compare with nothing.
fn compare_operand(cell: &Value, operand: &FilterValue) -> Option<Ordering> {
    match (cell, operand) {
        (Value::Null, _) => None,
        (Value::Number(n), FilterValue::Int(i)) => match n.as_i64() {
            Some(x) => Some(x.cmp(i)),
            None => n.as_f64()?.partial_cmp(&(*i as f64)),
        },
        (Value::Number(n), FilterValue::Float(f)) => n.as_f64()?.partial_cmp(f),
        (Value::Bool(b), FilterValue::Bool(x)) => Some(b.cmp(x)),
        (Value::String(s), FilterValue::Timestamp(t)) => Some(parse_timestamp(s)?.cmp(t)),
        _ => Some(cell_text(cell)?.cmp(&operand.as_text())),
    }
}

fn matches(row: &Row, p: &Predicate) -> bool {
    let cell = row.get(&p.column).unwrap_or(&Value::Null);
    let eq = |v: &FilterValue| compare_operand(cell, v) == Some(Ordering::Equal);
    match p.op {
        Operator::Eq => p.values.first().is_some_and(eq),
        Operator::In => p.values.iter().any(eq),
        Operator::Ne => p
            .values
            .first()
            .is_some_and(|v| compare_operand(cell, v).is_some_and(|o| o != Ordering::Equal)),
        Operator::Gte => p
            .values
            .first()
            .is_some_and(|v| compare_operand(cell, v).is_some_and(|o| o != Ordering::Less)),
        Operator::Lte => p
            .values
            .first()
            .is_some_and(|v| compare_operand(cell, v).is_some_and(|o| o != Ordering::Greater)),
        Operator::Like => match (cell_text(cell), p.values.first()) {
            (Some(text), Some(needle)) => text.contains(&needle.as_text()),
            _ => false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(v: Value) -> Row {
        v.as_object().unwrap().clone()
    }

    fn pred(column: &str, op: Operator, values: Vec<FilterValue>) -> Predicate {
        Predicate { column: column.into(), op, values }
    }

    #[test]
    fn comparisons_follow_sql_null_semantics() {
        let r = row(json!({"id": 1, "name": null}));
        assert!(!matches(&r, &pred("name", Operator::Eq, vec![FilterValue::Text("x".into())])));
        assert!(!matches(&r, &pred("name", Operator::Ne, vec![FilterValue::Text("x".into())])));
        assert!(!matches(&r, &pred("missing", Operator::Like, vec![FilterValue::Text("x".into())])));
        assert!(matches(&r, &pred("id", Operator::Ne, vec![FilterValue::Int(2)])));
    }

    #[test]
    fn numbers_and_text_forms() {
        let r = row(json!({"id": 7, "userId": "3", "score": 2.5, "at": "2024-03-01T10:00:00Z"}));
        assert!(matches(&r, &pred("id", Operator::Gte, vec![FilterValue::Int(7)])));
        assert!(!matches(&r, &pred("id", Operator::Lte, vec![FilterValue::Int(6)])));
        assert!(matches(&r, &pred("userId", Operator::Eq, vec![FilterValue::Int(3)])));
        assert!(matches(&r, &pred("score", Operator::Lte, vec![FilterValue::Float(2.5)])));
        assert!(matches(&r, &pred("id", Operator::In, vec![FilterValue::Int(1), FilterValue::Int(7)])));
        let t = parse_timestamp("2024-03-01").unwrap();
        assert!(matches(&r, &pred("at", Operator::Gte, vec![FilterValue::Timestamp(t)])));
    }

    #[test]
    fn sort_puts_nulls_last_ascending() {
        let mut rows = vec![row(json!({"n": null})), row(json!({"n": 2})), row(json!({"n": 1}))];
        sort_rows(&mut rows, &[SortField { column: "n".into(), direction: SortDirection::Asc }]);
        assert_eq!(rows.iter().map(|r| r["n"].clone()).collect::<Vec<_>>(), vec![json!(1), json!(2), json!(null)]);
        sort_rows(&mut rows, &[SortField { column: "n".into(), direction: SortDirection::Desc }]);
        assert_eq!(rows.iter().map(|r| r["n"].clone()).collect::<Vec<_>>(), vec![json!(null), json!(2), json!(1)]);
    }

    #[test]
    fn rejects_non_object_documents() {
        assert!(MemoryStore::from_document(&json!([1, 2])).is_err());
    }
}
