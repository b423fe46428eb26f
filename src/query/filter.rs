//! Filter builder: residual filter entries -> AND-combined atomic predicates.

use crate::query::FilterEntry;
use crate::schema::{ColumnType, TableDescriptor};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;

static OPERATOR_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<column>.+)_(?P<op>like|ne|gte|lte)$").expect("static regex")
});

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    /// Case-sensitive substring match.
    Like,
    Gte,
    Lte,
    In,
}

impl Operator {
    fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "like" => Some(Operator::Like),
            "ne" => Some(Operator::Ne),
            "gte" => Some(Operator::Gte),
            "lte" => Some(Operator::Lte),
            _ => None,
        }
    }
}

/// A filter operand coerced to the column's type. Values that do not coerce stay text.
#[derive(Clone, Debug, PartialEq)]
pub enum FilterValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl FilterValue {
    pub fn coerce(column_type: ColumnType, raw: &str) -> Self {
        let trimmed = raw.trim();
        let coerced = match column_type {
            ColumnType::Integer => trimmed.parse().map(FilterValue::Int).ok(),
            ColumnType::Number => trimmed.parse().ok().filter(|f: &f64| f.is_finite()).map(FilterValue::Float),
            ColumnType::Boolean => match trimmed.to_lowercase().as_str() {
                "true" => Some(FilterValue::Bool(true)),
                "false" => Some(FilterValue::Bool(false)),
                _ => None,
            },
            ColumnType::Timestamp => parse_timestamp(trimmed).map(FilterValue::Timestamp),
            ColumnType::Text | ColumnType::Json => None,
        };
        coerced.unwrap_or_else(|| FilterValue::Text(raw.to_string()))
    }

    /// Whether the value kept the column's native type.
    pub fn matches_type(&self, column_type: ColumnType) -> bool {
        matches!(
            (self, column_type),
            (FilterValue::Int(_), ColumnType::Integer)
                | (FilterValue::Float(_), ColumnType::Number)
                | (FilterValue::Bool(_), ColumnType::Boolean)
                | (FilterValue::Timestamp(_), ColumnType::Timestamp)
                | (FilterValue::Text(_), ColumnType::Text)
        )
    }

    pub fn as_text(&self) -> String {
        match self {
            FilterValue::Bool(b) => b.to_string(),
            FilterValue::Int(n) => n.to_string(),
            FilterValue::Float(f) => f.to_string(),
            FilterValue::Text(s) => s.clone(),
            FilterValue::Timestamp(t) => t.to_rfc3339(),
        }
    }
}

/// Accepts RFC 3339, naive date-times (`T` or space separated) and plain dates, read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(t) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(t.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|t| t.and_utc())
}

#[derive(Clone, Debug, PartialEq)]
pub struct Predicate {
    pub column: String,
    pub op: Operator,
    /// One value, except for `In`.
    pub values: Vec<FilterValue>,
}

/// Splits `column_op` into its base column and operator when the suffix is known.
pub fn split_operator(key: &str) -> Option<(&str, Operator)> {
    let caps = OPERATOR_SUFFIX.captures(key)?;
    let column = caps.name("column")?.as_str();
    let op = Operator::from_suffix(caps.name("op")?.as_str())?;
    Some((column, op))
}

pub fn build(filters: &[FilterEntry], table: &TableDescriptor) -> Vec<Predicate> {
    let mut out = Vec::new();
    for entry in filters {
        let (column, op) = if table.has_column(&entry.key) {
            (entry.key.as_str(), Operator::Eq)
        } else {
            match split_operator(&entry.key) {
                Some((column, op)) if table.has_column(column) => (column, op),
                _ => {
                    tracing::debug!(table = %table.resource, key = %entry.key, "filter key ignored");
                    continue;
                }
            }
        };
        let Some(column_type) = table.column(column).map(|c| c.column_type) else {
            continue;
        };

        if op == Operator::Eq {
            let raw = equality_values(entry.value.values());
            let values: Vec<FilterValue> = raw.iter().map(|v| FilterValue::coerce(column_type, v)).collect();
            let op = match values.len() {
                0 => continue,
                1 => Operator::Eq,
                _ => Operator::In,
            };
            out.push(Predicate {
                column: column.to_string(),
                op,
                values,
            });
            continue;
        }

        for raw in entry.value.values() {
            let value = if op == Operator::Like {
                FilterValue::Text(raw.to_string())
            } else {
                FilterValue::coerce(column_type, raw)
            };
            out.push(Predicate {
                column: column.to_string(),
                op,
                values: vec![value],
            });
        }
    }
    out
}

/// Comma-containing values split into trimmed, non-empty parts; others pass through.
fn equality_values(raw: Vec<&str>) -> Vec<String> {
    raw.into_iter()
        .flat_map(|v| {
            if v.contains(',') {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            } else {
                vec![v.to_string()]
            }
        })
        .collect()
}
