//! Typed bind values for PostgreSQL, converted from filter operands.

use crate::query::FilterValue;
use chrono::{DateTime, Utc};
use sqlx::encode::{Encode, IsNull};
use sqlx::postgres::{PgTypeInfo, Postgres};
use sqlx::Database;

/// A value that can be bound to a PostgreSQL query. Each variant reports its own
/// Postgres type so mixed-type parameter lists bind correctly.
#[derive(Clone, Debug, PartialEq)]
pub enum PgBindValue {
    Bool(bool),
    I64(i64),
    F64(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl PgBindValue {
    /// Native binding, keeping the operand's coerced type.
    pub fn from_filter(v: &FilterValue) -> Self {
        match v {
            FilterValue::Bool(b) => PgBindValue::Bool(*b),
            FilterValue::Int(n) => PgBindValue::I64(*n),
            FilterValue::Float(f) => PgBindValue::F64(*f),
            FilterValue::Text(s) => PgBindValue::Text(s.clone()),
            FilterValue::Timestamp(t) => PgBindValue::Timestamp(*t),
        }
    }

    /// Text binding, for comparisons against a column cast to text.
    pub fn text_of(v: &FilterValue) -> Self {
        PgBindValue::Text(v.as_text())
    }
}

impl<'q> Encode<'q, Postgres> for PgBindValue {
    fn encode_by_ref(
        &self,
        buf: &mut <Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, Box<dyn std::error::Error + Send + Sync>> {
        Ok(match self {
            PgBindValue::Bool(b) => <bool as Encode<Postgres>>::encode_by_ref(b, buf)?,
            PgBindValue::I64(n) => <i64 as Encode<Postgres>>::encode_by_ref(n, buf)?,
            PgBindValue::F64(n) => <f64 as Encode<Postgres>>::encode_by_ref(n, buf)?,
            PgBindValue::Text(s) => <String as Encode<Postgres>>::encode_by_ref(s, buf)?,
            PgBindValue::Timestamp(t) => <DateTime<Utc> as Encode<Postgres>>::encode_by_ref(t, buf)?,
        })
    }

    fn produces(&self) -> Option<PgTypeInfo> {
        Some(match self {
            PgBindValue::Bool(_) => PgTypeInfo::with_name("BOOL"),
            PgBindValue::I64(_) => PgTypeInfo::with_name("INT8"),
            PgBindValue::F64(_) => PgTypeInfo::with_name("FLOAT8"),
            PgBindValue::Text(_) => PgTypeInfo::with_name("TEXT"),
            PgBindValue::Timestamp(_) => PgTypeInfo::with_name("TIMESTAMPTZ"),
        })
    }
}

impl sqlx::Type<Postgres> for PgBindValue {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("TEXT")
    }
}
