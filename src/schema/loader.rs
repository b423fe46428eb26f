//! Load a schema definition from a JSON file or from Postgres `information_schema`.

use crate::error::SchemaError;
use crate::schema::{ColumnDefinition, ColumnsConfig, SchemaDefinition, TableDefinition};
use sqlx::PgPool;
use std::collections::BTreeMap;
use std::path::Path;

/// Reads a schema definition (`{ resource: { name, columns } }`) from disk.
pub async fn load_from_path(path: &Path) -> Result<SchemaDefinition, SchemaError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| SchemaError::Load(format!("{}: {}", path.display(), e)))?;
    let value: serde_json::Value =
        serde_json::from_str(&raw).map_err(|e| SchemaError::Load(format!("{}: {}", path.display(), e)))?;
    SchemaDefinition::from_json(value)
        .ok_or_else(|| SchemaError::Load(format!("{}: expected a JSON object", path.display())))
}

/// Introspects base tables of `schema`. Each table is exposed under its own name.
pub async fn load_from_pool(pool: &PgPool, schema: &str) -> Result<SchemaDefinition, SchemaError> {
    let sql = r#"
        SELECT c.table_name, c.column_name, c.data_type, c.is_nullable = 'YES' AS nullable,
               EXISTS (
                   SELECT 1
                   FROM information_schema.table_constraints tc
                   JOIN information_schema.key_column_usage k
                     ON k.constraint_name = tc.constraint_name
                    AND k.table_schema = tc.table_schema
                    AND k.table_name = tc.table_name
                   WHERE tc.constraint_type = 'PRIMARY KEY'
                     AND tc.table_schema = c.table_schema
                     AND tc.table_name = c.table_name
                     AND k.column_name = c.column_name
               ) AS is_pk
        FROM information_schema.columns c
        JOIN information_schema.tables t
          ON t.table_schema = c.table_schema AND t.table_name = c.table_name
        WHERE c.table_schema = $1 AND t.table_type = 'BASE TABLE'
        ORDER BY c.table_name, c.ordinal_position
    "#;
    tracing::debug!(sql = %sql, schema = %schema, "query");
    let rows = sqlx::query_as::<_, (String, String, String, bool, bool)>(sql)
        .bind(schema)
        .fetch_all(pool)
        .await
        .map_err(|e| SchemaError::Load(e.to_string()))?;

    let mut by_table: BTreeMap<String, Vec<ColumnDefinition>> = BTreeMap::new();
    for (table, column, data_type, nullable, is_pk) in rows {
        by_table.entry(table).or_default().push(ColumnDefinition {
            name: column,
            type_: data_type,
            nullable,
            primary_key: is_pk,
        });
    }

    let mut definition = SchemaDefinition::default();
    for (table, columns) in by_table {
        definition.insert(
            table.clone(),
            &TableDefinition {
                name: table,
                columns: ColumnsConfig::List(columns),
            },
        );
    }
    tracing::info!(schema = %schema, tables = definition.entries.len(), "schema introspected");
    Ok(definition)
}
