//! Turns a raw schema definition into table descriptors.
//!
//! Two phases: each table's columns and primary key are extracted on their own, then
//! foreign-key references and the belongs_to/has_many closure are computed across the
//! accepted tables in one pass.

use crate::config::{strip_foreign_key_suffix, NamingConvention};
use crate::error::SchemaError;
use crate::schema::{
    Catalog, ColumnDescriptor, ColumnReference, ColumnType, RelationDescriptor, RelationKind,
    SchemaDefinition, TableDefinition, TableDescriptor,
};

/// Result of schema extraction: accepted tables plus the tables that were rejected.
#[derive(Debug, Default)]
pub struct Extraction {
    pub tables: Vec<TableDescriptor>,
    pub rejected: Vec<SchemaError>,
}

impl Extraction {
    pub fn into_catalog(self) -> Catalog {
        Catalog::new(self.tables)
    }
}

pub fn extract_tables(definition: &SchemaDefinition, naming: &NamingConvention) -> Extraction {
    let mut out = Extraction::default();
    for (resource, table) in definition.tables() {
        match extract_table(&resource, &table) {
            Ok(t) => out.tables.push(t),
            Err(e) => {
                let table = e.table().unwrap_or(resource.as_str());
                tracing::error!(resource = %resource, table = %table, error = %e, "table rejected");
                out.rejected.push(e);
            }
        }
    }
    link_relations(&mut out.tables, naming);
    tracing::info!(
        tables = out.tables.len(),
        rejected = out.rejected.len(),
        "schema extracted"
    );
    out
}

/// Phase one: columns and primary key of a single table. No cross-table lookups.
pub fn extract_table(resource: &str, table: &TableDefinition) -> Result<TableDescriptor, SchemaError> {
    let mut columns: Vec<ColumnDescriptor> = Vec::new();
    for c in table.column_list() {
        if columns.iter().any(|existing| existing.name == c.name) {
            tracing::warn!(table = %table.name, column = %c.name, "duplicate column ignored");
            continue;
        }
        columns.push(ColumnDescriptor {
            column_type: ColumnType::from_declared(&c.type_),
            nullable: c.nullable,
            is_primary_key: c.primary_key,
            reference: None,
            name: c.name,
        });
    }

    let flagged: Vec<String> = columns
        .iter()
        .filter(|c| c.is_primary_key)
        .map(|c| c.name.clone())
        .collect();
    let primary_key = match flagged.as_slice() {
        [single] => single.clone(),
        [] => {
            let Some(id) = columns.iter_mut().find(|c| c.name == "id") else {
                return Err(SchemaError::MissingPrimaryKey {
                    table: table.name.clone(),
                });
            };
            tracing::warn!(table = %table.name, "no primary key flagged; adopting 'id'");
            id.is_primary_key = true;
            id.name.clone()
        }
        _ => {
            return Err(SchemaError::CompositePrimaryKey {
                table: table.name.clone(),
                columns: flagged,
            })
        }
    };

    Ok(TableDescriptor {
        name: table.name.clone(),
        resource: resource.to_string(),
        columns,
        primary_key,
        relations: Vec::new(),
    })
}

/// Phase two: infer references for every table against the full table set, then add
/// the converse has_many for each belongs_to.
pub fn link_relations(tables: &mut [TableDescriptor], naming: &NamingConvention) {
    let mut inferred: Vec<(usize, usize, ColumnReference)> = Vec::new();
    for (ti, table) in tables.iter().enumerate() {
        for (ci, column) in table.columns.iter().enumerate() {
            if column.is_primary_key {
                continue;
            }
            if let Some(reference) = infer_reference(&column.name, tables, naming) {
                inferred.push((ti, ci, reference));
            }
        }
    }

    for (ti, ci, reference) in inferred {
        let fk = tables[ti].columns[ci].name.clone();
        let source = tables[ti].resource.clone();
        let name = strip_foreign_key_suffix(&fk).unwrap_or_else(|| fk.clone());

        tables[ti].relations.push(RelationDescriptor {
            kind: RelationKind::BelongsTo,
            name,
            related_table: reference.table.clone(),
            our_key: fk.clone(),
            their_key: reference.column.clone(),
        });
        if let Some(target) = tables.iter_mut().find(|t| t.resource == reference.table) {
            target.relations.push(RelationDescriptor {
                kind: RelationKind::HasMany,
                name: source.clone(),
                related_table: source,
                our_key: target.primary_key.clone(),
                their_key: fk,
            });
        }
        tracing::debug!(table = %tables[ti].resource, column = %tables[ti].columns[ci].name, target = %reference.table, "reference inferred");
        tables[ti].columns[ci].reference = Some(reference);
    }
}

/// Matches a foreign-key-shaped column name against the table set: the stripped base
/// name, then its singular, then its plural, each compared case-insensitively with table and resource
/// names. First match wins.
pub fn infer_reference(
    column: &str,
    tables: &[TableDescriptor],
    naming: &NamingConvention,
) -> Option<ColumnReference> {
    let base = strip_foreign_key_suffix(column)?;
    let candidates = [base.clone(), naming.singularize(&base), naming.pluralize(&base)];
    candidates.iter().find_map(|candidate| {
        tables
            .iter()
            .find(|t| t.name.to_lowercase() == *candidate || t.resource.to_lowercase() == *candidate)
            .map(|t| ColumnReference {
                table: t.resource.clone(),
                column: t.primary_key.clone(),
            })
    })
}
