//! Resolved, immutable table metadata shared by every request.

use std::collections::HashMap;

/// Declared type tag of a column, normalized from the raw type name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Number,
    Boolean,
    Text,
    Timestamp,
    Json,
}

impl ColumnType {
    pub fn from_declared(declared: &str) -> Self {
        let lower = declared.trim().to_lowercase();
        let base = lower.split('(').next().unwrap_or("").trim();
        match base {
            "int" | "tinyint" | "int2" | "int4" | "int8" | "integer" | "smallint" | "bigint" | "serial" | "bigserial"
            | "smallserial" => ColumnType::Integer,
            "number" | "numeric" | "decimal" | "real" | "float" | "float4" | "float8" | "double"
            | "double precision" => ColumnType::Number,
            "bool" | "boolean" => ColumnType::Boolean,
            "json" | "jsonb" | "array" | "object" => ColumnType::Json,
            "date" | "datetime" => ColumnType::Timestamp,
            b if b.starts_with("timestamp") => ColumnType::Timestamp,
            _ => ColumnType::Text,
        }
    }
}

/// Inferred reference from a foreign-key-shaped column to another table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnReference {
    /// Resource name of the referenced table.
    pub table: String,
    /// Primary key of the referenced table.
    pub column: String,
}

#[derive(Clone, Debug)]
pub struct ColumnDescriptor {
    pub name: String,
    pub column_type: ColumnType,
    pub nullable: bool,
    pub is_primary_key: bool,
    pub reference: Option<ColumnReference>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelationKind {
    /// We hold a foreign key to them.
    BelongsTo,
    /// They hold a foreign key to us.
    HasMany,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelationDescriptor {
    pub kind: RelationKind,
    /// Canonical embed name: the stripped foreign-key column for `BelongsTo`, the
    /// related resource for `HasMany`.
    pub name: String,
    /// Resource name of the related table.
    pub related_table: String,
    /// Our column used in the join (our FK for belongs_to; our PK for has_many).
    pub our_key: String,
    /// Their column used in the join (their PK for belongs_to; their FK for has_many).
    pub their_key: String,
}

impl RelationDescriptor {
    /// The foreign-key column, whichever side it lives on.
    pub fn foreign_key(&self) -> &str {
        match self.kind {
            RelationKind::BelongsTo => &self.our_key,
            RelationKind::HasMany => &self.their_key,
        }
    }

    /// The key column of the related table used in the join.
    pub fn related_key(&self) -> &str {
        &self.their_key
    }
}

#[derive(Clone, Debug)]
pub struct TableDescriptor {
    /// Logical (storage) table name.
    pub name: String,
    /// Externally exposed resource name.
    pub resource: String,
    pub columns: Vec<ColumnDescriptor>,
    pub primary_key: String,
    pub relations: Vec<RelationDescriptor>,
}

impl TableDescriptor {
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn primary_key_column(&self) -> Option<&ColumnDescriptor> {
        self.column(&self.primary_key)
    }
}

/// All exposed tables, looked up by resource name.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    tables: Vec<TableDescriptor>,
    by_resource: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(tables: Vec<TableDescriptor>) -> Self {
        let by_resource = tables
            .iter()
            .enumerate()
            .map(|(i, t)| (t.resource.clone(), i))
            .collect();
        Catalog { tables, by_resource }
    }

    pub fn table(&self, resource: &str) -> Option<&TableDescriptor> {
        self.by_resource.get(resource).map(|&i| &self.tables[i])
    }

    pub fn tables(&self) -> &[TableDescriptor] {
        &self.tables
    }

    pub fn resources(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|t| t.resource.as_str())
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
