//! Store collaborator: executes retrieval, count and embed fetches.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::error::StoreError;
use crate::query::{CountPlan, Predicate, RetrievalPlan};
use crate::schema::TableDescriptor;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// One result row: column name -> JSON value.
pub type Row = Map<String, Value>;

#[async_trait]
pub trait Store: Send + Sync {
    /// Rows matching the plan's predicates, in the plan's order, within its window.
    async fn fetch(&self, table: &TableDescriptor, plan: &RetrievalPlan) -> Result<Vec<Row>, StoreError>;

    /// Number of rows matching the plan's predicates.
    async fn count(&self, table: &TableDescriptor, plan: &CountPlan) -> Result<u64, StoreError>;

    /// All rows matching `predicates` (all rows when empty), in natural order.
    async fn fetch_related(&self, table: &TableDescriptor, predicates: &[Predicate]) -> Result<Vec<Row>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
