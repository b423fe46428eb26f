//! QueryService: runs the parse -> plan -> fetch/count -> embed pipeline per request.

use crate::config::NamingConvention;
use crate::error::AppError;
use crate::query::{
    parse, plan, FilterValue, Operator, PaginationMode, RawParams, RetrievalPlan, Predicate, Window,
};
use crate::schema::{Catalog, ColumnType, TableDescriptor};
use crate::service::embed;
use crate::store::{Row, Store};
use std::sync::Arc;

/// Rows of one list request plus the filter-only total.
#[derive(Clone, Debug)]
pub struct ListResult {
    pub rows: Vec<Row>,
    pub total: u64,
    pub window: Window,
    pub mode: PaginationMode,
}

/// Shared across requests; holds only read-only state.
#[derive(Clone)]
pub struct QueryService {
    catalog: Arc<Catalog>,
    store: Arc<dyn Store>,
    naming: NamingConvention,
}

impl QueryService {
    pub fn new(catalog: Arc<Catalog>, store: Arc<dyn Store>, naming: NamingConvention) -> Self {
        QueryService {
            catalog,
            store,
            naming,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    fn table(&self, resource: &str) -> Result<&TableDescriptor, AppError> {
        self.catalog
            .table(resource)
            .ok_or_else(|| AppError::NotFound(resource.to_string()))
    }

    /// One retrieval, one count, then one fetch per resolved embed key, in that order.
    pub async fn list(&self, resource: &str, params: &RawParams) -> Result<ListResult, AppError> {
        let table = self.table(resource)?;
        let intent = parse(params);
        let plan = plan(&intent, table);
        tracing::debug!(
            resource = %resource,
            predicates = plan.retrieval.predicates.len(),
            sort = plan.retrieval.sort.len(),
            window = ?plan.retrieval.window,
            "list"
        );

        let rows = self.store.fetch(table, &plan.retrieval).await?;
        let total = self.store.count(table, &plan.count).await?;
        let rows = embed::resolve(
            self.store.as_ref(),
            &self.catalog,
            table,
            rows,
            &intent.embed,
            &self.naming,
        )
        .await?;
        Ok(ListResult {
            rows,
            total,
            window: plan.retrieval.window,
            mode: plan.mode,
        })
    }

    /// Single row by primary key; only `_embed` is honored from `params`.
    pub async fn read(&self, resource: &str, id: &str, params: &RawParams) -> Result<Row, AppError> {
        let table = self.table(resource)?;
        let intent = parse(params);
        let column_type = table
            .primary_key_column()
            .map_or(ColumnType::Text, |c| c.column_type);
        let retrieval = RetrievalPlan {
            predicates: vec![Predicate {
                column: table.primary_key.clone(),
                op: Operator::Eq,
                values: vec![FilterValue::coerce(column_type, id)],
            }],
            sort: Vec::new(),
            window: Window { start: 0, end: Some(1) },
        };
        let rows = self.store.fetch(table, &retrieval).await?;
        if rows.is_empty() {
            return Err(AppError::NotFound(format!("{}/{}", resource, id)));
        }
        let rows = embed::resolve(
            self.store.as_ref(),
            &self.catalog,
            table,
            rows,
            &intent.embed,
            &self.naming,
        )
        .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("{}/{}", resource, id)))
    }
}
