//! Relay REST: JSON-Server compatible read surface over a relational schema.

pub mod config;
pub mod error;
pub mod query;
pub mod response;
pub mod routes;
pub mod schema;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;
pub mod handlers;

pub use config::{NamingConvention, Settings};
pub use error::{AppError, SchemaError, StoreError};
pub use query::{parse, plan, ParsedQueryIntent, QueryPlan, RawParams};
pub use response::ListResponse;
pub use routes::{common_routes, resource_routes, router};
pub use schema::{extract_tables, load_from_path, load_from_pool, Catalog, SchemaDefinition, TableDescriptor};
pub use service::{ListResult, QueryService};
pub use state::AppState;
pub use store::{MemoryStore, PgStore, Row, Store};
