//! Example server: Postgres when DATABASE_URL is set, otherwise the in-memory store over DB_PATH.

use relay_rest::{
    extract_tables, load_from_path, load_from_pool, router, AppState, MemoryStore, PgStore,
    QueryService, SchemaDefinition, Settings, Store,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("relay_rest=info".parse()?))
        .init();

    let settings = Settings::from_env();

    let (store, definition): (Arc<dyn Store>, SchemaDefinition) = match &settings.database_url {
        Some(url) => {
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(settings.max_connections)
                .connect(url)
                .await?;
            let definition = match &settings.schema_path {
                Some(path) => load_from_path(path).await?,
                None => load_from_pool(&pool, &settings.pg_schema).await?,
            };
            let store: Arc<dyn Store> = Arc::new(PgStore::new(pool, settings.pg_schema.clone()));
            (store, definition)
        }
        None => {
            let (store, document) = MemoryStore::load(&settings.db_path).await?;
            let definition = match &settings.schema_path {
                Some(path) => load_from_path(path).await?,
                None => SchemaDefinition::infer_from_document(&document),
            };
            tracing::info!(path = %settings.db_path.display(), "in-memory store");
            let store: Arc<dyn Store> = Arc::new(store);
            (store, definition)
        }
    };

    let catalog = extract_tables(&definition, &settings.naming).into_catalog();
    for resource in catalog.resources() {
        tracing::info!(resource = %resource, "serving");
    }

    let state = AppState::new(QueryService::new(Arc::new(catalog), store, settings.naming.clone()));
    let app = router(state);

    let listener = TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
