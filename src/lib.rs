pub mod api;
pub mod config;
pub mod error;
pub mod logic;
pub mod model;
pub mod seed;
pub mod store;

// Export API types
pub use api::handlers;
pub use api::routes;

pub use error::{EngineError, EngineResult};

pub use logic::{BomEngine, Expander, Materializer, UidCounter};

// Export all model types
pub use model::*;

// Export seed module
pub use seed::*;

// Export store types
pub use store::{MemoryStore, PostgresStore, Store};

/// Build the engine for the configured backend and serve the HTTP API until shutdown.
pub async fn run_server(config: config::AppConfig) -> anyhow::Result<()> {
    use crate::config::Backend;
    use anyhow::Context;
    use std::sync::Arc;

    match config.database.backend {
        Backend::Postgres => {
            let database_url = config.database_url()?;
            let store = PostgresStore::new(&database_url, config.max_connections())
                .await
                .context("Failed to connect to PostgreSQL")?;
            store.migrate().await?;
            serve(Arc::new(store), &config).await
        }
        Backend::Memory => serve(Arc::new(MemoryStore::new()), &config).await,
    }
}

async fn serve<S: Store + 'static>(
    store: std::sync::Arc<S>,
    config: &config::AppConfig,
) -> anyhow::Result<()> {
    use std::sync::Arc;
    use tokio::net::TcpListener;

    if std::env::var("LOAD_SEED_DATA").unwrap_or_default() == "true" {
        println!("Loading seed data...");
        seed::load_seed_data(store.as_ref()).await?;
        println!("Seed data loaded successfully");
    }

    let engine = Arc::new(BomEngine::new(store, config.engine.clone()));
    let app = routes::create_router().with_state(engine);

    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address).await?;
    println!("BOM engine server running on http://{}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
