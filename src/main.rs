use bom_order_db::config::{AppConfig, Backend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    // Initialize logging with explicit filter to suppress sqlx debug logs
    use env_logger::Builder;
    use log::LevelFilter;

    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter_module("sqlx", LevelFilter::Warn)
        .parse_default_env()
        .init();

    println!("BOM composition engine");

    let config = AppConfig::load()?;
    println!(
        "Configuration loaded: server={}:{}, backend={:?}",
        config.server.host, config.server.port, config.database.backend
    );

    match config.database.backend {
        Backend::Postgres => println!("Connecting to PostgreSQL and running migrations..."),
        Backend::Memory => println!("Using in-memory store; data is lost on exit"),
    }

    bom_order_db::run_server(config).await
}
