use dotenvy::dotenv;
use fitting4u::{
    api::{self, AppState},
    config::{catalog::load_catalog_if_present, database, settings::Settings},
    core::catalog::seed_catalog,
    errors::Result,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars may also be set externally
    dotenv().ok();

    // 3. Runtime settings
    let settings = Settings::from_env()
        .inspect_err(|e| error!("Critical error loading settings: {}", e))?;
    info!(bind_addr = %settings.bind_addr, "Settings loaded.");

    // 4. Database (memoized, tables created on first connect)
    let db = database::connection(&settings.database_url)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    // 5. Seed catalog from TOML, if a file is present
    let catalog = load_catalog_if_present(&settings.catalog_path)?;
    seed_catalog(&db, &catalog)
        .await
        .inspect(|summary| info!(?summary, "Catalog seeded."))
        .inspect_err(|e| error!("Failed to seed catalog: {}", e))?;

    // 6. Serve
    let listener = tokio::net::TcpListener::bind(settings.bind_addr)
        .await
        .inspect_err(|e| error!("Failed to bind {}: {}", settings.bind_addr, e))?;
    info!("Listening on {}", settings.bind_addr);

    let app = api::router(AppState::new(db, &settings.payment_key_secret));
    axum::serve(listener, app).await?;

    Ok(())
}
