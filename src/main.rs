use std::sync::Arc;

use kotalapor_core::core::config::Config;
use kotalapor_core::core::database;
use kotalapor_core::features::staging::repositories::PgStagedFileRepository;
use kotalapor_core::features::staging::{StagingBuckets, StagingService, StagingSweeper};
use kotalapor_core::modules::storage::MinioStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

async fn async_main() -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;
    tracing::info!("Configuration loaded successfully");

    // Create database connection pool
    let pool = database::create_pool(&config.database).await?;
    tracing::info!("Database connection pool created");

    // Run migrations automatically
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    tracing::info!("Database migrations completed successfully");

    // Initialize MinIO-backed object store
    let store = Arc::new(
        MinioStore::new(&config.storage)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to initialize MinIO store: {}", e))?,
    );
    tracing::info!("Object store initialized");

    // Initialize staging service
    let staged_files = Arc::new(PgStagedFileRepository::new(pool.clone()));
    let staging = Arc::new(StagingService::new(
        staged_files,
        store,
        StagingBuckets::from_config(&config.storage),
    ));
    tracing::info!("Staging service initialized");

    // This binary is the platform's maintenance worker: it owns the staged
    // upload expiry sweep. The HTTP deployable consumes the same crate.
    let sweeper = StagingSweeper::new(staging, config.staging.sweep_interval_secs);
    sweeper.run().await;

    Ok(())
}
