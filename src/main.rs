use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use std::str::FromStr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vidtube::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    repository::{PostgresRepository, RepositoryState},
    storage::{S3StorageClient, StorageService, StorageState},
};

/// main
///
/// Startup sequence: configuration, logging, database (with migrations), media
/// storage, then the HTTP server. Any failure before the server is listening aborts
/// the process.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail-fast on missing production secrets)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging: RUST_LOG wins over the defaults.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "vidtube=debug,tower_http=info,axum=trace".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            // JSON lines for log aggregation.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 3. Database: every pooled connection gets a server-side statement timeout.
    let statement_timeout_ms = config.db_statement_timeout.as_millis().to_string();
    let connect_options = PgConnectOptions::from_str(&config.db_url)
        .expect("FATAL: DATABASE_URL is not a valid Postgres connection string.")
        .options([("statement_timeout", statement_timeout_ms.as_str())]);

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect_with(connect_options)
        .await
        .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("FATAL: Failed to apply database migrations.");

    let repo = Arc::new(PostgresRepository::new(pool)) as RepositoryState;

    // 4. Media storage (S3/MinIO) with bounded, retried uploads.
    let s3_client = S3StorageClient::new(
        &config.s3_endpoint,
        &config.s3_region,
        &config.s3_key,
        &config.s3_secret,
        &config.s3_bucket,
        &config.media_public_url,
        config.upload_retry_policy(),
    )
    .await;

    // LOCAL-ONLY: provision the MinIO bucket.
    if config.env == Env::Local {
        s3_client.ensure_bucket_exists().await;
    }

    let storage = Arc::new(s3_client) as StorageState;

    // 5. Server
    let bind_addr = config.bind_addr.clone();
    let app = create_router(AppState {
        repo,
        storage,
        config,
    });

    let listener = TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("FATAL: Failed to bind {}: {}", bind_addr, e));

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at /swagger-ui");

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
    }
}
