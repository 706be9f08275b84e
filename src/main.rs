use std::sync::Arc;
use threadboard::config::Config;
use threadboard::database::{create_pool, run_migrations};
use threadboard::repositories::{
    CategoryRegistry, PgCommentRepository, PgThreadRepository, PgUserRepository,
};
use threadboard::{AppState, create_app};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "threadboard=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded successfully");

    // Create database connection pool
    let db = create_pool(&config.database_url).await?;
    tracing::info!("Database connection pool created");

    // Run migrations
    run_migrations(&db).await?;
    tracing::info!("Database migrations completed");

    // One thread table per category
    if config.categories.is_empty() {
        return Err("no valid thread categories configured".into());
    }
    let mut registry = CategoryRegistry::new();
    for category in &config.categories {
        let repository =
            PgThreadRepository::new(db.clone(), category, config.request_timeout);
        repository.ensure_table().await?;
        registry.register(Arc::new(repository));
    }
    tracing::info!("Thread categories ready: {:?}", registry.categories());

    // Create application state
    let state = AppState {
        users: Arc::new(PgUserRepository::new(db.clone(), config.request_timeout)),
        comments: Arc::new(PgCommentRepository::new(db, config.request_timeout)),
        threads: Arc::new(registry),
        config: Arc::new(config.clone()),
    };

    // Create application
    let app = create_app(state);

    // Create listener
    let listener = TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;
    tracing::info!("Server listening on {}:{}", config.host, config.port);

    // Start server
    axum::serve(listener, app).await?;

    Ok(())
}
