//! Bookwise Server - Library Management Backend
//!
//! A Rust REST API server for a small library: accounts, book reviews, and
//! borrow records with daily due-date email reminders.

use axum::{
    routing::{delete, get, post},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bookwise_server::{
    api,
    config::AppConfig,
    repository::Repository,
    scheduler::{ReminderJob, SystemClock},
    services::Services,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("bookwise_server={},tower_http=debug", config.logging.level).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Bookwise Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Save server address and reminder settings before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;
    let reminder_config = config.reminder.clone();

    // Create repository and services
    let repository = Repository::new(pool);
    let services = Services::new(
        repository,
        config.auth.clone(),
        config.email.clone(),
        &reminder_config,
    );

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Start the daily due-date reminder job
    if reminder_config.enabled {
        let _reminder_handle = ReminderJob::new(
            state.services.reminder.clone(),
            Arc::new(SystemClock),
            &reminder_config,
        )
        .start();
        tracing::info!(
            hour = reminder_config.hour,
            minute = reminder_config.minute,
            "Reminder job scheduled"
        );
    } else {
        tracing::info!("Reminder job disabled");
    }

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(
        server_host.parse().expect("Invalid host address"),
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let routes = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Authentication
        .route("/register", post(api::auth::register))
        .route("/login", post(api::auth::login))
        // Reviews
        .route("/reviews", get(api::reviews::list_reviews))
        .route("/reviews", post(api::reviews::create_review))
        .route("/reviews", delete(api::reviews::clear_reviews))
        .route("/reviews/:id", delete(api::reviews::delete_review))
        // Borrow records
        .route("/borrow", get(api::borrows::list_borrows))
        .route("/borrow", post(api::borrows::create_borrow))
        .route("/borrow/:id", delete(api::borrows::delete_borrow))
        .with_state(state);

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    routes
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
