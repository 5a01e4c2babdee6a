use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use cinema_booking_server::config::Config;
use cinema_booking_server::routes::create_routes;
use cinema_booking_server::services::maintenance::spawn_sweeper;
use cinema_booking_server::state::AppState;
use cinema_booking_server::store::{BookingStore, MemoryBookingStore, PgBookingStore};
use cinema_booking_server::upstream::HttpCinemaBackend;

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cinema_booking_server=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env();

    let store: Arc<dyn BookingStore> = match &config.database_url {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await
                .expect("Failed to connect to database");

            tracing::info!("Successfully connected to database");

            sqlx::migrate!()
                .run(&pool)
                .await
                .expect("Failed to run migrations");

            tracing::info!("Migrations run successfully");
            Arc::new(PgBookingStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, seat holds and confirmations are kept in memory");
            Arc::new(MemoryBookingStore::new())
        }
    };

    let backend = HttpCinemaBackend::new(&config.cinema_api_url, config.upstream_timeout)
        .expect("Failed to build cinema backend client");
    tracing::info!(url = %config.cinema_api_url, "Using cinema backend");

    let port = config.port;
    let state = AppState::new(config, Arc::new(backend), store);
    spawn_sweeper(state.clone(), SWEEP_INTERVAL);

    let app = create_routes(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Server running at http://{}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server failed");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down");
}
