use cine_booking::clients::{MovieClient, ScheduleClient};
use cine_booking::store::{BookingStore, BookingsDoc};
use cine_booking::{app, AppState};
use cine_store::SnapshotStore;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cine_booking=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = cine_store::app_config::Config::load("booking").expect("Failed to load config");
    let collaborators = config
        .collaborators
        .expect("booking config requires a [collaborators] section");
    let timeout = Duration::from_secs(collaborators.request_timeout_secs);

    let snapshot: SnapshotStore<BookingsDoc> = SnapshotStore::new(&config.storage.path);
    let store = BookingStore::open(snapshot)
        .await
        .expect("Failed to load booking snapshot");

    let schedule = ScheduleClient::new(&collaborators.schedule_url, timeout)
        .expect("Failed to build schedule client");
    let movies = MovieClient::new(&collaborators.movie_url, timeout)
        .expect("Failed to build movie client");

    let state = AppState {
        store: Arc::new(store),
        schedule,
        movies,
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Booking service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind");
    axum::serve(listener, app(state))
        .await
        .expect("Server error");
}
