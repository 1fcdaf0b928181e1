use cine_schedule::store::{ScheduleDoc, ScheduleStore};
use cine_schedule::{app, AppState};
use cine_store::SnapshotStore;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cine_schedule=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = cine_store::app_config::Config::load("schedule").expect("Failed to load config");

    let snapshot: SnapshotStore<ScheduleDoc> = SnapshotStore::new(&config.storage.path);
    let store = ScheduleStore::open(snapshot)
        .await
        .expect("Failed to load schedule snapshot");

    let state = AppState {
        store: Arc::new(store),
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Schedule service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind");
    axum::serve(listener, app(state))
        .await
        .expect("Server error");
}
