use cine_store::SnapshotStore;
use cine_user::store::{UserStore, UsersDoc};
use cine_user::{app, AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cine_user=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = cine_store::app_config::Config::load("user").expect("Failed to load config");

    let snapshot: SnapshotStore<UsersDoc> = SnapshotStore::new(&config.storage.path);
    let store = UserStore::open(snapshot)
        .await
        .expect("Failed to load user snapshot");

    let state = AppState {
        store: Arc::new(store),
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("User service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind");
    axum::serve(listener, app(state))
        .await
        .expect("Server error");
}
