pub mod app_config;
pub mod snapshot;

pub use snapshot::{SnapshotStore, StoreError};
