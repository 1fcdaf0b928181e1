use chrono::Utc;
use cine_store::{SnapshotStore, StoreError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::Mutex;

/// One user record. Beyond `id`, `name` and `last_active` the shape is
/// caller-defined; unknown fields round-trip through `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_active: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Persisted document shape: `{"users": [...]}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsersDoc {
    pub users: Vec<UserRecord>,
}

#[derive(Debug, thiserror::Error)]
pub enum UserStoreError {
    #[error("user ID already exists")]
    AlreadyExists,

    #[error("user ID not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Flat list of user records, at most one per id, guarded by one mutex for
/// the whole read-modify-write-persist sequence.
pub struct UserStore {
    snapshot: SnapshotStore<UsersDoc>,
    users: Mutex<Vec<UserRecord>>,
}

fn now_iso() -> String {
    Utc::now().to_rfc3339()
}

impl UserStore {
    pub async fn open(snapshot: SnapshotStore<UsersDoc>) -> Result<Self, StoreError> {
        let doc = snapshot.load_or_default().await?;
        tracing::info!(
            "loaded {} user record(s) from {}",
            doc.users.len(),
            snapshot.path().display()
        );
        Ok(Self {
            snapshot,
            users: Mutex::new(doc.users),
        })
    }

    pub async fn all(&self) -> Vec<UserRecord> {
        self.users.lock().await.clone()
    }

    pub async fn get(&self, id: &str) -> Option<UserRecord> {
        self.users.lock().await.iter().find(|u| u.id == id).cloned()
    }

    /// Insert a new record with `last_active` stamped to now.
    pub async fn add(&self, mut record: UserRecord) -> Result<UserRecord, UserStoreError> {
        let mut users = self.users.lock().await;
        if users.iter().any(|u| u.id == record.id) {
            return Err(UserStoreError::AlreadyExists);
        }

        let rollback = users.clone();
        record.last_active = Some(now_iso());
        users.push(record.clone());

        if let Err(err) = self.persist_locked(users.as_slice()).await {
            *users = rollback;
            return Err(err.into());
        }
        Ok(record)
    }

    /// Rename a user, touching `last_active`.
    pub async fn rename(&self, id: &str, name: &str) -> Result<UserRecord, UserStoreError> {
        let mut users = self.users.lock().await;
        let idx = users
            .iter()
            .position(|u| u.id == id)
            .ok_or(UserStoreError::NotFound)?;

        let rollback = users.clone();
        users[idx].name = Some(name.to_string());
        users[idx].last_active = Some(now_iso());
        let updated = users[idx].clone();

        if let Err(err) = self.persist_locked(users.as_slice()).await {
            *users = rollback;
            return Err(err.into());
        }
        Ok(updated)
    }

    pub async fn remove(&self, id: &str) -> Result<UserRecord, UserStoreError> {
        let mut users = self.users.lock().await;
        let idx = users
            .iter()
            .position(|u| u.id == id)
            .ok_or(UserStoreError::NotFound)?;

        let rollback = users.clone();
        let removed = users.remove(idx);

        if let Err(err) = self.persist_locked(users.as_slice()).await {
            *users = rollback;
            return Err(err.into());
        }
        Ok(removed)
    }

    async fn persist_locked(&self, users: &[UserRecord]) -> Result<(), StoreError> {
        let doc = UsersDoc {
            users: users.to_vec(),
        };
        self.snapshot.persist(&doc).await
    }
}
