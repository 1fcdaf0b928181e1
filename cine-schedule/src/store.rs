use cine_store::{SnapshotStore, StoreError};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

/// Which movies are screened on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub date: String,
    pub movies: Vec<String>,
}

/// Persisted document shape: `{"schedule": [...]}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleDoc {
    pub schedule: Vec<ScheduleEntry>,
}

#[derive(Debug, thiserror::Error)]
pub enum ScheduleStoreError {
    #[error("schedule already exists for this date")]
    AlreadyScheduled,

    #[error("schedule not found for this date")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Flat list of schedule entries, at most one per date, guarded by one mutex
/// for the whole read-modify-write-persist sequence.
pub struct ScheduleStore {
    snapshot: SnapshotStore<ScheduleDoc>,
    entries: Mutex<Vec<ScheduleEntry>>,
}

impl ScheduleStore {
    pub async fn open(snapshot: SnapshotStore<ScheduleDoc>) -> Result<Self, StoreError> {
        let doc = snapshot.load_or_default().await?;
        tracing::info!(
            "loaded {} schedule entr(ies) from {}",
            doc.schedule.len(),
            snapshot.path().display()
        );
        Ok(Self {
            snapshot,
            entries: Mutex::new(doc.schedule),
        })
    }

    pub async fn all(&self) -> Vec<ScheduleEntry> {
        self.entries.lock().await.clone()
    }

    pub async fn get(&self, date: &str) -> Option<ScheduleEntry> {
        self.entries
            .lock()
            .await
            .iter()
            .find(|e| e.date == date)
            .cloned()
    }

    pub async fn create(
        &self,
        date: &str,
        movies: Vec<String>,
    ) -> Result<ScheduleEntry, ScheduleStoreError> {
        let mut entries = self.entries.lock().await;
        if entries.iter().any(|e| e.date == date) {
            return Err(ScheduleStoreError::AlreadyScheduled);
        }

        let rollback = entries.clone();
        let entry = ScheduleEntry {
            date: date.to_string(),
            movies,
        };
        entries.push(entry.clone());

        if let Err(err) = self.persist_locked(entries.as_slice()).await {
            *entries = rollback;
            return Err(err.into());
        }
        Ok(entry)
    }

    pub async fn replace(
        &self,
        date: &str,
        movies: Vec<String>,
    ) -> Result<ScheduleEntry, ScheduleStoreError> {
        let mut entries = self.entries.lock().await;
        let idx = entries
            .iter()
            .position(|e| e.date == date)
            .ok_or(ScheduleStoreError::NotFound)?;

        let rollback = entries.clone();
        entries[idx].movies = movies;
        let entry = entries[idx].clone();

        if let Err(err) = self.persist_locked(entries.as_slice()).await {
            *entries = rollback;
            return Err(err.into());
        }
        Ok(entry)
    }

    pub async fn remove(&self, date: &str) -> Result<ScheduleEntry, ScheduleStoreError> {
        let mut entries = self.entries.lock().await;
        let idx = entries
            .iter()
            .position(|e| e.date == date)
            .ok_or(ScheduleStoreError::NotFound)?;

        let rollback = entries.clone();
        let removed = entries.remove(idx);

        if let Err(err) = self.persist_locked(entries.as_slice()).await {
            *entries = rollback;
            return Err(err.into());
        }
        Ok(removed)
    }

    async fn persist_locked(&self, entries: &[ScheduleEntry]) -> Result<(), StoreError> {
        let doc = ScheduleDoc {
            schedule: entries.to_vec(),
        };
        self.snapshot.persist(&doc).await
    }
}
