use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// Whole-document JSON persistence.
///
/// Every service keeps its complete state as one JSON document: loaded once
/// on boot, rewritten in full after every mutation. There is no incremental
/// writing; a mutation is only acknowledged once the new snapshot is on disk.
pub struct SnapshotStore<T> {
    path: PathBuf,
    _doc: PhantomData<T>,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("snapshot io failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot (de)serialization failed: {0}")]
    Serde(#[from] serde_json::Error),
}

impl<T> SnapshotStore<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _doc: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the document, or start from `T::default()` when the file does
    /// not exist yet. Any other io failure or malformed JSON is an error:
    /// silently discarding an unreadable snapshot would lose bookings.
    pub async fn load_or_default(&self) -> Result<T, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::info!("no snapshot at {}, starting empty", self.path.display());
                Ok(T::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Rewrite the full document. Creates parent directories on first use.
    pub async fn persist(&self, doc: &T) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let bytes = serde_json::to_vec_pretty(doc)?;
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }
}
