use cine_store::{SnapshotStore, StoreError};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

/// All bookings of one user, keyed by date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserBookingRecord {
    pub userid: String,
    pub dates: Vec<DateBookingEntry>,
}

/// The movies one user booked for one date. `movies` has set semantics with
/// first-insertion order preserved; an emptied entry never survives the
/// mutation that emptied it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateBookingEntry {
    pub date: String,
    pub movies: Vec<String>,
}

/// Persisted document shape: `{"bookings": [...]}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingsDoc {
    pub bookings: Vec<UserBookingRecord>,
}

#[derive(Debug, PartialEq)]
pub struct AddResult {
    /// Subset of the request that was actually inserted. Empty when every
    /// requested movie was already booked, which is not an error.
    pub added: Vec<String>,
    /// Full movie list for that user/date after the insert.
    pub current: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteError {
    #[error("user has no bookings")]
    UserNotFound,

    #[error("no bookings for this date")]
    DateNotFound,

    #[error("movie not booked on this date")]
    MovieNotBooked,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The shared mutable booking collection.
///
/// All operations run under one mutex, covering the whole
/// read-modify-write-persist sequence, so no request ever observes a
/// half-applied mutation. Iteration order is insertion order at every level
/// (users, dates within a user, movies within a date); the stats ranking
/// relies on this as its tie-break.
pub struct BookingStore {
    snapshot: SnapshotStore<BookingsDoc>,
    records: Mutex<Vec<UserBookingRecord>>,
}

impl BookingStore {
    /// Load the snapshot (or start empty) and wrap it.
    pub async fn open(snapshot: SnapshotStore<BookingsDoc>) -> Result<Self, StoreError> {
        let doc = snapshot.load_or_default().await?;
        tracing::info!(
            "loaded {} booking record(s) from {}",
            doc.bookings.len(),
            snapshot.path().display()
        );
        Ok(Self {
            snapshot,
            records: Mutex::new(doc.bookings),
        })
    }

    pub async fn all(&self) -> Vec<UserBookingRecord> {
        self.records.lock().await.clone()
    }

    pub async fn user(&self, userid: &str) -> Option<UserBookingRecord> {
        self.records
            .lock()
            .await
            .iter()
            .find(|r| r.userid == userid)
            .cloned()
    }

    /// Idempotent set-union insert of `movie_ids` into the user's entry for
    /// `date`, creating user record and date entry as needed.
    ///
    /// Validation belongs to the caller; by the time this runs the date is
    /// well-formed and the schedule has approved every id. The mutation and
    /// its snapshot persist are atomic: on persist failure the in-memory
    /// state is rolled back and no partial record remains.
    pub async fn add(
        &self,
        userid: &str,
        date: &str,
        movie_ids: &[String],
    ) -> Result<AddResult, StoreError> {
        let mut records = self.records.lock().await;
        let rollback = records.clone();

        let user_idx = match records.iter().position(|r| r.userid == userid) {
            Some(idx) => idx,
            None => {
                records.push(UserBookingRecord {
                    userid: userid.to_string(),
                    dates: Vec::new(),
                });
                records.len() - 1
            }
        };
        let record = &mut records[user_idx];

        let date_idx = match record.dates.iter().position(|d| d.date == date) {
            Some(idx) => idx,
            None => {
                record.dates.push(DateBookingEntry {
                    date: date.to_string(),
                    movies: Vec::new(),
                });
                record.dates.len() - 1
            }
        };
        let entry = &mut record.dates[date_idx];

        let mut added = Vec::new();
        for movie_id in movie_ids {
            if !entry.movies.contains(movie_id) {
                entry.movies.push(movie_id.clone());
                added.push(movie_id.clone());
            }
        }
        let current = entry.movies.clone();

        if let Err(err) = self.persist_locked(records.as_slice()).await {
            *records = rollback;
            return Err(err);
        }

        tracing::info!(
            "booking added: user={} date={} added={:?}",
            userid,
            date,
            added
        );
        Ok(AddResult { added, current })
    }

    /// Remove one movie from one date for one user, pruning the date entry
    /// and then the user record if the removal emptied them.
    pub async fn delete(&self, userid: &str, date: &str, movieid: &str) -> Result<(), DeleteError> {
        let mut records = self.records.lock().await;
        let rollback = records.clone();

        let user_idx = records
            .iter()
            .position(|r| r.userid == userid)
            .ok_or(DeleteError::UserNotFound)?;
        let record = &mut records[user_idx];

        let date_idx = record
            .dates
            .iter()
            .position(|d| d.date == date)
            .ok_or(DeleteError::DateNotFound)?;
        let entry = &mut record.dates[date_idx];

        let movie_idx = entry
            .movies
            .iter()
            .position(|m| m == movieid)
            .ok_or(DeleteError::MovieNotBooked)?;
        entry.movies.remove(movie_idx);

        // Cascade on the post-removal state: date level first, then user level.
        if entry.movies.is_empty() {
            record.dates.remove(date_idx);
        }
        if record.dates.is_empty() {
            records.remove(user_idx);
        }

        if let Err(err) = self.persist_locked(records.as_slice()).await {
            *records = rollback;
            return Err(err.into());
        }

        tracing::info!(
            "booking deleted: user={} date={} movie={}",
            userid,
            date,
            movieid
        );
        Ok(())
    }

    /// Booking counts per movie for `date`, in first-encountered order over
    /// the store's insertion order. The lock is released before this returns;
    /// metadata enrichment happens outside of it.
    pub async fn counts_for_date(&self, date: &str) -> Vec<(String, u64)> {
        let records = self.records.lock().await;

        let mut counts: Vec<(String, u64)> = Vec::new();
        for record in records.iter() {
            for entry in record.dates.iter().filter(|d| d.date == date) {
                for movie_id in &entry.movies {
                    match counts.iter_mut().find(|(id, _)| id == movie_id) {
                        Some((_, n)) => *n += 1,
                        None => counts.push((movie_id.clone(), 1)),
                    }
                }
            }
        }
        counts
    }

    async fn persist_locked(&self, records: &[UserBookingRecord]) -> Result<(), StoreError> {
        let doc = BookingsDoc {
            bookings: records.to_vec(),
        };
        self.snapshot.persist(&doc).await
    }
}
