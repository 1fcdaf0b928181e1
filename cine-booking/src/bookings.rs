use axum::{
    body::Bytes,
    extract::{Path, State},
    http::HeaderMap,
    routing::{delete, get, post},
    Json, Router,
};
use cine_shared::{ApiError, ScreeningDate};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::clients::ScheduleCheck;
use crate::state::AppState;
use crate::store::UserBookingRecord;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/bookings", get(list_bookings))
        .route("/bookings/{userid}", get(get_user_bookings))
        .route("/bookings/{userid}/details", get(get_user_bookings_detailed))
        .route("/bookings/{userid}/{date}", post(add_booking))
        .route("/bookings/{userid}/{date}/{movieid}", delete(delete_booking))
}

/// Request body for adding bookings: a single movie and/or a list, in any
/// combination. Duplicates are tolerated; "neither" is rejected by the
/// handler once resolved.
#[derive(Debug, Default, Deserialize)]
pub struct AddBookingBody {
    movie: Option<String>,
    movies: Option<Vec<String>>,
}

impl AddBookingBody {
    /// Normalized request set: singular first, then the list, duplicates
    /// dropped while keeping first-occurrence order.
    fn requested(&self) -> Vec<String> {
        let mut requested: Vec<String> = Vec::new();
        let singular = self.movie.iter();
        let listed = self.movies.iter().flatten();
        for id in singular.chain(listed) {
            if !requested.contains(id) {
                requested.push(id.clone());
            }
        }
        requested
    }
}

#[derive(Debug, Serialize)]
struct AddBookingResponse {
    message: &'static str,
    userid: String,
    date: String,
    added_movies: Vec<String>,
    current_movies: Vec<String>,
}

#[derive(Debug, Serialize)]
struct DeleteBookingResponse {
    message: &'static str,
    userid: String,
    date: String,
    movie: String,
}

#[derive(Debug, Serialize)]
struct DetailedDateEntry {
    date: String,
    movies: Vec<Value>,
}

#[derive(Debug, Serialize)]
struct DetailedBookingResponse {
    userid: String,
    dates: Vec<DetailedDateEntry>,
}

fn require_admin(headers: &HeaderMap) -> Result<(), ApiError> {
    let is_admin = headers
        .get("x-admin")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("true"));
    if is_admin {
        Ok(())
    } else {
        Err(ApiError::Authorization("admin only".to_string()))
    }
}

async fn list_bookings(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<UserBookingRecord>>, ApiError> {
    require_admin(&headers)?;
    Ok(Json(state.store.all().await))
}

async fn get_user_bookings(
    State(state): State<AppState>,
    Path(userid): Path<String>,
) -> Json<UserBookingRecord> {
    let record = state
        .store
        .user(&userid)
        .await
        // consistent shape even for users that never booked
        .unwrap_or(UserBookingRecord {
            userid,
            dates: Vec::new(),
        });
    Json(record)
}

async fn get_user_bookings_detailed(
    State(state): State<AppState>,
    Path(userid): Path<String>,
) -> Json<DetailedBookingResponse> {
    let record = state.store.user(&userid).await.unwrap_or(UserBookingRecord {
        userid: userid.clone(),
        dates: Vec::new(),
    });

    // The store lock is already released; metadata lookups run outside it.
    let mut dates = Vec::with_capacity(record.dates.len());
    for entry in record.dates {
        let mut movies = Vec::with_capacity(entry.movies.len());
        for movie_id in &entry.movies {
            movies.push(state.movies.details_or_placeholder(movie_id).await);
        }
        dates.push(DetailedDateEntry {
            date: entry.date,
            movies,
        });
    }

    Json(DetailedBookingResponse {
        userid: record.userid,
        dates,
    })
}

async fn add_booking(
    State(state): State<AppState>,
    Path((userid, date)): Path<(String, String)>,
    body: Bytes,
) -> Result<Json<AddBookingResponse>, ApiError> {
    let date = ScreeningDate::parse(&date)
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    // A missing body counts as "no movies", not as a malformed request.
    let body: AddBookingBody = if body.is_empty() {
        AddBookingBody::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|_| ApiError::Validation("invalid JSON body".to_string()))?
    };
    let requested = body.requested();
    if requested.is_empty() {
        return Err(ApiError::Validation(
            "provide movie or movies in JSON body".to_string(),
        ));
    }

    // Collaborator round-trip happens before the store lock is taken.
    match state.schedule.validate(date.as_str(), &requested).await {
        ScheduleCheck::Unreachable => {
            return Err(ApiError::UpstreamUnavailable(
                "schedule service unreachable".to_string(),
            ))
        }
        ScheduleCheck::DateUnknown => {
            return Err(ApiError::Conflict("date not found in schedule".to_string()))
        }
        ScheduleCheck::Disallowed { not_allowed } => {
            return Err(ApiError::ConflictDetailed {
                message: "some movies are not scheduled for this date".to_string(),
                detail: json!({
                    "date": date.as_str(),
                    "not_allowed_movies": not_allowed,
                }),
            })
        }
        ScheduleCheck::Allowed => {}
    }

    let result = state.store.add(&userid, date.as_str(), &requested).await?;

    Ok(Json(AddBookingResponse {
        message: "booking added",
        userid,
        date: date.into_string(),
        added_movies: result.added,
        current_movies: result.current,
    }))
}

async fn delete_booking(
    State(state): State<AppState>,
    Path((userid, date, movieid)): Path<(String, String, String)>,
) -> Result<Json<DeleteBookingResponse>, ApiError> {
    use crate::store::DeleteError;

    // An impossible date can never hold a booking; reject it as malformed
    // rather than reporting "no bookings for this date".
    ScreeningDate::parse(&date).map_err(|e| ApiError::Validation(e.to_string()))?;

    state
        .store
        .delete(&userid, &date, &movieid)
        .await
        .map_err(|err| match err {
            DeleteError::UserNotFound
            | DeleteError::DateNotFound
            | DeleteError::MovieNotBooked => ApiError::NotFound(err.to_string()),
            DeleteError::Store(err) => ApiError::Anyhow(err.into()),
        })?;

    Ok(Json(DeleteBookingResponse {
        message: "booking deleted",
        userid,
        date,
        movie: movieid,
    }))
}
