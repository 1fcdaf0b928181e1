use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use cine_shared::{ApiError, ScreeningDate};
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use crate::store::{ScheduleEntry, ScheduleStoreError};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/schedule", get(list_schedule))
        .route(
            "/schedule/{date}",
            get(get_schedule)
                .post(create_schedule)
                .put(update_schedule)
                .delete(delete_schedule),
        )
}

#[derive(Debug, Deserialize)]
struct ScheduleBody {
    movies: Vec<String>,
}

#[derive(Debug, Serialize)]
struct DeleteScheduleResponse {
    message: String,
    deleted_entry: ScheduleEntry,
}

fn parse_date(raw: &str) -> Result<ScreeningDate, ApiError> {
    ScreeningDate::parse(raw).map_err(|e| ApiError::Validation(e.to_string()))
}

fn parse_body(body: &Bytes) -> Result<ScheduleBody, ApiError> {
    serde_json::from_slice(body)
        .map_err(|_| ApiError::Validation("provide a movies list in JSON body".to_string()))
}

/// Movie ids are opaque strings owned by the movie service, but an empty or
/// blank id can never resolve, so those are rejected up front.
fn validate_movies(movies: &[String]) -> Result<(), ApiError> {
    if movies.is_empty() {
        return Err(ApiError::Validation(
            "provide a non-empty movies list".to_string(),
        ));
    }
    if movies.iter().any(|m| m.trim().is_empty()) {
        return Err(ApiError::Validation(
            "all movie entries must be non-empty strings".to_string(),
        ));
    }
    Ok(())
}

fn map_store_error(err: ScheduleStoreError) -> ApiError {
    match err {
        ScheduleStoreError::AlreadyScheduled => ApiError::Conflict(err.to_string()),
        ScheduleStoreError::NotFound => ApiError::NotFound(err.to_string()),
        ScheduleStoreError::Store(err) => ApiError::Anyhow(err.into()),
    }
}

async fn list_schedule(State(state): State<AppState>) -> Json<Vec<ScheduleEntry>> {
    Json(state.store.all().await)
}

async fn get_schedule(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<ScheduleEntry>, ApiError> {
    let date = parse_date(&date)?;
    state
        .store
        .get(date.as_str())
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("schedule not found for date: {}", date)))
}

async fn create_schedule(
    State(state): State<AppState>,
    Path(date): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<ScheduleEntry>), ApiError> {
    let date = parse_date(&date)?;
    let body = parse_body(&body)?;
    validate_movies(&body.movies)?;

    let entry = state
        .store
        .create(date.as_str(), body.movies)
        .await
        .map_err(map_store_error)?;

    tracing::info!("schedule created for {}", date);
    Ok((StatusCode::CREATED, Json(entry)))
}

async fn update_schedule(
    State(state): State<AppState>,
    Path(date): Path<String>,
    body: Bytes,
) -> Result<Json<ScheduleEntry>, ApiError> {
    let date = parse_date(&date)?;
    let body = parse_body(&body)?;
    validate_movies(&body.movies)?;

    let entry = state
        .store
        .replace(date.as_str(), body.movies)
        .await
        .map_err(map_store_error)?;

    tracing::info!("schedule replaced for {}", date);
    Ok(Json(entry))
}

async fn delete_schedule(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<DeleteScheduleResponse>, ApiError> {
    let date = parse_date(&date)?;

    let deleted = state
        .store
        .remove(date.as_str())
        .await
        .map_err(map_store_error)?;

    tracing::info!("schedule deleted for {}", date);
    Ok(Json(DeleteScheduleResponse {
        message: format!("schedule deleted for date: {}", date),
        deleted_entry: deleted,
    }))
}
