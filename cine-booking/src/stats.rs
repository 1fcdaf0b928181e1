use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use cine_shared::{ApiError, ScreeningDate};
use serde::Serialize;
use serde_json::Value;

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/stats/date/{date}/movies", get(movies_for_date))
}

#[derive(Debug, Serialize)]
pub struct RankedMovie {
    pub movie: Value,
    pub count: u64,
}

#[derive(Debug, Serialize)]
struct DateStatsResponse {
    date: String,
    movies: Vec<RankedMovie>,
}

/// Descending by count, ties kept in input order. The input arrives in
/// first-encountered order, so equally-booked movies rank by who was
/// counted first; that ordering is part of the endpoint's contract.
pub fn rank(mut movies: Vec<RankedMovie>) -> Vec<RankedMovie> {
    movies.sort_by(|a, b| b.count.cmp(&a.count));
    movies
}

async fn movies_for_date(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<DateStatsResponse>, ApiError> {
    let date = ScreeningDate::parse(&date)
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let counts = state.store.counts_for_date(date.as_str()).await;

    // Enrichment runs after the store lock is released.
    let mut movies = Vec::with_capacity(counts.len());
    for (movie_id, count) in counts {
        movies.push(RankedMovie {
            movie: state.movies.details_or_placeholder(&movie_id).await,
            count,
        });
    }

    Ok(Json(DateStatsResponse {
        date: date.into_string(),
        movies: rank(movies),
    }))
}
