use axum::{
    body::Bytes,
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use cine_shared::ApiError;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::state::AppState;
use crate::store::{UserRecord, UserStoreError};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route(
            "/users/{userid}",
            get(get_user).post(add_user).delete(delete_user),
        )
        .route("/users/{userid}/{name}", put(rename_user))
}

#[derive(Debug, Serialize)]
struct AddUserResponse {
    message: &'static str,
    user: UserRecord,
}

fn map_store_error(err: UserStoreError) -> ApiError {
    match err {
        UserStoreError::AlreadyExists => ApiError::Conflict(err.to_string()),
        UserStoreError::NotFound => ApiError::NotFound(err.to_string()),
        UserStoreError::Store(err) => ApiError::Anyhow(err.into()),
    }
}

async fn list_users(State(state): State<AppState>) -> Json<Vec<UserRecord>> {
    Json(state.store.all().await)
}

async fn get_user(
    State(state): State<AppState>,
    Path(userid): Path<String>,
) -> Result<Json<UserRecord>, ApiError> {
    state
        .store
        .get(&userid)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("user ID not found".to_string()))
}

/// The id comes from the URL; the optional body supplies the rest of the
/// record (a `name` and any caller-defined fields).
async fn add_user(
    State(state): State<AppState>,
    Path(userid): Path<String>,
    body: Bytes,
) -> Result<Json<AddUserResponse>, ApiError> {
    // A missing or non-object body just means an id-only record.
    let mut fields: Map<String, Value> = if body.is_empty() {
        Map::new()
    } else {
        serde_json::from_slice::<Value>(&body)
            .map_err(|_| ApiError::Validation("invalid JSON body".to_string()))?
            .as_object()
            .cloned()
            .unwrap_or_default()
    };
    // the URL wins over anything the body claims
    fields.remove("id");
    fields.remove("last_active");
    let name = fields
        .remove("name")
        .and_then(|v| v.as_str().map(str::to_string));

    let record = UserRecord {
        id: userid,
        name,
        last_active: None,
        extra: fields,
    };

    let added = state.store.add(record).await.map_err(map_store_error)?;
    tracing::info!("user added: {}", added.id);

    Ok(Json(AddUserResponse {
        message: "user added",
        user: added,
    }))
}

async fn rename_user(
    State(state): State<AppState>,
    Path((userid, name)): Path<(String, String)>,
) -> Result<Json<UserRecord>, ApiError> {
    let updated = state
        .store
        .rename(&userid, &name)
        .await
        .map_err(map_store_error)?;
    Ok(Json(updated))
}

async fn delete_user(
    State(state): State<AppState>,
    Path(userid): Path<String>,
) -> Result<Json<UserRecord>, ApiError> {
    let removed = state.store.remove(&userid).await.map_err(map_store_error)?;
    tracing::info!("user deleted: {}", removed.id);
    Ok(Json(removed))
}
