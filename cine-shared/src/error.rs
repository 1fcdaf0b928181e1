use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Error taxonomy shared by all three services.
///
/// Each variant maps to exactly one status code; the body is always a JSON
/// object with an `error` field, optionally extended with structured detail
/// (e.g. the offending movie ids on a schedule conflict).
#[derive(Debug)]
pub enum ApiError {
    Validation(String),
    Authorization(String),
    NotFound(String),
    Conflict(String),
    /// Conflict with machine-readable detail merged into the body.
    ConflictDetailed {
        message: String,
        detail: serde_json::Value,
    },
    UpstreamUnavailable(String),
    Anyhow(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            ApiError::Authorization(msg) => (StatusCode::FORBIDDEN, json!({ "error": msg })),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, json!({ "error": msg })),
            ApiError::ConflictDetailed { message, detail } => {
                let mut body = json!({ "error": message });
                if let (Some(obj), Some(extra)) = (body.as_object_mut(), detail.as_object()) {
                    for (k, v) in extra {
                        obj.insert(k.clone(), v.clone());
                    }
                }
                (StatusCode::CONFLICT, body)
            }
            ApiError::UpstreamUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, json!({ "error": msg }))
            }
            ApiError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal Server Error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Anyhow(err.into())
    }
}
