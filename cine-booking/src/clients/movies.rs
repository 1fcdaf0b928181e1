use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;

/// Best-effort client for the movie metadata collaborator.
///
/// The catalog schema is owned by the collaborator, so records are carried
/// as raw JSON. A miss of any kind (no such id, non-200, timeout, transport
/// failure) degrades to a placeholder instead of failing the caller.
#[derive(Clone)]
pub struct MovieClient {
    http: reqwest::Client,
    base_url: String,
}

impl MovieClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: reqwest::Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// `GET {base}/movies/{id}`. Single attempt, no retries.
    pub async fn lookup(&self, movie_id: &str) -> Option<Value> {
        let url = format!("{}/movies/{}", self.base_url, movie_id);
        let response = match self.http.get(&url).send().await {
            Ok(r) => r,
            Err(err) => {
                tracing::warn!("movie service unreachable: {}", err);
                return None;
            }
        };
        if response.status() != StatusCode::OK {
            return None;
        }
        response.json::<Value>().await.ok()
    }

    /// Resolved record, or `{"id": ..., "error": "movie not found"}`.
    pub async fn details_or_placeholder(&self, movie_id: &str) -> Value {
        match self.lookup(movie_id).await {
            Some(movie) => movie,
            None => json!({ "id": movie_id, "error": "movie not found" }),
        }
    }
}
