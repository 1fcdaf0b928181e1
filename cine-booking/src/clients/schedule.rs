use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

/// Outcome of asking the schedule collaborator whether a set of movies is
/// screened on a date. Never an `Err`: transport failure is itself an
/// outcome, so callers pattern-match instead of string-comparing reasons.
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleCheck {
    /// Every requested movie is on the date's schedule.
    Allowed,
    /// The collaborator has no schedule for this date.
    DateUnknown,
    /// The date exists but some requested movies are not on it.
    Disallowed { not_allowed: Vec<String> },
    /// The collaborator could not be reached within the timeout.
    Unreachable,
}

#[derive(Debug, Deserialize)]
struct ScheduleDay {
    #[serde(default)]
    movies: Vec<String>,
}

/// Read-only client for the schedule collaborator.
#[derive(Clone)]
pub struct ScheduleClient {
    http: reqwest::Client,
    base_url: String,
}

impl ScheduleClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: reqwest::Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// `GET {base}/schedule/{date}` and compare the allowed list against the
    /// request. `movie_ids` is assumed deduplicated; `not_allowed` keeps the
    /// request order.
    pub async fn validate(&self, date: &str, movie_ids: &[String]) -> ScheduleCheck {
        let url = format!("{}/schedule/{}", self.base_url, date);
        let response = match self.http.get(&url).send().await {
            Ok(r) => r,
            Err(err) => {
                tracing::warn!("schedule service unreachable: {}", err);
                return ScheduleCheck::Unreachable;
            }
        };

        if response.status() != StatusCode::OK {
            return ScheduleCheck::DateUnknown;
        }

        let day = match response.json::<ScheduleDay>().await {
            Ok(day) => day,
            Err(err) => {
                tracing::warn!("schedule service returned an unreadable body: {}", err);
                return ScheduleCheck::Unreachable;
            }
        };

        let not_allowed: Vec<String> = movie_ids
            .iter()
            .filter(|id| !day.movies.contains(id))
            .cloned()
            .collect();

        if not_allowed.is_empty() {
            ScheduleCheck::Allowed
        } else {
            ScheduleCheck::Disallowed { not_allowed }
        }
    }
}
