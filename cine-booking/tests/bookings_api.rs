use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use cine_booking::clients::{MovieClient, ScheduleClient};
use cine_booking::store::{BookingStore, BookingsDoc};
use cine_booking::{app, AppState};
use cine_store::SnapshotStore;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TIMEOUT: Duration = Duration::from_secs(1);

async fn test_app(schedule_url: &str, movie_url: &str) -> (axum::Router, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let snapshot: SnapshotStore<BookingsDoc> = SnapshotStore::new(dir.path().join("bookings.json"));
    let store = BookingStore::open(snapshot).await.unwrap();

    let state = AppState {
        store: Arc::new(store),
        schedule: ScheduleClient::new(schedule_url, TIMEOUT).unwrap(),
        movies: MovieClient::new(movie_url, TIMEOUT).unwrap(),
    };
    (app(state), dir)
}

/// Schedule collaborator that allows `movies` on `date`.
async fn schedule_allowing(date: &str, movies: &[&str]) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/schedule/{}", date)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "date": date,
            "movies": movies,
        })))
        .mount(&server)
        .await;
    server
}

/// Movie collaborator that knows no movies at all.
async fn empty_movie_catalog() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    server
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_admin(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("X-Admin", "true")
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn full_listing_requires_the_admin_header() {
    let schedule = schedule_allowing("20240101", &["m1"]).await;
    let movies = empty_movie_catalog().await;
    let (app, _dir) = test_app(&schedule.uri(), &movies.uri()).await;

    let (status, body) = send(&app, get("/bookings")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "admin only");

    let (status, body) = send(&app, get_admin("/bookings")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn unknown_user_reads_as_an_empty_record() {
    let schedule = schedule_allowing("20240101", &["m1"]).await;
    let movies = empty_movie_catalog().await;
    let (app, _dir) = test_app(&schedule.uri(), &movies.uri()).await;

    let (status, body) = send(&app, get("/bookings/ghost")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "userid": "ghost", "dates": [] }));
}

#[tokio::test]
async fn adding_twice_is_idempotent() {
    let schedule = schedule_allowing("20240101", &["m1", "m2"]).await;
    let movies = empty_movie_catalog().await;
    let (app, _dir) = test_app(&schedule.uri(), &movies.uri()).await;

    let (status, body) = send(
        &app,
        post_json("/bookings/u1/20240101", json!({ "movies": ["m1"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["added_movies"], json!(["m1"]));
    assert_eq!(body["current_movies"], json!(["m1"]));

    let (status, body) = send(
        &app,
        post_json("/bookings/u1/20240101", json!({ "movie": "m1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["added_movies"], json!([]));
    assert_eq!(body["current_movies"], json!(["m1"]));
}

#[tokio::test]
async fn add_then_delete_leaves_no_residual_records() {
    let schedule = schedule_allowing("20240101", &["m1"]).await;
    let movies = empty_movie_catalog().await;
    let (app, _dir) = test_app(&schedule.uri(), &movies.uri()).await;

    let (status, _) = send(
        &app,
        post_json("/bookings/u1/20240101", json!({ "movie": "m1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, delete("/bookings/u1/20240101/m1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "booking deleted");
    assert_eq!(body["movie"], "m1");

    // the user vanished from the admin view entirely
    let (_, body) = send(&app, get_admin("/bookings")).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn delete_distinguishes_its_not_found_variants() {
    let schedule = schedule_allowing("20240101", &["m1"]).await;
    let movies = empty_movie_catalog().await;
    let (app, _dir) = test_app(&schedule.uri(), &movies.uri()).await;

    send(
        &app,
        post_json("/bookings/u1/20240101", json!({ "movie": "m1" })),
    )
    .await;

    let (status, body) = send(&app, delete("/bookings/ghost/20240101/m1")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "user has no bookings");

    let (status, body) = send(&app, delete("/bookings/u1/20240102/m1")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "no bookings for this date");

    let (status, body) = send(&app, delete("/bookings/u1/20240101/m9")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "movie not booked on this date");
}

#[tokio::test]
async fn unscheduled_movies_conflict_without_mutation() {
    let schedule = schedule_allowing("20240101", &["m1"]).await;
    let movies = empty_movie_catalog().await;
    let (app, _dir) = test_app(&schedule.uri(), &movies.uri()).await;

    let (status, body) = send(
        &app,
        post_json("/bookings/u1/20240101", json!({ "movies": ["m1", "m2"] })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["not_allowed_movies"], json!(["m2"]));

    // nothing was written
    let (_, body) = send(&app, get("/bookings/u1")).await;
    assert_eq!(body["dates"], json!([]));
}

#[tokio::test]
async fn unknown_schedule_date_conflicts() {
    let schedule = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&schedule)
        .await;
    let movies = empty_movie_catalog().await;
    let (app, _dir) = test_app(&schedule.uri(), &movies.uri()).await;

    let (status, body) = send(
        &app,
        post_json("/bookings/u1/20240101", json!({ "movie": "m1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "date not found in schedule");
}

#[tokio::test]
async fn schedule_outage_maps_to_service_unavailable() {
    let movies = empty_movie_catalog().await;
    // nothing listens on this port
    let (app, _dir) = test_app("http://127.0.0.1:9", &movies.uri()).await;

    let (status, body) = send(
        &app,
        post_json("/bookings/u1/20240101", json!({ "movie": "m1" })),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "schedule service unreachable");

    let (_, body) = send(&app, get("/bookings/u1")).await;
    assert_eq!(body["dates"], json!([]));
}

#[tokio::test]
async fn impossible_calendar_dates_are_rejected() {
    let schedule = schedule_allowing("20240101", &["m1"]).await;
    let movies = empty_movie_catalog().await;
    let (app, _dir) = test_app(&schedule.uri(), &movies.uri()).await;

    let (status, _) = send(
        &app,
        post_json("/bookings/u1/20240230", json!({ "movie": "m1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, get("/stats/date/20240230/movies")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // malformed, not "no bookings for this date"
    let (status, body) = send(&app, delete("/bookings/u1/20240230/m1")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid date format, expected YYYYMMDD");
}

#[tokio::test]
async fn missing_and_empty_bodies_are_rejected() {
    let schedule = schedule_allowing("20240101", &["m1"]).await;
    let movies = empty_movie_catalog().await;
    let (app, _dir) = test_app(&schedule.uri(), &movies.uri()).await;

    let no_body = Request::builder()
        .method("POST")
        .uri("/bookings/u1/20240101")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, no_body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "provide movie or movies in JSON body");

    let (status, _) = send(&app, post_json("/bookings/u1/20240101", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        post_json("/bookings/u1/20240101", json!({ "movies": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn stats_rank_by_count_with_ties_in_first_encountered_order() {
    let schedule = schedule_allowing("20240101", &["m1", "m2", "m3"]).await;
    let movies = empty_movie_catalog().await;
    let (app, _dir) = test_app(&schedule.uri(), &movies.uri()).await;

    // u1 first encounters m3, so m3 leads the counting order despite
    // ending up with the lowest count
    for (user, booked) in [
        ("u1", json!({ "movies": ["m3", "m1", "m2"] })),
        ("u2", json!({ "movies": ["m1", "m2"] })),
        ("u3", json!({ "movies": ["m1", "m2"] })),
    ] {
        let uri = format!("/bookings/{}/20240101", user);
        let (status, _) = send(&app, post_json(&uri, booked)).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(&app, get("/stats/date/20240101/movies")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["date"], "20240101");

    let ranked = body["movies"].as_array().unwrap();
    let ids: Vec<&str> = ranked
        .iter()
        .map(|m| m["movie"]["id"].as_str().unwrap())
        .collect();
    let counts: Vec<u64> = ranked.iter().map(|m| m["count"].as_u64().unwrap()).collect();

    // m1 before m2 (tie broken by encounter order), both before m3
    assert_eq!(ids, vec!["m1", "m2", "m3"]);
    assert_eq!(counts, vec![3, 3, 1]);
    // catalog knows none of them, so every entry is a placeholder
    assert!(ranked.iter().all(|m| m["movie"]["error"] == "movie not found"));
}

#[tokio::test]
async fn details_mix_catalog_records_and_placeholders() {
    let schedule = schedule_allowing("20240101", &["m1", "m2"]).await;

    let movies = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movies/m1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "m1",
            "title": "Playtime",
            "rating": 8.2,
        })))
        .mount(&movies)
        .await;
    Mock::given(method("GET"))
        .and(path("/movies/m2"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&movies)
        .await;

    let (app, _dir) = test_app(&schedule.uri(), &movies.uri()).await;

    send(
        &app,
        post_json("/bookings/u1/20240101", json!({ "movies": ["m1", "m2"] })),
    )
    .await;

    let (status, body) = send(&app, get("/bookings/u1/details")).await;
    assert_eq!(status, StatusCode::OK);

    let resolved = body["dates"][0]["movies"].as_array().unwrap();
    assert_eq!(resolved[0]["title"], "Playtime");
    assert_eq!(
        resolved[1],
        json!({ "id": "m2", "error": "movie not found" })
    );
}
