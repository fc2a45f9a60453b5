use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::NaiveTime;
use serde_json::{json, Value};
use small_theater::{build_router, AppState, FixedClock, InMemoryStore, TheaterService};
use std::sync::Arc;
use tower::ServiceExt;

fn app_at(h: u32, m: u32) -> Router {
    let now = NaiveTime::from_hms_opt(h, m, 0).unwrap();
    let service = TheaterService::with_clock(Arc::new(InMemoryStore::new()), Arc::new(FixedClock(now)));
    build_router(AppState::new(service))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    let request = match body {
        Some(body) => request.body(Body::from(body.to_string())).unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, "POST", uri, Some(body)).await
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, "GET", uri, None).await
}

async fn create_room(app: &Router, capacity: u32) -> i64 {
    let (status, body) = post(app, "/api/room/", json!({"name": "Room", "capacity": capacity})).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

async fn create_movie(app: &Router, room: i64, start: &str, end: &str) -> (StatusCode, Value) {
    post(
        app,
        "/api/movie/",
        json!({"name": "Movie", "start_time": start, "end_time": end, "room": room}),
    )
    .await
}

#[tokio::test]
async fn test_room_create_success() {
    let app = app_at(9, 0);
    let (status, body) = post(&app, "/api/room/", json!({"name": "Room 1", "capacity": 500})).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Room 1");
    assert_eq!(body["capacity"], 500);
    assert_eq!(body["current_playing_movie"], Value::Null);
}

#[tokio::test]
async fn test_room_create_fail_with_missing_param() {
    let app = app_at(9, 0);
    let (status, body) = post(&app, "/api/room/", json!({"name": "Room 1"})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"capacity": ["This field is required."]}));
}

#[tokio::test]
async fn test_room_list_success() {
    let app = app_at(9, 0);
    create_room(&app, 10).await;
    create_room(&app, 20).await;

    let (status, body) = get(&app, "/api/room/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_movie_create_success() {
    let app = app_at(9, 0);
    let room = create_room(&app, 50).await;

    let (status, body) = create_movie(&app, room, "11:00:00", "13:00:00").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Movie");
    assert_eq!(body["start_time"], "11:00:00");
    assert_eq!(body["end_time"], "13:00:00");
    assert_eq!(body["room"]["id"], room);
    assert_eq!(body["room"]["name"], "Room");
    assert_eq!(body["remaining_tickets"], 50);
}

#[tokio::test]
async fn test_movie_create_fail_with_missing_param() {
    let app = app_at(9, 0);
    let (status, body) = post(&app, "/api/movie/", json!({"name": "Movie 1"})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.get("start_time").is_some());
    assert!(body.get("end_time").is_some());
    assert!(body.get("room").is_some());
}

#[tokio::test]
async fn test_movie_create_fail_with_unknown_room() {
    let app = app_at(9, 0);
    let (status, body) = create_movie(&app, 99, "10:00:00", "12:00:00").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"room": ["Invalid pk \"99\" - object does not exist."]}));
}

#[tokio::test]
async fn test_movie_create_fail_with_invalid_show_time() {
    let app = app_at(9, 0);
    let room = create_room(&app, 50).await;

    let (status, body) = create_movie(&app, room, "13:00:00", "10:00:00").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["non_field_errors"][0], "WRONG_DURATION");

    let (status, body) = create_movie(&app, room, "10:00:00", "10:00:00").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["non_field_errors"][0], "WRONG_DURATION");
}

#[tokio::test]
async fn test_movie_create_fail_with_movie_exist() {
    let app = app_at(9, 0);
    let room = create_room(&app, 50).await;
    let (status, _) = create_movie(&app, room, "10:00:00", "12:00:00").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = create_movie(&app, room, "09:00:00", "11:00:00").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["non_field_errors"][0], "MOVIE_EXIST");

    let (status, body) = create_movie(&app, room, "11:00:00", "13:00:00").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["non_field_errors"][0], "MOVIE_EXIST");

    // 起點等於既有場次的終點也算重疊
    let (status, body) = create_movie(&app, room, "12:00:00", "14:00:00").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["non_field_errors"][0], "MOVIE_EXIST");

    let (status, _) = create_movie(&app, room, "12:00:01", "14:00:00").await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_movie_list_success() {
    let app = app_at(15, 0);
    let room = create_room(&app, 40).await;
    create_movie(&app, room, "14:00:00", "16:00:00").await;

    let (status, body) = get(&app, "/api/movie/").await;
    assert_eq!(status, StatusCode::OK);

    let movies = body.as_array().unwrap();
    assert_eq!(movies.len(), 1);
    assert_eq!(movies[0]["remaining_tickets"], 40);
    assert_eq!(movies[0]["room"]["current_playing_movie"]["id"], movies[0]["id"]);
}

#[tokio::test]
async fn test_ticket_create_success() {
    let app = app_at(9, 0);
    let room = create_room(&app, 50).await;
    let (_, movie) = create_movie(&app, room, "10:00:00", "12:00:00").await;

    let (status, body) = post(&app, "/api/ticket/", json!({"movie": movie["id"], "quantity": 1})).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["quantity"], 1);
    assert_eq!(body["movie"]["id"], movie["id"]);
    assert_eq!(body["movie"]["remaining_tickets"], 49);
}

#[tokio::test]
async fn test_ticket_create_fail_with_missing_param() {
    let app = app_at(9, 0);
    let (status, body) = post(&app, "/api/ticket/", json!({"quantity": 1})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"movie": ["This field is required."]}));
}

#[tokio::test]
async fn test_ticket_create_fail_with_sold_out() {
    let app = app_at(9, 0);
    let room = create_room(&app, 10).await;
    let (_, movie) = create_movie(&app, room, "10:00:00", "12:00:00").await;

    let (status, body) = post(&app, "/api/ticket/", json!({"movie": movie["id"], "quantity": 10})).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["movie"]["remaining_tickets"], 0);

    let (status, body) = post(&app, "/api/ticket/", json!({"movie": movie["id"], "quantity": 1})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"non_field_errors": ["SOLD_OUT"]}));
}

#[tokio::test]
async fn test_ticket_create_fail_with_insufficient_tickets() {
    let app = app_at(9, 0);
    let room = create_room(&app, 10).await;
    let (_, movie) = create_movie(&app, room, "10:00:00", "12:00:00").await;
    post(&app, "/api/ticket/", json!({"movie": movie["id"], "quantity": 5})).await;

    let (status, body) = post(&app, "/api/ticket/", json!({"movie": movie["id"], "quantity": 10})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"non_field_errors": ["INSUFFICIENT_TICKETS"]}));
}

#[tokio::test]
async fn test_ticket_list_success() {
    let app = app_at(9, 0);
    let room = create_room(&app, 10).await;
    let (_, movie) = create_movie(&app, room, "10:00:00", "12:00:00").await;
    for _ in 0..2 {
        post(&app, "/api/ticket/", json!({"movie": movie["id"], "quantity": 1})).await;
    }

    let (status, body) = get(&app, "/api/ticket/").await;
    assert_eq!(status, StatusCode::OK);

    let tickets = body.as_array().unwrap();
    assert_eq!(tickets.len(), 2);
    assert_eq!(tickets[1]["movie"]["remaining_tickets"], 8);
}

#[tokio::test]
async fn test_playing_movie_list_success() {
    let app = app_at(15, 0);
    let room1 = create_room(&app, 10).await;
    let room2 = create_room(&app, 10).await;

    let (_, movie1) = create_movie(&app, room1, "15:00:00", "17:00:00").await;
    // 三小時前已結束
    create_movie(&app, room1, "10:00:00", "12:00:00").await;
    let (_, movie3) = create_movie(&app, room2, "14:30:00", "15:30:00").await;

    let (status, body) = get(&app, "/api/theater-playing-movies/").await;
    assert_eq!(status, StatusCode::OK);

    let ids: Vec<&Value> = body.as_array().unwrap().iter().map(|m| &m["id"]).collect();
    assert_eq!(ids, vec![&movie1["id"], &movie3["id"]]);
}

#[tokio::test]
async fn test_room_create_fail_with_wrong_capacity_type() {
    let app = app_at(9, 0);
    let (status, body) = post(&app, "/api/room/", json!({"name": "Room 1", "capacity": "abc"})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"capacity": ["A valid integer is required."]}));
}

#[tokio::test]
async fn test_movie_create_fail_with_unparsable_time() {
    let app = app_at(9, 0);
    let room = create_room(&app, 50).await;

    let (status, body) = post(
        &app,
        "/api/movie/",
        json!({"name": "", "start_time": "25:99", "end_time": "12:00:00", "room": room}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({
            "name": ["This field may not be blank."],
            "start_time": ["Time has wrong format. Use one of these formats instead: hh:mm[:ss[.uuuuuu]]."]
        })
    );
}

#[tokio::test]
async fn test_ticket_create_fail_with_wrong_movie_type() {
    let app = app_at(9, 0);
    let (status, body) = post(&app, "/api/ticket/", json!({"movie": true, "quantity": 1})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"movie": ["Incorrect type. Expected pk value, received bool."]})
    );
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let app = app_at(9, 0);
    let request = Request::builder()
        .method("POST")
        .uri("/api/room/")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body.get("detail").is_some());
}

#[tokio::test]
async fn test_lists_do_not_change_state() {
    let app = app_at(11, 0);
    let room = create_room(&app, 10).await;
    let (_, movie) = create_movie(&app, room, "10:00:00", "12:00:00").await;
    post(&app, "/api/ticket/", json!({"movie": movie["id"], "quantity": 3})).await;

    for uri in ["/api/room/", "/api/movie/", "/api/ticket/", "/api/theater-playing-movies/"] {
        let first = get(&app, uri).await;
        let second = get(&app, uri).await;
        assert_eq!(first, second, "{} changed between reads", uri);
    }
}

#[tokio::test]
async fn test_health() {
    let app = app_at(9, 0);
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
