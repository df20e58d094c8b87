use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::{DateTime, Duration, Utc};
use fitness_studio::db::connect_in_memory;
use fitness_studio::models::{ClassType, FitnessClass, NewFitnessClass};
use fitness_studio::repository::{SqliteStudioRepository, StudioRepository};
use fitness_studio::settings::Settings;
use fitness_studio::timezone::normalize_to_ist;
use fitness_studio::{AppState, build_router};
use serde_json::{Value, json};
use tower::{Service, ServiceExt};

fn test_settings() -> Settings {
    Settings {
        database_url: "sqlite::memory:".to_string(),
        max_connections: 1,
        debug: true,
        enable_swagger: true,
        port: 8080,
    }
}

/// Helper function to create an app backed by a fresh in-memory database
async fn create_test_app() -> (Router, SqliteStudioRepository) {
    let repo = SqliteStudioRepository::new(connect_in_memory().await.unwrap());
    let state = AppState::new(test_settings(), Arc::new(repo.clone()));
    (build_router(state), repo)
}

async fn add_class(
    repo: &SqliteStudioRepository,
    class_type: ClassType,
    start: DateTime<Utc>,
    total: i64,
    available: i64,
) -> FitnessClass {
    repo.create_class(
        NewFitnessClass {
            name: format!("{} class", class_type.label()),
            class_type,
            description: "Test class".to_string(),
            instructor: "Priya Sharma".to_string(),
            start_time: normalize_to_ist(start),
            end_time: normalize_to_ist(start + Duration::hours(1)),
            total_slots: total,
            available_slots: available,
        },
        Utc::now(),
    )
    .await
    .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn book_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/book")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn booking_body(class_id: i64, email: &str) -> Value {
    json!({
        "fitness_class": class_id,
        "client_name": "Test Client",
        "client_email": email,
    })
}

/// Helper to extract response body as JSON
async fn response_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: &mut Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.call(request).await.unwrap();
    let status = response.status();
    (status, response_json(response.into_body()).await)
}

#[tokio::test]
async fn test_root_endpoint() {
    let (mut app, _) = create_test_app().await;

    let (status, body) = send(&mut app, get("/")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Fitness Studio Booking API");
    assert!(body["endpoints"]["/classes"].is_string());
}

#[tokio::test]
async fn test_healthz() {
    let (mut app, _) = create_test_app().await;

    let (status, body) = send(&mut app, get("/healthz/live")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(&mut app, get("/healthz/ready")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_healthz_ready_when_database_closed() {
    let (mut app, repo) = create_test_app().await;
    repo.pool().close().await;

    let response = app.call(get("/healthz/ready")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_classes_lists_only_upcoming_in_order() {
    let (mut app, repo) = create_test_app().await;
    let now = Utc::now();
    let later = add_class(&repo, ClassType::Zumba, now + Duration::days(2), 10, 10).await;
    add_class(&repo, ClassType::Yoga, now - Duration::hours(2), 10, 10).await;
    let sooner = add_class(&repo, ClassType::Hiit, now + Duration::hours(5), 12, 7).await;

    let (status, body) = send(&mut app, get("/classes")).await;

    assert_eq!(status, StatusCode::OK);
    let classes = body.as_array().unwrap();
    assert_eq!(classes.len(), 2);
    assert_eq!(classes[0]["id"], sooner.id);
    assert_eq!(classes[1]["id"], later.id);

    let first = &classes[0];
    assert_eq!(first["class_type"], "HIIT");
    assert_eq!(first["class_type_display"], "HIIT");
    assert_eq!(first["total_slots"], 12);
    assert_eq!(first["available_slots"], 7);
    assert!(first["start_time"].as_str().unwrap().ends_with("+05:30"));
    let formatted = first["formatted_start_time"].as_str().unwrap();
    assert!(formatted.ends_with("AM") || formatted.ends_with("PM"));
    assert_eq!(classes[1]["class_type_display"], "Zumba");
}

#[tokio::test]
async fn test_classes_empty() {
    let (mut app, _) = create_test_app().await;

    let (status, body) = send(&mut app, get("/classes")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_classes_ical() {
    let (mut app, repo) = create_test_app().await;
    add_class(&repo, ClassType::Yoga, Utc::now() + Duration::days(1), 10, 10).await;

    let response = app.call(get("/classes.ical")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "text/calendar"
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(body.contains("BEGIN:VEVENT"));
    assert!(body.contains("Yoga: Yoga class"));
}

#[tokio::test]
async fn test_book_success_decrements_slots() {
    let (mut app, repo) = create_test_app().await;
    let class = add_class(&repo, ClassType::Yoga, Utc::now() + Duration::days(1), 10, 3).await;

    let (status, body) = send(&mut app, book_request(booking_body(class.id, "a@x.com"))).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["fitness_class"], class.id);
    assert_eq!(body["class_name"], "Yoga");
    assert_eq!(body["client_name"], "Test Client");
    assert_eq!(body["client_email"], "a@x.com");
    assert_eq!(body["is_cancelled"], false);
    assert!(body["id"].is_i64());
    assert!(body["formatted_booking_date"].is_string());

    let class = repo.find_class(class.id).await.unwrap().unwrap();
    assert_eq!(class.available_slots, 2);
}

#[tokio::test]
async fn test_book_capacity_and_duplicate_scenario() {
    let (mut app, repo) = create_test_app().await;
    let class = add_class(&repo, ClassType::Hiit, Utc::now() + Duration::days(1), 10, 1).await;

    let (status, _) = send(&mut app, book_request(booking_body(class.id, "a@x.com"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        repo.find_class(class.id).await.unwrap().unwrap().available_slots,
        0
    );

    let (status, body) = send(&mut app, book_request(booking_body(class.id, "b@x.com"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No slots available for this class");

    let (status, body) = send(&mut app, book_request(booking_body(class.id, "a@x.com"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "You already have a booking for this class");

    assert_eq!(
        repo.find_class(class.id).await.unwrap().unwrap().available_slots,
        0
    );
}

#[tokio::test]
async fn test_book_duplicate_with_free_slots() {
    let (mut app, repo) = create_test_app().await;
    let class = add_class(&repo, ClassType::Zumba, Utc::now() + Duration::days(1), 10, 5).await;

    let (status, _) = send(&mut app, book_request(booking_body(class.id, "a@x.com"))).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = send(&mut app, book_request(booking_body(class.id, "a@x.com"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "You already have a booking for this class");

    assert_eq!(
        repo.find_class(class.id).await.unwrap().unwrap().available_slots,
        4
    );
}

#[tokio::test]
async fn test_book_unknown_class() {
    let (mut app, _) = create_test_app().await;

    let (status, body) = send(&mut app, book_request(booking_body(42, "a@x.com"))).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("42"));
}

#[tokio::test]
async fn test_book_validation_errors() {
    let (mut app, repo) = create_test_app().await;
    let class = add_class(&repo, ClassType::Yoga, Utc::now() + Duration::days(1), 10, 5).await;

    let cases = [
        json!({"client_name": "A", "client_email": "a@x.com"}),
        json!({"fitness_class": class.id, "client_email": "a@x.com"}),
        json!({"fitness_class": class.id, "client_name": "A"}),
        json!({"fitness_class": class.id, "client_name": "A", "client_email": "not-an-email"}),
        json!({"fitness_class": "abc", "client_name": "A", "client_email": "a@x.com"}),
    ];
    for case in cases {
        let (status, body) = send(&mut app, book_request(case.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "case: {case}");
        assert!(body["error"].is_string(), "case: {case}");
    }

    let malformed = Request::builder()
        .method("POST")
        .uri("/book")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&mut app, malformed).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    assert_eq!(
        repo.find_class(class.id).await.unwrap().unwrap().available_slots,
        5
    );
}

#[tokio::test]
async fn test_concurrent_bookings_for_last_slot() {
    let (app, repo) = create_test_app().await;
    let class = add_class(&repo, ClassType::Hiit, Utc::now() + Duration::days(1), 10, 1).await;

    let requests = ["a@x.com", "b@x.com", "c@x.com", "d@x.com"]
        .into_iter()
        .map(|email| app.clone().oneshot(book_request(booking_body(class.id, email))));
    let responses = futures::future::join_all(requests).await;

    let statuses: Vec<StatusCode> = responses
        .into_iter()
        .map(|r| r.unwrap().status())
        .collect();
    assert_eq!(
        statuses.iter().filter(|s| **s == StatusCode::CREATED).count(),
        1
    );
    assert_eq!(
        statuses
            .iter()
            .filter(|s| **s == StatusCode::BAD_REQUEST)
            .count(),
        3
    );

    let class = repo.find_class(class.id).await.unwrap().unwrap();
    assert_eq!(class.available_slots, 0);
    assert_eq!(repo.count_bookings().await.unwrap(), 1);
}

#[tokio::test]
async fn test_bookings_requires_email() {
    let (mut app, _) = create_test_app().await;

    let (status, body) = send(&mut app, get("/bookings")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email parameter is required");

    let (status, _) = send(&mut app, get("/bookings?email=")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_bookings_lists_active_most_recent_first() {
    let (mut app, repo) = create_test_app().await;
    let now = Utc::now();
    let first = add_class(&repo, ClassType::Yoga, now + Duration::days(1), 10, 5).await;
    let second = add_class(&repo, ClassType::Zumba, now + Duration::days(2), 10, 5).await;
    let third = add_class(&repo, ClassType::Hiit, now + Duration::days(3), 10, 5).await;

    for class in [&first, &second, &third] {
        let (status, _) = send(&mut app, book_request(booking_body(class.id, "a@x.com"))).await;
        assert_eq!(status, StatusCode::CREATED);
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    let (status, _) = send(&mut app, book_request(booking_body(first.id, "b@x.com"))).await;
    assert_eq!(status, StatusCode::CREATED);

    sqlx::query("UPDATE bookings SET is_cancelled = 1 WHERE fitness_class_id = ? AND client_email = ?")
        .bind(second.id)
        .bind("a@x.com")
        .execute(repo.pool())
        .await
        .unwrap();

    let (status, body) = send(&mut app, get("/bookings?email=a@x.com")).await;

    assert_eq!(status, StatusCode::OK);
    let bookings = body.as_array().unwrap();
    let classes: Vec<i64> = bookings
        .iter()
        .map(|b| b["fitness_class"].as_i64().unwrap())
        .collect();
    assert_eq!(classes, vec![third.id, first.id]);
    assert!(bookings.iter().all(|b| b["is_cancelled"] == false));
    assert_eq!(bookings[0]["class_name"], "HIIT");
    assert_eq!(bookings[1]["class_name"], "Yoga");

    let (status, body) = send(&mut app, get("/bookings?email=nobody@x.com")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_openapi_document() {
    let (mut app, _) = create_test_app().await;

    let (status, body) = send(&mut app, get("/openapi.json")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/book"]["post"].is_object());
    assert!(body["paths"]["/bookings"]["get"].is_object());
    assert!(body["components"]["schemas"]["ClassView"].is_object());
}
