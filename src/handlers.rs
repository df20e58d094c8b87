use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::{Json, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use tracing::{error, info};

use crate::{
    AppState,
    error::{ApiError, ErrorBody},
    models::{BookingCreate, BookingView, ClassView},
    validation::{validate_booking, validate_email_query},
};

#[derive(Debug, serde::Deserialize)]
pub struct BookingsQuery {
    pub email: Option<String>,
}

#[utoipa::path(get, path = "/", tag = "studio")]
pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Fitness Studio Booking API",
        "endpoints": {
            "/classes": "List upcoming classes as JSON",
            "/classes.ical": "Download upcoming classes as iCal file",
            "/book": "Book a slot in a class",
            "/bookings?email=": "List active bookings for an email address"
        }
    }))
}

#[utoipa::path(get, path = "/healthz/live", tag = "studio")]
pub async fn healthz_live() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

#[utoipa::path(
    get,
    path = "/healthz/ready",
    responses(
        (status = 200, description = "Database reachable"),
        (status = 503, description = "Database unavailable", body = ErrorBody)
    ),
    tag = "studio"
)]
pub async fn healthz_ready(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    if let Err(err) = state.repository.ping().await {
        error!("Readiness check failed: {err}");
        return Err(ApiError::ServiceUnavailable("Database unavailable".into()));
    }
    Ok(Json(serde_json::json!({"status": "ok"})))
}

#[utoipa::path(
    get,
    path = "/classes",
    responses(
        (status = 200, description = "Upcoming classes, earliest first", body = [ClassView]),
        (status = 500, description = "Storage failure", body = ErrorBody)
    ),
    tag = "classes"
)]
pub async fn list_classes(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let classes = state.repository.list_upcoming(Utc::now()).await?;
    let views: Vec<ClassView> = classes.iter().map(ClassView::from).collect();
    Ok(Json(views))
}

#[utoipa::path(
    get,
    path = "/classes.ical",
    responses(
        (status = 200, description = "iCal file", content_type = "text/calendar"),
        (status = 500, description = "Storage failure", body = ErrorBody)
    ),
    tag = "classes"
)]
pub async fn get_ical(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let classes = state.repository.list_upcoming(Utc::now()).await?;
    let body = state.exporter.generate(&classes);
    Ok((
        StatusCode::OK,
        [
            ("content-type", "text/calendar"),
            (
                "content-disposition",
                "attachment; filename=fitness_classes.ics",
            ),
        ],
        body,
    ))
}

#[utoipa::path(
    post,
    path = "/book",
    request_body = BookingCreate,
    responses(
        (status = 201, description = "Booking created", body = BookingView),
        (status = 400, description = "Invalid request, no slots left or duplicate booking", body = ErrorBody),
        (status = 404, description = "Unknown fitness class", body = ErrorBody)
    ),
    tag = "bookings"
)]
pub async fn create_booking(
    State(state): State<AppState>,
    payload: Result<Json<BookingCreate>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    let booking = validate_booking(request)?;
    let booking = state
        .repository
        .create_booking(booking, Utc::now())
        .await?;

    info!(
        booking_id = booking.id,
        fitness_class = booking.fitness_class,
        "Booking created"
    );
    Ok((StatusCode::CREATED, Json(BookingView::from(&booking))))
}

#[utoipa::path(
    get,
    path = "/bookings",
    params(
        ("email" = String, Query, description = "Client email address")
    ),
    responses(
        (status = 200, description = "Active bookings, most recent first", body = [BookingView]),
        (status = 400, description = "Missing email parameter", body = ErrorBody)
    ),
    tag = "bookings"
)]
pub async fn list_bookings(
    State(state): State<AppState>,
    query: Result<Query<BookingsQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query?;
    let email = validate_email_query(query.email.as_deref())?;
    let bookings = state.repository.list_bookings_by_email(&email).await?;
    let views: Vec<BookingView> = bookings.iter().map(BookingView::from).collect();
    Ok(Json(views))
}
