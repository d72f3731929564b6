use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::bookings::{BookingList, BookingPayload, BookingRead},
    error::{AppResult, ErrorData},
    extract::{AppJson, AppPath, AppQuery},
    response::ApiResponse,
    routes::params::BookingQuery,
    services::{WriteMode, booking_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_bookings).post(create_booking))
        .route(
            "/{id}",
            get(get_booking)
                .put(replace_booking)
                .patch(patch_booking)
                .delete(delete_booking),
        )
}

#[utoipa::path(
    get,
    path = "/api/bookings",
    params(BookingQuery),
    responses(
        (status = 200, description = "Bookings, newest first", body = ApiResponse<BookingList>),
        (status = 400, description = "Malformed filter", body = ApiResponse<ErrorData>),
    ),
    tag = "Bookings"
)]
pub async fn list_bookings(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<BookingQuery>,
) -> AppResult<Json<ApiResponse<BookingList>>> {
    let resp = booking_service::list_bookings(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/bookings/{id}",
    params(
        ("id" = Uuid, Path, description = "Booking ID")
    ),
    responses(
        (status = 200, description = "Get booking", body = ApiResponse<BookingRead>),
        (status = 404, description = "Booking not found", body = ApiResponse<ErrorData>),
    ),
    tag = "Bookings"
)]
pub async fn get_booking(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<ApiResponse<BookingRead>>> {
    let resp = booking_service::get_booking(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/bookings",
    request_body = BookingPayload,
    responses(
        (status = 201, description = "Create booking", body = ApiResponse<BookingRead>),
        (status = 400, description = "Validation failed", body = ApiResponse<ErrorData>),
    ),
    tag = "Bookings"
)]
pub async fn create_booking(
    State(state): State<AppState>,
    AppJson(payload): AppJson<BookingPayload>,
) -> AppResult<(StatusCode, Json<ApiResponse<BookingRead>>)> {
    let resp = booking_service::create_booking(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/bookings/{id}",
    params(
        ("id" = Uuid, Path, description = "Booking ID")
    ),
    request_body = BookingPayload,
    responses(
        (status = 200, description = "Replaced booking", body = ApiResponse<BookingRead>),
        (status = 400, description = "Validation failed", body = ApiResponse<ErrorData>),
        (status = 404, description = "Booking not found", body = ApiResponse<ErrorData>),
    ),
    tag = "Bookings"
)]
pub async fn replace_booking(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<BookingPayload>,
) -> AppResult<Json<ApiResponse<BookingRead>>> {
    let resp = booking_service::update_booking(&state, id, payload, WriteMode::Replace).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/bookings/{id}",
    params(
        ("id" = Uuid, Path, description = "Booking ID")
    ),
    request_body = BookingPayload,
    responses(
        (status = 200, description = "Patched booking", body = ApiResponse<BookingRead>),
        (status = 400, description = "Validation failed", body = ApiResponse<ErrorData>),
        (status = 404, description = "Booking not found", body = ApiResponse<ErrorData>),
    ),
    tag = "Bookings"
)]
pub async fn patch_booking(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<BookingPayload>,
) -> AppResult<Json<ApiResponse<BookingRead>>> {
    let resp = booking_service::update_booking(&state, id, payload, WriteMode::Merge).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/bookings/{id}",
    params(
        ("id" = Uuid, Path, description = "Booking ID")
    ),
    responses(
        (status = 204, description = "Booking deleted"),
        (status = 404, description = "Booking not found", body = ApiResponse<ErrorData>),
    ),
    tag = "Bookings"
)]
pub async fn delete_booking(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<StatusCode> {
    booking_service::delete_booking(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
