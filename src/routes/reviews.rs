use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::reviews::{ReviewList, ReviewPayload, ReviewRead},
    error::{AppResult, ErrorData},
    extract::{AppJson, AppPath, AppQuery},
    response::ApiResponse,
    routes::params::ReviewQuery,
    services::{WriteMode, review_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_reviews).post(create_review))
        .route(
            "/{id}",
            get(get_review)
                .put(replace_review)
                .patch(patch_review)
                .delete(delete_review),
        )
}

#[utoipa::path(
    get,
    path = "/api/reviews",
    params(ReviewQuery),
    responses(
        (status = 200, description = "Reviews, newest first", body = ApiResponse<ReviewList>),
        (status = 400, description = "Malformed filter", body = ApiResponse<ErrorData>),
    ),
    tag = "Reviews"
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ReviewQuery>,
) -> AppResult<Json<ApiResponse<ReviewList>>> {
    let resp = review_service::list_reviews(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/reviews/{id}",
    params(
        ("id" = Uuid, Path, description = "Review ID")
    ),
    responses(
        (status = 200, description = "Get review", body = ApiResponse<ReviewRead>),
        (status = 404, description = "Review not found", body = ApiResponse<ErrorData>),
    ),
    tag = "Reviews"
)]
pub async fn get_review(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<ApiResponse<ReviewRead>>> {
    let resp = review_service::get_review(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/reviews",
    request_body = ReviewPayload,
    responses(
        (status = 201, description = "Create review", body = ApiResponse<ReviewRead>),
        (status = 400, description = "Validation failed or guest already reviewed the listing", body = ApiResponse<ErrorData>),
        (status = 409, description = "Concurrent duplicate review", body = ApiResponse<ErrorData>),
    ),
    tag = "Reviews"
)]
pub async fn create_review(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ReviewPayload>,
) -> AppResult<(StatusCode, Json<ApiResponse<ReviewRead>>)> {
    let resp = review_service::create_review(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/reviews/{id}",
    params(
        ("id" = Uuid, Path, description = "Review ID")
    ),
    request_body = ReviewPayload,
    responses(
        (status = 200, description = "Replaced review", body = ApiResponse<ReviewRead>),
        (status = 400, description = "Validation failed", body = ApiResponse<ErrorData>),
        (status = 404, description = "Review not found", body = ApiResponse<ErrorData>),
    ),
    tag = "Reviews"
)]
pub async fn replace_review(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<ReviewPayload>,
) -> AppResult<Json<ApiResponse<ReviewRead>>> {
    let resp = review_service::update_review(&state, id, payload, WriteMode::Replace).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/reviews/{id}",
    params(
        ("id" = Uuid, Path, description = "Review ID")
    ),
    request_body = ReviewPayload,
    responses(
        (status = 200, description = "Patched review", body = ApiResponse<ReviewRead>),
        (status = 400, description = "Validation failed", body = ApiResponse<ErrorData>),
        (status = 404, description = "Review not found", body = ApiResponse<ErrorData>),
    ),
    tag = "Reviews"
)]
pub async fn patch_review(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<ReviewPayload>,
) -> AppResult<Json<ApiResponse<ReviewRead>>> {
    let resp = review_service::update_review(&state, id, payload, WriteMode::Merge).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/reviews/{id}",
    params(
        ("id" = Uuid, Path, description = "Review ID")
    ),
    responses(
        (status = 204, description = "Review deleted"),
        (status = 404, description = "Review not found", body = ApiResponse<ErrorData>),
    ),
    tag = "Reviews"
)]
pub async fn delete_review(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<StatusCode> {
    review_service::delete_review(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
