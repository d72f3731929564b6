use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::listings::{ListingList, ListingPayload, ListingRead},
    error::{AppResult, ErrorData},
    extract::{AppJson, AppPath, AppQuery},
    response::ApiResponse,
    routes::params::ListingQuery,
    services::{WriteMode, listing_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_listings).post(create_listing))
        .route(
            "/{id}",
            get(get_listing)
                .put(replace_listing)
                .patch(patch_listing)
                .delete(delete_listing),
        )
}

#[utoipa::path(
    get,
    path = "/api/listings",
    params(ListingQuery),
    responses(
        (status = 200, description = "Listings, newest first", body = ApiResponse<ListingList>),
        (status = 400, description = "Malformed filter", body = ApiResponse<ErrorData>),
    ),
    tag = "Listings"
)]
pub async fn list_listings(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ListingQuery>,
) -> AppResult<Json<ApiResponse<ListingList>>> {
    let resp = listing_service::list_listings(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/listings/{id}",
    params(
        ("id" = Uuid, Path, description = "Listing ID")
    ),
    responses(
        (status = 200, description = "Get listing", body = ApiResponse<ListingRead>),
        (status = 404, description = "Listing not found", body = ApiResponse<ErrorData>),
    ),
    tag = "Listings"
)]
pub async fn get_listing(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<ApiResponse<ListingRead>>> {
    let resp = listing_service::get_listing(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/listings",
    request_body = ListingPayload,
    responses(
        (status = 201, description = "Create listing", body = ApiResponse<ListingRead>),
        (status = 400, description = "Validation failed", body = ApiResponse<ErrorData>),
    ),
    tag = "Listings"
)]
pub async fn create_listing(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ListingPayload>,
) -> AppResult<(StatusCode, Json<ApiResponse<ListingRead>>)> {
    let resp = listing_service::create_listing(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/listings/{id}",
    params(
        ("id" = Uuid, Path, description = "Listing ID")
    ),
    request_body = ListingPayload,
    responses(
        (status = 200, description = "Replaced listing", body = ApiResponse<ListingRead>),
        (status = 400, description = "Validation failed", body = ApiResponse<ErrorData>),
        (status = 404, description = "Listing not found", body = ApiResponse<ErrorData>),
    ),
    tag = "Listings"
)]
pub async fn replace_listing(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<ListingPayload>,
) -> AppResult<Json<ApiResponse<ListingRead>>> {
    let resp = listing_service::update_listing(&state, id, payload, WriteMode::Replace).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/listings/{id}",
    params(
        ("id" = Uuid, Path, description = "Listing ID")
    ),
    request_body = ListingPayload,
    responses(
        (status = 200, description = "Patched listing", body = ApiResponse<ListingRead>),
        (status = 400, description = "Validation failed", body = ApiResponse<ErrorData>),
        (status = 404, description = "Listing not found", body = ApiResponse<ErrorData>),
    ),
    tag = "Listings"
)]
pub async fn patch_listing(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<ListingPayload>,
) -> AppResult<Json<ApiResponse<ListingRead>>> {
    let resp = listing_service::update_listing(&state, id, payload, WriteMode::Merge).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/listings/{id}",
    params(
        ("id" = Uuid, Path, description = "Listing ID")
    ),
    responses(
        (status = 204, description = "Listing deleted with its bookings and reviews"),
        (status = 404, description = "Listing not found", body = ApiResponse<ErrorData>),
    ),
    tag = "Listings"
)]
pub async fn delete_listing(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<StatusCode> {
    listing_service::delete_listing(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
