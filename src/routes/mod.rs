use axum::{Router, http::Uri, routing::get};

use crate::{error::AppError, state::AppState};

pub mod bookings;
pub mod doc;
pub mod health;
pub mod listings;
pub mod params;
pub mod reviews;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/health", health::router())
        .nest("/listings", listings::router())
        .nest("/bookings", bookings::router())
        .nest("/reviews", reviews::router())
}

/// Full application: API under `/api`, docs at `/docs`, raw OpenAPI JSON
/// at `/api-docs/openapi.json`.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", create_api_router())
        .route("/api-docs/openapi.json", get(doc::openapi_json))
        .merge(doc::scalar_docs())
        .fallback(not_found)
        .with_state(state)
}

async fn not_found(uri: Uri) -> AppError {
    tracing::debug!(path = %uri.path(), "no route");
    AppError::NotFound
}
