use axum::Json;
use utoipa::{OpenApi, openapi::OpenApi as OpenApiSpec};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        bookings::{BookingList, BookingPayload, BookingRead},
        listings::{ListingList, ListingPayload, ListingRead},
        reviews::{ReviewList, ReviewPayload, ReviewRead},
        users::UserSummary,
    },
    error::ErrorData,
    models::BookingStatus,
    response::{ApiResponse, Meta},
    routes::{bookings, health, listings, params, reviews},
    validation::FieldErrors,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        listings::list_listings,
        listings::create_listing,
        listings::get_listing,
        listings::replace_listing,
        listings::patch_listing,
        listings::delete_listing,
        bookings::list_bookings,
        bookings::create_booking,
        bookings::get_booking,
        bookings::replace_booking,
        bookings::patch_booking,
        bookings::delete_booking,
        reviews::list_reviews,
        reviews::create_review,
        reviews::get_review,
        reviews::replace_review,
        reviews::patch_review,
        reviews::delete_review
    ),
    components(
        schemas(
            UserSummary,
            BookingStatus,
            ListingPayload,
            ListingRead,
            ListingList,
            BookingPayload,
            BookingRead,
            BookingList,
            ReviewPayload,
            ReviewRead,
            ReviewList,
            params::ListingQuery,
            params::BookingQuery,
            params::ReviewQuery,
            FieldErrors,
            ErrorData,
            Meta,
            ApiResponse<ListingRead>,
            ApiResponse<ListingList>,
            ApiResponse<BookingRead>,
            ApiResponse<BookingList>,
            ApiResponse<ReviewRead>,
            ApiResponse<ReviewList>,
            ApiResponse<ErrorData>
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Listings", description = "Property listings with host and reviews"),
        (name = "Bookings", description = "Reservations of a listing by a guest"),
        (name = "Reviews", description = "Guest ratings of listings"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}

pub async fn openapi_json() -> Json<OpenApiSpec> {
    Json(ApiDoc::openapi())
}
