#![allow(dead_code)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use stay_api::{
    dto::{
        bookings::{BookingPayload, BookingRead},
        listings::{ListingPayload, ListingRead},
        reviews::{ReviewPayload, ReviewRead},
    },
    error::AppError,
    models::{NewUser, User},
    services::{booking_service, listing_service, review_service},
    state::AppState,
    validation::FieldErrors,
};
use uuid::Uuid;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn dec(value: &str) -> Decimal {
    value.parse().expect("valid decimal")
}

pub async fn user(state: &AppState, username: &str) -> User {
    state
        .users
        .create(NewUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            first_name: username.to_string(),
            last_name: "Tester".to_string(),
        })
        .await
        .expect("create user")
}

pub fn listing_payload(host_id: Uuid, price: &str, max_guests: i32) -> ListingPayload {
    ListingPayload {
        title: Some("Harbour Flat".into()),
        description: Some("Two rooms above the harbour.".into()),
        location: Some("Portland, ME".into()),
        price_per_night: Some(dec(price)),
        number_of_bedrooms: Some(2),
        number_of_bathrooms: Some(1),
        max_guests: Some(max_guests),
        available: Some(true),
        host_id: Some(host_id),
    }
}

pub async fn listing(state: &AppState, host_id: Uuid, price: &str, max_guests: i32) -> ListingRead {
    listing_service::create_listing(state, listing_payload(host_id, price, max_guests))
        .await
        .expect("create listing")
        .data
        .expect("listing data")
}

pub fn booking_payload(
    listing_id: Uuid,
    guest_id: Uuid,
    check_in: NaiveDate,
    check_out: NaiveDate,
    guests: i32,
) -> BookingPayload {
    BookingPayload {
        listing_id: Some(listing_id),
        guest_id: Some(guest_id),
        check_in: Some(check_in),
        check_out: Some(check_out),
        number_of_guests: Some(guests),
        ..Default::default()
    }
}

pub async fn booking(
    state: &AppState,
    listing_id: Uuid,
    guest_id: Uuid,
    check_in: NaiveDate,
    check_out: NaiveDate,
) -> BookingRead {
    booking_service::create_booking(
        state,
        booking_payload(listing_id, guest_id, check_in, check_out, 1),
    )
    .await
    .expect("create booking")
    .data
    .expect("booking data")
}

pub fn review_payload(listing_id: Uuid, guest_id: Uuid, rating: i32) -> ReviewPayload {
    ReviewPayload {
        listing_id: Some(listing_id),
        guest_id: Some(guest_id),
        rating: Some(rating),
        comment: Some("Lovely stay.".into()),
    }
}

pub async fn review(state: &AppState, listing_id: Uuid, guest_id: Uuid, rating: i32) -> ReviewRead {
    review_service::create_review(state, review_payload(listing_id, guest_id, rating))
        .await
        .expect("create review")
        .data
        .expect("review data")
}

/// Unwraps the field errors of a validation failure.
pub fn field_errors(err: AppError) -> FieldErrors {
    match err {
        AppError::Validation(errors) => errors,
        other => panic!("expected a validation error, got {other:?}"),
    }
}
