mod common;

use common::{booking, date, dec, field_errors, listing, listing_payload, review, user};
use stay_api::{
    dto::listings::ListingPayload,
    error::AppError,
    routes::params::ListingQuery,
    services::{WriteMode, listing_service},
    state::AppState,
    validation::REQUIRED,
};
use uuid::Uuid;

#[tokio::test]
async fn create_listing_fills_defaults_and_embeds_host() {
    let state = AppState::in_memory();
    let host = user(&state, "host").await;

    let mut payload = listing_payload(host.id, "150", 4);
    payload.available = None;
    let resp = listing_service::create_listing(&state, payload).await.unwrap();
    assert_eq!(resp.message, "Listing created");

    let listing = resp.data.unwrap();
    assert!(listing.available);
    assert_eq!(listing.price_per_night.to_string(), "150.00");
    assert_eq!(listing.host.username, "host");
    assert!(listing.reviews.is_empty());
    assert_eq!(listing.average_rating, None);
}

#[tokio::test]
async fn create_listing_reports_every_missing_field() {
    let state = AppState::in_memory();

    let err = listing_service::create_listing(&state, ListingPayload::default())
        .await
        .unwrap_err();
    let errors = field_errors(err);
    for field in [
        "title",
        "description",
        "location",
        "price_per_night",
        "number_of_bedrooms",
        "number_of_bathrooms",
        "max_guests",
        "host_id",
    ] {
        assert_eq!(errors.messages(field), [REQUIRED], "field {field}");
    }
    assert!(!errors.contains("available"));
}

#[tokio::test]
async fn create_listing_rejects_bad_prices_counts_and_hosts() {
    let state = AppState::in_memory();
    let host = user(&state, "host").await;

    let mut payload = listing_payload(host.id, "0", 0);
    payload.number_of_bedrooms = Some(-1);
    let errors = field_errors(listing_service::create_listing(&state, payload).await.unwrap_err());
    assert_eq!(
        errors.messages("price_per_night"),
        ["Price per night must be greater than zero."]
    );
    assert_eq!(errors.messages("max_guests"), ["Maximum guests must be at least 1."]);
    assert!(errors.contains("number_of_bedrooms"));

    let stranger = Uuid::new_v4();
    let errors = field_errors(
        listing_service::create_listing(&state, listing_payload(stranger, "99", 2))
            .await
            .unwrap_err(),
    );
    assert_eq!(
        errors.messages("host_id"),
        [format!("Invalid pk \"{stranger}\" - object does not exist.")]
    );
    assert_eq!(state.listings.count().await.unwrap(), 0);
}

#[tokio::test]
async fn list_filters_by_price_range_location_and_availability() {
    let state = AppState::in_memory();
    let host = user(&state, "host").await;

    let cheap = listing(&state, host.id, "40", 2).await;
    let middle = listing(&state, host.id, "150", 2).await;
    let pricey = listing(&state, host.id, "250", 2).await;

    let query = ListingQuery {
        min_price: Some("50".into()),
        max_price: Some("200".into()),
        ..Default::default()
    };
    let resp = listing_service::list_listings(&state, query).await.unwrap();
    let ids: Vec<Uuid> = resp.data.unwrap().items.iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![middle.id]);
    assert_eq!(resp.meta.unwrap().total, Some(1));

    let patch = ListingPayload {
        location: Some("Miami, FL".into()),
        available: Some(false),
        ..Default::default()
    };
    listing_service::update_listing(&state, pricey.id, patch, WriteMode::Merge)
        .await
        .unwrap();

    let query = ListingQuery {
        location: Some("miami".into()),
        ..Default::default()
    };
    let items = listing_service::list_listings(&state, query)
        .await
        .unwrap()
        .data
        .unwrap()
        .items;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, pricey.id);

    let query = ListingQuery {
        available: Some("true".into()),
        ..Default::default()
    };
    let ids: Vec<Uuid> = listing_service::list_listings(&state, query)
        .await
        .unwrap()
        .data
        .unwrap()
        .items
        .iter()
        .map(|l| l.id)
        .collect();
    assert_eq!(ids, vec![middle.id, cheap.id]);
}

#[tokio::test]
async fn malformed_price_filter_is_a_validation_error() {
    let state = AppState::in_memory();
    let query = ListingQuery {
        max_price: Some("lots".into()),
        ..Default::default()
    };
    let errors = field_errors(listing_service::list_listings(&state, query).await.unwrap_err());
    assert_eq!(errors.messages("max_price"), ["Enter a valid number."]);
}

#[tokio::test]
async fn average_rating_is_the_mean_of_reviews() {
    let state = AppState::in_memory();
    let host = user(&state, "host").await;
    let ann = user(&state, "ann").await;
    let ben = user(&state, "ben").await;
    let flat = listing(&state, host.id, "120", 2).await;

    review(&state, flat.id, ann.id, 3).await;
    review(&state, flat.id, ben.id, 5).await;

    let listing = listing_service::get_listing(&state, flat.id)
        .await
        .unwrap()
        .data
        .unwrap();
    assert_eq!(listing.average_rating, Some(4.0));
    assert_eq!(listing.reviews.len(), 2);
    assert!(listing.reviews.iter().all(|r| r.listing == flat.id));
}

#[tokio::test]
async fn put_requires_all_fields_but_patch_merges() {
    let state = AppState::in_memory();
    let host = user(&state, "host").await;
    let flat = listing(&state, host.id, "120", 2).await;

    let partial = ListingPayload {
        title: Some("Renamed".into()),
        ..Default::default()
    };
    let errors = field_errors(
        listing_service::update_listing(&state, flat.id, partial.clone(), WriteMode::Replace)
            .await
            .unwrap_err(),
    );
    assert!(errors.contains("description"));
    assert!(!errors.contains("title"));

    let patched = listing_service::update_listing(&state, flat.id, partial, WriteMode::Merge)
        .await
        .unwrap()
        .data
        .unwrap();
    assert_eq!(patched.title, "Renamed");
    assert_eq!(patched.price_per_night, dec("120.00"));
    assert_eq!(patched.created_at, flat.created_at);
    assert!(patched.updated_at >= flat.updated_at);

    let bad = ListingPayload {
        price_per_night: Some(dec("-5")),
        ..Default::default()
    };
    let errors = field_errors(
        listing_service::update_listing(&state, flat.id, bad, WriteMode::Merge)
            .await
            .unwrap_err(),
    );
    assert!(errors.contains("price_per_night"));
}

#[tokio::test]
async fn deleting_a_listing_removes_its_bookings_and_reviews() {
    let state = AppState::in_memory();
    let host = user(&state, "host").await;
    let guest = user(&state, "guest").await;
    let flat = listing(&state, host.id, "100", 2).await;
    let other = listing(&state, host.id, "90", 2).await;

    booking(&state, flat.id, guest.id, date(2025, 5, 1), date(2025, 5, 3)).await;
    let kept = booking(&state, other.id, guest.id, date(2025, 6, 1), date(2025, 6, 3)).await;
    review(&state, flat.id, guest.id, 4).await;

    listing_service::delete_listing(&state, flat.id).await.unwrap();

    assert!(matches!(
        listing_service::get_listing(&state, flat.id).await,
        Err(AppError::NotFound)
    ));
    assert_eq!(state.bookings.count().await.unwrap(), 1);
    assert!(state.bookings.get(kept.id).await.unwrap().is_some());
    assert_eq!(state.reviews.count().await.unwrap(), 0);
    assert_eq!(state.users.count().await.unwrap(), 2);

    assert!(matches!(
        listing_service::delete_listing(&state, flat.id).await,
        Err(AppError::NotFound)
    ));
}

#[tokio::test]
async fn whitespace_only_text_is_blank() {
    let state = AppState::in_memory();
    let host = user(&state, "host").await;

    let mut payload = listing_payload(host.id, "80", 2);
    payload.title = Some("   ".into());
    payload.location = Some("\t".into());
    let errors = field_errors(listing_service::create_listing(&state, payload).await.unwrap_err());
    assert_eq!(errors.messages("title"), ["This field may not be blank."]);
    assert_eq!(errors.messages("location"), ["This field may not be blank."]);

    let mut payload = listing_payload(host.id, "80", 2);
    payload.title = Some("  Harbour Flat  ".into());
    let created = listing_service::create_listing(&state, payload)
        .await
        .unwrap()
        .data
        .unwrap();
    assert_eq!(created.title, "Harbour Flat");
}
