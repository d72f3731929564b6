mod common;

use common::{field_errors, listing, review, review_payload, user};
use stay_api::{
    dto::reviews::ReviewPayload,
    error::AppError,
    routes::params::ReviewQuery,
    services::{WriteMode, review_service},
    state::AppState,
    validation::{DUPLICATE_REVIEW, NON_FIELD},
};

#[tokio::test]
async fn rating_must_be_between_one_and_five() {
    let state = AppState::in_memory();
    let host = user(&state, "host").await;
    let guest = user(&state, "guest").await;
    let flat = listing(&state, host.id, "100", 2).await;

    for rating in [0, 6, -3] {
        let errors = field_errors(
            review_service::create_review(&state, review_payload(flat.id, guest.id, rating))
                .await
                .unwrap_err(),
        );
        assert_eq!(errors.messages("rating"), ["Rating must be between 1 and 5."]);
    }

    for rating in 1..=5 {
        let guest = user(&state, &format!("guest{rating}")).await;
        let created = review(&state, flat.id, guest.id, rating).await;
        assert_eq!(created.rating, rating);
        assert_eq!(created.listing, flat.id);
    }
}

#[tokio::test]
async fn blank_comment_is_rejected() {
    let state = AppState::in_memory();
    let host = user(&state, "host").await;
    let guest = user(&state, "guest").await;
    let flat = listing(&state, host.id, "100", 2).await;

    let mut payload = review_payload(flat.id, guest.id, 4);
    payload.comment = Some(String::new());
    let errors = field_errors(review_service::create_review(&state, payload).await.unwrap_err());
    assert_eq!(errors.messages("comment"), ["This field may not be blank."]);

    let mut payload = review_payload(flat.id, guest.id, 4);
    payload.comment = Some(" \n  ".into());
    let errors = field_errors(review_service::create_review(&state, payload).await.unwrap_err());
    assert_eq!(errors.messages("comment"), ["This field may not be blank."]);
}

#[tokio::test]
async fn one_review_per_guest_and_listing() {
    let state = AppState::in_memory();
    let host = user(&state, "host").await;
    let guest = user(&state, "guest").await;
    let flat = listing(&state, host.id, "100", 2).await;
    let loft = listing(&state, host.id, "90", 2).await;

    let first = review(&state, flat.id, guest.id, 4).await;

    let errors = field_errors(
        review_service::create_review(&state, review_payload(flat.id, guest.id, 2))
            .await
            .unwrap_err(),
    );
    assert_eq!(errors.messages(NON_FIELD), [DUPLICATE_REVIEW]);
    assert_eq!(state.reviews.count().await.unwrap(), 1);

    let other = review(&state, loft.id, guest.id, 5).await;

    // Keeping its own pair is fine; taking another review's pair is not.
    let edit = ReviewPayload {
        rating: Some(5),
        ..Default::default()
    };
    let edited = review_service::update_review(&state, first.id, edit, WriteMode::Merge)
        .await
        .unwrap()
        .data
        .unwrap();
    assert_eq!(edited.rating, 5);

    let steal = ReviewPayload {
        listing_id: Some(flat.id),
        ..Default::default()
    };
    let errors = field_errors(
        review_service::update_review(&state, other.id, steal, WriteMode::Merge)
            .await
            .unwrap_err(),
    );
    assert_eq!(errors.messages(NON_FIELD), [DUPLICATE_REVIEW]);
}

#[tokio::test]
async fn put_replaces_and_delete_removes() {
    let state = AppState::in_memory();
    let host = user(&state, "host").await;
    let guest = user(&state, "guest").await;
    let flat = listing(&state, host.id, "100", 2).await;
    let first = review(&state, flat.id, guest.id, 4).await;

    let mut replacement = review_payload(flat.id, guest.id, 2);
    replacement.comment = Some("Noisy at night.".into());
    let replaced = review_service::update_review(&state, first.id, replacement, WriteMode::Replace)
        .await
        .unwrap()
        .data
        .unwrap();
    assert_eq!(replaced.rating, 2);
    assert_eq!(replaced.comment, "Noisy at night.");
    assert_eq!(replaced.guest.id, guest.id);

    review_service::delete_review(&state, first.id).await.unwrap();
    assert!(matches!(
        review_service::get_review(&state, first.id).await,
        Err(AppError::NotFound)
    ));
}

#[tokio::test]
async fn list_filters_by_listing_and_guest() {
    let state = AppState::in_memory();
    let host = user(&state, "host").await;
    let ann = user(&state, "ann").await;
    let ben = user(&state, "ben").await;
    let flat = listing(&state, host.id, "100", 2).await;
    let loft = listing(&state, host.id, "90", 2).await;

    review(&state, flat.id, ann.id, 4).await;
    review(&state, flat.id, ben.id, 3).await;
    review(&state, loft.id, ann.id, 5).await;

    let query = ReviewQuery {
        listing_id: Some(flat.id.to_string()),
        guest_id: None,
    };
    let resp = review_service::list_reviews(&state, query).await.unwrap();
    assert_eq!(resp.meta.unwrap().total, Some(2));

    let query = ReviewQuery {
        listing_id: None,
        guest_id: Some(ann.id.to_string()),
    };
    let items = review_service::list_reviews(&state, query)
        .await
        .unwrap()
        .data
        .unwrap()
        .items;
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|r| r.guest.username == "ann"));

    let query = ReviewQuery {
        listing_id: Some("nope".into()),
        guest_id: None,
    };
    let errors = field_errors(review_service::list_reviews(&state, query).await.unwrap_err());
    assert_eq!(errors.messages("listing_id"), ["Must be a valid UUID."]);
}
