//! Builds read representations. Related rows are fetched in batches and
//! derived fields are computed here, never read from the store.

use std::collections::HashMap;

use anyhow::anyhow;
use uuid::Uuid;

use crate::{
    dto::{
        bookings::BookingRead, listings::ListingRead, reviews::ReviewRead, users::UserSummary,
    },
    error::{AppError, AppResult},
    models::{Booking, Listing, Review},
    state::AppState,
};

fn unique_ids(ids: impl Iterator<Item = Uuid>) -> Vec<Uuid> {
    let mut ids: Vec<Uuid> = ids.collect();
    ids.sort();
    ids.dedup();
    ids
}

async fn user_index(state: &AppState, ids: &[Uuid]) -> AppResult<HashMap<Uuid, UserSummary>> {
    Ok(state
        .users
        .get_many(ids)
        .await?
        .iter()
        .map(|user| (user.id, UserSummary::from(user)))
        .collect())
}

fn summary(users: &HashMap<Uuid, UserSummary>, id: Uuid) -> AppResult<UserSummary> {
    users
        .get(&id)
        .cloned()
        .ok_or_else(|| AppError::Internal(anyhow!("user {id} referenced but missing")))
}

fn single<T>(items: Vec<T>) -> AppResult<T> {
    items
        .into_iter()
        .next()
        .ok_or_else(|| AppError::Internal(anyhow!("rendering produced no item")))
}

pub async fn render_reviews(state: &AppState, reviews: Vec<Review>) -> AppResult<Vec<ReviewRead>> {
    let guest_ids = unique_ids(reviews.iter().map(|r| r.fields.guest_id));
    let users = user_index(state, &guest_ids).await?;
    reviews
        .into_iter()
        .map(|review| {
            let guest = summary(&users, review.fields.guest_id)?;
            Ok(ReviewRead::new(review, guest))
        })
        .collect()
}

pub async fn render_review(state: &AppState, review: Review) -> AppResult<ReviewRead> {
    single(render_reviews(state, vec![review]).await?)
}

pub async fn render_listings(
    state: &AppState,
    listings: Vec<Listing>,
) -> AppResult<Vec<ListingRead>> {
    let listing_ids: Vec<Uuid> = listings.iter().map(|l| l.id).collect();
    let reviews = state.reviews.list_for_listings(&listing_ids).await?;
    let user_ids = unique_ids(
        listings
            .iter()
            .map(|l| l.fields.host_id)
            .chain(reviews.iter().map(|r| r.fields.guest_id)),
    );
    let users = user_index(state, &user_ids).await?;

    let mut by_listing: HashMap<Uuid, Vec<ReviewRead>> = HashMap::new();
    for review in reviews {
        let guest = summary(&users, review.fields.guest_id)?;
        by_listing
            .entry(review.fields.listing_id)
            .or_default()
            .push(ReviewRead::new(review, guest));
    }

    listings
        .into_iter()
        .map(|listing| {
            let host = summary(&users, listing.fields.host_id)?;
            let reviews = by_listing.remove(&listing.id).unwrap_or_default();
            Ok(ListingRead::new(listing, host, reviews))
        })
        .collect()
}

pub async fn render_listing(state: &AppState, listing: Listing) -> AppResult<ListingRead> {
    single(render_listings(state, vec![listing]).await?)
}

pub async fn render_bookings(
    state: &AppState,
    bookings: Vec<Booking>,
) -> AppResult<Vec<BookingRead>> {
    let listing_ids = unique_ids(bookings.iter().map(|b| b.fields.listing_id));
    let listings = state.listings.get_many(&listing_ids).await?;
    let listings: HashMap<Uuid, ListingRead> = render_listings(state, listings)
        .await?
        .into_iter()
        .map(|listing| (listing.id, listing))
        .collect();

    let guest_ids = unique_ids(bookings.iter().map(|b| b.fields.guest_id));
    let users = user_index(state, &guest_ids).await?;

    bookings
        .into_iter()
        .map(|booking| {
            let listing_id = booking.fields.listing_id;
            let listing = listings.get(&listing_id).cloned().ok_or_else(|| {
                AppError::Internal(anyhow!("listing {listing_id} referenced but missing"))
            })?;
            let guest = summary(&users, booking.fields.guest_id)?;
            Ok(BookingRead::new(booking, listing, guest))
        })
        .collect()
}

pub async fn render_booking(state: &AppState, booking: Booking) -> AppResult<BookingRead> {
    single(render_bookings(state, vec![booking]).await?)
}
