//! Store access behind one trait per entity. Services only see these traits;
//! `orm` backs them with Postgres through SeaORM, `memory` with an
//! in-process table set.

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        Booking, BookingFields, BookingStatus, Listing, ListingFields, NewUser, Review,
        ReviewFields, User,
    },
};

pub mod memory;
pub mod orm;

pub use memory::MemoryStore;
pub use orm::OrmStore;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingFilter {
    /// Case-insensitive substring of `location`.
    pub location: Option<String>,
    pub available: Option<bool>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}

impl ListingFilter {
    pub fn matches(&self, listing: &Listing) -> bool {
        let f = &listing.fields;
        if let Some(needle) = &self.location {
            if !f.location.to_lowercase().contains(&needle.to_lowercase()) {
                return false;
            }
        }
        if self.available.is_some_and(|available| f.available != available) {
            return false;
        }
        if self.min_price.is_some_and(|min| f.price_per_night < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| f.price_per_night > max) {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingFilter {
    pub status: Option<BookingStatus>,
    pub guest_id: Option<Uuid>,
    pub listing_id: Option<Uuid>,
}

impl BookingFilter {
    pub fn matches(&self, booking: &Booking) -> bool {
        let f = &booking.fields;
        self.status.is_none_or(|s| f.status == s)
            && self.guest_id.is_none_or(|id| f.guest_id == id)
            && self.listing_id.is_none_or(|id| f.listing_id == id)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewFilter {
    pub listing_id: Option<Uuid>,
    pub guest_id: Option<Uuid>,
}

impl ReviewFilter {
    pub fn matches(&self, review: &Review) -> bool {
        let f = &review.fields;
        self.listing_id.is_none_or(|id| f.listing_id == id)
            && self.guest_id.is_none_or(|id| f.guest_id == id)
    }
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get(&self, id: Uuid) -> AppResult<Option<User>>;
    async fn get_many(&self, ids: &[Uuid]) -> AppResult<Vec<User>>;
    async fn get_by_username(&self, username: &str) -> AppResult<Option<User>>;
    /// Fails with a conflict when the username is taken.
    async fn create(&self, user: NewUser) -> AppResult<User>;
    async fn count(&self) -> AppResult<u64>;
    /// Removes every user together with everything that references them.
    async fn delete_all(&self) -> AppResult<u64>;
}

/// Listings are returned newest first.
#[async_trait]
pub trait ListingRepository: Send + Sync {
    async fn list(&self, filter: &ListingFilter) -> AppResult<Vec<Listing>>;
    async fn get(&self, id: Uuid) -> AppResult<Option<Listing>>;
    async fn get_many(&self, ids: &[Uuid]) -> AppResult<Vec<Listing>>;
    async fn create(&self, fields: ListingFields) -> AppResult<Listing>;
    async fn update(&self, id: Uuid, fields: ListingFields) -> AppResult<Option<Listing>>;
    /// Deletes the listing and cascades to its bookings and reviews.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
    async fn count(&self) -> AppResult<u64>;
    async fn delete_all(&self) -> AppResult<u64>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn list(&self, filter: &BookingFilter) -> AppResult<Vec<Booking>>;
    async fn get(&self, id: Uuid) -> AppResult<Option<Booking>>;
    async fn create(&self, fields: BookingFields) -> AppResult<Booking>;
    async fn update(&self, id: Uuid, fields: BookingFields) -> AppResult<Option<Booking>>;
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
    async fn count(&self) -> AppResult<u64>;
    async fn delete_all(&self) -> AppResult<u64>;
}

/// The store enforces one review per (listing, guest); a second one fails
/// with a conflict.
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn list(&self, filter: &ReviewFilter) -> AppResult<Vec<Review>>;
    async fn list_for_listings(&self, listing_ids: &[Uuid]) -> AppResult<Vec<Review>>;
    async fn get(&self, id: Uuid) -> AppResult<Option<Review>>;
    async fn get_by_pair(&self, listing_id: Uuid, guest_id: Uuid) -> AppResult<Option<Review>>;
    async fn create(&self, fields: ReviewFields) -> AppResult<Review>;
    async fn update(&self, id: Uuid, fields: ReviewFields) -> AppResult<Option<Review>>;
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
    async fn count(&self) -> AppResult<u64>;
    async fn delete_all(&self) -> AppResult<u64>;
}
