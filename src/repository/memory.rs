use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        Booking, BookingFields, Listing, ListingFields, NewUser, Review, ReviewFields, User,
    },
    repository::{
        BookingFilter, BookingRepository, ListingFilter, ListingRepository, ReviewFilter,
        ReviewRepository, UserRepository,
    },
    validation::DUPLICATE_REVIEW,
};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    listings: Vec<Listing>,
    bookings: Vec<Booking>,
    reviews: Vec<Review>,
}

impl Tables {
    fn remove_listings_where(&mut self, doomed: impl Fn(&Listing) -> bool) -> u64 {
        let ids: Vec<Uuid> = self
            .listings
            .iter()
            .filter(|l| doomed(l))
            .map(|l| l.id)
            .collect();
        self.listings.retain(|l| !ids.contains(&l.id));
        self.bookings.retain(|b| !ids.contains(&b.fields.listing_id));
        self.reviews.retain(|r| !ids.contains(&r.fields.listing_id));
        ids.len() as u64
    }

    fn pair_taken(&self, fields: &ReviewFields, except: Option<Uuid>) -> bool {
        self.reviews.iter().any(|r| {
            Some(r.id) != except
                && r.fields.listing_id == fields.listing_id
                && r.fields.guest_id == fields.guest_id
        })
    }
}

/// Process-local store. Rows are kept in insertion order and read back
/// newest first. Deleting a listing or a user cascades like the SQL schema.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn get(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.tables.read().users.iter().find(|u| u.id == id).cloned())
    }

    async fn get_many(&self, ids: &[Uuid]) -> AppResult<Vec<User>> {
        let tables = self.tables.read();
        Ok(tables
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn get_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let tables = self.tables.read();
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn create(&self, user: NewUser) -> AppResult<User> {
        let mut tables = self.tables.write();
        if tables.users.iter().any(|u| u.username == user.username) {
            return Err(AppError::Conflict(format!(
                "username \"{}\" already exists",
                user.username
            )));
        }
        let user = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.tables.read().users.len() as u64)
    }

    async fn delete_all(&self) -> AppResult<u64> {
        let mut tables = self.tables.write();
        let removed = tables.users.len() as u64;
        *tables = Tables::default();
        Ok(removed)
    }
}

#[async_trait]
impl ListingRepository for MemoryStore {
    async fn list(&self, filter: &ListingFilter) -> AppResult<Vec<Listing>> {
        let tables = self.tables.read();
        Ok(tables
            .listings
            .iter()
            .rev()
            .filter(|l| filter.matches(l))
            .cloned()
            .collect())
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<Listing>> {
        Ok(self.tables.read().listings.iter().find(|l| l.id == id).cloned())
    }

    async fn get_many(&self, ids: &[Uuid]) -> AppResult<Vec<Listing>> {
        let tables = self.tables.read();
        Ok(tables
            .listings
            .iter()
            .rev()
            .filter(|l| ids.contains(&l.id))
            .cloned()
            .collect())
    }

    async fn create(&self, fields: ListingFields) -> AppResult<Listing> {
        let now = Utc::now();
        let listing = Listing {
            id: Uuid::new_v4(),
            fields,
            created_at: now,
            updated_at: now,
        };
        self.tables.write().listings.push(listing.clone());
        Ok(listing)
    }

    async fn update(&self, id: Uuid, fields: ListingFields) -> AppResult<Option<Listing>> {
        let mut tables = self.tables.write();
        let Some(listing) = tables.listings.iter_mut().find(|l| l.id == id) else {
            return Ok(None);
        };
        listing.fields = fields;
        listing.updated_at = Utc::now();
        Ok(Some(listing.clone()))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.tables.write().remove_listings_where(|l| l.id == id) > 0)
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.tables.read().listings.len() as u64)
    }

    async fn delete_all(&self) -> AppResult<u64> {
        Ok(self.tables.write().remove_listings_where(|_| true))
    }
}

#[async_trait]
impl BookingRepository for MemoryStore {
    async fn list(&self, filter: &BookingFilter) -> AppResult<Vec<Booking>> {
        let tables = self.tables.read();
        Ok(tables
            .bookings
            .iter()
            .rev()
            .filter(|b| filter.matches(b))
            .cloned()
            .collect())
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<Booking>> {
        Ok(self.tables.read().bookings.iter().find(|b| b.id == id).cloned())
    }

    async fn create(&self, fields: BookingFields) -> AppResult<Booking> {
        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4(),
            fields,
            created_at: now,
            updated_at: now,
        };
        self.tables.write().bookings.push(booking.clone());
        Ok(booking)
    }

    async fn update(&self, id: Uuid, fields: BookingFields) -> AppResult<Option<Booking>> {
        let mut tables = self.tables.write();
        let Some(booking) = tables.bookings.iter_mut().find(|b| b.id == id) else {
            return Ok(None);
        };
        booking.fields = fields;
        booking.updated_at = Utc::now();
        Ok(Some(booking.clone()))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut tables = self.tables.write();
        let before = tables.bookings.len();
        tables.bookings.retain(|b| b.id != id);
        Ok(tables.bookings.len() < before)
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.tables.read().bookings.len() as u64)
    }

    async fn delete_all(&self) -> AppResult<u64> {
        let mut tables = self.tables.write();
        let removed = tables.bookings.len() as u64;
        tables.bookings.clear();
        Ok(removed)
    }
}

#[async_trait]
impl ReviewRepository for MemoryStore {
    async fn list(&self, filter: &ReviewFilter) -> AppResult<Vec<Review>> {
        let tables = self.tables.read();
        Ok(tables
            .reviews
            .iter()
            .rev()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }

    async fn list_for_listings(&self, listing_ids: &[Uuid]) -> AppResult<Vec<Review>> {
        let tables = self.tables.read();
        Ok(tables
            .reviews
            .iter()
            .rev()
            .filter(|r| listing_ids.contains(&r.fields.listing_id))
            .cloned()
            .collect())
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<Review>> {
        Ok(self.tables.read().reviews.iter().find(|r| r.id == id).cloned())
    }

    async fn get_by_pair(&self, listing_id: Uuid, guest_id: Uuid) -> AppResult<Option<Review>> {
        let tables = self.tables.read();
        Ok(tables
            .reviews
            .iter()
            .find(|r| r.fields.listing_id == listing_id && r.fields.guest_id == guest_id)
            .cloned())
    }

    async fn create(&self, fields: ReviewFields) -> AppResult<Review> {
        let mut tables = self.tables.write();
        if tables.pair_taken(&fields, None) {
            return Err(AppError::Conflict(DUPLICATE_REVIEW.into()));
        }
        let now = Utc::now();
        let review = Review {
            id: Uuid::new_v4(),
            fields,
            created_at: now,
            updated_at: now,
        };
        tables.reviews.push(review.clone());
        Ok(review)
    }

    async fn update(&self, id: Uuid, fields: ReviewFields) -> AppResult<Option<Review>> {
        let mut tables = self.tables.write();
        if tables.pair_taken(&fields, Some(id)) {
            return Err(AppError::Conflict(DUPLICATE_REVIEW.into()));
        }
        let Some(review) = tables.reviews.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        review.fields = fields;
        review.updated_at = Utc::now();
        Ok(Some(review.clone()))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut tables = self.tables.write();
        let before = tables.reviews.len();
        tables.reviews.retain(|r| r.id != id);
        Ok(tables.reviews.len() < before)
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.tables.read().reviews.len() as u64)
    }

    async fn delete_all(&self) -> AppResult<u64> {
        let mut tables = self.tables.write();
        let removed = tables.reviews.len() as u64;
        tables.reviews.clear();
        Ok(removed)
    }
}
