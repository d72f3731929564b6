//! Fixed sample dataset for local development and demos.

use anyhow::anyhow;
use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    error::{AppError, AppResult},
    models::{BookingFields, BookingStatus, Listing, ListingFields, NewUser, ReviewFields, User},
    state::AppState,
};

const USERS: [(&str, &str, &str, &str); 4] = [
    ("john_host", "john@example.com", "John", "Doe"),
    ("jane_host", "jane@example.com", "Jane", "Smith"),
    ("bob_guest", "bob@example.com", "Bob", "Johnson"),
    ("alice_guest", "alice@example.com", "Alice", "Williams"),
];

struct SampleListing {
    title: &'static str,
    description: &'static str,
    location: &'static str,
    price_cents: i64,
    bedrooms: i32,
    bathrooms: i32,
    max_guests: i32,
    available: bool,
    host: usize,
}

const LISTINGS: [SampleListing; 5] = [
    SampleListing {
        title: "Cozy Downtown Apartment",
        description: "A beautiful apartment in the heart of the city with modern amenities and stunning views.",
        location: "New York, NY",
        price_cents: 15000,
        bedrooms: 2,
        bathrooms: 1,
        max_guests: 4,
        available: true,
        host: 0,
    },
    SampleListing {
        title: "Beachfront Villa",
        description: "Luxurious villa right on the beach with private pool and direct ocean access.",
        location: "Miami, FL",
        price_cents: 35000,
        bedrooms: 4,
        bathrooms: 3,
        max_guests: 8,
        available: true,
        host: 0,
    },
    SampleListing {
        title: "Mountain Cabin Retreat",
        description: "Peaceful cabin surrounded by nature, perfect for a quiet getaway.",
        location: "Aspen, CO",
        price_cents: 20000,
        bedrooms: 3,
        bathrooms: 2,
        max_guests: 6,
        available: true,
        host: 1,
    },
    SampleListing {
        title: "Urban Loft Studio",
        description: "Modern loft in trendy neighborhood with easy access to restaurants and shops.",
        location: "San Francisco, CA",
        price_cents: 12000,
        bedrooms: 1,
        bathrooms: 1,
        max_guests: 2,
        available: true,
        host: 1,
    },
    SampleListing {
        title: "Historic Townhouse",
        description: "Charming townhouse with classic architecture and modern updates.",
        location: "Boston, MA",
        price_cents: 18000,
        bedrooms: 3,
        bathrooms: 2,
        max_guests: 5,
        available: false,
        host: 0,
    },
];

/// (listing, guest, check-in offset, check-out offset, guests, total cents, status).
/// Offsets are days relative to the run date.
const BOOKINGS: [(usize, usize, i64, i64, i32, i64, BookingStatus); 4] = [
    (0, 2, 7, 10, 2, 45000, BookingStatus::Confirmed),
    (1, 3, 14, 21, 4, 245000, BookingStatus::Pending),
    (2, 2, -10, -5, 3, 100000, BookingStatus::Completed),
    (3, 3, 3, 5, 1, 24000, BookingStatus::Confirmed),
];

const REVIEWS: [(usize, usize, i32, &str); 4] = [
    (
        0,
        2,
        5,
        "Amazing place! Very clean and exactly as described. Great location.",
    ),
    (
        1,
        3,
        4,
        "Beautiful villa with stunning ocean views. A bit pricey but worth it.",
    ),
    (
        2,
        2,
        5,
        "Perfect mountain getaway. So peaceful and relaxing. Highly recommend!",
    ),
    (
        0,
        3,
        4,
        "Great apartment in a convenient location. Would stay again.",
    ),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub users: usize,
    pub listings: usize,
    pub bookings: usize,
    pub reviews: usize,
}

/// Removes every booking, review, listing and user.
pub async fn clear_all(state: &AppState) -> AppResult<()> {
    let bookings = state.bookings.delete_all().await?;
    let reviews = state.reviews.delete_all().await?;
    let listings = state.listings.delete_all().await?;
    let users = state.users.delete_all().await?;
    tracing::info!(bookings, reviews, listings, users, "store cleared");
    Ok(())
}

/// Inserts the sample dataset. Users are looked up by username first, so a
/// second run reuses them; listings, bookings and reviews are always added.
pub async fn seed(state: &AppState, clear: bool, today: NaiveDate) -> AppResult<SeedSummary> {
    if clear {
        clear_all(state).await?;
    }

    let users = seed_users(state).await?;
    let listings = seed_listings(state, &users).await?;

    let mut bookings = 0;
    for (listing, guest, from, to, guests, total_cents, status) in BOOKINGS {
        let fields = BookingFields {
            listing_id: listings[listing].id,
            guest_id: users[guest].id,
            check_in: shift(today, from)?,
            check_out: shift(today, to)?,
            number_of_guests: guests,
            total_price: Decimal::new(total_cents, 2),
            status,
        };
        state.bookings.create(fields).await?;
        bookings += 1;
    }

    let mut reviews = 0;
    for (listing, guest, rating, comment) in REVIEWS {
        let fields = ReviewFields {
            listing_id: listings[listing].id,
            guest_id: users[guest].id,
            rating,
            comment: comment.to_string(),
        };
        state.reviews.create(fields).await?;
        reviews += 1;
    }

    let summary = SeedSummary {
        users: users.len(),
        listings: listings.len(),
        bookings,
        reviews,
    };
    tracing::info!(?summary, "sample data seeded");
    Ok(summary)
}

async fn seed_users(state: &AppState) -> AppResult<Vec<User>> {
    let mut users = Vec::with_capacity(USERS.len());
    for (username, email, first_name, last_name) in USERS {
        let user = match state.users.get_by_username(username).await? {
            Some(existing) => existing,
            None => {
                state
                    .users
                    .create(NewUser {
                        username: username.to_string(),
                        email: email.to_string(),
                        first_name: first_name.to_string(),
                        last_name: last_name.to_string(),
                    })
                    .await?
            }
        };
        users.push(user);
    }
    Ok(users)
}

async fn seed_listings(state: &AppState, users: &[User]) -> AppResult<Vec<Listing>> {
    let mut listings = Vec::with_capacity(LISTINGS.len());
    for sample in &LISTINGS {
        let fields = ListingFields {
            title: sample.title.to_string(),
            description: sample.description.to_string(),
            location: sample.location.to_string(),
            price_per_night: Decimal::new(sample.price_cents, 2),
            number_of_bedrooms: sample.bedrooms,
            number_of_bathrooms: sample.bathrooms,
            max_guests: sample.max_guests,
            available: sample.available,
            host_id: users[sample.host].id,
        };
        listings.push(state.listings.create(fields).await?);
    }
    Ok(listings)
}

fn shift(today: NaiveDate, days: i64) -> AppResult<NaiveDate> {
    let delta = Days::new(days.unsigned_abs());
    let shifted = if days >= 0 {
        today.checked_add_days(delta)
    } else {
        today.checked_sub_days(delta)
    };
    shifted.ok_or_else(|| AppError::Internal(anyhow!("date out of range: {today} {days:+}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_bookings_fit_their_listings() {
        for (listing, _, from, to, guests, _, _) in BOOKINGS {
            assert!(to > from);
            assert!(guests <= LISTINGS[listing].max_guests);
        }
    }

    #[test]
    fn shift_moves_both_directions() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        assert_eq!(shift(today, 7).unwrap(), NaiveDate::from_ymd_opt(2024, 3, 17).unwrap());
        assert_eq!(shift(today, -10).unwrap(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }
}
