//! Write-side rules for listings, bookings and reviews.
//!
//! A request body is first checked field by field (the `validator` derives on
//! the payload types), then merged into a draft. PUT and POST start from an
//! empty draft, PATCH starts from the stored record. Finishing a draft checks
//! required fields and the cross-field rules and yields the columns to persist.

use std::{collections::BTreeMap, fmt};

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::{
    dto::{bookings::BookingPayload, listings::ListingPayload, reviews::ReviewPayload},
    models::{
        Booking, BookingFields, BookingStatus, Listing, ListingFields, Review, ReviewFields,
        nights_between,
    },
};

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";
pub const NON_FIELD: &str = "non_field_errors";
pub const CHECK_OUT_BEFORE_CHECK_IN: &str = "Check-out date must be after check-in date.";
pub const DUPLICATE_REVIEW: &str = "The fields listing, guest must make a unique set.";

const MAX_MONEY: i64 = 100_000_000;

/// Per-field error messages, serialized as `{ "field": ["message", ...] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn messages(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = FieldErrors::new();
        for (field, list) in errors.field_errors() {
            for error in list.iter() {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                out.add(field.to_string(), message);
            }
        }
        out
    }
}

/// Field-level checks declared on a payload type.
pub fn check_payload<T: Validate>(payload: &T) -> FieldErrors {
    match payload.validate() {
        Ok(()) => FieldErrors::new(),
        Err(errors) => errors.into(),
    }
}

/// Message for a relation id that points at nothing.
pub fn missing_reference(id: Uuid) -> String {
    format!("Invalid pk \"{id}\" - object does not exist.")
}

fn required<T>(errors: &mut FieldErrors, field: &str, value: Option<T>) -> Option<T> {
    if value.is_none() {
        errors.add(field, REQUIRED);
    }
    value
}

/// Required text, trimmed; whitespace-only counts as blank.
fn required_text(errors: &mut FieldErrors, field: &str, value: Option<String>) -> Option<String> {
    let value = required(errors, field, value)?;
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, BLANK);
        return None;
    }
    Some(value.to_string())
}

/// Positive, at most 8 integer digits and 2 decimal places.
fn check_money(errors: &mut FieldErrors, field: &str, label: &str, value: Decimal) {
    if value <= Decimal::ZERO {
        errors.add(field, format!("{label} must be greater than zero."));
    }
    if value.normalize().scale() > 2 {
        errors.add(field, "Ensure that there are no more than 2 decimal places.");
    }
    if value.trunc().abs() >= Decimal::from(MAX_MONEY) {
        errors.add(
            field,
            "Ensure that there are no more than 8 digits before the decimal point.",
        );
    }
}

/// Stores money with two decimal places, e.g. `150` becomes `150.00`.
pub fn money(value: Decimal) -> Decimal {
    let mut value = value;
    value.rescale(2);
    value
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub price_per_night: Option<Decimal>,
    pub number_of_bedrooms: Option<i32>,
    pub number_of_bathrooms: Option<i32>,
    pub max_guests: Option<i32>,
    pub available: Option<bool>,
    pub host_id: Option<Uuid>,
}

impl From<&Listing> for ListingDraft {
    fn from(listing: &Listing) -> Self {
        let f = &listing.fields;
        Self {
            title: Some(f.title.clone()),
            description: Some(f.description.clone()),
            location: Some(f.location.clone()),
            price_per_night: Some(f.price_per_night),
            number_of_bedrooms: Some(f.number_of_bedrooms),
            number_of_bathrooms: Some(f.number_of_bathrooms),
            max_guests: Some(f.max_guests),
            available: Some(f.available),
            host_id: Some(f.host_id),
        }
    }
}

impl ListingDraft {
    pub fn apply(&mut self, payload: ListingPayload) {
        if payload.title.is_some() {
            self.title = payload.title;
        }
        if payload.description.is_some() {
            self.description = payload.description;
        }
        if payload.location.is_some() {
            self.location = payload.location;
        }
        if payload.price_per_night.is_some() {
            self.price_per_night = payload.price_per_night;
        }
        if payload.number_of_bedrooms.is_some() {
            self.number_of_bedrooms = payload.number_of_bedrooms;
        }
        if payload.number_of_bathrooms.is_some() {
            self.number_of_bathrooms = payload.number_of_bathrooms;
        }
        if payload.max_guests.is_some() {
            self.max_guests = payload.max_guests;
        }
        if payload.available.is_some() {
            self.available = payload.available;
        }
        if payload.host_id.is_some() {
            self.host_id = payload.host_id;
        }
    }

    /// Checks required fields and prices. `available` defaults to true.
    pub fn finish(self, errors: &mut FieldErrors) -> Option<ListingFields> {
        let title = required_text(errors, "title", self.title);
        let description = required_text(errors, "description", self.description);
        let location = required_text(errors, "location", self.location);
        let price_per_night = required(errors, "price_per_night", self.price_per_night);
        let number_of_bedrooms = required(errors, "number_of_bedrooms", self.number_of_bedrooms);
        let number_of_bathrooms =
            required(errors, "number_of_bathrooms", self.number_of_bathrooms);
        let max_guests = required(errors, "max_guests", self.max_guests);
        let host_id = required(errors, "host_id", self.host_id);

        if let Some(price) = price_per_night {
            check_money(errors, "price_per_night", "Price per night", price);
        }

        match (
            title,
            description,
            location,
            price_per_night,
            number_of_bedrooms,
            number_of_bathrooms,
            max_guests,
            host_id,
        ) {
            (
                Some(title),
                Some(description),
                Some(location),
                Some(price_per_night),
                Some(number_of_bedrooms),
                Some(number_of_bathrooms),
                Some(max_guests),
                Some(host_id),
            ) if errors.is_empty() => Some(ListingFields {
                title,
                description,
                location,
                price_per_night: money(price_per_night),
                number_of_bedrooms,
                number_of_bathrooms,
                max_guests,
                available: self.available.unwrap_or(true),
                host_id,
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingDraft {
    pub listing_id: Option<Uuid>,
    pub guest_id: Option<Uuid>,
    pub check_in: Option<chrono::NaiveDate>,
    pub check_out: Option<chrono::NaiveDate>,
    pub number_of_guests: Option<i32>,
    pub total_price: Option<Decimal>,
    pub status: Option<BookingStatus>,
}

impl From<&Booking> for BookingDraft {
    fn from(booking: &Booking) -> Self {
        let f = &booking.fields;
        Self {
            listing_id: Some(f.listing_id),
            guest_id: Some(f.guest_id),
            check_in: Some(f.check_in),
            check_out: Some(f.check_out),
            number_of_guests: Some(f.number_of_guests),
            total_price: Some(f.total_price),
            status: Some(f.status),
        }
    }
}

impl BookingDraft {
    /// Moving the stay without naming a price drops the stored total so
    /// `finish` derives it from the new nights.
    pub fn apply(&mut self, payload: BookingPayload) {
        let moves_stay = payload.check_in.is_some()
            || payload.check_out.is_some()
            || payload.listing_id.is_some();
        if moves_stay && payload.total_price.is_none() {
            self.total_price = None;
        }
        if payload.listing_id.is_some() {
            self.listing_id = payload.listing_id;
        }
        if payload.guest_id.is_some() {
            self.guest_id = payload.guest_id;
        }
        if payload.check_in.is_some() {
            self.check_in = payload.check_in;
        }
        if payload.check_out.is_some() {
            self.check_out = payload.check_out;
        }
        if payload.number_of_guests.is_some() {
            self.number_of_guests = payload.number_of_guests;
        }
        if payload.total_price.is_some() {
            self.total_price = payload.total_price;
        }
        if payload.status.is_some() {
            self.status = payload.status;
        }
    }

    /// `listing` is the record `listing_id` points at, when it exists.
    ///
    /// Rejects check_out <= check_in and a guest count above the listing's
    /// capacity. A missing total price is derived from the nightly rate.
    pub fn finish(self, listing: Option<&Listing>, errors: &mut FieldErrors) -> Option<BookingFields> {
        let listing_id = required(errors, "listing_id", self.listing_id);
        let guest_id = required(errors, "guest_id", self.guest_id);
        let check_in = required(errors, "check_in", self.check_in);
        let check_out = required(errors, "check_out", self.check_out);
        let number_of_guests = required(errors, "number_of_guests", self.number_of_guests);

        let nights = match (check_in, check_out) {
            (Some(check_in), Some(check_out)) if check_out <= check_in => {
                errors.add("check_out", CHECK_OUT_BEFORE_CHECK_IN);
                None
            }
            (Some(check_in), Some(check_out)) => Some(nights_between(check_in, check_out)),
            _ => None,
        };

        if let (Some(guests), Some(listing)) = (number_of_guests, listing) {
            let capacity = listing.fields.max_guests;
            if guests > capacity {
                errors.add(
                    "number_of_guests",
                    format!("Number of guests exceeds listing capacity ({capacity})."),
                );
            }
        }

        let total_price = match (self.total_price, listing, nights) {
            (Some(price), _, _) => {
                check_money(errors, "total_price", "Total price", price);
                Some(price)
            }
            (None, Some(listing), Some(nights)) => {
                let derived = listing
                    .fields
                    .price_per_night
                    .checked_mul(Decimal::from(nights))
                    .unwrap_or(Decimal::MAX);
                check_money(errors, "total_price", "Total price", derived);
                Some(derived)
            }
            (None, _, _) => None,
        };

        match (listing_id, guest_id, check_in, check_out, number_of_guests, total_price) {
            (
                Some(listing_id),
                Some(guest_id),
                Some(check_in),
                Some(check_out),
                Some(number_of_guests),
                Some(total_price),
            ) if errors.is_empty() => Some(BookingFields {
                listing_id,
                guest_id,
                check_in,
                check_out,
                number_of_guests,
                total_price: money(total_price),
                status: self.status.unwrap_or_default(),
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewDraft {
    pub listing_id: Option<Uuid>,
    pub guest_id: Option<Uuid>,
    pub rating: Option<i32>,
    pub comment: Option<String>,
}

impl From<&Review> for ReviewDraft {
    fn from(review: &Review) -> Self {
        let f = &review.fields;
        Self {
            listing_id: Some(f.listing_id),
            guest_id: Some(f.guest_id),
            rating: Some(f.rating),
            comment: Some(f.comment.clone()),
        }
    }
}

impl ReviewDraft {
    pub fn apply(&mut self, payload: ReviewPayload) {
        if payload.listing_id.is_some() {
            self.listing_id = payload.listing_id;
        }
        if payload.guest_id.is_some() {
            self.guest_id = payload.guest_id;
        }
        if payload.rating.is_some() {
            self.rating = payload.rating;
        }
        if payload.comment.is_some() {
            self.comment = payload.comment;
        }
    }

    pub fn finish(self, errors: &mut FieldErrors) -> Option<ReviewFields> {
        let listing_id = required(errors, "listing_id", self.listing_id);
        let guest_id = required(errors, "guest_id", self.guest_id);
        let rating = required(errors, "rating", self.rating);
        let comment = required_text(errors, "comment", self.comment);

        if let Some(rating) = rating {
            if !(1..=5).contains(&rating) && !errors.contains("rating") {
                errors.add("rating", "Rating must be between 1 and 5.");
            }
        }

        match (listing_id, guest_id, rating, comment) {
            (Some(listing_id), Some(guest_id), Some(rating), Some(comment)) if errors.is_empty() => {
                Some(ReviewFields {
                    listing_id,
                    guest_id,
                    rating,
                    comment,
                })
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn listing(max_guests: i32, price: i64) -> Listing {
        Listing {
            id: Uuid::new_v4(),
            fields: ListingFields {
                title: "Loft".into(),
                description: "Quiet".into(),
                location: "Boston, MA".into(),
                price_per_night: Decimal::new(price * 100, 2),
                number_of_bedrooms: 1,
                number_of_bathrooms: 1,
                max_guests,
                available: true,
                host_id: Uuid::new_v4(),
            },
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn booking_draft(listing: &Listing) -> BookingDraft {
        BookingDraft {
            listing_id: Some(listing.id),
            guest_id: Some(Uuid::new_v4()),
            check_in: Some(date(2025, 12, 15)),
            check_out: Some(date(2025, 12, 20)),
            number_of_guests: Some(2),
            total_price: None,
            status: None,
        }
    }

    #[test]
    fn empty_listing_draft_reports_every_required_field() {
        let mut errors = FieldErrors::new();
        assert!(ListingDraft::default().finish(&mut errors).is_none());
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
            assert_eq!(errors.messages(field), [REQUIRED], "{field}");
        }
        assert!(!errors.contains("available"));
    }

    #[test]
    fn listing_price_must_be_positive_with_two_places() {
        let mut draft = ListingDraft::from(&listing(2, 100));
        draft.price_per_night = Some(Decimal::new(1999, 3));
        let mut errors = FieldErrors::new();
        assert!(draft.clone().finish(&mut errors).is_none());
        assert_eq!(
            errors.messages("price_per_night"),
            ["Ensure that there are no more than 2 decimal places."]
        );

        draft.price_per_night = Some(Decimal::ZERO);
        let mut errors = FieldErrors::new();
        assert!(draft.finish(&mut errors).is_none());
        assert_eq!(
            errors.messages("price_per_night"),
            ["Price per night must be greater than zero."]
        );
    }

    #[test]
    fn listing_price_is_stored_with_two_places() {
        let mut draft = ListingDraft::from(&listing(2, 100));
        draft.price_per_night = Some(Decimal::from(150));
        draft.available = None;
        let mut errors = FieldErrors::new();
        let fields = draft.finish(&mut errors).expect("valid listing");
        assert_eq!(fields.price_per_night.to_string(), "150.00");
        assert!(fields.available);
    }

    #[test]
    fn booking_rejects_check_out_on_or_before_check_in() {
        let listing = listing(4, 100);
        for check_out in [date(2025, 12, 15), date(2025, 12, 10)] {
            let mut draft = booking_draft(&listing);
            draft.check_out = Some(check_out);
            let mut errors = FieldErrors::new();
            assert!(draft.finish(Some(&listing), &mut errors).is_none());
            assert_eq!(errors.messages("check_out"), [CHECK_OUT_BEFORE_CHECK_IN]);
        }
    }

    #[test]
    fn booking_rejects_guests_over_capacity() {
        let listing = listing(2, 100);
        let mut draft = booking_draft(&listing);
        draft.number_of_guests = Some(3);
        let mut errors = FieldErrors::new();
        assert!(draft.finish(Some(&listing), &mut errors).is_none());
        assert_eq!(
            errors.messages("number_of_guests"),
            ["Number of guests exceeds listing capacity (2)."]
        );
    }

    #[test]
    fn booking_at_capacity_is_accepted_and_priced() {
        let listing = listing(2, 120);
        let mut errors = FieldErrors::new();
        let fields = booking_draft(&listing)
            .finish(Some(&listing), &mut errors)
            .expect("valid booking");
        assert!(errors.is_empty());
        assert_eq!(fields.total_price.to_string(), "600.00");
        assert_eq!(fields.status, BookingStatus::Pending);
        assert_eq!(fields.duration_nights(), 5);
    }

    #[test]
    fn review_rating_outside_range_is_rejected() {
        for rating in [0, 6, -1] {
            let draft = ReviewDraft {
                listing_id: Some(Uuid::new_v4()),
                guest_id: Some(Uuid::new_v4()),
                rating: Some(rating),
                comment: Some("ok".into()),
            };
            let mut errors = FieldErrors::new();
            assert!(draft.finish(&mut errors).is_none());
            assert_eq!(errors.messages("rating"), ["Rating must be between 1 and 5."]);
        }
    }

    #[test]
    fn payload_checks_collect_validator_messages() {
        let payload = ReviewPayload {
            rating: Some(9),
            comment: Some(String::new()),
            ..Default::default()
        };
        let errors = check_payload(&payload);
        assert_eq!(errors.messages("rating"), ["Rating must be between 1 and 5."]);
        assert!(!errors.contains("comment"));
    }

    #[test]
    fn whitespace_only_text_is_blank_and_text_is_trimmed() {
        let mut draft = ListingDraft::from(&listing(2, 100));
        draft.title = Some("   ".into());
        draft.location = Some("  Boston, MA \n".into());
        let mut errors = FieldErrors::new();
        assert!(draft.clone().finish(&mut errors).is_none());
        assert_eq!(errors.messages("title"), [BLANK]);
        assert!(!errors.contains("location"));

        draft.title = Some(" Loft ".into());
        let mut errors = FieldErrors::new();
        let fields = draft.finish(&mut errors).expect("valid listing");
        assert_eq!(fields.title, "Loft");
        assert_eq!(fields.location, "Boston, MA");

        let review = ReviewDraft {
            listing_id: Some(Uuid::new_v4()),
            guest_id: Some(Uuid::new_v4()),
            rating: Some(4),
            comment: Some("\t ".into()),
        };
        let mut errors = FieldErrors::new();
        assert!(review.finish(&mut errors).is_none());
        assert_eq!(errors.messages("comment"), [BLANK]);
    }

    #[test]
    fn derived_total_obeys_money_bounds() {
        let mut listing = listing(4, 1);
        listing.fields.price_per_night = Decimal::new(9_999_999_999, 2);
        let mut draft = booking_draft(&listing);
        draft.check_out = Some(date(2025, 12, 17));
        let mut errors = FieldErrors::new();
        assert!(draft.finish(Some(&listing), &mut errors).is_none());
        assert_eq!(
            errors.messages("total_price"),
            ["Ensure that there are no more than 8 digits before the decimal point."]
        );
    }

    #[test]
    fn moving_the_stay_rederives_an_unsent_total() {
        let listing = listing(4, 100);
        let mut draft = booking_draft(&listing);
        draft.total_price = Some(Decimal::new(50000, 2));

        let mut kept = draft.clone();
        kept.apply(BookingPayload {
            number_of_guests: Some(3),
            ..Default::default()
        });
        assert_eq!(kept.total_price, Some(Decimal::new(50000, 2)));

        draft.apply(BookingPayload {
            check_out: Some(date(2025, 12, 18)),
            ..Default::default()
        });
        let mut errors = FieldErrors::new();
        let fields = draft.finish(Some(&listing), &mut errors).expect("valid booking");
        assert_eq!(fields.total_price.to_string(), "300.00");
    }
}
