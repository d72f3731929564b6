use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    models::BookingStatus,
    repository::{BookingFilter, ListingFilter, ReviewFilter},
    validation::FieldErrors,
};

const INVALID_NUMBER: &str = "Enter a valid number.";
const INVALID_UUID: &str = "Must be a valid UUID.";

/// Query values arrive as text; empty strings count as absent.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn parse_param<T: FromStr>(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<String>,
    message: impl Fn(&str) -> String,
) -> Option<T> {
    let raw = present(value)?;
    match raw.parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            errors.add(field, message(&raw));
            None
        }
    }
}

fn finish<T>(errors: FieldErrors, filter: T) -> Result<T, FieldErrors> {
    if errors.is_empty() {
        Ok(filter)
    } else {
        Err(errors)
    }
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListingQuery {
    /// Case-insensitive substring of the location.
    pub location: Option<String>,
    /// `true` (any case) for available listings, anything else for unavailable.
    pub available: Option<String>,
    /// Inclusive lower bound on `price_per_night`.
    pub min_price: Option<String>,
    /// Inclusive upper bound on `price_per_night`.
    pub max_price: Option<String>,
}

impl ListingQuery {
    pub fn into_filter(self) -> Result<ListingFilter, FieldErrors> {
        let mut errors = FieldErrors::new();
        let min_price = parse_param::<Decimal>(&mut errors, "min_price", self.min_price, |_| {
            INVALID_NUMBER.to_string()
        });
        let max_price = parse_param::<Decimal>(&mut errors, "max_price", self.max_price, |_| {
            INVALID_NUMBER.to_string()
        });
        let filter = ListingFilter {
            location: present(self.location),
            available: present(self.available).map(|v| v.eq_ignore_ascii_case("true")),
            min_price,
            max_price,
        };
        finish(errors, filter)
    }
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BookingQuery {
    /// One of `pending`, `confirmed`, `cancelled`, `completed`.
    pub status: Option<String>,
    pub guest_id: Option<String>,
    pub listing_id: Option<String>,
}

impl BookingQuery {
    pub fn into_filter(self) -> Result<BookingFilter, FieldErrors> {
        let mut errors = FieldErrors::new();
        let status = parse_param::<BookingStatus>(&mut errors, "status", self.status, |raw| {
            format!("\"{raw}\" is not a valid choice.")
        });
        let guest_id = parse_param::<Uuid>(&mut errors, "guest_id", self.guest_id, |_| {
            INVALID_UUID.to_string()
        });
        let listing_id = parse_param::<Uuid>(&mut errors, "listing_id", self.listing_id, |_| {
            INVALID_UUID.to_string()
        });
        finish(
            errors,
            BookingFilter {
                status,
                guest_id,
                listing_id,
            },
        )
    }
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReviewQuery {
    pub listing_id: Option<String>,
    pub guest_id: Option<String>,
}

impl ReviewQuery {
    pub fn into_filter(self) -> Result<ReviewFilter, FieldErrors> {
        let mut errors = FieldErrors::new();
        let listing_id = parse_param::<Uuid>(&mut errors, "listing_id", self.listing_id, |_| {
            INVALID_UUID.to_string()
        });
        let guest_id = parse_param::<Uuid>(&mut errors, "guest_id", self.guest_id, |_| {
            INVALID_UUID.to_string()
        });
        finish(
            errors,
            ReviewFilter {
                listing_id,
                guest_id,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_query_parses_prices_and_availability() {
        let filter = ListingQuery {
            location: Some("york".into()),
            available: Some("TRUE".into()),
            min_price: Some("50".into()),
            max_price: Some("200.50".into()),
        }
        .into_filter()
        .unwrap();
        assert_eq!(filter.location.as_deref(), Some("york"));
        assert_eq!(filter.available, Some(true));
        assert_eq!(filter.min_price, Some(Decimal::from(50)));
        assert_eq!(filter.max_price, Some(Decimal::new(20050, 2)));
    }

    #[test]
    fn listing_query_treats_other_availability_as_false_and_ignores_empties() {
        let filter = ListingQuery {
            location: Some(String::new()),
            available: Some("no".into()),
            min_price: Some(String::new()),
            max_price: None,
        }
        .into_filter()
        .unwrap();
        assert_eq!(filter.location, None);
        assert_eq!(filter.available, Some(false));
        assert_eq!(filter.min_price, None);
    }

    #[test]
    fn malformed_values_name_the_parameter() {
        let errors = ListingQuery {
            min_price: Some("cheap".into()),
            ..Default::default()
        }
        .into_filter()
        .unwrap_err();
        assert_eq!(errors.messages("min_price"), [INVALID_NUMBER]);

        let errors = BookingQuery {
            status: Some("lost".into()),
            guest_id: Some("7".into()),
            listing_id: None,
        }
        .into_filter()
        .unwrap_err();
        assert_eq!(errors.messages("status"), ["\"lost\" is not a valid choice."]);
        assert_eq!(errors.messages("guest_id"), [INVALID_UUID]);
    }
}
