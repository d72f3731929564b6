use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{reviews::ReviewRead, users::UserSummary},
    models::{Listing, average_rating},
};

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct ListingPayload {
    #[validate(length(max = 255, message = "Ensure this field has no more than 255 characters."))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(length(max = 255, message = "Ensure this field has no more than 255 characters."))]
    pub location: Option<String>,
    #[schema(value_type = Option<String>, example = "150.00")]
    pub price_per_night: Option<Decimal>,
    #[validate(range(min = 0, message = "Number of bedrooms cannot be negative."))]
    pub number_of_bedrooms: Option<i32>,
    #[validate(range(min = 0, message = "Number of bathrooms cannot be negative."))]
    pub number_of_bathrooms: Option<i32>,
    #[validate(range(min = 1, message = "Maximum guests must be at least 1."))]
    pub max_guests: Option<i32>,
    pub available: Option<bool>,
    pub host_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ListingRead {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub location: String,
    #[schema(value_type = String, example = "150.00")]
    pub price_per_night: Decimal,
    pub number_of_bedrooms: i32,
    pub number_of_bathrooms: i32,
    pub max_guests: i32,
    pub available: bool,
    pub host: UserSummary,
    /// Mean review rating; `null` when the listing has no reviews.
    pub average_rating: Option<f64>,
    pub reviews: Vec<ReviewRead>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ListingRead {
    pub fn new(listing: Listing, host: UserSummary, reviews: Vec<ReviewRead>) -> Self {
        let average_rating = average_rating(reviews.iter().map(|r| r.rating));
        let fields = listing.fields;
        Self {
            id: listing.id,
            title: fields.title,
            description: fields.description,
            location: fields.location,
            price_per_night: fields.price_per_night,
            number_of_bedrooms: fields.number_of_bedrooms,
            number_of_bathrooms: fields.number_of_bathrooms,
            max_guests: fields.max_guests,
            available: fields.available,
            host,
            average_rating,
            reviews,
            created_at: listing.created_at,
            updated_at: listing.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ListingList {
    #[schema(value_type = Vec<ListingRead>)]
    pub items: Vec<ListingRead>,
}
