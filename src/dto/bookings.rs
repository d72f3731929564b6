use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{listings::ListingRead, users::UserSummary},
    models::{Booking, BookingStatus},
};

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct BookingPayload {
    pub listing_id: Option<Uuid>,
    pub guest_id: Option<Uuid>,
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    #[validate(range(min = 1, message = "Number of guests must be at least 1."))]
    pub number_of_guests: Option<i32>,
    /// Defaults to `price_per_night * nights` when omitted.
    #[schema(value_type = Option<String>, example = "450.00")]
    pub total_price: Option<Decimal>,
    pub status: Option<BookingStatus>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookingRead {
    pub id: Uuid,
    pub listing: ListingRead,
    pub guest: UserSummary,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub number_of_guests: i32,
    #[schema(value_type = String, example = "450.00")]
    pub total_price: Decimal,
    pub status: BookingStatus,
    pub duration_nights: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BookingRead {
    pub fn new(booking: Booking, listing: ListingRead, guest: UserSummary) -> Self {
        let duration_nights = booking.fields.duration_nights();
        let fields = booking.fields;
        Self {
            id: booking.id,
            listing,
            guest,
            check_in: fields.check_in,
            check_out: fields.check_out,
            number_of_guests: fields.number_of_guests,
            total_price: fields.total_price,
            status: fields.status,
            duration_nights,
            created_at: booking.created_at,
            updated_at: booking.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct BookingList {
    #[schema(value_type = Vec<BookingRead>)]
    pub items: Vec<BookingRead>,
}
