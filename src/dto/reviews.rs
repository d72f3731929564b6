use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{dto::users::UserSummary, models::Review};

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct ReviewPayload {
    pub listing_id: Option<Uuid>,
    pub guest_id: Option<Uuid>,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5."))]
    pub rating: Option<i32>,
    /// Trimmed; blank comments are rejected.
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReviewRead {
    pub id: Uuid,
    /// Id of the reviewed listing.
    pub listing: Uuid,
    pub guest: UserSummary,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReviewRead {
    pub fn new(review: Review, guest: UserSummary) -> Self {
        Self {
            id: review.id,
            listing: review.fields.listing_id,
            guest,
            rating: review.fields.rating,
            comment: review.fields.comment,
            created_at: review.created_at,
            updated_at: review.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ReviewList {
    #[schema(value_type = Vec<ReviewRead>)]
    pub items: Vec<ReviewRead>,
}
