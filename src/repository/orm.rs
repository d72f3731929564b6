use anyhow::anyhow;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, extension::postgres::PgExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, SqlErr,
};
use uuid::Uuid;

use crate::{
    entity::{
        bookings::{
            ActiveModel as BookingActive, Column as BookingCol, Entity as Bookings,
            Model as BookingModel,
        },
        listings::{
            ActiveModel as ListingActive, Column as ListingCol, Entity as Listings,
            Model as ListingModel,
        },
        reviews::{
            ActiveModel as ReviewActive, Column as ReviewCol, Entity as Reviews,
            Model as ReviewModel,
        },
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users, Model as UserModel},
    },
    error::{AppError, AppResult},
    models::{
        Booking, BookingFields, BookingStatus, Listing, ListingFields, NewUser, Review,
        ReviewFields, User,
    },
    repository::{
        BookingFilter, BookingRepository, ListingFilter, ListingRepository, ReviewFilter,
        ReviewRepository, UserRepository,
    },
    validation::DUPLICATE_REVIEW,
};

/// Postgres-backed repositories. Cascades and the review uniqueness rule are
/// enforced by the schema in `migrations/`.
#[derive(Debug, Clone)]
pub struct OrmStore {
    conn: DatabaseConnection,
}

impl OrmStore {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

/// Turns a unique-index violation into a conflict; anything else stays a
/// storage error.
fn unique_violation(err: DbErr, message: &str) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            tracing::debug!(%detail, "unique constraint rejected write");
            AppError::Conflict(message.to_string())
        }
        _ => AppError::OrmError(err),
    }
}

/// Escapes LIKE wildcards so the needle matches literally.
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[async_trait]
impl UserRepository for OrmStore {
    async fn get(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(Users::find_by_id(id)
            .one(&self.conn)
            .await?
            .map(user_from_entity))
    }

    async fn get_many(&self, ids: &[Uuid]) -> AppResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(Users::find()
            .filter(UserCol::Id.is_in(ids.iter().copied()))
            .all(&self.conn)
            .await?
            .into_iter()
            .map(user_from_entity)
            .collect())
    }

    async fn get_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(Users::find()
            .filter(UserCol::Username.eq(username))
            .one(&self.conn)
            .await?
            .map(user_from_entity))
    }

    async fn create(&self, user: NewUser) -> AppResult<User> {
        let message = format!("username \"{}\" already exists", user.username);
        let active = UserActive {
            id: Set(Uuid::new_v4()),
            username: Set(user.username),
            email: Set(user.email),
            first_name: Set(user.first_name),
            last_name: Set(user.last_name),
            created_at: Set(Utc::now().into()),
        };
        let model = active
            .insert(&self.conn)
            .await
            .map_err(|err| unique_violation(err, &message))?;
        Ok(user_from_entity(model))
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(Users::find().count(&self.conn).await?)
    }

    async fn delete_all(&self) -> AppResult<u64> {
        Ok(Users::delete_many().exec(&self.conn).await?.rows_affected)
    }
}

#[async_trait]
impl ListingRepository for OrmStore {
    async fn list(&self, filter: &ListingFilter) -> AppResult<Vec<Listing>> {
        let mut condition = Condition::all();

        if let Some(location) = filter.location.as_ref() {
            condition = condition.add(Expr::col(ListingCol::Location).ilike(like_pattern(location)));
        }
        if let Some(available) = filter.available {
            condition = condition.add(ListingCol::Available.eq(available));
        }
        if let Some(min_price) = filter.min_price {
            condition = condition.add(ListingCol::PricePerNight.gte(min_price));
        }
        if let Some(max_price) = filter.max_price {
            condition = condition.add(ListingCol::PricePerNight.lte(max_price));
        }

        Ok(Listings::find()
            .filter(condition)
            .order_by_desc(ListingCol::CreatedAt)
            .all(&self.conn)
            .await?
            .into_iter()
            .map(listing_from_entity)
            .collect())
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<Listing>> {
        Ok(Listings::find_by_id(id)
            .one(&self.conn)
            .await?
            .map(listing_from_entity))
    }

    async fn get_many(&self, ids: &[Uuid]) -> AppResult<Vec<Listing>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(Listings::find()
            .filter(ListingCol::Id.is_in(ids.iter().copied()))
            .order_by_desc(ListingCol::CreatedAt)
            .all(&self.conn)
            .await?
            .into_iter()
            .map(listing_from_entity)
            .collect())
    }

    async fn create(&self, fields: ListingFields) -> AppResult<Listing> {
        let now = Utc::now();
        let active = ListingActive {
            id: Set(Uuid::new_v4()),
            title: Set(fields.title),
            description: Set(fields.description),
            location: Set(fields.location),
            price_per_night: Set(fields.price_per_night),
            number_of_bedrooms: Set(fields.number_of_bedrooms),
            number_of_bathrooms: Set(fields.number_of_bathrooms),
            max_guests: Set(fields.max_guests),
            available: Set(fields.available),
            host_id: Set(fields.host_id),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        Ok(listing_from_entity(active.insert(&self.conn).await?))
    }

    async fn update(&self, id: Uuid, fields: ListingFields) -> AppResult<Option<Listing>> {
        let Some(existing) = Listings::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };

        let mut active: ListingActive = existing.into();
        active.title = Set(fields.title);
        active.description = Set(fields.description);
        active.location = Set(fields.location);
        active.price_per_night = Set(fields.price_per_night);
        active.number_of_bedrooms = Set(fields.number_of_bedrooms);
        active.number_of_bathrooms = Set(fields.number_of_bathrooms);
        active.max_guests = Set(fields.max_guests);
        active.available = Set(fields.available);
        active.host_id = Set(fields.host_id);
        active.updated_at = Set(Utc::now().into());

        Ok(Some(listing_from_entity(active.update(&self.conn).await?)))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = Listings::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(Listings::find().count(&self.conn).await?)
    }

    async fn delete_all(&self) -> AppResult<u64> {
        Ok(Listings::delete_many().exec(&self.conn).await?.rows_affected)
    }
}

#[async_trait]
impl BookingRepository for OrmStore {
    async fn list(&self, filter: &BookingFilter) -> AppResult<Vec<Booking>> {
        let mut condition = Condition::all();
        if let Some(status) = filter.status {
            condition = condition.add(BookingCol::Status.eq(status.as_str()));
        }
        if let Some(guest_id) = filter.guest_id {
            condition = condition.add(BookingCol::GuestId.eq(guest_id));
        }
        if let Some(listing_id) = filter.listing_id {
            condition = condition.add(BookingCol::ListingId.eq(listing_id));
        }

        Bookings::find()
            .filter(condition)
            .order_by_desc(BookingCol::CreatedAt)
            .all(&self.conn)
            .await?
            .into_iter()
            .map(booking_from_entity)
            .collect()
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<Booking>> {
        Bookings::find_by_id(id)
            .one(&self.conn)
            .await?
            .map(booking_from_entity)
            .transpose()
    }

    async fn create(&self, fields: BookingFields) -> AppResult<Booking> {
        let now = Utc::now();
        let active = BookingActive {
            id: Set(Uuid::new_v4()),
            listing_id: Set(fields.listing_id),
            guest_id: Set(fields.guest_id),
            check_in: Set(fields.check_in),
            check_out: Set(fields.check_out),
            number_of_guests: Set(fields.number_of_guests),
            total_price: Set(fields.total_price),
            status: Set(fields.status.as_str().to_string()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        booking_from_entity(active.insert(&self.conn).await?)
    }

    async fn update(&self, id: Uuid, fields: BookingFields) -> AppResult<Option<Booking>> {
        let Some(existing) = Bookings::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };

        let mut active: BookingActive = existing.into();
        active.listing_id = Set(fields.listing_id);
        active.guest_id = Set(fields.guest_id);
        active.check_in = Set(fields.check_in);
        active.check_out = Set(fields.check_out);
        active.number_of_guests = Set(fields.number_of_guests);
        active.total_price = Set(fields.total_price);
        active.status = Set(fields.status.as_str().to_string());
        active.updated_at = Set(Utc::now().into());

        booking_from_entity(active.update(&self.conn).await?).map(Some)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = Bookings::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(Bookings::find().count(&self.conn).await?)
    }

    async fn delete_all(&self) -> AppResult<u64> {
        Ok(Bookings::delete_many().exec(&self.conn).await?.rows_affected)
    }
}

#[async_trait]
impl ReviewRepository for OrmStore {
    async fn list(&self, filter: &ReviewFilter) -> AppResult<Vec<Review>> {
        let mut condition = Condition::all();
        if let Some(listing_id) = filter.listing_id {
            condition = condition.add(ReviewCol::ListingId.eq(listing_id));
        }
        if let Some(guest_id) = filter.guest_id {
            condition = condition.add(ReviewCol::GuestId.eq(guest_id));
        }

        Ok(Reviews::find()
            .filter(condition)
            .order_by_desc(ReviewCol::CreatedAt)
            .all(&self.conn)
            .await?
            .into_iter()
            .map(review_from_entity)
            .collect())
    }

    async fn list_for_listings(&self, listing_ids: &[Uuid]) -> AppResult<Vec<Review>> {
        if listing_ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(Reviews::find()
            .filter(ReviewCol::ListingId.is_in(listing_ids.iter().copied()))
            .order_by_desc(ReviewCol::CreatedAt)
            .all(&self.conn)
            .await?
            .into_iter()
            .map(review_from_entity)
            .collect())
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<Review>> {
        Ok(Reviews::find_by_id(id)
            .one(&self.conn)
            .await?
            .map(review_from_entity))
    }

    async fn get_by_pair(&self, listing_id: Uuid, guest_id: Uuid) -> AppResult<Option<Review>> {
        Ok(Reviews::find()
            .filter(ReviewCol::ListingId.eq(listing_id))
            .filter(ReviewCol::GuestId.eq(guest_id))
            .one(&self.conn)
            .await?
            .map(review_from_entity))
    }

    async fn create(&self, fields: ReviewFields) -> AppResult<Review> {
        let now = Utc::now();
        let active = ReviewActive {
            id: Set(Uuid::new_v4()),
            listing_id: Set(fields.listing_id),
            guest_id: Set(fields.guest_id),
            rating: Set(fields.rating),
            comment: Set(fields.comment),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        let model = active
            .insert(&self.conn)
            .await
            .map_err(|err| unique_violation(err, DUPLICATE_REVIEW))?;
        Ok(review_from_entity(model))
    }

    async fn update(&self, id: Uuid, fields: ReviewFields) -> AppResult<Option<Review>> {
        let Some(existing) = Reviews::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };

        let mut active: ReviewActive = existing.into();
        active.listing_id = Set(fields.listing_id);
        active.guest_id = Set(fields.guest_id);
        active.rating = Set(fields.rating);
        active.comment = Set(fields.comment);
        active.updated_at = Set(Utc::now().into());

        let model = active
            .update(&self.conn)
            .await
            .map_err(|err| unique_violation(err, DUPLICATE_REVIEW))?;
        Ok(Some(review_from_entity(model)))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = Reviews::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(Reviews::find().count(&self.conn).await?)
    }

    async fn delete_all(&self) -> AppResult<u64> {
        Ok(Reviews::delete_many().exec(&self.conn).await?.rows_affected)
    }
}

fn user_from_entity(model: UserModel) -> User {
    User {
        id: model.id,
        username: model.username,
        email: model.email,
        first_name: model.first_name,
        last_name: model.last_name,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn listing_from_entity(model: ListingModel) -> Listing {
    Listing {
        id: model.id,
        fields: ListingFields {
            title: model.title,
            description: model.description,
            location: model.location,
            price_per_night: model.price_per_night,
            number_of_bedrooms: model.number_of_bedrooms,
            number_of_bathrooms: model.number_of_bathrooms,
            max_guests: model.max_guests,
            available: model.available,
            host_id: model.host_id,
        },
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

fn booking_from_entity(model: BookingModel) -> AppResult<Booking> {
    let status = model
        .status
        .parse::<BookingStatus>()
        .map_err(|e| AppError::Internal(anyhow!("booking {}: {e}", model.id)))?;
    Ok(Booking {
        id: model.id,
        fields: BookingFields {
            listing_id: model.listing_id,
            guest_id: model.guest_id,
            check_in: model.check_in,
            check_out: model.check_out,
            number_of_guests: model.number_of_guests,
            total_price: model.total_price,
            status,
        },
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

fn review_from_entity(model: ReviewModel) -> Review {
    Review {
        id: model.id,
        fields: ReviewFields {
            listing_id: model.listing_id,
            guest_id: model.guest_id,
            rating: model.rating,
            comment: model.comment,
        },
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
