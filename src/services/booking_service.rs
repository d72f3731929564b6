use uuid::Uuid;

use crate::{
    dto::bookings::{BookingList, BookingPayload, BookingRead},
    error::{AppError, AppResult},
    models::BookingFields,
    response::{ApiResponse, Meta},
    routes::params::BookingQuery,
    services::{
        WriteMode,
        render::{render_booking, render_bookings},
    },
    state::AppState,
    validation::{BookingDraft, check_payload, missing_reference},
};

pub async fn list_bookings(
    state: &AppState,
    query: BookingQuery,
) -> AppResult<ApiResponse<BookingList>> {
    let filter = query.into_filter()?;
    let bookings = state.bookings.list(&filter).await?;
    let items = render_bookings(state, bookings).await?;

    let meta = Meta::with_total(items.len());
    Ok(ApiResponse::success("Bookings", BookingList { items }, Some(meta)))
}

pub async fn get_booking(state: &AppState, id: Uuid) -> AppResult<ApiResponse<BookingRead>> {
    let booking = match state.bookings.get(id).await? {
        Some(b) => b,
        None => return Err(AppError::NotFound),
    };
    let data = render_booking(state, booking).await?;
    Ok(ApiResponse::success("Booking", data, None))
}

pub async fn create_booking(
    state: &AppState,
    payload: BookingPayload,
) -> AppResult<ApiResponse<BookingRead>> {
    let fields = build_booking(state, BookingDraft::default(), payload).await?;
    let booking = state.bookings.create(fields).await?;
    tracing::info!(
        booking_id = %booking.id,
        listing_id = %booking.fields.listing_id,
        nights = booking.fields.duration_nights(),
        "booking created"
    );

    Ok(ApiResponse::success(
        "Booking created",
        render_booking(state, booking).await?,
        Some(Meta::empty()),
    ))
}

/// Any status may replace any other; there is no transition graph.
pub async fn update_booking(
    state: &AppState,
    id: Uuid,
    payload: BookingPayload,
    mode: WriteMode,
) -> AppResult<ApiResponse<BookingRead>> {
    let existing = match state.bookings.get(id).await? {
        Some(b) => b,
        None => return Err(AppError::NotFound),
    };
    let draft = match mode {
        WriteMode::Replace => BookingDraft::default(),
        WriteMode::Merge => BookingDraft::from(&existing),
    };
    let fields = build_booking(state, draft, payload).await?;
    if fields.status != existing.fields.status {
        tracing::info!(
            booking_id = %id,
            from = %existing.fields.status,
            to = %fields.status,
            "booking status changed"
        );
    }

    let booking = match state.bookings.update(id, fields).await? {
        Some(b) => b,
        None => return Err(AppError::NotFound),
    };

    Ok(ApiResponse::success(
        "Updated",
        render_booking(state, booking).await?,
        Some(Meta::empty()),
    ))
}

pub async fn delete_booking(state: &AppState, id: Uuid) -> AppResult<()> {
    if !state.bookings.delete(id).await? {
        return Err(AppError::NotFound);
    }
    tracing::info!(booking_id = %id, "booking deleted");
    Ok(())
}

async fn build_booking(
    state: &AppState,
    mut draft: BookingDraft,
    payload: BookingPayload,
) -> AppResult<BookingFields> {
    let mut errors = check_payload(&payload);
    draft.apply(payload);

    let listing = match draft.listing_id {
        Some(listing_id) => {
            let listing = state.listings.get(listing_id).await?;
            if listing.is_none() {
                errors.add("listing_id", missing_reference(listing_id));
            }
            listing
        }
        None => None,
    };
    if let Some(guest_id) = draft.guest_id {
        if state.users.get(guest_id).await?.is_none() {
            errors.add("guest_id", missing_reference(guest_id));
        }
    }

    match draft.finish(listing.as_ref(), &mut errors) {
        Some(fields) if errors.is_empty() => Ok(fields),
        _ => {
            tracing::debug!(%errors, "booking rejected");
            Err(AppError::Validation(errors))
        }
    }
}
