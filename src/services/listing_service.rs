use uuid::Uuid;

use crate::{
    dto::listings::{ListingList, ListingPayload, ListingRead},
    error::{AppError, AppResult},
    models::ListingFields,
    response::{ApiResponse, Meta},
    routes::params::ListingQuery,
    services::{
        WriteMode,
        render::{render_listing, render_listings},
    },
    state::AppState,
    validation::{ListingDraft, check_payload, missing_reference},
};

pub async fn list_listings(
    state: &AppState,
    query: ListingQuery,
) -> AppResult<ApiResponse<ListingList>> {
    let filter = query.into_filter()?;
    let listings = state.listings.list(&filter).await?;
    let items = render_listings(state, listings).await?;

    let meta = Meta::with_total(items.len());
    Ok(ApiResponse::success("Listings", ListingList { items }, Some(meta)))
}

pub async fn get_listing(state: &AppState, id: Uuid) -> AppResult<ApiResponse<ListingRead>> {
    let listing = match state.listings.get(id).await? {
        Some(l) => l,
        None => return Err(AppError::NotFound),
    };
    let data = render_listing(state, listing).await?;
    Ok(ApiResponse::success("Listing", data, None))
}

pub async fn create_listing(
    state: &AppState,
    payload: ListingPayload,
) -> AppResult<ApiResponse<ListingRead>> {
    let fields = build_listing(state, ListingDraft::default(), payload).await?;
    let listing = state.listings.create(fields).await?;
    tracing::info!(listing_id = %listing.id, host_id = %listing.fields.host_id, "listing created");

    Ok(ApiResponse::success(
        "Listing created",
        render_listing(state, listing).await?,
        Some(Meta::empty()),
    ))
}

pub async fn update_listing(
    state: &AppState,
    id: Uuid,
    payload: ListingPayload,
    mode: WriteMode,
) -> AppResult<ApiResponse<ListingRead>> {
    let existing = match state.listings.get(id).await? {
        Some(l) => l,
        None => return Err(AppError::NotFound),
    };
    let draft = match mode {
        WriteMode::Replace => ListingDraft::default(),
        WriteMode::Merge => ListingDraft::from(&existing),
    };
    let fields = build_listing(state, draft, payload).await?;

    let listing = match state.listings.update(id, fields).await? {
        Some(l) => l,
        None => return Err(AppError::NotFound),
    };
    tracing::info!(listing_id = %id, ?mode, "listing updated");

    Ok(ApiResponse::success(
        "Updated",
        render_listing(state, listing).await?,
        Some(Meta::empty()),
    ))
}

/// Bookings and reviews of the listing go with it.
pub async fn delete_listing(state: &AppState, id: Uuid) -> AppResult<()> {
    if !state.listings.delete(id).await? {
        return Err(AppError::NotFound);
    }
    tracing::info!(listing_id = %id, "listing deleted");
    Ok(())
}

async fn build_listing(
    state: &AppState,
    mut draft: ListingDraft,
    payload: ListingPayload,
) -> AppResult<ListingFields> {
    let mut errors = check_payload(&payload);
    draft.apply(payload);

    if let Some(host_id) = draft.host_id {
        if state.users.get(host_id).await?.is_none() {
            errors.add("host_id", missing_reference(host_id));
        }
    }

    match draft.finish(&mut errors) {
        Some(fields) if errors.is_empty() => Ok(fields),
        _ => {
            tracing::debug!(%errors, "listing rejected");
            Err(AppError::Validation(errors))
        }
    }
}
