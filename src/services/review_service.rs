use uuid::Uuid;

use crate::{
    dto::reviews::{ReviewList, ReviewPayload, ReviewRead},
    error::{AppError, AppResult},
    models::ReviewFields,
    response::{ApiResponse, Meta},
    routes::params::ReviewQuery,
    services::{
        WriteMode,
        render::{render_review, render_reviews},
    },
    state::AppState,
    validation::{DUPLICATE_REVIEW, NON_FIELD, ReviewDraft, check_payload, missing_reference},
};

pub async fn list_reviews(
    state: &AppState,
    query: ReviewQuery,
) -> AppResult<ApiResponse<ReviewList>> {
    let filter = query.into_filter()?;
    let reviews = state.reviews.list(&filter).await?;
    let items = render_reviews(state, reviews).await?;

    let meta = Meta::with_total(items.len());
    Ok(ApiResponse::success("Reviews", ReviewList { items }, Some(meta)))
}

pub async fn get_review(state: &AppState, id: Uuid) -> AppResult<ApiResponse<ReviewRead>> {
    let review = match state.reviews.get(id).await? {
        Some(r) => r,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success(
        "Review",
        render_review(state, review).await?,
        None,
    ))
}

/// A second review by the same guest for the same listing is rejected.
pub async fn create_review(
    state: &AppState,
    payload: ReviewPayload,
) -> AppResult<ApiResponse<ReviewRead>> {
    let fields = build_review(state, ReviewDraft::default(), payload, None).await?;
    let review = state.reviews.create(fields).await?;
    tracing::info!(
        review_id = %review.id,
        listing_id = %review.fields.listing_id,
        rating = review.fields.rating,
        "review created"
    );

    Ok(ApiResponse::success(
        "Review created",
        render_review(state, review).await?,
        Some(Meta::empty()),
    ))
}

pub async fn update_review(
    state: &AppState,
    id: Uuid,
    payload: ReviewPayload,
    mode: WriteMode,
) -> AppResult<ApiResponse<ReviewRead>> {
    let existing = match state.reviews.get(id).await? {
        Some(r) => r,
        None => return Err(AppError::NotFound),
    };
    let draft = match mode {
        WriteMode::Replace => ReviewDraft::default(),
        WriteMode::Merge => ReviewDraft::from(&existing),
    };
    let fields = build_review(state, draft, payload, Some(id)).await?;

    let review = match state.reviews.update(id, fields).await? {
        Some(r) => r,
        None => return Err(AppError::NotFound),
    };
    tracing::info!(review_id = %id, ?mode, "review updated");

    Ok(ApiResponse::success(
        "Updated",
        render_review(state, review).await?,
        Some(Meta::empty()),
    ))
}

pub async fn delete_review(state: &AppState, id: Uuid) -> AppResult<()> {
    if !state.reviews.delete(id).await? {
        return Err(AppError::NotFound);
    }
    tracing::info!(review_id = %id, "review deleted");
    Ok(())
}

/// `current` is the review being updated, which may keep its own pair.
async fn build_review(
    state: &AppState,
    mut draft: ReviewDraft,
    payload: ReviewPayload,
    current: Option<Uuid>,
) -> AppResult<ReviewFields> {
    let mut errors = check_payload(&payload);
    draft.apply(payload);

    if let Some(listing_id) = draft.listing_id {
        if state.listings.get(listing_id).await?.is_none() {
            errors.add("listing_id", missing_reference(listing_id));
        }
    }
    if let Some(guest_id) = draft.guest_id {
        if state.users.get(guest_id).await?.is_none() {
            errors.add("guest_id", missing_reference(guest_id));
        }
    }
    if let (Some(listing_id), Some(guest_id)) = (draft.listing_id, draft.guest_id) {
        if let Some(other) = state.reviews.get_by_pair(listing_id, guest_id).await? {
            if Some(other.id) != current {
                errors.add(NON_FIELD, DUPLICATE_REVIEW);
            }
        }
    }

    match draft.finish(&mut errors) {
        Some(fields) if errors.is_empty() => Ok(fields),
        _ => {
            tracing::debug!(%errors, "review rejected");
            Err(AppError::Validation(errors))
        }
    }
}
