//! Book review endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::review::{CreateReview, Review},
};

use super::AuthenticatedUser;

/// Response for bulk review deletion
#[derive(Serialize, ToSchema)]
pub struct ClearReviewsResponse {
    /// Number of reviews removed
    pub deleted: u64,
}

/// List all reviews, newest first
#[utoipa::path(
    get,
    path = "/reviews",
    tag = "reviews",
    responses(
        (status = 200, description = "All reviews", body = Vec<Review>)
    )
)]
pub async fn list_reviews(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<Review>>> {
    let reviews = state.services.reviews.list().await?;
    Ok(Json(reviews))
}

/// Create a review
#[utoipa::path(
    post,
    path = "/reviews",
    tag = "reviews",
    security(("bearer_auth" = [])),
    request_body = CreateReview,
    responses(
        (status = 201, description = "Review created", body = Review),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn create_review(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Json(request): Json<CreateReview>,
) -> AppResult<(StatusCode, Json<Review>)> {
    let review = state.services.reviews.create(request).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// Delete a review (admin only)
#[utoipa::path(
    delete,
    path = "/reviews/{id}",
    tag = "reviews",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Review ID")
    ),
    responses(
        (status = 204, description = "Review deleted"),
        (status = 403, description = "Not an administrator"),
        (status = 404, description = "Review not found")
    )
)]
pub async fn delete_review(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;

    state.services.reviews.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete all reviews (admin only)
#[utoipa::path(
    delete,
    path = "/reviews",
    tag = "reviews",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Reviews cleared", body = ClearReviewsResponse),
        (status = 403, description = "Not an administrator")
    )
)]
pub async fn clear_reviews(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<ClearReviewsResponse>> {
    claims.require_admin()?;

    let deleted = state.services.reviews.clear().await?;
    Ok(Json(ClearReviewsResponse { deleted }))
}
