//! Borrow record endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::borrow::{BorrowQuery, BorrowRecord, BorrowSort, CreateBorrowRequest},
};

use super::AuthenticatedUser;

/// Response for borrow record deletion
#[derive(Serialize, ToSchema)]
pub struct DeleteBorrowResponse {
    pub success: bool,
}

/// List borrow records, soonest due first
#[utoipa::path(
    get,
    path = "/borrow",
    tag = "borrow",
    security(("bearer_auth" = [])),
    params(BorrowQuery),
    responses(
        (status = 200, description = "All borrow records", body = Vec<BorrowRecord>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_borrows(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<BorrowQuery>,
) -> AppResult<Json<Vec<BorrowRecord>>> {
    let sort = match query.sort.as_deref() {
        None | Some("returnDate") => BorrowSort::ReturnDate,
        Some("created") => BorrowSort::Created,
        Some(other) => {
            return Err(AppError::Validation(format!("Unknown sort key: {}", other)));
        }
    };

    let records = state.services.borrows.list(sort).await?;
    Ok(Json(records))
}

/// Create a borrow record (admin only)
#[utoipa::path(
    post,
    path = "/borrow",
    tag = "borrow",
    security(("bearer_auth" = [])),
    request_body = CreateBorrowRequest,
    responses(
        (status = 201, description = "Borrow record created", body = BorrowRecord),
        (status = 400, description = "Missing field or unparsable date"),
        (status = 403, description = "Not an administrator"),
        (status = 500, description = "Persistence failure")
    )
)]
pub async fn create_borrow(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateBorrowRequest>,
) -> AppResult<(StatusCode, Json<BorrowRecord>)> {
    claims.require_admin()?;

    let record = state.services.borrows.create(request).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Delete a borrow record (admin only)
#[utoipa::path(
    delete,
    path = "/borrow/{id}",
    tag = "borrow",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Borrow record ID")
    ),
    responses(
        (status = 200, description = "Borrow record deleted", body = DeleteBorrowResponse),
        (status = 403, description = "Not an administrator"),
        (status = 404, description = "Borrow record not found")
    )
)]
pub async fn delete_borrow(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<DeleteBorrowResponse>> {
    claims.require_admin()?;

    state.services.borrows.delete(id).await?;
    Ok(Json(DeleteBorrowResponse { success: true }))
}
