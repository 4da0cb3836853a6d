//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, borrows, health, reviews};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bookwise API",
        version = "0.1.0",
        description = "Library Management Backend REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::register,
        auth::login,
        // Reviews
        reviews::list_reviews,
        reviews::create_review,
        reviews::delete_review,
        reviews::clear_reviews,
        // Borrow records
        borrows::list_borrows,
        borrows::create_borrow,
        borrows::delete_borrow,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::UserInfo,
            crate::models::user::User,
            crate::models::user::Role,
            crate::models::user::RegisterRequest,
            // Reviews
            crate::models::review::Review,
            crate::models::review::CreateReview,
            reviews::ClearReviewsResponse,
            // Borrow records
            crate::models::borrow::BorrowRecord,
            crate::models::borrow::CreateBorrowRequest,
            borrows::DeleteBorrowResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Registration and login"),
        (name = "reviews", description = "Book reviews"),
        (name = "borrow", description = "Borrow record management")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
