//! Book review service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::review::{CreateReview, Review},
    repository::Repository,
};

#[derive(Clone)]
pub struct ReviewsService {
    repository: Repository,
}

impl ReviewsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List all reviews, newest first
    pub async fn list(&self) -> AppResult<Vec<Review>> {
        self.repository.reviews.list().await
    }

    /// Create a new review
    pub async fn create(&self, review: CreateReview) -> AppResult<Review> {
        review
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.repository.reviews.create(&review).await
    }

    /// Delete a review
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.reviews.delete(id).await
    }

    /// Delete all reviews, returning the number removed
    pub async fn clear(&self) -> AppResult<u64> {
        self.repository.reviews.clear().await
    }
}
