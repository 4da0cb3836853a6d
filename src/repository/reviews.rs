//! Reviews repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::review::{CreateReview, Review},
};

#[derive(Clone)]
pub struct ReviewsRepository {
    pool: Pool<Postgres>,
}

impl ReviewsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all reviews, newest first
    pub async fn list(&self) -> AppResult<Vec<Review>> {
        let reviews = sqlx::query_as::<_, Review>("SELECT * FROM reviews ORDER BY id DESC")
            .fetch_all(&self.pool)
            .await?;

        Ok(reviews)
    }

    /// Create a new review
    pub async fn create(&self, review: &CreateReview) -> AppResult<Review> {
        let created = sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (title, author, review, rating)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&review.title)
        .bind(&review.author)
        .bind(&review.review)
        .bind(review.rating)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Delete a review by ID
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Review with id {} not found", id)));
        }

        Ok(())
    }

    /// Delete all reviews, returning the number removed
    pub async fn clear(&self) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM reviews")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
