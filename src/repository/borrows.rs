//! Borrow records repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::borrow::{BorrowRecord, BorrowSort, CreateBorrow},
};

#[derive(Clone)]
pub struct BorrowsRepository {
    pool: Pool<Postgres>,
}

impl BorrowsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Create a new borrow record
    ///
    /// The record is persisted unconditionally: no availability check
    /// against other records for the same book, and no check that the
    /// username resolves to an account.
    pub async fn create(&self, borrow: &CreateBorrow) -> AppResult<BorrowRecord> {
        let record = sqlx::query_as::<_, BorrowRecord>(
            r#"
            INSERT INTO borrows (username, book, borrow_date, return_date)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&borrow.username)
        .bind(&borrow.book)
        .bind(&borrow.borrow_date)
        .bind(&borrow.return_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    /// List all borrow records
    pub async fn list(&self, sort: BorrowSort) -> AppResult<Vec<BorrowRecord>> {
        let query = match sort {
            BorrowSort::Created => "SELECT * FROM borrows ORDER BY id",
            BorrowSort::ReturnDate => "SELECT * FROM borrows ORDER BY return_date, id",
        };

        let records = sqlx::query_as::<_, BorrowRecord>(query)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    /// Delete a borrow record by ID
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM borrows WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Borrow record with id {} not found",
                id
            )));
        }

        Ok(())
    }

    /// Check whether a borrow record still exists
    pub async fn exists(&self, id: i32) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM borrows WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Find records whose return date equals the given canonical date string.
    ///
    /// Literal string equality: records with malformed or differently
    /// formatted return dates never match.
    pub async fn find_due_on(&self, date: &str) -> AppResult<Vec<BorrowRecord>> {
        let records = sqlx::query_as::<_, BorrowRecord>(
            "SELECT * FROM borrows WHERE return_date = $1 ORDER BY id",
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Count records whose return date is not a canonical `YYYY-MM-DD`
    /// string. Such records can never be selected by the due-date scan.
    pub async fn count_malformed_return_dates(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r"SELECT COUNT(*) FROM borrows WHERE return_date !~ '^\d{4}-\d{2}-\d{2}$'",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
