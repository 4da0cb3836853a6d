//! Borrow record service

use tracing::warn;

use crate::{
    error::{AppError, AppResult},
    models::borrow::{
        is_canonical_date, BorrowRecord, BorrowSort, CreateBorrow, CreateBorrowRequest,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct BorrowsService {
    repository: Repository,
}

impl BorrowsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Create a borrow record.
    ///
    /// All four fields are required and both dates must be canonical
    /// `YYYY-MM-DD` strings; nothing is persisted otherwise. There is no
    /// check that the return date follows the borrow date, that the book is
    /// not already out, or that the username resolves to an account.
    pub async fn create(&self, request: CreateBorrowRequest) -> AppResult<BorrowRecord> {
        let borrow = validate(request)?;
        self.repository.borrows.create(&borrow).await
    }

    /// List borrow records.
    ///
    /// A store failure here degrades to an empty listing; create and delete
    /// still surface their failures.
    pub async fn list(&self, sort: BorrowSort) -> AppResult<Vec<BorrowRecord>> {
        match self.repository.borrows.list(sort).await {
            Ok(records) => Ok(records),
            Err(AppError::Database(e)) => {
                warn!(error = %e, "borrow listing failed, returning empty result");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Delete a borrow record
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.borrows.delete(id).await
    }
}

fn require(field: Option<String>, name: &str) -> AppResult<String> {
    match field {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AppError::Validation(format!("{} is required", name))),
    }
}

/// Validate a create request before anything touches the store.
fn validate(request: CreateBorrowRequest) -> AppResult<CreateBorrow> {
    let username = require(request.username, "username")?;
    let book = require(request.book, "book")?;
    let borrow_date = require(request.borrow_date, "borrowDate")?;
    let return_date = require(request.return_date, "returnDate")?;

    if !is_canonical_date(&borrow_date) {
        return Err(AppError::Validation(
            "borrowDate must be a calendar date in YYYY-MM-DD format".to_string(),
        ));
    }
    if !is_canonical_date(&return_date) {
        return Err(AppError::Validation(
            "returnDate must be a calendar date in YYYY-MM-DD format".to_string(),
        ));
    }

    Ok(CreateBorrow {
        username,
        book,
        borrow_date,
        return_date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_request() -> CreateBorrowRequest {
        CreateBorrowRequest {
            username: Some("alice".to_string()),
            book: Some("Dune".to_string()),
            borrow_date: Some("2024-01-01".to_string()),
            return_date: Some("2024-01-22".to_string()),
        }
    }

    #[test]
    fn complete_request_passes_validation() {
        let borrow = validate(full_request()).unwrap();
        assert_eq!(borrow.username, "alice");
        assert_eq!(borrow.return_date, "2024-01-22");
    }

    #[test]
    fn missing_book_is_a_validation_error() {
        let request = CreateBorrowRequest {
            book: None,
            ..full_request()
        };
        match validate(request) {
            Err(AppError::Validation(msg)) => assert!(msg.contains("book")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn blank_fields_are_treated_as_missing() {
        let request = CreateBorrowRequest {
            username: Some("   ".to_string()),
            ..full_request()
        };
        assert!(matches!(validate(request), Err(AppError::Validation(_))));
    }

    #[test]
    fn unparsable_dates_are_rejected() {
        let request = CreateBorrowRequest {
            return_date: Some("next tuesday".to_string()),
            ..full_request()
        };
        assert!(matches!(validate(request), Err(AppError::Validation(_))));

        let request = CreateBorrowRequest {
            borrow_date: Some("2024-1-1".to_string()),
            ..full_request()
        };
        assert!(matches!(validate(request), Err(AppError::Validation(_))));
    }

    #[test]
    fn return_before_borrow_is_not_rejected() {
        // The original system never enforced date ordering; neither do we.
        let request = CreateBorrowRequest {
            borrow_date: Some("2024-02-01".to_string()),
            return_date: Some("2024-01-01".to_string()),
            ..full_request()
        };
        assert!(validate(request).is_ok());
    }
}
