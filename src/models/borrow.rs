//! Borrow record model and related types

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

/// Canonical calendar-date format for borrow and return dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

static CANONICAL_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date regex"));

/// Check that a date string is zero-padded `YYYY-MM-DD` and names a real
/// calendar day. The due-date scan compares stored strings literally, so
/// anything else will never match it.
pub fn is_canonical_date(s: &str) -> bool {
    CANONICAL_DATE.is_match(s) && NaiveDate::parse_from_str(s, DATE_FORMAT).is_ok()
}

/// Borrow record from database
///
/// `username` is a soft reference to `users.username`: it is matched as a
/// plain string, and a record can outlive its account.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRecord {
    pub id: i32,
    pub username: String,
    pub book: String,
    pub borrow_date: String,
    pub return_date: String,
}

/// Create borrow record request
///
/// Fields are optional at the wire level so that a missing field surfaces as
/// a validation failure instead of a deserialization rejection.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBorrowRequest {
    pub username: Option<String>,
    pub book: Option<String>,
    pub borrow_date: Option<String>,
    pub return_date: Option<String>,
}

/// Validated create-borrow input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateBorrow {
    pub username: String,
    pub book: String,
    pub borrow_date: String,
    pub return_date: String,
}

/// Ordering for borrow listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorrowSort {
    /// Insertion order (by id).
    Created,
    /// Return date ascending, soonest due first.
    ReturnDate,
}

/// Borrow listing query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct BorrowQuery {
    /// Sort key: "returnDate" (default) or "created".
    pub sort: Option<String>,
}
