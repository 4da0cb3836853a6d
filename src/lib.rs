//! Bookwise Library Management Backend
//!
//! A Rust implementation of the Bookwise library backend, providing a REST
//! JSON API for accounts, book reviews, and borrow records, plus a daily
//! due-date email reminder job.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod scheduler;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
