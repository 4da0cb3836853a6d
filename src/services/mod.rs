//! Business logic services

pub mod borrows;
pub mod email;
pub mod reminder;
pub mod reviews;
pub mod users;

use std::sync::Arc;

use crate::{
    config::{AuthConfig, EmailConfig, ReminderConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub repository: Repository,
    pub users: users::UsersService,
    pub reviews: reviews::ReviewsService,
    pub borrows: borrows::BorrowsService,
    pub reminder: Arc<reminder::ReminderService>,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(
        repository: Repository,
        auth_config: AuthConfig,
        email_config: EmailConfig,
        reminder_config: &ReminderConfig,
    ) -> Self {
        let mailer: Arc<dyn email::Mailer> = Arc::new(email::SmtpMailer::new(email_config));
        let store: Arc<dyn reminder::ReminderStore> = Arc::new(repository.clone());

        Self {
            users: users::UsersService::new(repository.clone(), auth_config),
            reviews: reviews::ReviewsService::new(repository.clone()),
            borrows: borrows::BorrowsService::new(repository.clone()),
            repository,
            reminder: Arc::new(reminder::ReminderService::new(
                store,
                mailer,
                reminder_config,
            )),
        }
    }
}
