//! Due-date scan and reminder dispatch
//!
//! Once a day the reminder job asks this service to select every borrow
//! record due tomorrow and mail the owning account. Matching is a literal
//! string comparison against the canonical `YYYY-MM-DD` form, exactly as the
//! dates were stored by the borrow API.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::{
    config::ReminderConfig,
    error::{AppError, AppResult},
    models::{
        borrow::{BorrowRecord, DATE_FORMAT},
        user::User,
    },
    repository::Repository,
    services::email::Mailer,
};

/// Store operations the reminder pipeline depends on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReminderStore: Send + Sync {
    /// Records whose return date string-equals `date`.
    async fn due_on(&self, date: &str) -> AppResult<Vec<BorrowRecord>>;
    /// Whether a record selected by the scan still exists.
    async fn record_exists(&self, id: i32) -> AppResult<bool>;
    /// Account owning a record, by exact username match.
    async fn owner_by_username(&self, username: &str) -> AppResult<Option<User>>;
    /// Count of records whose return date can never match a scan.
    async fn count_malformed_return_dates(&self) -> AppResult<i64>;
}

#[async_trait]
impl ReminderStore for Repository {
    async fn due_on(&self, date: &str) -> AppResult<Vec<BorrowRecord>> {
        self.borrows.find_due_on(date).await
    }

    async fn record_exists(&self, id: i32) -> AppResult<bool> {
        self.borrows.exists(id).await
    }

    async fn owner_by_username(&self, username: &str) -> AppResult<Option<User>> {
        self.users.get_by_username(username).await
    }

    async fn count_malformed_return_dates(&self) -> AppResult<i64> {
        self.borrows.count_malformed_return_dates().await
    }
}

/// Outcome counters for one dispatch batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub selected: usize,
    pub sent: usize,
    pub skipped_missing_owner: usize,
    pub skipped_deleted: usize,
    pub failed: usize,
}

pub struct ReminderService {
    store: Arc<dyn ReminderStore>,
    mailer: Arc<dyn Mailer>,
    send_timeout: Duration,
    max_retries: u32,
    retry_backoff: Duration,
}

impl ReminderService {
    pub fn new(
        store: Arc<dyn ReminderStore>,
        mailer: Arc<dyn Mailer>,
        config: &ReminderConfig,
    ) -> Self {
        Self {
            store,
            mailer,
            send_timeout: Duration::from_secs(config.send_timeout_secs),
            max_retries: config.max_retries,
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }

    /// Canonical date string for the day after `today`.
    pub fn tomorrow(today: NaiveDate) -> String {
        (today + chrono::Duration::days(1))
            .format(DATE_FORMAT)
            .to_string()
    }

    /// Run one daily cycle: scan for records due tomorrow, then dispatch.
    ///
    /// There is no de-duplication across runs: invoking this twice on the
    /// same day sends the reminders twice.
    pub async fn run_daily(&self, today: NaiveDate) -> AppResult<DispatchSummary> {
        let due_date = Self::tomorrow(today);

        match self.store.count_malformed_return_dates().await {
            Ok(0) => {}
            Ok(count) => warn!(
                count,
                "borrow records with non-canonical return dates can never match the scan"
            ),
            Err(e) => warn!(error = %e, "failed to count malformed return dates"),
        }

        let records = self.store.due_on(&due_date).await?;
        info!(%due_date, selected = records.len(), "due-date scan complete");

        Ok(self.dispatch(records).await)
    }

    /// Send one reminder per due record with a resolvable owner.
    ///
    /// Per-record failures are isolated: a record whose send fails, whose
    /// owner is unknown, or that was returned since the scan is counted and
    /// skipped, and the batch continues.
    pub async fn dispatch(&self, records: Vec<BorrowRecord>) -> DispatchSummary {
        let mut summary = DispatchSummary {
            selected: records.len(),
            ..Default::default()
        };

        for record in records {
            // The record may have been returned between scan and dispatch.
            match self.store.record_exists(record.id).await {
                Ok(true) => {}
                Ok(false) => {
                    debug!(record_id = record.id, "record gone since scan, skipping");
                    summary.skipped_deleted += 1;
                    continue;
                }
                Err(e) => {
                    warn!(record_id = record.id, error = %e, "existence check failed");
                    summary.failed += 1;
                    continue;
                }
            }

            let owner = match self.store.owner_by_username(&record.username).await {
                Ok(Some(user)) => user,
                Ok(None) => {
                    warn!(
                        record_id = record.id,
                        username = %record.username,
                        "no account matches borrow record owner"
                    );
                    summary.skipped_missing_owner += 1;
                    continue;
                }
                Err(e) => {
                    warn!(record_id = record.id, error = %e, "owner lookup failed");
                    summary.failed += 1;
                    continue;
                }
            };

            match self.send_with_retry(&owner.email, &record).await {
                Ok(()) => summary.sent += 1,
                Err(e) => {
                    warn!(
                        record_id = record.id,
                        to = %owner.email,
                        error = %e,
                        "reminder send failed"
                    );
                    summary.failed += 1;
                }
            }
        }

        info!(
            selected = summary.selected,
            sent = summary.sent,
            skipped_missing_owner = summary.skipped_missing_owner,
            skipped_deleted = summary.skipped_deleted,
            failed = summary.failed,
            "reminder dispatch complete"
        );

        summary
    }

    async fn send_with_retry(&self, to: &str, record: &BorrowRecord) -> AppResult<()> {
        let subject = "Book Return Reminder";
        let body = format!(
            "Reminder: Please return \"{}\" by {}.",
            record.book, record.return_date
        );

        let mut attempt: u32 = 0;
        loop {
            let result =
                tokio::time::timeout(self.send_timeout, self.mailer.send(to, subject, &body)).await;

            let err = match result {
                Ok(Ok(())) => return Ok(()),
                Ok(Err(e)) => e,
                Err(_) => AppError::Transport(format!(
                    "send timed out after {:?}",
                    self.send_timeout
                )),
            };

            if attempt >= self.max_retries {
                return Err(err);
            }
            attempt += 1;
            warn!(attempt, error = %err, "reminder send failed, retrying");
            tokio::time::sleep(self.retry_backoff * (1 << (attempt - 1))).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::Role;
    use crate::services::email::MockMailer;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn test_config(max_retries: u32) -> ReminderConfig {
        ReminderConfig {
            enabled: true,
            hour: 9,
            minute: 0,
            send_timeout_secs: 5,
            max_retries,
            retry_backoff_ms: 0,
        }
    }

    fn record(id: i32, username: &str, book: &str, return_date: &str) -> BorrowRecord {
        BorrowRecord {
            id,
            username: username.to_string(),
            book: book.to_string(),
            borrow_date: "2024-01-01".to_string(),
            return_date: return_date.to_string(),
        }
    }

    fn account(username: &str, email: &str) -> User {
        User {
            id: 1,
            username: username.to_string(),
            email: email.to_string(),
            password: "hash".to_string(),
            role: Role::User,
            created_at: None,
        }
    }

    fn service(
        store: MockReminderStore,
        mailer: MockMailer,
        max_retries: u32,
    ) -> ReminderService {
        ReminderService::new(Arc::new(store), Arc::new(mailer), &test_config(max_retries))
    }

    #[test]
    fn tomorrow_is_zero_padded() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(ReminderService::tomorrow(today), "2024-01-16");
    }

    #[test]
    fn tomorrow_rolls_over_month_and_year() {
        let end_of_month = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(ReminderService::tomorrow(end_of_month), "2024-02-01");

        let end_of_year = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        assert_eq!(ReminderService::tomorrow(end_of_year), "2025-01-01");

        let leap_february = NaiveDate::from_ymd_opt(2024, 2, 28).unwrap();
        assert_eq!(ReminderService::tomorrow(leap_february), "2024-02-29");
    }

    #[tokio::test]
    async fn scan_queries_exactly_tomorrow() {
        let mut store = MockReminderStore::new();
        store
            .expect_count_malformed_return_dates()
            .returning(|| Ok(0));
        store
            .expect_due_on()
            .withf(|date| date == "2024-01-16")
            .times(1)
            .returning(|_| Ok(vec![]));

        let svc = service(store, MockMailer::new(), 0);
        let today = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let summary = svc.run_daily(today).await.unwrap();

        assert_eq!(summary, DispatchSummary::default());
    }

    #[tokio::test]
    async fn dispatch_sends_one_reminder_per_resolvable_owner() {
        let mut store = MockReminderStore::new();
        store.expect_record_exists().returning(|_| Ok(true));
        store
            .expect_owner_by_username()
            .withf(|name| name == "alice")
            .returning(|_| Ok(Some(account("alice", "alice@example.org"))));
        store
            .expect_owner_by_username()
            .withf(|name| name == "ghost")
            .returning(|_| Ok(None));

        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .withf(|to, subject, body| {
                to == "alice@example.org"
                    && subject == "Book Return Reminder"
                    && body == "Reminder: Please return \"Dune\" by 2024-01-16."
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let svc = service(store, mailer, 0);
        let summary = svc
            .dispatch(vec![
                record(1, "alice", "Dune", "2024-01-16"),
                record(2, "ghost", "Solaris", "2024-01-16"),
            ])
            .await;

        assert_eq!(summary.selected, 2);
        assert_eq!(summary.sent, 1);
        assert_eq!(summary.skipped_missing_owner, 1);
        assert_eq!(summary.failed, 0);
    }

    #[tokio::test]
    async fn transport_failure_does_not_abort_the_batch() {
        let mut store = MockReminderStore::new();
        store.expect_record_exists().returning(|_| Ok(true));
        store.expect_owner_by_username().returning(|name| {
            Ok(Some(account(name, &format!("{}@example.org", name))))
        });

        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .withf(|to, _, _| to == "alice@example.org")
            .times(1)
            .returning(|_, _, _| Ok(()));
        mailer
            .expect_send()
            .withf(|to, _, _| to == "bob@example.org")
            .times(1)
            .returning(|_, _, _| Err(AppError::Transport("connection refused".to_string())));
        mailer
            .expect_send()
            .withf(|to, _, _| to == "carol@example.org")
            .times(1)
            .returning(|_, _, _| Ok(()));

        let svc = service(store, mailer, 0);
        let summary = svc
            .dispatch(vec![
                record(1, "alice", "Dune", "2024-01-16"),
                record(2, "bob", "Solaris", "2024-01-16"),
                record(3, "carol", "Hyperion", "2024-01-16"),
            ])
            .await;

        assert_eq!(summary.sent, 2);
        assert_eq!(summary.failed, 1);
    }

    #[tokio::test]
    async fn record_deleted_between_scan_and_dispatch_is_skipped() {
        let mut store = MockReminderStore::new();
        store.expect_record_exists().returning(|_| Ok(false));

        // No owner lookup and no send may happen for a deleted record.
        let svc = service(store, MockMailer::new(), 0);
        let summary = svc
            .dispatch(vec![record(1, "alice", "Dune", "2024-01-16")])
            .await;

        assert_eq!(summary.skipped_deleted, 1);
        assert_eq!(summary.sent, 0);
        assert_eq!(summary.failed, 0);
    }

    #[tokio::test]
    async fn failed_send_is_retried_up_to_the_bound() {
        let mut store = MockReminderStore::new();
        store.expect_record_exists().returning(|_| Ok(true));
        store
            .expect_owner_by_username()
            .returning(|_| Ok(Some(account("alice", "alice@example.org"))));

        let calls = Arc::new(AtomicUsize::new(0));
        let counted = calls.clone();
        let mut mailer = MockMailer::new();
        mailer.expect_send().times(3).returning(move |_, _, _| {
            if counted.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(AppError::Transport("temporary failure".to_string()))
            } else {
                Ok(())
            }
        });

        let svc = service(store, mailer, 2);
        let summary = svc
            .dispatch(vec![record(1, "alice", "Dune", "2024-01-16")])
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(summary.sent, 1);
        assert_eq!(summary.failed, 0);
    }
}
