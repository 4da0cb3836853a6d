//! Daily reminder job scheduling

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, NaiveTime};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::{config::ReminderConfig, services::reminder::ReminderService};

/// Source of the current local time.
///
/// Injectable so tests can drive the daily trigger deterministically
/// instead of waiting on wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// Wall-clock time
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Background job firing the due-date scan once a day at a fixed local time.
///
/// One job per running process. There is no cross-instance coordination:
/// running several instances of the service sends every reminder once per
/// instance.
pub struct ReminderJob {
    service: Arc<ReminderService>,
    clock: Arc<dyn Clock>,
    fire_time: NaiveTime,
}

impl ReminderJob {
    pub fn new(
        service: Arc<ReminderService>,
        clock: Arc<dyn Clock>,
        config: &ReminderConfig,
    ) -> Self {
        let fire_time =
            NaiveTime::from_hms_opt(config.hour, config.minute, 0).unwrap_or(NaiveTime::MIN);
        Self {
            service,
            clock,
            fire_time,
        }
    }

    /// Duration until the next occurrence of the configured local fire time.
    fn until_next_fire(&self, now: DateTime<Local>) -> Duration {
        let today_fire = now.date_naive().and_time(self.fire_time);
        let next = if now.naive_local() < today_fire {
            today_fire
        } else {
            today_fire + chrono::Duration::days(1)
        };

        (next - now.naive_local()).to_std().unwrap_or(Duration::ZERO)
    }

    /// Run a single scan-and-dispatch cycle.
    async fn run_cycle(&self) {
        let today = self.clock.now().date_naive();
        match self.service.run_daily(today).await {
            Ok(summary) => info!(?summary, "reminder cycle complete"),
            Err(e) => error!(error = %e, "reminder cycle failed"),
        }
    }

    /// Start the daily job.
    ///
    /// Returns a handle that can be used to abort the task.
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                let wait = self.until_next_fire(self.clock.now());
                debug!(seconds = wait.as_secs(), "sleeping until next reminder fire");
                tokio::time::sleep(wait).await;
                self.run_cycle().await;
            }
        })
    }
}
