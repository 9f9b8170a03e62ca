//! Minute-resolution scheduler loop.

use chrono::{DateTime, Datelike, Timelike, Utc};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cron::CronExpr;

/// Emitted when the schedule matches the current minute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trigger {
    pub fired_at: DateTime<Utc>,
    pub schedule: String,
}

/// Evaluates a cron expression against UTC wall-clock time.
pub struct Scheduler {
    expr: CronExpr,
    interval: Duration,
}

impl Scheduler {
    pub fn new(expr: CronExpr) -> Self {
        Self {
            expr,
            interval: Duration::from_secs(60),
        }
    }

    /// Override the evaluation interval (one minute by default).
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn expr(&self) -> &CronExpr {
        &self.expr
    }

    /// Start the background loop.
    ///
    /// The receiver yields one [`Trigger`] per matching minute. The loop ends
    /// when `cancel` fires or the receiver is dropped.
    pub fn start(
        self,
        cancel: CancellationToken,
    ) -> (mpsc::Receiver<Trigger>, tokio::task::JoinHandle<()>) {
        let (tx, rx) = mpsc::channel::<Trigger>(4);

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut last_fired: Option<DateTime<Utc>> = None;
            info!(schedule = %self.expr, "Scheduler started");

            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = interval.tick() => {}
                }

                let now = Utc::now();
                if !should_fire(&self.expr, &now, last_fired.as_ref()) {
                    continue;
                }
                last_fired = Some(now);
                info!(fired_at = %now.to_rfc3339(), "Schedule triggered");

                let trigger = Trigger {
                    fired_at: now,
                    schedule: self.expr.to_string(),
                };
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    sent = tx.send(trigger) => {
                        if sent.is_err() {
                            debug!("Trigger receiver dropped, stopping scheduler");
                            return;
                        }
                    }
                }
            }
            debug!("Scheduler stopped");
        });

        (rx, handle)
    }
}

/// `now` matches and no trigger was emitted in the same minute.
pub fn should_fire(expr: &CronExpr, now: &DateTime<Utc>, last: Option<&DateTime<Utc>>) -> bool {
    if !expr.matches(now) {
        return false;
    }
    match last {
        Some(last) => !same_minute(last, now),
        None => true,
    }
}

fn same_minute(a: &DateTime<Utc>, b: &DateTime<Utc>) -> bool {
    a.minute() == b.minute()
        && a.hour() == b.hour()
        && a.day() == b.day()
        && a.month() == b.month()
        && a.year() == b.year()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        chrono::NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
            .and_utc()
    }

    #[test]
    fn fires_once_per_matching_minute() {
        let expr = CronExpr::parse("0 9 * * *").unwrap();

        assert!(should_fire(&expr, &at(9, 0, 5), None));
        assert!(!should_fire(&expr, &at(9, 0, 40), Some(&at(9, 0, 5))));
        assert!(!should_fire(&expr, &at(9, 1, 0), Some(&at(9, 0, 5))));
        assert!(!should_fire(&expr, &at(8, 59, 59), None));
    }

    #[test]
    fn fires_again_the_next_day() {
        let expr = CronExpr::parse("0 9 * * *").unwrap();
        let yesterday = at(9, 0, 0) - chrono::Duration::days(1);
        assert!(should_fire(&expr, &at(9, 0, 0), Some(&yesterday)));
    }

    #[tokio::test]
    async fn every_minute_schedule_triggers_on_first_tick() {
        let cancel = CancellationToken::new();
        let scheduler = Scheduler::new(CronExpr::parse("* * * * *").unwrap());
        let (mut rx, handle) = scheduler.start(cancel.clone());

        let trigger = rx.recv().await.unwrap();
        assert_eq!(trigger.schedule, "* * * * *");

        cancel.cancel();
        handle.await.unwrap();
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn cancellation_stops_an_idle_loop() {
        let cancel = CancellationToken::new();
        // Feb 31st never matches.
        let scheduler = Scheduler::new(CronExpr::parse("0 0 31 2 *").unwrap())
            .with_interval(Duration::from_millis(10));
        let (mut rx, handle) = scheduler.start(cancel.clone());

        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();
        handle.await.unwrap();
        assert!(rx.recv().await.is_none());
    }
}
