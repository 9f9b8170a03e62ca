//! Scheduling for daemon mode.
//!
//! A 5-field cron expression is checked against UTC once per minute; each
//! matching minute yields one trigger for the caller to turn into a run.

pub mod cron;
pub mod scheduler;

pub use cron::{CronError, CronExpr};
pub use scheduler::{Scheduler, Trigger, should_fire};
