//! Five-field cron expressions evaluated in UTC.
//!
//! Supports `*`, `*/N` (step), `N` (literal), `N-M` (range), `N-M/S` and
//! comma-separated lists of any of these.

use chrono::{DateTime, Datelike, Duration, Timelike, Utc};
use thiserror::Error;

/// A cron expression that failed to parse.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid cron expression '{expr}': {reason}")]
pub struct CronError {
    pub expr: String,
    pub reason: String,
}

/// A parsed 5-field cron expression: minute hour dom month dow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronExpr {
    source: String,
    minutes: Vec<u32>,
    hours: Vec<u32>,
    days_of_month: Vec<u32>,
    months: Vec<u32>,
    days_of_week: Vec<u32>, // 0=Sun, 6=Sat
}

impl CronExpr {
    /// Parse a standard 5-field cron expression.
    pub fn parse(expr: &str) -> Result<Self, CronError> {
        let invalid = |reason: String| CronError {
            expr: expr.to_string(),
            reason,
        };

        let fields: Vec<&str> = expr.split_whitespace().collect();
        if fields.len() != 5 {
            return Err(invalid(format!(
                "expected 5 fields (minute hour dom month dow), got {}",
                fields.len()
            )));
        }

        Ok(CronExpr {
            source: fields.join(" "),
            minutes: parse_field(fields[0], 0, 59).map_err(invalid)?,
            hours: parse_field(fields[1], 0, 23).map_err(invalid)?,
            days_of_month: parse_field(fields[2], 1, 31).map_err(invalid)?,
            months: parse_field(fields[3], 1, 12).map_err(invalid)?,
            days_of_week: parse_field(fields[4], 0, 6).map_err(invalid)?,
        })
    }

    /// The normalized expression text.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Check if the given datetime matches this cron expression.
    pub fn matches(&self, dt: &DateTime<Utc>) -> bool {
        let dow = dt.weekday().num_days_from_sunday();

        self.minutes.contains(&dt.minute())
            && self.hours.contains(&dt.hour())
            && self.days_of_month.contains(&dt.day())
            && self.months.contains(&dt.month())
            && self.days_of_week.contains(&dow)
    }

    /// The first matching minute strictly after `after`, searching up to
    /// about four years ahead.
    pub fn next_after(&self, after: &DateTime<Utc>) -> Option<DateTime<Utc>> {
        let start = after.with_second(0)?.with_nanosecond(0)? + Duration::minutes(1);
        let mut candidate = start;
        let horizon = start + Duration::days(366 * 4);

        while candidate <= horizon {
            if !self.months.contains(&candidate.month())
                || !self.days_of_month.contains(&candidate.day())
                || !self
                    .days_of_week
                    .contains(&candidate.weekday().num_days_from_sunday())
            {
                // Skip to the start of the next day.
                let next_day = candidate.date_naive().succ_opt()?;
                candidate = next_day.and_hms_opt(0, 0, 0)?.and_utc();
                continue;
            }
            if self.matches(&candidate) {
                return Some(candidate);
            }
            candidate += Duration::minutes(1);
        }
        None
    }
}

impl std::fmt::Display for CronExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

impl std::str::FromStr for CronExpr {
    type Err = CronError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn parse_field(field: &str, min: u32, max: u32) -> Result<Vec<u32>, String> {
    let mut values = Vec::new();

    for part in field.split(',') {
        let part = part.trim();

        if let Some((base, step)) = part.split_once('/') {
            let step: u32 = step
                .parse()
                .map_err(|_| format!("invalid step: {step}"))?;
            if step == 0 {
                return Err("step cannot be zero".into());
            }
            let (start, end) = if base == "*" {
                (min, max)
            } else if base.contains('-') {
                parse_range(base, min, max)?
            } else {
                (parse_value(base, min, max)?, max)
            };
            values.extend((start..=end).step_by(step as usize));
        } else if part.contains('-') {
            let (start, end) = parse_range(part, min, max)?;
            values.extend(start..=end);
        } else if part == "*" {
            values.extend(min..=max);
        } else {
            values.push(parse_value(part, min, max)?);
        }
    }

    values.sort_unstable();
    values.dedup();
    if values.is_empty() {
        return Err("field produced no values".into());
    }
    Ok(values)
}

fn parse_value(s: &str, min: u32, max: u32) -> Result<u32, String> {
    let v: u32 = s.parse().map_err(|_| format!("invalid number: {s}"))?;
    if v < min || v > max {
        return Err(format!("{v} out of range {min}-{max}"));
    }
    Ok(v)
}

fn parse_range(s: &str, min: u32, max: u32) -> Result<(u32, u32), String> {
    let (start, end) = s
        .split_once('-')
        .ok_or_else(|| format!("invalid range: {s}"))?;
    let start: u32 = start
        .parse()
        .map_err(|_| format!("invalid range start: {start}"))?;
    let end: u32 = end
        .parse()
        .map_err(|_| format!("invalid range end: {end}"))?;
    if start < min || end > max || start > end {
        return Err(format!("range {start}-{end} invalid for {min}-{max}"));
    }
    Ok((start, end))
}
