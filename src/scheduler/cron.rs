//! Cron expressions for the outer schedule.
//!
//! Supports the standard five fields (`minute hour day-of-month month
//! day-of-week`) and a six-field form with a leading `second` field.
//! Five-field expressions fire at second zero.
//!
//! Field syntax: `*`, `n`, `a-b`, `a,b,c`, `*/n`, `a-b/n`, `a/n`. Months
//! accept `JAN`..`DEC`, weekdays `SUN`..`SAT`; weekday `7` is Sunday.
//! When both day fields are restricted, a day matches if either does.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Timelike};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CronError {
    #[error("expected 5 or 6 fields, found {0}")]
    FieldCount(usize),

    #[error("invalid {field} value {value:?}")]
    InvalidValue { field: &'static str, value: String },

    #[error("{field} value {value} out of range {min}-{max}")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    #[error("invalid step in {field} field: {value:?}")]
    InvalidStep { field: &'static str, value: String },
}

struct Field {
    name: &'static str,
    min: u32,
    max: u32,
    names: &'static [&'static str],
}

const SECOND: Field = Field { name: "second", min: 0, max: 59, names: &[] };
const MINUTE: Field = Field { name: "minute", min: 0, max: 59, names: &[] };
const HOUR: Field = Field { name: "hour", min: 0, max: 23, names: &[] };
const DAY_OF_MONTH: Field = Field { name: "day-of-month", min: 1, max: 31, names: &[] };
const MONTH: Field = Field {
    name: "month",
    min: 1,
    max: 12,
    names: &["JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC"],
};
const DAY_OF_WEEK: Field = Field {
    name: "day-of-week",
    min: 0,
    max: 7,
    names: &["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"],
};

impl Field {
    fn value(&self, raw: &str) -> Result<u32, CronError> {
        let value = match raw.parse::<u32>() {
            Ok(v) => v,
            Err(_) => {
                let upper = raw.to_ascii_uppercase();
                let index = self
                    .names
                    .iter()
                    .position(|name| *name == upper)
                    .ok_or_else(|| CronError::InvalidValue {
                        field: self.name,
                        value: raw.to_string(),
                    })?;
                // Month names start at 1, weekday names at 0.
                index as u32 + self.min
            }
        };

        if value < self.min || value > self.max {
            return Err(CronError::OutOfRange {
                field: self.name,
                value,
                min: self.min,
                max: self.max,
            });
        }
        Ok(value)
    }

    /// Parse a comma-separated field into a bit set indexed by value.
    fn parse(&self, spec: &str) -> Result<u64, CronError> {
        let mut bits = 0u64;

        for part in spec.split(',') {
            let (range, step) = match part.split_once('/') {
                Some((range, step)) => {
                    let step = step
                        .parse::<u32>()
                        .ok()
                        .filter(|s| *s > 0)
                        .ok_or_else(|| CronError::InvalidStep {
                            field: self.name,
                            value: part.to_string(),
                        })?;
                    (range, Some(step))
                }
                None => (part, None),
            };

            let (start, end) = if range == "*" {
                (self.min, self.max)
            } else if let Some((a, b)) = range.split_once('-') {
                (self.value(a)?, self.value(b)?)
            } else {
                let v = self.value(range)?;
                if step.is_some() {
                    (v, self.max)
                } else {
                    (v, v)
                }
            };

            if start > end {
                return Err(CronError::InvalidValue {
                    field: self.name,
                    value: part.to_string(),
                });
            }

            let step = step.unwrap_or(1);
            let mut v = start;
            while v <= end {
                bits |= 1 << v;
                v += step;
            }
        }

        Ok(bits)
    }
}

/// A parsed cron expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronSchedule {
    expression: String,
    seconds: u64,
    minutes: u64,
    hours: u64,
    days_of_month: u64,
    months: u64,
    days_of_week: u64,
    dom_restricted: bool,
    dow_restricted: bool,
}

/// How far ahead `next_after` searches before giving up.
const SEARCH_LIMIT_DAYS: i64 = 5 * 366;

impl CronSchedule {
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// First firing strictly after `after`, in the same time zone.
    ///
    /// Local times that do not exist (DST gaps) are skipped. Returns `None`
    /// when nothing matches within five years (e.g. `0 0 30 2 *`).
    pub fn next_after<Tz: TimeZone>(&self, after: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        let tz = after.timezone();
        let start = after.naive_local().with_nanosecond(0)? + TimeDelta::seconds(1);
        let limit = start + TimeDelta::days(SEARCH_LIMIT_DAYS);
        let mut t = start;

        while t <= limit {
            if !bit(self.months, t.month()) {
                t = first_of_next_month(t.date())?;
                continue;
            }
            if !self.day_matches(t.date()) {
                t = t.date().succ_opt()?.and_hms_opt(0, 0, 0)?;
                continue;
            }
            if !bit(self.hours, t.hour()) {
                t = t.date().and_hms_opt(t.hour(), 0, 0)? + TimeDelta::hours(1);
                continue;
            }
            if !bit(self.minutes, t.minute()) {
                t = t.date().and_hms_opt(t.hour(), t.minute(), 0)? + TimeDelta::minutes(1);
                continue;
            }
            if !bit(self.seconds, t.second()) {
                t += TimeDelta::seconds(1);
                continue;
            }

            let mapped = tz.from_local_datetime(&t);
            let candidate = [mapped.clone().earliest(), mapped.latest()]
                .into_iter()
                .flatten()
                .find(|dt| dt > after);
            match candidate {
                Some(dt) => return Some(dt),
                None => t += TimeDelta::seconds(1),
            }
        }

        None
    }

    fn day_matches(&self, date: NaiveDate) -> bool {
        let dom = bit(self.days_of_month, date.day());
        let dow = bit(self.days_of_week, date.weekday().num_days_from_sunday());
        if self.dom_restricted && self.dow_restricted {
            dom || dow
        } else {
            dom && dow
        }
    }
}

fn bit(set: u64, value: u32) -> bool {
    set & (1 << value) != 0
}

fn first_of_next_month(date: NaiveDate) -> Option<NaiveDateTime> {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)?.and_hms_opt(0, 0, 0)
}

impl FromStr for CronSchedule {
    type Err = CronError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split_whitespace().collect();
        let (second, rest) = match fields.len() {
            5 => ("0", &fields[..]),
            6 => (fields[0], &fields[1..]),
            n => return Err(CronError::FieldCount(n)),
        };

        let mut days_of_week = DAY_OF_WEEK.parse(rest[4])?;
        if bit(days_of_week, 7) {
            days_of_week = (days_of_week | 1) & !(1 << 7);
        }

        Ok(Self {
            expression: fields.join(" "),
            seconds: SECOND.parse(second)?,
            minutes: MINUTE.parse(rest[0])?,
            hours: HOUR.parse(rest[1])?,
            days_of_month: DAY_OF_MONTH.parse(rest[2])?,
            months: MONTH.parse(rest[3])?,
            days_of_week,
            dom_restricted: !rest[2].starts_with('*'),
            dow_restricted: !rest[4].starts_with('*'),
        })
    }
}

impl fmt::Display for CronSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression)
    }
}
