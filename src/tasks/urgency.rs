//! Deadline classification for display highlighting.

use chrono::{Days, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::model::{DEADLINE_FORMAT, TaskStatus};

/// Days ahead of today that still count as due soon.
pub const DUE_SOON_DAYS: u64 = 2;

/// Urgency bucket of a task's deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Overdue,
    DueSoon,
    Normal,
}

/// Parse a stored deadline. Accepts `YYYY-MM-DD`, or a full
/// `YYYY-MM-DD HH:MM:SS` timestamp of which only the date is kept.
pub fn parse_deadline(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, DEADLINE_FORMAT)
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

/// Classify a deadline relative to `today`.
///
/// Done tasks are never highlighted. A deadline that does not parse is
/// `Normal`.
pub fn classify(deadline: &str, status: TaskStatus, today: NaiveDate) -> Urgency {
    if status == TaskStatus::Done {
        return Urgency::Normal;
    }

    let Some(deadline) = parse_deadline(deadline) else {
        return Urgency::Normal;
    };

    if deadline < today {
        return Urgency::Overdue;
    }
    match today.checked_add_days(Days::new(DUE_SOON_DAYS)) {
        Some(horizon) if deadline <= horizon => Urgency::DueSoon,
        Some(_) => Urgency::Normal,
        // `today` is at the end of the calendar; anything not overdue is close.
        None => Urgency::DueSoon,
    }
}
