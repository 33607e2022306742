//! Work segments - one clock-in/clock-out interval each.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{UserId, ValidationError};

/// One clock-in/clock-out interval, possibly still open.
///
/// A segment is keyed to the calendar date it was opened on. A closed
/// segment whose end time is chronologically before its start time crossed
/// midnight while staying anchored to its opening date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Unique identifier, assigned at creation and immutable.
    pub id: i64,
    /// Owning user. Immutable after creation unless a privileged role
    /// reassigns it.
    pub owner: UserId,
    /// Calendar date assigned at creation (server-local).
    pub date: NaiveDate,
    /// Local time of day the segment opened.
    pub start_time: NaiveTime,
    /// Local time of day the segment closed; `None` while open.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<NaiveTime>,
    /// Creation timestamp (UTC), for audit and order tie-breaking.
    pub created_at: DateTime<Utc>,
}

impl Segment {
    /// Whether the segment has no recorded end time.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.end_time.is_none()
    }

    /// Elapsed whole minutes, or `None` while the segment is open.
    ///
    /// Applies the midnight-wrap rule; see [`wrapped_minutes`].
    #[must_use]
    pub fn duration_minutes(&self) -> Option<i64> {
        self.end_time
            .map(|end| wrapped_minutes(self.start_time, end))
    }

    /// The external representation exposed to API consumers.
    #[must_use]
    pub fn view(&self) -> SegmentView {
        SegmentView {
            id: self.id,
            owner: self.owner.clone(),
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
            duration_minutes: self.duration_minutes(),
        }
    }
}

/// Segment as serialized for external consumers.
///
/// `duration_minutes` is `null` unless both times are present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentView {
    pub id: i64,
    pub owner: UserId,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: Option<NaiveTime>,
    pub duration_minutes: Option<i64>,
}

/// Whole minutes between two times of day, wrapping across midnight.
///
/// If `end` is chronologically before `start`, 24 hours are added before
/// taking the difference: the interval crossed midnight while staying keyed
/// to its opening date. The result is floored to whole minutes and never
/// negative.
#[must_use]
pub fn wrapped_minutes(start: NaiveTime, end: NaiveTime) -> i64 {
    let mut delta = end.signed_duration_since(start);
    if delta < chrono::Duration::zero() {
        delta = delta + chrono::Duration::hours(24);
    }
    delta.num_minutes().max(0)
}

/// Parses a time of day from `HH:MM:SS` or `HH:MM`.
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| ValidationError::InvalidTime {
            value: value.to_string(),
        })
}
