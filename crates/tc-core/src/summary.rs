//! Daily and monthly aggregation over segments.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::clock::ClockReading;
use crate::segment::{Segment, SegmentView, wrapped_minutes};

/// Aggregate view of one user's current local date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayTotals {
    /// The date being summarized.
    pub date: NaiveDate,
    /// Whether the user has an open segment on any date, not just today.
    pub open: bool,
    /// Whole minutes worked today, including the running partial of an open
    /// segment opened today.
    pub total_minutes: i64,
    /// `total_minutes / 60`, rounded to 2 decimal places.
    pub total_hours: f64,
    /// Today's segments, ordered by `(start_time, id)`.
    pub segments: Vec<SegmentView>,
}

/// Aggregate view of one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthSummary {
    pub year: i32,
    pub month: u32,
    /// Whole minutes across closed segments; open segments contribute 0.
    pub total_minutes: i64,
    /// `total_minutes / 60`, rounded to 2 decimal places.
    pub total_hours: f64,
    /// Count of segments in scope, open or closed.
    pub segments_count: usize,
}

/// Converts whole minutes to hours rounded to 2 decimal places.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn hours_from_minutes(minutes: i64) -> f64 {
    (minutes as f64 / 60.0 * 100.0).round() / 100.0
}

/// Builds the "today" aggregate from the day's segments.
///
/// `segments` must be the caller's segments for `reading.date`, ordered by
/// `(start_time, id)`. `any_open` reports whether an open segment exists for
/// the owner on *any* date; only an open segment opened today contributes a
/// running partial to the totals.
#[must_use]
pub fn day_totals(segments: &[Segment], any_open: bool, reading: &ClockReading) -> DayTotals {
    let mut total_minutes = 0;
    for segment in segments {
        total_minutes += match segment.end_time {
            Some(end) => wrapped_minutes(segment.start_time, end),
            None if segment.date == reading.date => {
                wrapped_minutes(segment.start_time, reading.time)
            }
            None => 0,
        };
    }

    DayTotals {
        date: reading.date,
        open: any_open,
        total_minutes,
        total_hours: hours_from_minutes(total_minutes),
        segments: segments.iter().map(Segment::view).collect(),
    }
}

/// Builds the monthly summary from the month's segments.
///
/// Open segments count toward `segments_count` but contribute no minutes.
#[must_use]
pub fn month_summary(segments: &[Segment], year: i32, month: u32) -> MonthSummary {
    let total_minutes: i64 = segments
        .iter()
        .filter_map(Segment::duration_minutes)
        .sum();

    MonthSummary {
        year,
        month,
        total_minutes,
        total_hours: hours_from_minutes(total_minutes),
        segments_count: segments.len(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, NaiveTime, Utc};

    use super::*;
    use crate::types::UserId;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn segment(id: i64, on: NaiveDate, start: NaiveTime, end: Option<NaiveTime>) -> Segment {
        Segment {
            id,
            owner: UserId::new("alice").unwrap(),
            date: on,
            start_time: start,
            end_time: end,
            created_at: DateTime::parse_from_rfc3339("2025-01-15T07:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        }
    }

    fn reading_at(on: NaiveDate, now: NaiveTime) -> ClockReading {
        ClockReading {
            date: on,
            time: now,
            utc: DateTime::parse_from_rfc3339("2025-01-15T12:30:00Z")
                .unwrap()
                .with_timezone(&Utc),
        }
    }

    #[test]
    fn hours_round_to_two_decimals() {
        assert!((hours_from_minutes(630) - 10.5).abs() < f64::EPSILON);
        assert!((hours_from_minutes(270) - 4.5).abs() < f64::EPSILON);
        assert!((hours_from_minutes(100) - 1.67).abs() < f64::EPSILON);
        assert!((hours_from_minutes(0) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn today_sums_closed_and_running_partial() {
        // One closed 08:00-12:00 segment plus one open segment started at
        // 13:00, observed at 13:30: 240 + 30 minutes.
        let today = date(2025, 1, 15);
        let segments = vec![
            segment(1, today, time(8, 0), Some(time(12, 0))),
            segment(2, today, time(13, 0), None),
        ];
        let totals = day_totals(&segments, true, &reading_at(today, time(13, 30)));

        assert!(totals.open);
        assert_eq!(totals.total_minutes, 270);
        assert!((totals.total_hours - 4.5).abs() < f64::EPSILON);
        assert_eq!(totals.segments.len(), 2);
        assert_eq!(totals.segments[0].duration_minutes, Some(240));
        assert_eq!(totals.segments[1].duration_minutes, None);
    }

    #[test]
    fn open_segment_from_prior_date_adds_nothing_today() {
        // The owner-wide open flag is set, but yesterday's open segment is
        // not part of today's list and contributes no partial.
        let today = date(2025, 1, 15);
        let totals = day_totals(&[], true, &reading_at(today, time(9, 0)));
        assert!(totals.open);
        assert_eq!(totals.total_minutes, 0);
        assert!(totals.segments.is_empty());
    }

    #[test]
    fn running_partial_wraps_past_midnight() {
        // Opened 23:30 yesterday-keyed date, observed 00:15 "today" on the
        // same keyed date: 45 minutes so far.
        let today = date(2025, 1, 15);
        let segments = vec![segment(1, today, time(23, 30), None)];
        let totals = day_totals(&segments, true, &reading_at(today, time(0, 15)));
        assert_eq!(totals.total_minutes, 45);
    }

    #[test]
    fn month_counts_open_segments_but_sums_closed_only() {
        // 10h30m of closed time in February plus one open segment.
        let segments = vec![
            segment(1, date(2025, 2, 3), time(8, 0), Some(time(16, 0))),
            segment(2, date(2025, 2, 4), time(9, 0), Some(time(11, 30))),
            segment(3, date(2025, 2, 28), time(22, 0), None),
        ];
        let summary = month_summary(&segments, 2025, 2);

        assert_eq!(summary.total_minutes, 630);
        assert!((summary.total_hours - 10.5).abs() < f64::EPSILON);
        assert_eq!(summary.segments_count, 3);
    }

    #[test]
    fn empty_month_is_all_zeroes() {
        let summary = month_summary(&[], 2025, 13);
        assert_eq!(summary.total_minutes, 0);
        assert!((summary.total_hours - 0.0).abs() < f64::EPSILON);
        assert_eq!(summary.segments_count, 0);
    }
}
