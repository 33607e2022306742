//! Month command: the monthly summary.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::Datelike;

use tc_core::{Clock, Identity, Scope, UserId, month_summary};
use tc_db::Database;

use super::today::format_duration;

/// Runs `tc month`, summarizing one calendar month.
///
/// Year and month default to the current ones. Out-of-range values are
/// accepted literally and simply match zero segments.
#[expect(
    clippy::too_many_arguments,
    reason = "arguments mirror the CLI flags one-to-one"
)]
pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    identity: &Identity,
    clock: &impl Clock,
    year: Option<i32>,
    month: Option<u32>,
    user: Option<String>,
    json: bool,
) -> Result<()> {
    let reading = clock.read();
    let year = year.unwrap_or_else(|| reading.date.year());
    let month = month.unwrap_or_else(|| reading.date.month());

    let requested = user
        .map(UserId::new)
        .transpose()
        .context("invalid --user")?;
    let scope = Scope::for_identity(identity).narrow_to(identity, requested)?;

    let segments = db.segments_for_month(&scope, year, month)?;
    let summary = month_summary(&segments, year, month);

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&summary)?)?;
        return Ok(());
    }

    writeln!(writer, "Month {year:04}-{month:02}")?;
    writeln!(writer, "Segments: {}", summary.segments_count)?;
    writeln!(
        writer,
        "Total:    {} ({} min / {:.2} h)",
        format_duration(summary.total_minutes),
        summary.total_minutes,
        summary.total_hours
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

    use tc_core::{ClockReading, FixedClock, Role};

    use super::*;

    fn identity(name: &str, role: Role) -> Identity {
        Identity {
            user: UserId::new(name).unwrap(),
            role,
            staff: false,
        }
    }

    fn clock_at(date: &str, time: &str) -> FixedClock {
        FixedClock::new(ClockReading {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            time: NaiveTime::parse_from_str(time, "%H:%M:%S").unwrap(),
            utc: DateTime::parse_from_rfc3339("2025-02-28T07:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        })
    }

    fn seed_february(db: &mut Database, alice: &UserId) {
        // 8h + 2h30m closed, plus one still-open evening segment.
        db.clock_in(alice, &clock_at("2025-02-03", "08:00:00").read())
            .unwrap();
        db.clock_out(alice, &clock_at("2025-02-03", "16:00:00").read())
            .unwrap();
        db.clock_in(alice, &clock_at("2025-02-04", "09:00:00").read())
            .unwrap();
        db.clock_out(alice, &clock_at("2025-02-04", "11:30:00").read())
            .unwrap();
        db.clock_in(alice, &clock_at("2025-02-28", "22:00:00").read())
            .unwrap();
    }

    #[test]
    fn month_counts_open_segments_but_sums_closed_time() {
        let mut db = Database::open_in_memory().unwrap();
        let alice = identity("alice", Role::Worker);
        seed_february(&mut db, &alice.user);

        let mut output = Vec::new();
        run(
            &mut output,
            &db,
            &alice,
            &clock_at("2025-02-28", "23:00:00"),
            Some(2025),
            Some(2),
            None,
            false,
        )
        .unwrap();

        let expected = "\
Month 2025-02
Segments: 3
Total:    10h 30m (630 min / 10.50 h)
";
        assert_eq!(String::from_utf8(output).unwrap(), expected);
    }

    #[test]
    fn month_defaults_to_current_year_and_month() {
        let mut db = Database::open_in_memory().unwrap();
        let alice = identity("alice", Role::Worker);
        seed_february(&mut db, &alice.user);

        let mut output = Vec::new();
        run(
            &mut output,
            &db,
            &alice,
            &clock_at("2025-02-28", "23:00:00"),
            None,
            None,
            None,
            true,
        )
        .unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&String::from_utf8(output).unwrap()).unwrap();
        assert_eq!(value["year"], 2025);
        assert_eq!(value["month"], 2);
        assert_eq!(value["total_minutes"], 630);
        assert_eq!(value["total_hours"], 10.5);
        assert_eq!(value["segments_count"], 3);
    }

    #[test]
    fn out_of_range_month_is_empty_not_an_error() {
        let mut db = Database::open_in_memory().unwrap();
        let alice = identity("alice", Role::Worker);
        seed_february(&mut db, &alice.user);

        let mut output = Vec::new();
        run(
            &mut output,
            &db,
            &alice,
            &clock_at("2025-02-28", "23:00:00"),
            Some(2025),
            Some(13),
            None,
            true,
        )
        .unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&String::from_utf8(output).unwrap()).unwrap();
        assert_eq!(value["month"], 13);
        assert_eq!(value["segments_count"], 0);
        assert_eq!(value["total_minutes"], 0);
    }

    #[test]
    fn worker_cannot_summarize_another_user() {
        let mut db = Database::open_in_memory().unwrap();
        let alice = identity("alice", Role::Worker);
        seed_february(&mut db, &alice.user);

        let bob = identity("bob", Role::Worker);
        let err = run(
            &mut Vec::new(),
            &db,
            &bob,
            &clock_at("2025-02-28", "23:00:00"),
            Some(2025),
            Some(2),
            Some("alice".to_string()),
            false,
        )
        .unwrap_err();
        assert!(err.to_string().contains("may not access"));
    }

    #[test]
    fn company_summarizes_any_user() {
        let mut db = Database::open_in_memory().unwrap();
        let alice = identity("alice", Role::Worker);
        seed_february(&mut db, &alice.user);

        let boss = identity("boss", Role::Company);
        let mut output = Vec::new();
        run(
            &mut output,
            &db,
            &boss,
            &clock_at("2025-02-28", "23:00:00"),
            Some(2025),
            Some(2),
            Some("alice".to_string()),
            true,
        )
        .unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&String::from_utf8(output).unwrap()).unwrap();
        assert_eq!(value["segments_count"], 3);
    }
}
