//! Today command: the aggregate view of the current local date.

use std::io::Write;

use anyhow::Result;

use tc_core::{Clock, Identity, day_totals};
use tc_db::Database;

/// Formats whole minutes as a duration string.
///
/// Returns "Xh Ym" if >= 1 hour, "Xm" if < 1 hour. Negative durations are
/// treated as 0m (defensive).
#[must_use]
pub fn format_duration(minutes: i64) -> String {
    if minutes < 0 {
        return "0m".to_string();
    }
    let hours = minutes / 60;
    let minutes = minutes % 60;

    if hours >= 1 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// Runs `tc today`, printing the day's segments and totals.
pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    identity: &Identity,
    clock: &impl Clock,
    json: bool,
) -> Result<()> {
    let reading = clock.read();
    let segments = db.segments_for_day(&identity.user, reading.date)?;
    let any_open = db.open_segment_exists(&identity.user)?;
    let totals = day_totals(&segments, any_open, &reading);

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&totals)?)?;
        return Ok(());
    }

    writeln!(writer, "Today {} ({})", totals.date, identity.user)?;
    if totals.segments.is_empty() {
        writeln!(writer, "No segments today.")?;
    } else {
        for segment in &totals.segments {
            let span = match segment.end_time {
                Some(end) => format!(
                    "{}-{}",
                    segment.start_time.format("%H:%M"),
                    end.format("%H:%M")
                ),
                None => format!("{}-", segment.start_time.format("%H:%M")),
            };
            let note = match segment.duration_minutes {
                Some(minutes) => format_duration(minutes),
                None => "(open)".to_string(),
            };
            writeln!(writer, "  {:>3}  {span:<11}  {note}", segment.id)?;
        }
    }
    writeln!(writer, "Open:  {}", if totals.open { "yes" } else { "no" })?;
    writeln!(
        writer,
        "Total: {} ({} min / {:.2} h)",
        format_duration(totals.total_minutes),
        totals.total_minutes,
        totals.total_hours
    )?;
    Ok(())
}
