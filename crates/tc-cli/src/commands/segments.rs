//! Segment management commands: list, show, edit, delete.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use tc_core::{Identity, Scope, Segment, SegmentView, UserId, parse_time_of_day, policy};
use tc_db::{Database, SegmentChanges};

use super::today::format_duration;

/// Runs `tc segments list`.
pub fn list<W: Write>(
    writer: &mut W,
    db: &Database,
    identity: &Identity,
    from: Option<String>,
    to: Option<String>,
    user: Option<String>,
    json: bool,
) -> Result<()> {
    let from = parse_date_arg(from.as_deref(), "from")?;
    let to = parse_date_arg(to.as_deref(), "to")?;
    let requested = user
        .map(UserId::new)
        .transpose()
        .context("invalid --user")?;
    let scope = Scope::for_identity(identity).narrow_to(identity, requested)?;

    let segments = db.list_segments(&scope, from, to)?;
    let views: Vec<SegmentView> = segments.iter().map(Segment::view).collect();

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&views)?)?;
        return Ok(());
    }

    if views.is_empty() {
        writeln!(writer, "No segments.")?;
        return Ok(());
    }
    for view in &views {
        writeln!(writer, "{}", render_line(view))?;
    }
    Ok(())
}

/// Runs `tc segments show <id>`.
pub fn show<W: Write>(writer: &mut W, db: &Database, identity: &Identity, id: i64) -> Result<()> {
    let scope = Scope::for_identity(identity);
    let segment = db.get_segment(id, &scope)?;
    let view = segment.view();

    writeln!(writer, "Segment {}", view.id)?;
    writeln!(writer, "Owner:    {}", view.owner)?;
    writeln!(writer, "Date:     {}", view.date)?;
    writeln!(writer, "Start:    {}", view.start_time.format("%H:%M:%S"))?;
    match (view.end_time, view.duration_minutes) {
        (Some(end), Some(minutes)) => {
            writeln!(writer, "End:      {}", end.format("%H:%M:%S"))?;
            writeln!(writer, "Duration: {}", format_duration(minutes))?;
        }
        _ => {
            writeln!(writer, "End:      (open)")?;
        }
    }
    Ok(())
}

/// Runs `tc segments edit <id>`.
///
/// Workers may adjust times on their own segments; only privileged roles
/// may reassign the owner, and a worker-supplied `--owner` is silently
/// ignored rather than rejected.
pub fn edit<W: Write>(
    writer: &mut W,
    db: &mut Database,
    identity: &Identity,
    id: i64,
    start: Option<String>,
    end: Option<String>,
    owner: Option<String>,
) -> Result<()> {
    let changes = SegmentChanges {
        start_time: start.as_deref().map(parse_time_of_day).transpose()?,
        end_time: end.as_deref().map(parse_time_of_day).transpose()?,
        owner: owner.map(UserId::new).transpose().context("invalid --owner")?,
    };
    let scope = Scope::for_identity(identity);
    let updated = db.update_segment(id, &scope, &changes, policy::can_reassign_owner(identity))?;

    writeln!(writer, "Updated {}", render_line(&updated.view()))?;
    Ok(())
}

/// Runs `tc segments delete <id>`.
pub fn delete<W: Write>(
    writer: &mut W,
    db: &mut Database,
    identity: &Identity,
    id: i64,
) -> Result<()> {
    let scope = Scope::for_identity(identity);
    db.delete_segment(id, &scope)?;
    writeln!(writer, "Deleted segment {id}")?;
    Ok(())
}

fn render_line(view: &SegmentView) -> String {
    let span = match view.end_time {
        Some(end) => format!(
            "{}-{}",
            view.start_time.format("%H:%M"),
            end.format("%H:%M")
        ),
        None => format!("{}-", view.start_time.format("%H:%M")),
    };
    let note = match view.duration_minutes {
        Some(minutes) => format_duration(minutes),
        None => "(open)".to_string(),
    };
    format!(
        "{:>4}  {}  {span:<11}  {note:<7}  {}",
        view.id, view.date, view.owner
    )
}

fn parse_date_arg(value: Option<&str>, name: &str) -> Result<Option<NaiveDate>> {
    value
        .map(|v| {
            NaiveDate::parse_from_str(v, "%Y-%m-%d")
                .with_context(|| format!("invalid --{name} date, expected YYYY-MM-DD"))
        })
        .transpose()
}
