//! Clock-in and clock-out commands.

use std::io::Write;

use anyhow::Result;

use tc_core::{Clock, Identity};
use tc_db::Database;

use super::today::format_duration;

/// Runs `tc in`: opens a new segment for the authenticated user.
pub fn run_in<W: Write>(
    writer: &mut W,
    db: &mut Database,
    identity: &Identity,
    clock: &impl Clock,
) -> Result<()> {
    let reading = clock.read();
    let segment = db.clock_in(&identity.user, &reading)?;
    writeln!(
        writer,
        "Clocked in at {} (segment {})",
        segment.start_time.format("%H:%M:%S"),
        segment.id
    )?;
    Ok(())
}

/// Runs `tc out`: closes the authenticated user's open segment.
pub fn run_out<W: Write>(
    writer: &mut W,
    db: &mut Database,
    identity: &Identity,
    clock: &impl Clock,
) -> Result<()> {
    let reading = clock.read();
    let segment = db.clock_out(&identity.user, &reading)?;
    let worked = segment.duration_minutes().unwrap_or(0);
    writeln!(
        writer,
        "Clocked out at {} (segment {}, {})",
        reading.time.format("%H:%M:%S"),
        segment.id,
        format_duration(worked)
    )?;
    Ok(())
}
