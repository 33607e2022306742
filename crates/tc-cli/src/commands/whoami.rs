//! Whoami command: shows the resolved identity.

use std::io::Write;

use anyhow::Result;

use tc_core::Identity;

/// Runs `tc whoami`.
pub fn run<W: Write>(writer: &mut W, identity: &Identity) -> Result<()> {
    let timezone = iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string());

    writeln!(writer, "User:     {}", identity.user)?;
    writeln!(writer, "Role:     {}", identity.role)?;
    writeln!(writer, "Staff:    {}", if identity.staff { "yes" } else { "no" })?;
    writeln!(writer, "Timezone: {timezone}")?;
    Ok(())
}
