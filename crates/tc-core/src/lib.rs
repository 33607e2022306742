//! Core domain logic for the time clock.
//!
//! This crate contains the fundamental types and rules for:
//! - Segments: clock-in/clock-out intervals and their durations
//! - Aggregation: daily and monthly totals with midnight-wrap arithmetic
//! - Policy: mapping an authenticated identity to a query scope
//! - Clock: a single injectable source of "now" per operation

pub mod clock;
pub mod policy;
pub mod segment;
pub mod summary;
pub mod types;

pub use clock::{Clock, ClockReading, FixedClock, SystemClock};
pub use policy::{Scope, ScopeError};
pub use segment::{Segment, SegmentView, parse_time_of_day, wrapped_minutes};
pub use summary::{DayTotals, MonthSummary, day_totals, hours_from_minutes, month_summary};
pub use types::{Identity, Role, UserId, ValidationError};
