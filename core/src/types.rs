//! Shared primitive types used across the entire planner.

/// Squares of roofing. Used both as a backlog quantity and as a weekly rate.
pub type Sqs = f64;

/// Currency amount.
pub type Dollars = f64;

/// Zero-based week offset from the projection's reference date.
pub type WeekIndex = usize;

/// A stable, unique identifier for a scheduled hire.
pub type HireId = String;

/// The canonical snapshot identifier.
pub type SnapshotId = String;
