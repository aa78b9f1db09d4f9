//! Production forecaster for a roofing contractor.
//!
//! Tracks the backlog of sold-but-unbuilt work, turns crew counts and
//! productivity into weekly production and revenue, and projects the
//! next 13, 26 or 52 weeks given a sales plan and scheduled hires.

pub mod clock;
pub mod config;
pub mod error;
pub mod forecast;
pub mod hiring;
pub mod input;
pub mod job_type;
pub mod metrics;
pub mod planner;
pub mod ramp;
pub mod sales;
pub mod snapshot;
pub mod store;
pub mod types;
