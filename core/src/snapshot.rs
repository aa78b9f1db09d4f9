//! Snapshot codec: full planner input state to/from a portable,
//! named, timestamped JSON record.
//!
//! Dates are stored as ISO-8601 strings. Snapshots written by older
//! versions may lack fields added later; those fall back to the
//! documented defaults. Only `id`, `name`, `state.job_types` and
//! `state.initial_pipeline` are required.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    config::PlannerConfig,
    error::{ForecastError, ForecastResult},
    forecast::{ForecastHorizon, RevenuePolicy},
    hiring::{check_training_weeks, Hire, HireKind, HiringPlan},
    input::{check_quantity, format_date, parse_date},
    job_type::{JobType, JobTypeId, JobTypeLedger},
    planner::{PlannerParts, PlannerState},
    sales::{SalesPlan, SalesWeek},
    types::{HireId, SnapshotId, Sqs},
};

const REQUIRED_KEYS: [&str; 3] = ["id", "name", "state"];
const REQUIRED_STATE_KEYS: [&str; 2] = ["job_types", "initial_pipeline"];
const OPTIONAL_STATE_KEYS: [&str; 8] = [
    "hires",
    "sales_plan",
    "site_supervisors",
    "training_cycle_weeks",
    "sales_baseline",
    "horizon",
    "revenue_policy",
    "overrides",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    pub id:          SnapshotId,
    pub name:        String,
    /// Human-readable capture time.
    #[serde(default)]
    pub timestamp:   String,
    /// RFC 3339 capture time.
    #[serde(default)]
    pub captured_at: String,
    pub state:       SnapshotState,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SnapshotState {
    pub job_types:            Vec<JobType>,
    pub initial_pipeline:     Sqs,
    #[serde(default)]
    pub hires:                Vec<HireRecord>,
    #[serde(default)]
    pub sales_plan:           Vec<SalesWeek>,
    #[serde(default = "defaults::site_supervisors")]
    pub site_supervisors:     u32,
    #[serde(default = "defaults::training_cycle_weeks")]
    pub training_cycle_weeks: u32,
    #[serde(default = "defaults::sales_baseline")]
    pub sales_baseline:       BTreeMap<JobTypeId, Sqs>,
    #[serde(default)]
    pub horizon:              ForecastHorizon,
    #[serde(default)]
    pub revenue_policy:       RevenuePolicy,
    #[serde(default)]
    pub overrides:            Vec<JobTypeId>,
}

/// A hire with its dates as ISO strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HireRecord {
    pub id:              HireId,
    pub hire_date:       String,
    /// Written for readers of the stored document; recomputed on load.
    #[serde(default)]
    pub ready_date:      String,
    pub kind:            HireKind,
    #[serde(default)]
    pub job_type:        Option<JobTypeId>,
    #[serde(default = "defaults::count")]
    pub count:           u32,
    #[serde(default)]
    pub output_per_week: Sqs,
    /// Absent in older documents; the snapshot's training cycle applies.
    #[serde(default)]
    pub training_weeks:  Option<u32>,
}

mod defaults {
    use super::*;

    pub fn site_supervisors() -> u32 {
        PlannerConfig::default_test().site_supervisors
    }

    pub fn training_cycle_weeks() -> u32 {
        PlannerConfig::default_test().training_cycle_weeks
    }

    pub fn sales_baseline() -> BTreeMap<JobTypeId, Sqs> {
        PlannerConfig::default_test().sales_baseline
    }

    pub fn count() -> u32 {
        1
    }
}

/// Capture `state` as a named snapshot taken at `captured_at`.
pub fn serialize(name: &str, state: &PlannerState, captured_at: DateTime<Utc>) -> ForecastResult<Snapshot> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ForecastError::validation("snapshot.name", "must not be empty"));
    }

    let hires = state
        .hiring()
        .hires()
        .iter()
        .map(|h| HireRecord {
            id:              h.id.clone(),
            hire_date:       format_date(h.hire_date),
            ready_date:      format_date(h.ready_date()),
            kind:            h.kind,
            job_type:        h.job_type,
            count:           h.count,
            output_per_week: h.output_per_week,
            training_weeks:  Some(h.training_weeks),
        })
        .collect();

    let short = Uuid::new_v4().simple().to_string();
    Ok(Snapshot {
        id:          format!("{}-{}", captured_at.timestamp_millis(), &short[..8]),
        name:        name.to_string(),
        timestamp:   captured_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        captured_at: captured_at.to_rfc3339(),
        state: SnapshotState {
            job_types:            state.ledger().iter().cloned().collect(),
            initial_pipeline:     state.initial_pipeline(),
            hires,
            sales_plan:           state.sales().weeks().to_vec(),
            site_supervisors:     state.site_supervisors(),
            training_cycle_weeks: state.training_cycle_weeks(),
            sales_baseline:       state.sales_baseline().clone(),
            horizon:              state.horizon(),
            revenue_policy:       state.revenue_policy(),
            overrides:            state.ledger().overrides().collect(),
        },
    })
}

/// Rebuild a planner state from a typed snapshot.
pub fn deserialize(snapshot: &Snapshot) -> ForecastResult<PlannerState> {
    let s = &snapshot.state;

    let mut ledger = JobTypeLedger::new(s.job_types.clone())?;
    for id in &s.overrides {
        ledger.set_override(*id);
    }

    let hires = s
        .hires
        .iter()
        .map(|h| restore_hire(h, s.training_cycle_weeks))
        .collect::<ForecastResult<Vec<_>>>()?;

    let state = PlannerState::from_parts(PlannerParts {
        ledger,
        hiring: HiringPlan::from_hires(hires),
        sales: SalesPlan::from_weeks(s.sales_plan.clone())?,
        initial_pipeline: s.initial_pipeline,
        site_supervisors: s.site_supervisors,
        training_cycle_weeks: s.training_cycle_weeks,
        sales_baseline: s.sales_baseline.clone(),
        horizon: s.horizon,
        revenue_policy: s.revenue_policy,
    })?;
    log::info!("snapshot '{}' ({}) restored", snapshot.name, snapshot.id);
    Ok(state)
}

fn restore_hire(record: &HireRecord, training_cycle_weeks: u32) -> ForecastResult<Hire> {
    let hire_date = parse_date(&format!("hires[{}].hire_date", record.id), &record.hire_date)?;
    if record.count == 0 {
        return Err(ForecastError::validation(
            format!("hires[{}].count", record.id),
            "must be at least 1",
        ));
    }
    let job_type = match record.kind {
        HireKind::Crew => Some(record.job_type.ok_or_else(|| {
            ForecastError::validation(format!("hires[{}].job_type", record.id), "required for crew hires")
        })?),
        HireKind::Supervisor => None,
    };
    let output_per_week = match record.kind {
        HireKind::Crew => check_quantity(
            &format!("hires[{}].output_per_week", record.id),
            record.output_per_week,
        )?,
        HireKind::Supervisor => 0.0,
    };
    Ok(Hire {
        id: record.id.clone(),
        hire_date,
        kind: record.kind,
        job_type,
        count: record.count,
        output_per_week,
        training_weeks: check_training_weeks(
            &format!("hires[{}].training_weeks", record.id),
            record.training_weeks.unwrap_or(training_cycle_weeks),
        )?,
    })
}

/// Decode a stored snapshot document. Missing required keys and
/// mistyped fields are validation errors; missing optional keys take
/// their defaults.
pub fn decode(doc: &Value) -> ForecastResult<Snapshot> {
    let obj = doc
        .as_object()
        .ok_or_else(|| ForecastError::validation("snapshot", "expected a JSON object"))?;
    for key in REQUIRED_KEYS {
        if !obj.contains_key(key) {
            return Err(ForecastError::validation(format!("snapshot.{key}"), "missing"));
        }
    }
    let state = obj["state"]
        .as_object()
        .ok_or_else(|| ForecastError::validation("snapshot.state", "expected a JSON object"))?;
    for key in REQUIRED_STATE_KEYS {
        if !state.contains_key(key) {
            return Err(ForecastError::validation(format!("snapshot.state.{key}"), "missing"));
        }
    }

    let defaulted: Vec<&str> = OPTIONAL_STATE_KEYS
        .iter()
        .copied()
        .filter(|k| !state.contains_key(*k))
        .collect();
    if !defaulted.is_empty() {
        log::warn!(
            "snapshot {}: using defaults for {}",
            obj["id"],
            defaulted.join(", ")
        );
    }

    serde_json::from_value(doc.clone())
        .map_err(|e| ForecastError::validation("snapshot", e.to_string()))
}

/// Decode and restore in one step.
pub fn restore(doc: &Value) -> ForecastResult<PlannerState> {
    deserialize(&decode(doc)?)
}
