//! Job type ledger: static crew economics per job type.
//!
//! The ledger describes the crews working *today*. It is not
//! time-phased: future crew changes are expressed as hires.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{
    error::{ForecastError, ForecastResult},
    types::{Dollars, Sqs},
};

/// The closed set of job types the business quotes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum JobTypeId {
    Shingles,
    Metal,
}

impl JobTypeId {
    pub const ALL: [JobTypeId; 2] = [JobTypeId::Shingles, JobTypeId::Metal];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobTypeId::Shingles => "shingles",
            JobTypeId::Metal    => "metal",
        }
    }
}

impl fmt::Display for JobTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobTypeId {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shingles" => Ok(JobTypeId::Shingles),
            "metal"    => Ok(JobTypeId::Metal),
            other => Err(ForecastError::validation(
                "job_type",
                format!("unknown job type '{other}'"),
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobType {
    pub id:                  JobTypeId,
    pub name:                String,
    pub sqs_per_crew_weekly: Sqs,
    pub crews:               u32,
    pub revenue_per_sqs:     Dollars,
    pub crew_leads:          u32,
    /// Weekly SQS one crew lead can oversee. Informational.
    pub sqs_per_crew_lead:   Sqs,
    pub requires_crew_lead:  bool,
    /// Quoted weeks from sale to install. Informational.
    #[serde(default)]
    pub lead_time_weeks:     u32,
}

impl JobType {
    pub fn production(&self) -> Sqs {
        self.crews as f64 * self.sqs_per_crew_weekly
    }

    pub fn revenue(&self) -> Dollars {
        self.production() * self.revenue_per_sqs
    }

    /// Reject non-finite or negative rates.
    pub fn validate(&self) -> ForecastResult<()> {
        let rates = [
            ("sqs_per_crew_weekly", self.sqs_per_crew_weekly),
            ("revenue_per_sqs",     self.revenue_per_sqs),
            ("sqs_per_crew_lead",   self.sqs_per_crew_lead),
        ];
        for (field, value) in rates {
            if !value.is_finite() || value < 0.0 {
                return Err(ForecastError::validation(
                    format!("{}.{field}", self.id),
                    format!("must be a non-negative number, got {value}"),
                ));
            }
        }
        if self.name.trim().is_empty() {
            return Err(ForecastError::validation(
                format!("{}.name", self.id),
                "must not be empty",
            ));
        }
        Ok(())
    }
}

/// Result of the crew-lead eligibility check.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CrewLeadStatus {
    pub can_run:        bool,
    pub needs_override: bool,
}

/// A job type that needs a crew lead and has none. Soft; production
/// is still reported for the type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StaffingWarning {
    pub job_type: JobTypeId,
    pub message:  String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct JobTypeLedger {
    types:     BTreeMap<JobTypeId, JobType>,
    overrides: BTreeSet<JobTypeId>,
}

impl JobTypeLedger {
    /// Build a ledger holding every job type in `JobTypeId::ALL`
    /// exactly once.
    pub fn new(job_types: Vec<JobType>) -> ForecastResult<Self> {
        let mut ledger = Self::default();
        for job_type in job_types {
            if ledger.types.contains_key(&job_type.id) {
                return Err(ForecastError::validation(
                    "job_types",
                    format!("'{}' is listed more than once", job_type.id),
                ));
            }
            ledger.upsert(job_type)?;
        }
        if let Some(missing) = JobTypeId::ALL.iter().find(|id| !ledger.types.contains_key(id)) {
            return Err(ForecastError::validation(
                "job_types",
                format!("'{missing}' is missing"),
            ));
        }
        Ok(ledger)
    }

    pub fn get(&self, id: JobTypeId) -> Option<&JobType> {
        self.types.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &JobType> {
        self.types.values()
    }

    /// Insert or replace a job type. Validated before anything changes.
    fn upsert(&mut self, job_type: JobType) -> ForecastResult<()> {
        job_type.validate()?;
        self.types.insert(job_type.id, job_type);
        Ok(())
    }

    /// Apply an edit to one job type. The edit runs on a copy and is
    /// committed only if the result validates.
    pub fn edit<F>(&mut self, id: JobTypeId, f: F) -> ForecastResult<()>
    where
        F: FnOnce(&mut JobType),
    {
        let mut edited = self
            .types
            .get(&id)
            .cloned()
            .ok_or_else(|| ForecastError::validation("job_type", format!("'{id}' is not configured")))?;
        f(&mut edited);
        edited.id = id;
        self.upsert(edited)
    }

    pub fn current_production(&self, id: JobTypeId) -> Sqs {
        self.types.get(&id).map(JobType::production).unwrap_or(0.0)
    }

    pub fn current_revenue(&self, id: JobTypeId) -> Dollars {
        self.types.get(&id).map(JobType::revenue).unwrap_or(0.0)
    }

    pub fn total_production(&self) -> Sqs {
        self.types.values().map(JobType::production).fold(0.0, |a, b| a + b)
    }

    pub fn total_revenue(&self) -> Dollars {
        self.types.values().map(JobType::revenue).fold(0.0, |a, b| a + b)
    }

    pub fn total_crews(&self) -> u32 {
        self.types.values().map(|t| t.crews).fold(0u32, u32::saturating_add)
    }

    /// Crew-lead eligibility for one job type. `ready_supervisors` is the
    /// number of hired supervisors past their ready date.
    pub fn can_run(&self, id: JobTypeId, ready_supervisors: u32) -> CrewLeadStatus {
        if self.overrides.contains(&id) {
            return CrewLeadStatus { can_run: true, needs_override: false };
        }
        let Some(job_type) = self.types.get(&id) else {
            return CrewLeadStatus { can_run: true, needs_override: false };
        };
        if job_type.requires_crew_lead && job_type.crew_leads.saturating_add(ready_supervisors) == 0 {
            CrewLeadStatus { can_run: false, needs_override: true }
        } else {
            CrewLeadStatus { can_run: true, needs_override: false }
        }
    }

    /// Acknowledge running a job type without a crew lead. Stays set
    /// until `clear_override` is called; staffing changes never reset it.
    pub fn set_override(&mut self, id: JobTypeId) {
        if self.overrides.insert(id) {
            log::info!("crew-lead override enabled for {id}");
        }
    }

    pub fn clear_override(&mut self, id: JobTypeId) {
        if self.overrides.remove(&id) {
            log::info!("crew-lead override cleared for {id}");
        }
    }

    pub fn is_overridden(&self, id: JobTypeId) -> bool {
        self.overrides.contains(&id)
    }

    pub fn overrides(&self) -> impl Iterator<Item = JobTypeId> + '_ {
        self.overrides.iter().copied()
    }

    pub fn staffing_warnings(&self, ready_supervisors: u32) -> Vec<StaffingWarning> {
        self.types
            .keys()
            .filter(|id| self.can_run(**id, ready_supervisors).needs_override)
            .map(|id| {
                let warning = StaffingWarning {
                    job_type: *id,
                    message:  format!("{id} has no crew lead assigned and no ready supervisor"),
                };
                log::warn!("{}", warning.message);
                warning
            })
            .collect()
    }
}
