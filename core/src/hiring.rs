//! Hiring plan: scheduled crew and supervisor hires.
//!
//! A hire never expires. Once its training weeks have elapsed it
//! contributes full capacity for the rest of the horizon.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    clock::{days_between, weeks_ceil, DAYS_PER_WEEK},
    error::{ForecastError, ForecastResult},
    input::{check_quantity, parse_date},
    job_type::{JobTypeId, JobTypeLedger},
    ramp::ramp_fraction,
    types::{HireId, Sqs},
};

/// Longest training program accepted (ten years).
pub const MAX_TRAINING_WEEKS: u32 = 520;

pub fn check_training_weeks(field: &str, weeks: u32) -> ForecastResult<u32> {
    if weeks > MAX_TRAINING_WEEKS {
        return Err(ForecastError::validation(
            field,
            format!("{weeks} weeks exceeds the {MAX_TRAINING_WEEKS}-week maximum"),
        ));
    }
    Ok(weeks)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HireKind {
    Crew,
    Supervisor,
}

/// A hire as entered, before validation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HireDraft {
    pub hire_date:       Option<String>,
    pub kind:            HireKind,
    #[serde(default)]
    pub job_type:        Option<JobTypeId>,
    pub count:           u32,
    #[serde(default)]
    pub output_per_week: Option<Sqs>,
    #[serde(default)]
    pub training_weeks:  Option<u32>,
}

impl HireDraft {
    pub fn crew(job_type: JobTypeId, hire_date: &str) -> Self {
        Self {
            hire_date:       Some(hire_date.to_string()),
            kind:            HireKind::Crew,
            job_type:        Some(job_type),
            count:           1,
            output_per_week: None,
            training_weeks:  None,
        }
    }

    pub fn supervisor(hire_date: &str) -> Self {
        Self {
            hire_date:       Some(hire_date.to_string()),
            kind:            HireKind::Supervisor,
            job_type:        None,
            count:           1,
            output_per_week: None,
            training_weeks:  None,
        }
    }

    pub fn count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    pub fn output_per_week(mut self, output: Sqs) -> Self {
        self.output_per_week = Some(output);
        self
    }

    pub fn training_weeks(mut self, weeks: u32) -> Self {
        self.training_weeks = Some(weeks);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Hire {
    pub id:              HireId,
    pub hire_date:       NaiveDate,
    pub kind:            HireKind,
    pub job_type:        Option<JobTypeId>,
    pub count:           u32,
    /// SQS per unit per week at full productivity. Zero for supervisors.
    pub output_per_week: Sqs,
    pub training_weeks:  u32,
}

impl Hire {
    /// Always `hire_date + 7 × training_weeks` days. Saturates at the
    /// last representable date.
    pub fn ready_date(&self) -> NaiveDate {
        self.hire_date
            .checked_add_signed(Duration::days(self.training_weeks as i64 * DAYS_PER_WEEK))
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn is_ready(&self, as_of: NaiveDate) -> bool {
        as_of >= self.ready_date()
    }

    /// Training week the hire is in on `as_of`, or `None` before the
    /// hire date. The hire date itself is training week 1.
    pub fn training_week(&self, as_of: NaiveDate) -> Option<u32> {
        let days = days_between(self.hire_date, as_of);
        if days < 0 {
            return None;
        }
        Some(weeks_ceil(days).max(1))
    }

    /// Productivity fraction on `as_of`; 0 before the hire date.
    pub fn ramp_fraction(&self, as_of: NaiveDate) -> f64 {
        self.training_week(as_of)
            .map(|week| ramp_fraction(week, self.training_weeks))
            .unwrap_or(0.0)
    }

    /// SQS this hire produces in the week starting `as_of`.
    /// Supervisors never produce volume directly.
    pub fn active_contribution(&self, as_of: NaiveDate) -> Sqs {
        match self.kind {
            HireKind::Supervisor => 0.0,
            HireKind::Crew => self.count as f64 * self.output_per_week * self.ramp_fraction(as_of),
        }
    }
}

/// Readiness of one hire relative to today.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainingStatus {
    pub hire_id:          HireId,
    pub kind:             HireKind,
    pub job_type:         Option<JobTypeId>,
    pub count:            u32,
    pub ready_date:       NaiveDate,
    pub days_until_ready: u32,
    pub ready:            bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct HiringPlan {
    hires: Vec<Hire>,
}

impl HiringPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a plan from already-validated hires (snapshot restore).
    pub fn from_hires(hires: Vec<Hire>) -> Self {
        Self { hires }
    }

    pub fn hires(&self) -> &[Hire] {
        &self.hires
    }

    pub fn len(&self) -> usize {
        self.hires.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hires.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Hire> {
        self.hires.iter().find(|h| h.id == id)
    }

    /// Validate a draft and append it. On error the plan is unchanged.
    ///
    /// `default_training_weeks` applies when the draft gives none. Crew
    /// hires without an explicit output take the job type's
    /// `sqs_per_crew_weekly` from `ledger`.
    pub fn add_hire(
        &mut self,
        draft: HireDraft,
        ledger: &JobTypeLedger,
        default_training_weeks: u32,
    ) -> ForecastResult<Hire> {
        let hire = Self::validate_draft(draft, ledger, default_training_weeks)?;
        log::info!(
            "hire added: {} {:?} x{} on {} (ready {})",
            hire.id,
            hire.kind,
            hire.count,
            hire.hire_date,
            hire.ready_date()
        );
        self.hires.push(hire.clone());
        Ok(hire)
    }

    fn validate_draft(
        draft: HireDraft,
        ledger: &JobTypeLedger,
        default_training_weeks: u32,
    ) -> ForecastResult<Hire> {
        let raw_date = draft
            .hire_date
            .as_deref()
            .ok_or_else(|| ForecastError::validation("hire_date", "date is required"))?;
        let hire_date = parse_date("hire_date", raw_date)?;

        if draft.count == 0 {
            return Err(ForecastError::validation("count", "must be at least 1"));
        }

        let (job_type, output_per_week) = match draft.kind {
            HireKind::Crew => {
                let job_type = draft.job_type.ok_or_else(|| {
                    ForecastError::validation("job_type", "required for crew hires")
                })?;
                let output = match draft.output_per_week {
                    Some(output) => check_quantity("output_per_week", output)?,
                    None => ledger
                        .get(job_type)
                        .map(|t| t.sqs_per_crew_weekly)
                        .ok_or_else(|| {
                            ForecastError::validation("job_type", format!("'{job_type}' is not configured"))
                        })?,
                };
                (Some(job_type), output)
            }
            HireKind::Supervisor => {
                if draft.job_type.is_some() {
                    return Err(ForecastError::validation(
                        "job_type",
                        "supervisor hires are not tied to a job type",
                    ));
                }
                (None, 0.0)
            }
        };

        let training_weeks = check_training_weeks(
            "training_weeks",
            draft.training_weeks.unwrap_or(default_training_weeks),
        )?;

        Ok(Hire {
            id: Uuid::new_v4().to_string(),
            hire_date,
            kind: draft.kind,
            job_type,
            count: draft.count,
            output_per_week,
            training_weeks,
        })
    }

    /// Remove a hire by id. Absent ids are ignored.
    pub fn remove_hire(&mut self, id: &str) {
        let before = self.hires.len();
        self.hires.retain(|h| h.id != id);
        if self.hires.len() < before {
            log::info!("hire removed: {id}");
        }
    }

    pub fn crew_hires(&self) -> impl Iterator<Item = &Hire> {
        self.hires.iter().filter(|h| h.kind == HireKind::Crew)
    }

    pub fn supervisor_hires(&self) -> impl Iterator<Item = &Hire> {
        self.hires.iter().filter(|h| h.kind == HireKind::Supervisor)
    }

    /// Supervisors whose training is complete on `as_of`.
    pub fn ready_supervisor_count(&self, as_of: NaiveDate) -> u32 {
        self.supervisor_hires()
            .filter(|h| h.is_ready(as_of))
            .map(|h| h.count)
            .fold(0u32, u32::saturating_add)
    }

    pub fn supervisors_in_training(&self, as_of: NaiveDate) -> u32 {
        self.supervisor_hires()
            .filter(|h| !h.is_ready(as_of))
            .map(|h| h.count)
            .fold(0u32, u32::saturating_add)
    }

    pub fn crews_in_training(&self, as_of: NaiveDate) -> u32 {
        self.crew_hires()
            .filter(|h| !h.is_ready(as_of))
            .map(|h| h.count)
            .fold(0u32, u32::saturating_add)
    }

    /// Total new-crew output for the week starting `as_of`.
    pub fn new_crew_production(&self, as_of: NaiveDate) -> Sqs {
        self.crew_hires().map(|h| h.active_contribution(as_of)).fold(0.0, |a, b| a + b)
    }

    pub fn training_status(&self, today: NaiveDate) -> Vec<TrainingStatus> {
        self.hires
            .iter()
            .map(|h| {
                let days_left = days_between(today, h.ready_date()).clamp(0, u32::MAX as i64) as u32;
                TrainingStatus {
                    hire_id:          h.id.clone(),
                    kind:             h.kind,
                    job_type:         h.job_type,
                    count:            h.count,
                    ready_date:       h.ready_date(),
                    days_until_ready: days_left,
                    ready:            days_left == 0,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supervisor(hire_date: NaiveDate, training_weeks: u32) -> Hire {
        Hire {
            id: "h-1".to_string(),
            hire_date,
            kind: HireKind::Supervisor,
            job_type: None,
            count: 1,
            output_per_week: 0.0,
            training_weeks,
        }
    }

    #[test]
    fn ready_date_saturates_at_calendar_end() {
        let late = supervisor(NaiveDate::MAX - Duration::days(3), 2);
        assert_eq!(late.ready_date(), NaiveDate::MAX);
        assert!(!late.is_ready(NaiveDate::MAX - Duration::days(1)));
    }

    #[test]
    fn training_weeks_bounded() {
        assert_eq!(check_training_weeks("training_weeks", MAX_TRAINING_WEEKS).unwrap(), MAX_TRAINING_WEEKS);
        assert!(check_training_weeks("training_weeks", MAX_TRAINING_WEEKS + 1).unwrap_err().is_validation());
    }
}
