//! The forecast engine: week-by-week projection of backlog,
//! production and revenue.
//!
//! PER WEEK (fixed order):
//!   1. Planned sales for the week (0 past the end of the plan).
//!   2. Existing production from the ledger. Static for the horizon.
//!   3. New-crew production from ramping hires, plus ramp notes.
//!   4. Pipeline balance, floored at zero.
//!   5. Revenue under the configured policy.
//!
//! RULES:
//!   - Projection is a pure function of its inputs and the clock.
//!   - Nothing is cached; every call recomputes the whole horizon.
//!   - Inputs are borrowed immutably and never modified.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    clock::PlanningClock,
    error::{ForecastError, ForecastResult},
    hiring::HiringPlan,
    job_type::{JobTypeId, JobTypeLedger},
    sales::SalesPlan,
    types::{Dollars, Sqs, WeekIndex},
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ForecastHorizon {
    #[default]
    Quarter,
    HalfYear,
    Year,
}

impl ForecastHorizon {
    pub fn weeks(&self) -> usize {
        match self {
            ForecastHorizon::Quarter  => 13,
            ForecastHorizon::HalfYear => 26,
            ForecastHorizon::Year     => 52,
        }
    }

    pub fn from_weeks(weeks: usize) -> ForecastResult<Self> {
        match weeks {
            13 => Ok(ForecastHorizon::Quarter),
            26 => Ok(ForecastHorizon::HalfYear),
            52 => Ok(ForecastHorizon::Year),
            other => Err(ForecastError::validation(
                "horizon",
                format!("{other} weeks is not supported (13, 26 or 52)"),
            )),
        }
    }
}

/// What revenue is recognised against.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RevenuePolicy {
    /// Planned sales volume × revenue per SQS.
    #[default]
    PlannedSales,
    /// Produced volume (existing + new crews) × revenue per SQS.
    ProducedVolume,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastRow {
    pub week_number:         WeekIndex,
    pub week_date:           NaiveDate,
    pub planned_sales:       BTreeMap<JobTypeId, Sqs>,
    pub sales_total:         Sqs,
    pub existing_production: Sqs,
    pub new_crew_production: Sqs,
    pub total_production:    Sqs,
    pub pipeline:            Sqs,
    pub net_change:          Sqs,
    pub total_revenue:       Dollars,
    pub notes:               String,
}

pub struct ForecastEngine {
    clock:  PlanningClock,
    policy: RevenuePolicy,
}

impl ForecastEngine {
    pub fn new(clock: PlanningClock, policy: RevenuePolicy) -> Self {
        Self { clock, policy }
    }

    pub fn clock(&self) -> PlanningClock {
        self.clock
    }

    pub fn policy(&self) -> RevenuePolicy {
        self.policy
    }

    /// Project `horizon` weeks forward from the engine's reference date.
    pub fn project(
        &self,
        ledger: &JobTypeLedger,
        hiring: &HiringPlan,
        sales: &SalesPlan,
        initial_pipeline: Sqs,
        horizon: ForecastHorizon,
    ) -> Vec<ForecastRow> {
        let weeks = horizon.weeks();
        let existing_production = ledger.total_production();
        let mut pipeline = initial_pipeline.max(0.0);
        let mut rows = Vec::with_capacity(weeks);

        for week in 0..weeks {
            let week_date = self.clock.week_date(week);

            let planned_sales: BTreeMap<JobTypeId, Sqs> = JobTypeId::ALL
                .iter()
                .map(|id| (*id, sales.get(week, *id)))
                .collect();
            let sales_total: Sqs = planned_sales.values().fold(0.0, |a, b| a + b);

            let mut new_by_type: BTreeMap<JobTypeId, Sqs> = BTreeMap::new();
            let mut notes = Vec::new();
            for hire in hiring.crew_hires() {
                let contribution = hire.active_contribution(week_date);
                if let Some(job_type) = hire.job_type {
                    *new_by_type.entry(job_type).or_default() += contribution;
                }
                let fraction = hire.ramp_fraction(week_date);
                if hire.training_week(week_date).is_some() && fraction < 1.0 {
                    let label = hire.job_type.map(|j| j.as_str()).unwrap_or("crew");
                    notes.push(format!("{label}: {}% productivity", (fraction * 100.0).round() as i64));
                }
            }
            let new_crew_production: Sqs = new_by_type.values().fold(0.0, |a, b| a + b);
            let total_production = existing_production + new_crew_production;

            pipeline = (pipeline + sales_total - total_production).max(0.0);

            let total_revenue: Dollars = match self.policy {
                RevenuePolicy::PlannedSales => planned_sales
                    .iter()
                    .map(|(id, qty)| qty * revenue_rate(ledger, *id))
                    .fold(0.0, |a, b| a + b),
                RevenuePolicy::ProducedVolume => JobTypeId::ALL
                    .iter()
                    .map(|id| {
                        let produced = ledger.current_production(*id)
                            + new_by_type.get(id).copied().unwrap_or(0.0);
                        produced * revenue_rate(ledger, *id)
                    })
                    .fold(0.0, |a, b| a + b),
            };

            rows.push(ForecastRow {
                week_number: week,
                week_date,
                planned_sales: planned_sales
                    .into_iter()
                    .map(|(id, qty)| (id, whole(qty)))
                    .collect(),
                sales_total: whole(sales_total),
                existing_production: whole(existing_production),
                new_crew_production: whole(new_crew_production),
                total_production: whole(total_production),
                pipeline: whole(pipeline),
                net_change: whole(sales_total - total_production),
                total_revenue: whole(total_revenue),
                notes: notes.join(", "),
            });
        }

        log::debug!(
            "projected {weeks} weeks from {}: ending pipeline {:.0} SQS ({} hires, {:?})",
            self.clock.today,
            pipeline,
            hiring.len(),
            self.policy
        );
        rows
    }
}

/// Round for display. Small negatives round to `-0.0`; report them as 0.
fn whole(x: f64) -> f64 {
    let r = x.round();
    if r == 0.0 { 0.0 } else { r }
}

fn revenue_rate(ledger: &JobTypeLedger, id: JobTypeId) -> Dollars {
    ledger.get(id).map(|t| t.revenue_per_sqs).unwrap_or(0.0)
}

/// Roll-up of a projection for reports.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastSummary {
    pub weeks:              usize,
    pub ending_pipeline:    Sqs,
    pub min_pipeline:       Sqs,
    pub min_pipeline_week:  WeekIndex,
    /// First week the backlog runs dry, if it does.
    pub first_empty_week:   Option<WeekIndex>,
    pub total_sales:        Sqs,
    pub total_production:   Sqs,
    pub total_revenue:      Dollars,
}

pub fn summarize(rows: &[ForecastRow]) -> ForecastSummary {
    let (min_pipeline_week, min_pipeline) = rows
        .iter()
        .map(|r| (r.week_number, r.pipeline))
        .fold((0, f64::INFINITY), |best, cur| if cur.1 < best.1 { cur } else { best });

    ForecastSummary {
        weeks:             rows.len(),
        ending_pipeline:   rows.last().map(|r| r.pipeline).unwrap_or(0.0),
        min_pipeline:      if rows.is_empty() { 0.0 } else { min_pipeline },
        min_pipeline_week,
        first_empty_week:  rows.iter().find(|r| r.pipeline <= 0.0).map(|r| r.week_number),
        total_sales:       rows.iter().map(|r| r.sales_total).fold(0.0, |a, b| a + b),
        total_production:  rows.iter().map(|r| r.total_production).fold(0.0, |a, b| a + b),
        total_revenue:     rows.iter().map(|r| r.total_revenue).fold(0.0, |a, b| a + b),
    }
}
