//! Sales plan: planned SQS sold per job type, week by week.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    error::{ForecastError, ForecastResult},
    input::check_quantity,
    job_type::JobTypeId,
    types::{Sqs, WeekIndex},
};

/// Planned sales for one week, keyed by job type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SalesWeek {
    pub by_type: BTreeMap<JobTypeId, Sqs>,
}

impl SalesWeek {
    pub fn get(&self, id: JobTypeId) -> Sqs {
        self.by_type.get(&id).copied().unwrap_or(0.0)
    }

    pub fn total(&self) -> Sqs {
        self.by_type.values().fold(0.0, |a, b| a + b)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SalesPlan {
    weeks: Vec<SalesWeek>,
}

impl SalesPlan {
    /// `weeks` identical weeks of `baseline`.
    pub fn flat(baseline: &BTreeMap<JobTypeId, Sqs>, weeks: usize) -> ForecastResult<Self> {
        for (id, qty) in baseline {
            check_quantity(&format!("sales_baseline.{id}"), *qty)?;
        }
        let week = SalesWeek { by_type: baseline.clone() };
        Ok(Self { weeks: vec![week; weeks] })
    }

    /// Rebuild from stored weeks, re-validating every quantity.
    pub fn from_weeks(weeks: Vec<SalesWeek>) -> ForecastResult<Self> {
        for (w, week) in weeks.iter().enumerate() {
            for (id, qty) in &week.by_type {
                check_quantity(&format!("sales[{w}].{id}"), *qty)?;
            }
        }
        Ok(Self { weeks })
    }

    pub fn weeks(&self) -> &[SalesWeek] {
        &self.weeks
    }

    pub fn len(&self) -> usize {
        self.weeks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }

    /// Planned sales for `id` in `week`; 0 past the end of the plan.
    pub fn get(&self, week: WeekIndex, id: JobTypeId) -> Sqs {
        self.weeks.get(week).map(|w| w.get(id)).unwrap_or(0.0)
    }

    pub fn week_total(&self, week: WeekIndex) -> Sqs {
        self.weeks.get(week).map(SalesWeek::total).unwrap_or(0.0)
    }

    pub fn set(&mut self, week: WeekIndex, id: JobTypeId, qty: Sqs) -> ForecastResult<()> {
        let qty = check_quantity(&format!("sales[{week}].{id}"), qty)?;
        let len = self.weeks.len();
        let entry = self.weeks.get_mut(week).ok_or_else(|| {
            ForecastError::validation("week", format!("week {week} is outside the plan (0..{len})"))
        })?;
        entry.by_type.insert(id, qty);
        Ok(())
    }

    /// Grow the plan to `weeks` entries, padding with `baseline`.
    /// Never shrinks; edits beyond the current horizon are kept.
    pub fn ensure_len(&mut self, weeks: usize, baseline: &BTreeMap<JobTypeId, Sqs>) {
        if self.weeks.len() < weeks {
            let pad = SalesWeek { by_type: baseline.clone() };
            self.weeks.resize(weeks, pad);
        }
    }
}
