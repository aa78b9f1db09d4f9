use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    forecast::{ForecastHorizon, RevenuePolicy},
    job_type::{JobType, JobTypeId},
    types::Sqs,
};

/// Starting values for a fresh planner state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlannerConfig {
    #[serde(default = "default_job_types")]
    pub job_types:            Vec<JobType>,
    #[serde(default = "default_initial_pipeline")]
    pub initial_pipeline:     Sqs,
    #[serde(default = "default_site_supervisors")]
    pub site_supervisors:     u32,
    #[serde(default = "default_training_cycle_weeks")]
    pub training_cycle_weeks: u32,
    #[serde(default = "default_sales_baseline")]
    pub sales_baseline:       BTreeMap<JobTypeId, Sqs>,
    #[serde(default)]
    pub horizon:              ForecastHorizon,
    #[serde(default)]
    pub revenue_policy:       RevenuePolicy,
}

fn default_job_types() -> Vec<JobType> {
    vec![
        JobType {
            id:                  JobTypeId::Shingles,
            name:                "Shingles".into(),
            sqs_per_crew_weekly: 120.0,
            crews:               2,
            revenue_per_sqs:     28.0,
            crew_leads:          1,
            sqs_per_crew_lead:   240.0,
            requires_crew_lead:  true,
            lead_time_weeks:     2,
        },
        JobType {
            id:                  JobTypeId::Metal,
            name:                "Metal".into(),
            sqs_per_crew_weekly: 180.0,
            crews:               1,
            revenue_per_sqs:     42.0,
            crew_leads:          1,
            sqs_per_crew_lead:   180.0,
            requires_crew_lead:  true,
            lead_time_weeks:     3,
        },
    ]
}

fn default_initial_pipeline() -> Sqs { 1239.0 }
fn default_site_supervisors() -> u32 { 3 }
fn default_training_cycle_weeks() -> u32 { 4 }

fn default_sales_baseline() -> BTreeMap<JobTypeId, Sqs> {
    [(JobTypeId::Shingles, 200.0), (JobTypeId::Metal, 120.0)].into()
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self::default_test()
    }
}

impl PlannerConfig {
    /// Load from `{data_dir}/planner_defaults.json`.
    /// In tests, use PlannerConfig::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/planner_defaults.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: PlannerConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        for job_type in &config.job_types {
            job_type
                .validate()
                .map_err(|e| anyhow::anyhow!("{path}: {e}"))?;
        }
        Ok(config)
    }

    /// The shop's current numbers, in code.
    pub fn default_test() -> Self {
        Self {
            job_types:            default_job_types(),
            initial_pipeline:     default_initial_pipeline(),
            site_supervisors:     default_site_supervisors(),
            training_cycle_weeks: default_training_cycle_weeks(),
            sales_baseline:       default_sales_baseline(),
            horizon:              ForecastHorizon::Quarter,
            revenue_policy:       RevenuePolicy::PlannedSales,
        }
    }
}
