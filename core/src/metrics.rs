//! Current metrics: today's pipeline, throughput and staffing, in
//! aggregate and per job type.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    forecast::RevenuePolicy,
    job_type::{CrewLeadStatus, JobTypeId},
    planner::PlannerState,
    types::{Dollars, Sqs},
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobTypeMetrics {
    pub name:                String,
    pub crews:               u32,
    pub sqs_per_crew_weekly: Sqs,
    pub production:          Sqs,
    pub weekly_income:       Sqs,
    pub weekly_revenue:      Dollars,
    /// Share of the current pipeline, split by share of production.
    pub pipeline:            Sqs,
    pub weeks_of_production: f64,
    pub lead_time_weeks:     u32,
    pub sqs_per_crew_lead:   Sqs,
    pub total_crew_leads:    u32,
    pub crew_lead_status:    CrewLeadStatus,
    pub overridden:          bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurrentMetrics {
    pub as_of:                   NaiveDate,
    pub pipeline_total:          Sqs,
    pub weekly_income:           Sqs,
    pub weekly_outflow:          Sqs,
    pub net_change:              Sqs,
    pub weeks_of_production:     f64,
    pub total_revenue:           Dollars,
    pub active_crews:            u32,
    pub crews_in_training:       u32,
    pub site_supervisors:        u32,
    pub ready_supervisors:       u32,
    pub supervisors_in_training: u32,
    pub by_type:                 BTreeMap<JobTypeId, JobTypeMetrics>,
}

pub fn current_metrics(state: &PlannerState, today: NaiveDate) -> CurrentMetrics {
    let ledger = state.ledger();
    let hiring = state.hiring();
    let sales = state.sales();

    let ready_supervisors = hiring.ready_supervisor_count(today);
    let weekly_outflow = ledger.total_production();
    let weekly_income = sales.week_total(0);
    let pipeline_total = state.initial_pipeline();

    let by_type: BTreeMap<JobTypeId, JobTypeMetrics> = ledger
        .iter()
        .map(|t| {
            let production = t.production();
            let share = if weekly_outflow > 0.0 { production / weekly_outflow } else { 0.0 };
            let pipeline = pipeline_total * share;
            let income = sales.get(0, t.id);
            let weekly_revenue = match state.revenue_policy() {
                RevenuePolicy::PlannedSales   => income * t.revenue_per_sqs,
                RevenuePolicy::ProducedVolume => t.revenue(),
            };
            let metrics = JobTypeMetrics {
                name:                t.name.clone(),
                crews:               t.crews,
                sqs_per_crew_weekly: t.sqs_per_crew_weekly,
                production,
                weekly_income:       income,
                weekly_revenue,
                pipeline:            pipeline.round(),
                weeks_of_production: weeks_of(pipeline, production),
                lead_time_weeks:     t.lead_time_weeks,
                sqs_per_crew_lead:   t.sqs_per_crew_lead,
                total_crew_leads:    t.crew_leads.saturating_add(ready_supervisors),
                crew_lead_status:    ledger.can_run(t.id, ready_supervisors),
                overridden:          ledger.is_overridden(t.id),
            };
            (t.id, metrics)
        })
        .collect();

    CurrentMetrics {
        as_of: today,
        pipeline_total,
        weekly_income,
        weekly_outflow,
        net_change: weekly_income - weekly_outflow,
        weeks_of_production: weeks_of(pipeline_total, weekly_outflow),
        total_revenue: by_type.values().map(|m| m.weekly_revenue).fold(0.0, |a, b| a + b),
        active_crews: ledger.total_crews(),
        crews_in_training: hiring.crews_in_training(today),
        site_supervisors: state.site_supervisors(),
        ready_supervisors,
        supervisors_in_training: hiring.supervisors_in_training(today),
        by_type,
    }
}

/// `pipeline / rate` to one decimal, 0 when nothing is being produced.
fn weeks_of(pipeline: Sqs, rate: Sqs) -> f64 {
    if rate > 0.0 {
        (pipeline / rate * 10.0).round() / 10.0
    } else {
        0.0
    }
}
