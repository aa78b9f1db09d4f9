//! Forecast engine tests: pipeline balance, ramping hires, revenue.

mod common;

use common::{clock, default_state, today, TODAY};
use roofing_forecast_core::{
    forecast::{summarize, ForecastEngine, ForecastHorizon, RevenuePolicy},
    hiring::{HireDraft, HiringPlan},
    job_type::JobTypeId,
    sales::SalesPlan,
};

/// Two shingles crews × 120 @ $28, one metal crew × 180 @ $42,
/// 1239 SQS waiting, 200/120 SQS sold per week.
#[test]
fn first_week_matches_hand_calculation() {
    let state = default_state();
    let rows = state.project(clock());
    let week0 = &rows[0];

    assert_eq!(week0.week_number, 0);
    assert_eq!(week0.week_date, today());
    assert_eq!(week0.existing_production, 420.0);
    assert_eq!(week0.new_crew_production, 0.0);
    assert_eq!(week0.total_production, 420.0);
    assert_eq!(week0.sales_total, 320.0);
    assert_eq!(week0.planned_sales[&JobTypeId::Shingles], 200.0);
    assert_eq!(week0.planned_sales[&JobTypeId::Metal], 120.0);
    assert_eq!(week0.net_change, -100.0);
    assert_eq!(week0.pipeline, 1139.0);
    assert_eq!(week0.total_revenue, 10_640.0);
    assert!(week0.notes.is_empty());

    let json = serde_json::to_string(week0).unwrap();
    assert!(json.contains("\"new_crew_production\":0.0"), "{json}");
    assert!(!json.contains("-0.0"), "{json}");
}

#[test]
fn pipeline_drains_by_net_change_each_week() {
    let state = default_state();
    let rows = state.project(clock());

    assert_eq!(rows[1].pipeline, 1039.0);
    assert_eq!(rows[2].pipeline, 939.0);
    // 1239 - 100 × 13 would be negative; the backlog stops at zero.
    assert_eq!(rows[12].pipeline, 0.0);
}

#[test]
fn existing_production_is_static_across_horizon() {
    let state = default_state();
    let rows = state.project(clock());
    assert!(rows.iter().all(|r| r.existing_production == 420.0));
}

#[test]
fn pipeline_never_negative_with_zero_sales() {
    let mut state = default_state();
    state
        .edit_job_type(JobTypeId::Shingles, |t| t.crews = 10)
        .unwrap();
    let engine = ForecastEngine::new(clock(), RevenuePolicy::PlannedSales);

    for pipeline in [0.0, 50.0, 1239.0, 100_000.0] {
        let rows = engine.project(
            state.ledger(),
            state.hiring(),
            &SalesPlan::default(),
            pipeline,
            ForecastHorizon::Year,
        );
        assert!(
            rows.iter().all(|r| r.pipeline >= 0.0),
            "negative pipeline from initial {pipeline}"
        );
        assert!(rows.iter().all(|r| r.sales_total == 0.0 && r.total_revenue == 0.0));
    }
}

#[test]
fn horizon_length_is_exact() {
    let mut state = default_state();
    for (horizon, weeks) in [
        (ForecastHorizon::Quarter, 13),
        (ForecastHorizon::HalfYear, 26),
        (ForecastHorizon::Year, 52),
    ] {
        state.set_horizon(horizon);
        let rows = state.project(clock());
        assert_eq!(rows.len(), weeks);
        assert_eq!(rows.last().unwrap().week_number, weeks - 1);
        assert_eq!(
            rows.last().unwrap().week_date,
            today() + chrono::Duration::days(7 * (weeks as i64 - 1))
        );
    }
}

#[test]
fn unsupported_horizon_rejected() {
    assert!(ForecastHorizon::from_weeks(13).is_ok());
    assert!(ForecastHorizon::from_weeks(12).unwrap_err().is_validation());
}

#[test]
fn sales_past_end_of_plan_count_as_zero() {
    let state = default_state();
    let short = SalesPlan::flat(state.sales_baseline(), 5).unwrap();
    let rows = ForecastEngine::new(clock(), RevenuePolicy::PlannedSales).project(
        state.ledger(),
        state.hiring(),
        &short,
        1239.0,
        ForecastHorizon::Quarter,
    );
    assert_eq!(rows[4].sales_total, 320.0);
    assert_eq!(rows[5].sales_total, 0.0);
    assert_eq!(rows[12].total_revenue, 0.0);
}

/// New shingles crew on a four-week program, hired today.
#[test]
fn crew_hire_ramps_along_four_week_curve() {
    let mut state = default_state();
    state
        .add_hire(
            HireDraft::crew(JobTypeId::Shingles, TODAY)
                .output_per_week(120.0)
                .training_weeks(4),
        )
        .unwrap();
    let rows = state.project(clock());

    let new: Vec<f64> = rows.iter().take(6).map(|r| r.new_crew_production).collect();
    assert_eq!(new, vec![12.0, 12.0, 36.0, 72.0, 108.0, 120.0]);

    assert_eq!(rows[3].notes, "shingles: 60% productivity");
    assert_eq!(rows[4].notes, "shingles: 90% productivity");
    assert!(rows[5].notes.is_empty());
    assert_eq!(rows[3].total_production, 420.0 + 72.0);
    // Hires never expire.
    assert!(rows[5..].iter().all(|r| r.new_crew_production == 120.0));
}

#[test]
fn notes_join_every_ramping_hire() {
    let mut state = default_state();
    state
        .add_hire(HireDraft::crew(JobTypeId::Shingles, TODAY).training_weeks(4))
        .unwrap();
    state
        .add_hire(HireDraft::crew(JobTypeId::Metal, TODAY).training_weeks(2))
        .unwrap();
    let rows = state.project(clock());

    assert_eq!(rows[1].notes, "shingles: 10% productivity, metal: 50% productivity");
    assert_eq!(rows[2].notes, "shingles: 30% productivity");
}

#[test]
fn supervisor_hire_adds_no_production() {
    let mut state = default_state();
    state
        .add_hire(HireDraft::supervisor(TODAY).count(3).training_weeks(2))
        .unwrap();
    let rows = state.project(clock());
    assert!(rows.iter().all(|r| r.new_crew_production == 0.0));
    assert!(rows.iter().all(|r| r.notes.is_empty()));
}

#[test]
fn future_hire_contributes_nothing_before_start() {
    let mut state = default_state();
    state
        .add_hire(HireDraft::crew(JobTypeId::Metal, "2026-11-08").training_weeks(0))
        .unwrap();
    let rows = state.project(clock());

    assert_eq!(rows[2].new_crew_production, 0.0);
    assert_eq!(rows[3].new_crew_production, 180.0);
}

#[test]
fn revenue_can_follow_produced_volume() {
    let mut state = default_state();
    state.set_revenue_policy(RevenuePolicy::ProducedVolume);
    let rows = state.project(clock());
    assert_eq!(rows[0].total_revenue, 240.0 * 28.0 + 180.0 * 42.0);

    state
        .add_hire(HireDraft::crew(JobTypeId::Metal, TODAY).training_weeks(0))
        .unwrap();
    let rows = state.project(clock());
    assert_eq!(rows[0].total_revenue, 240.0 * 28.0 + 360.0 * 42.0);
}

#[test]
fn summary_reports_when_backlog_runs_dry() {
    let state = default_state();
    let rows = state.project(clock());
    let summary = summarize(&rows);

    assert_eq!(summary.weeks, 13);
    assert_eq!(summary.ending_pipeline, 0.0);
    assert_eq!(summary.min_pipeline, 0.0);
    // 1239 - 100w hits 0 after week 12 (1239 - 1300 < 0).
    assert_eq!(summary.first_empty_week, Some(12));
    assert_eq!(summary.total_revenue, 10_640.0 * 13.0);
    assert_eq!(summary.total_sales, 320.0 * 13.0);
}

#[test]
fn empty_hiring_plan_projects_cleanly() {
    let state = default_state();
    let rows = ForecastEngine::new(clock(), RevenuePolicy::PlannedSales).project(
        state.ledger(),
        &HiringPlan::new(),
        state.sales(),
        0.0,
        ForecastHorizon::Quarter,
    );
    assert!(rows.iter().all(|r| r.pipeline == 0.0));
}
