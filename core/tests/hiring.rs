//! Hiring plan tests: validation, derived dates, readiness.

mod common;

use chrono::Duration;
use common::{clock, default_state, today, TODAY};
use roofing_forecast_core::{
    error::ForecastError,
    hiring::{HireDraft, HireKind, MAX_TRAINING_WEEKS},
    job_type::JobTypeId,
};

#[test]
fn ready_date_is_seven_days_per_training_week() {
    let mut state = default_state();
    let hire = state
        .add_hire(HireDraft::crew(JobTypeId::Shingles, TODAY).training_weeks(6))
        .unwrap();
    assert_eq!(hire.hire_date, today());
    assert_eq!(hire.ready_date(), today() + Duration::days(42));
}

#[test]
fn crew_output_defaults_to_job_type_rate() {
    let mut state = default_state();
    let metal = state
        .add_hire(HireDraft::crew(JobTypeId::Metal, TODAY))
        .unwrap();
    assert_eq!(metal.output_per_week, 180.0);

    let custom = state
        .add_hire(HireDraft::crew(JobTypeId::Metal, TODAY).output_per_week(150.0))
        .unwrap();
    assert_eq!(custom.output_per_week, 150.0);
}

#[test]
fn training_weeks_default_to_planner_cycle() {
    let mut state = default_state();
    state.set_training_cycle_weeks(3).unwrap();
    let hire = state.add_hire(HireDraft::supervisor(TODAY)).unwrap();
    assert_eq!(hire.training_weeks, 3);
    assert_eq!(hire.kind, HireKind::Supervisor);
    assert_eq!(hire.job_type, None);
}

#[test]
fn missing_hire_date_rejected_without_change() {
    let mut state = default_state();
    let mut draft = HireDraft::crew(JobTypeId::Shingles, TODAY);
    draft.hire_date = None;

    let err = state.add_hire(draft).unwrap_err();
    assert!(matches!(err, ForecastError::Validation { ref field, .. } if field == "hire_date"));
    assert!(state.hiring().is_empty());
}

#[test]
fn unparseable_hire_date_rejected_without_change() {
    let mut state = default_state();
    state.add_hire(HireDraft::supervisor(TODAY)).unwrap();
    let before = state.clone();

    for bad in ["", "soon", "2026-13-40"] {
        let err = state
            .add_hire(HireDraft::crew(JobTypeId::Metal, bad))
            .unwrap_err();
        assert!(err.is_validation(), "{bad:?} accepted");
    }
    assert_eq!(state, before);
}

#[test]
fn malformed_drafts_rejected() {
    let mut state = default_state();

    let zero = HireDraft::crew(JobTypeId::Metal, TODAY).count(0);
    assert!(state.add_hire(zero).unwrap_err().is_validation());

    let mut no_type = HireDraft::crew(JobTypeId::Metal, TODAY);
    no_type.job_type = None;
    assert!(state.add_hire(no_type).unwrap_err().is_validation());

    let negative = HireDraft::crew(JobTypeId::Metal, TODAY).output_per_week(-5.0);
    assert!(state.add_hire(negative).unwrap_err().is_validation());

    let mut typed_super = HireDraft::supervisor(TODAY);
    typed_super.job_type = Some(JobTypeId::Shingles);
    assert!(state.add_hire(typed_super).unwrap_err().is_validation());

    assert!(state.hiring().is_empty());
}

#[test]
fn oversized_training_weeks_rejected_without_change() {
    let mut state = default_state();
    let before = state.clone();

    let err = state
        .add_hire(HireDraft::supervisor(TODAY).training_weeks(u32::MAX))
        .unwrap_err();
    assert!(matches!(err, ForecastError::Validation { ref field, .. } if field == "training_weeks"));
    assert_eq!(state, before);

    let longest = state
        .add_hire(HireDraft::supervisor(TODAY).training_weeks(MAX_TRAINING_WEEKS))
        .unwrap();
    assert_eq!(longest.ready_date(), today() + Duration::days(MAX_TRAINING_WEEKS as i64 * 7));
    let m = state.metrics(clock());
    assert_eq!(m.supervisors_in_training, 1);
}

#[test]
fn oversized_training_cycle_rejected() {
    let mut state = default_state();
    assert!(state.set_training_cycle_weeks(MAX_TRAINING_WEEKS + 1).unwrap_err().is_validation());
    assert_eq!(state.training_cycle_weeks(), 4);
}

#[test]
fn remove_hire_by_id_and_ignore_unknown() {
    let mut state = default_state();
    let a = state.add_hire(HireDraft::supervisor(TODAY)).unwrap();
    let b = state.add_hire(HireDraft::crew(JobTypeId::Metal, TODAY)).unwrap();
    assert_ne!(a.id, b.id);

    state.remove_hire("no-such-hire");
    assert_eq!(state.hiring().len(), 2);

    state.remove_hire(&a.id);
    assert_eq!(state.hiring().len(), 1);
    assert_eq!(state.hiring().hires()[0].id, b.id);
}

#[test]
fn contribution_follows_ramp_and_count() {
    let mut state = default_state();
    let hire = state
        .add_hire(
            HireDraft::crew(JobTypeId::Shingles, TODAY)
                .count(2)
                .output_per_week(100.0)
                .training_weeks(3),
        )
        .unwrap();

    assert_eq!(hire.active_contribution(today() - Duration::days(1)), 0.0);
    assert!((hire.active_contribution(today()) - 50.0).abs() < 1e-9);
    assert!((hire.active_contribution(today() + Duration::days(10)) - 130.0).abs() < 1e-9);
    assert!((hire.active_contribution(today() + Duration::days(21)) - 200.0).abs() < 1e-9);
    assert!((hire.active_contribution(today() + Duration::days(365)) - 200.0).abs() < 1e-9);
}

#[test]
fn supervisor_contribution_is_always_zero() {
    let mut state = default_state();
    let hire = state
        .add_hire(HireDraft::supervisor(TODAY).count(4).training_weeks(0))
        .unwrap();
    for days in [0, 7, 70, 700] {
        assert_eq!(hire.active_contribution(today() + Duration::days(days)), 0.0);
    }
}

#[test]
fn training_status_counts_down_to_ready() {
    let mut state = default_state();
    state
        .add_hire(HireDraft::crew(JobTypeId::Shingles, "2026-10-08").training_weeks(4))
        .unwrap();
    state
        .add_hire(HireDraft::supervisor("2026-09-01").training_weeks(2))
        .unwrap();

    let status = state.hiring().training_status(today());
    assert_eq!(status[0].days_until_ready, 18);
    assert!(!status[0].ready);
    assert_eq!(status[1].days_until_ready, 0);
    assert!(status[1].ready);

    assert_eq!(state.hiring().crews_in_training(today()), 1);
    assert_eq!(state.hiring().ready_supervisor_count(today()), 1);
    assert_eq!(state.hiring().supervisors_in_training(today()), 0);
}
