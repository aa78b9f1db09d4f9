//! Projection must be a pure function of its inputs.
//!
//! Same state, same clock → byte-identical rows. Any divergence
//! means hidden mutable state crept into the engine.

mod common;

use common::{clock, default_state, TODAY};
use roofing_forecast_core::{hiring::HireDraft, job_type::JobTypeId, planner::PlannerState};

fn busy_state() -> PlannerState {
    let mut state = default_state();
    state
        .add_hire(HireDraft::crew(JobTypeId::Shingles, TODAY).count(2).training_weeks(5))
        .unwrap();
    state
        .add_hire(HireDraft::crew(JobTypeId::Metal, "2026-12-01").training_weeks(3))
        .unwrap();
    state
        .add_hire(HireDraft::supervisor("2026-10-01").training_weeks(4))
        .unwrap();
    state.set_sales(4, JobTypeId::Metal, 310.0).unwrap();
    state
}

#[test]
fn repeated_projection_is_byte_identical() {
    let state = busy_state();

    let a = serde_json::to_string(&state.project(clock())).unwrap();
    let b = serde_json::to_string(&state.project(clock())).unwrap();

    assert_eq!(a, b, "projection diverged between identical calls");
}

#[test]
fn projection_leaves_inputs_untouched() {
    let state = busy_state();
    let before = state.clone();

    let _ = state.project(clock());
    let _ = state.metrics(clock());

    assert_eq!(state, before);
}

#[test]
fn cloned_states_project_identically() {
    let a = busy_state();
    let b = a.clone();
    assert_eq!(a.project(clock()), b.project(clock()));
}
