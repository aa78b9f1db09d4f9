#![allow(dead_code)]

use chrono::NaiveDate;
use roofing_forecast_core::{clock::PlanningClock, config::PlannerConfig, planner::PlannerState};

pub const TODAY: &str = "2026-10-18";

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
}

pub fn clock() -> PlanningClock {
    PlanningClock::fixed(today())
}

pub fn default_state() -> PlannerState {
    let _ = env_logger::builder().is_test(true).try_init();
    PlannerState::from_config(&PlannerConfig::default_test()).expect("default state")
}
