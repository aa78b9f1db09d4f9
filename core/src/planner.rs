//! Planner state: every input the forecast reads, with validated
//! mutation operations.
//!
//! RULE: a mutation either fully applies or returns an error and
//! leaves the state untouched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    clock::PlanningClock,
    config::PlannerConfig,
    error::ForecastResult,
    forecast::{ForecastEngine, ForecastHorizon, ForecastRow, RevenuePolicy},
    hiring::{check_training_weeks, Hire, HireDraft, HiringPlan},
    input::{check_quantity, parse_count, parse_flag, parse_quantity},
    job_type::{JobType, JobTypeId, JobTypeLedger, StaffingWarning},
    metrics::{current_metrics, CurrentMetrics},
    sales::SalesPlan,
    types::{Sqs, WeekIndex},
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlannerState {
    ledger:               JobTypeLedger,
    hiring:               HiringPlan,
    sales:                SalesPlan,
    initial_pipeline:     Sqs,
    site_supervisors:     u32,
    training_cycle_weeks: u32,
    sales_baseline:       BTreeMap<JobTypeId, Sqs>,
    horizon:              ForecastHorizon,
    revenue_policy:       RevenuePolicy,
}

/// Raw parts of a planner state, for codecs that rebuild one.
#[derive(Debug, Clone)]
pub struct PlannerParts {
    pub ledger:               JobTypeLedger,
    pub hiring:               HiringPlan,
    pub sales:                SalesPlan,
    pub initial_pipeline:     Sqs,
    pub site_supervisors:     u32,
    pub training_cycle_weeks: u32,
    pub sales_baseline:       BTreeMap<JobTypeId, Sqs>,
    pub horizon:              ForecastHorizon,
    pub revenue_policy:       RevenuePolicy,
}

/// A job type attribute editable from free-form entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobTypeField {
    Name,
    SqsPerCrewWeekly,
    Crews,
    RevenuePerSqs,
    CrewLeads,
    SqsPerCrewLead,
    RequiresCrewLead,
    LeadTimeWeeks,
}

impl JobTypeField {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobTypeField::Name             => "name",
            JobTypeField::SqsPerCrewWeekly => "sqs_per_crew_weekly",
            JobTypeField::Crews            => "crews",
            JobTypeField::RevenuePerSqs    => "revenue_per_sqs",
            JobTypeField::CrewLeads        => "crew_leads",
            JobTypeField::SqsPerCrewLead   => "sqs_per_crew_lead",
            JobTypeField::RequiresCrewLead => "requires_crew_lead",
            JobTypeField::LeadTimeWeeks    => "lead_time_weeks",
        }
    }
}

/// One edit as typed into an input box. Values stay raw text until
/// `PlannerState::apply_edit` coerces them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "field", rename_all = "snake_case")]
pub enum FieldEdit {
    InitialPipeline { value: String },
    SiteSupervisors { value: String },
    TrainingCycleWeeks { value: String },
    Sales { week: WeekIndex, job_type: JobTypeId, value: String },
    JobType { job_type: JobTypeId, attribute: JobTypeField, value: String },
}

impl PlannerState {
    pub fn from_config(config: &PlannerConfig) -> ForecastResult<Self> {
        let ledger = JobTypeLedger::new(config.job_types.clone())?;
        let sales = SalesPlan::flat(&config.sales_baseline, config.horizon.weeks())?;
        Self::from_parts(PlannerParts {
            ledger,
            hiring: HiringPlan::new(),
            sales,
            initial_pipeline: config.initial_pipeline,
            site_supervisors: config.site_supervisors,
            training_cycle_weeks: config.training_cycle_weeks,
            sales_baseline: config.sales_baseline.clone(),
            horizon: config.horizon,
            revenue_policy: config.revenue_policy,
        })
    }

    pub fn from_parts(parts: PlannerParts) -> ForecastResult<Self> {
        let initial_pipeline = check_quantity("initial_pipeline", parts.initial_pipeline)?;
        let training_cycle_weeks =
            check_training_weeks("training_cycle_weeks", parts.training_cycle_weeks)?;
        for (id, qty) in &parts.sales_baseline {
            check_quantity(&format!("sales_baseline.{id}"), *qty)?;
        }
        let mut state = Self {
            ledger: parts.ledger,
            hiring: parts.hiring,
            sales: parts.sales,
            initial_pipeline,
            site_supervisors: parts.site_supervisors,
            training_cycle_weeks,
            sales_baseline: parts.sales_baseline,
            horizon: parts.horizon,
            revenue_policy: parts.revenue_policy,
        };
        state.sales.ensure_len(state.horizon.weeks(), &state.sales_baseline);
        Ok(state)
    }

    pub fn ledger(&self) -> &JobTypeLedger { &self.ledger }
    pub fn hiring(&self) -> &HiringPlan { &self.hiring }
    pub fn sales(&self) -> &SalesPlan { &self.sales }
    pub fn initial_pipeline(&self) -> Sqs { self.initial_pipeline }
    pub fn site_supervisors(&self) -> u32 { self.site_supervisors }
    pub fn training_cycle_weeks(&self) -> u32 { self.training_cycle_weeks }
    pub fn sales_baseline(&self) -> &BTreeMap<JobTypeId, Sqs> { &self.sales_baseline }
    pub fn horizon(&self) -> ForecastHorizon { self.horizon }
    pub fn revenue_policy(&self) -> RevenuePolicy { self.revenue_policy }

    // ── Scalar inputs ─────────────────────────────────────────

    pub fn set_initial_pipeline(&mut self, sqs: Sqs) -> ForecastResult<()> {
        self.initial_pipeline = check_quantity("initial_pipeline", sqs)?;
        Ok(())
    }

    pub fn set_site_supervisors(&mut self, count: u32) {
        self.site_supervisors = count;
    }

    pub fn set_training_cycle_weeks(&mut self, weeks: u32) -> ForecastResult<()> {
        self.training_cycle_weeks = check_training_weeks("training_cycle_weeks", weeks)?;
        Ok(())
    }

    pub fn set_horizon(&mut self, horizon: ForecastHorizon) {
        self.horizon = horizon;
        self.sales.ensure_len(horizon.weeks(), &self.sales_baseline);
    }

    pub fn set_revenue_policy(&mut self, policy: RevenuePolicy) {
        self.revenue_policy = policy;
    }

    // ── Ledger ────────────────────────────────────────────────

    pub fn edit_job_type<F>(&mut self, id: JobTypeId, f: F) -> ForecastResult<()>
    where
        F: FnOnce(&mut JobType),
    {
        self.ledger.edit(id, f)
    }

    pub fn set_override(&mut self, id: JobTypeId) {
        self.ledger.set_override(id);
    }

    pub fn clear_override(&mut self, id: JobTypeId) {
        self.ledger.clear_override(id);
    }

    // ── Hiring ────────────────────────────────────────────────

    pub fn add_hire(&mut self, draft: HireDraft) -> ForecastResult<Hire> {
        self.hiring.add_hire(draft, &self.ledger, self.training_cycle_weeks)
    }

    pub fn remove_hire(&mut self, id: &str) {
        self.hiring.remove_hire(id);
    }

    // ── Sales ─────────────────────────────────────────────────

    pub fn set_sales(&mut self, week: WeekIndex, id: JobTypeId, qty: Sqs) -> ForecastResult<()> {
        self.sales.set(week, id, qty)
    }

    /// Reset every week of the horizon to the baseline.
    pub fn reset_sales(&mut self) -> ForecastResult<()> {
        self.sales = SalesPlan::flat(&self.sales_baseline, self.horizon.weeks())?;
        Ok(())
    }

    // ── Free-form entry ───────────────────────────────────────

    /// Coerce one raw edit and apply it. Unparseable, negative or
    /// non-finite text is rejected and nothing changes.
    pub fn apply_edit(&mut self, edit: &FieldEdit) -> ForecastResult<()> {
        match edit {
            FieldEdit::InitialPipeline { value } => {
                self.set_initial_pipeline(parse_quantity("initial_pipeline", value)?)
            }
            FieldEdit::SiteSupervisors { value } => {
                self.set_site_supervisors(parse_count("site_supervisors", value)?);
                Ok(())
            }
            FieldEdit::TrainingCycleWeeks { value } => {
                self.set_training_cycle_weeks(parse_count("training_cycle_weeks", value)?)
            }
            FieldEdit::Sales { week, job_type, value } => {
                let qty = parse_quantity(&format!("sales[{week}].{job_type}"), value)?;
                self.set_sales(*week, *job_type, qty)
            }
            FieldEdit::JobType { job_type, attribute, value } => {
                self.apply_job_type_edit(*job_type, *attribute, value)
            }
        }
    }

    fn apply_job_type_edit(&mut self, id: JobTypeId, attribute: JobTypeField, raw: &str) -> ForecastResult<()> {
        let field = format!("{id}.{}", attribute.as_str());
        match attribute {
            JobTypeField::Name => {
                let name = raw.trim().to_string();
                self.edit_job_type(id, |t| t.name = name)
            }
            JobTypeField::SqsPerCrewWeekly => {
                let v = parse_quantity(&field, raw)?;
                self.edit_job_type(id, |t| t.sqs_per_crew_weekly = v)
            }
            JobTypeField::Crews => {
                let v = parse_count(&field, raw)?;
                self.edit_job_type(id, |t| t.crews = v)
            }
            JobTypeField::RevenuePerSqs => {
                let v = parse_quantity(&field, raw)?;
                self.edit_job_type(id, |t| t.revenue_per_sqs = v)
            }
            JobTypeField::CrewLeads => {
                let v = parse_count(&field, raw)?;
                self.edit_job_type(id, |t| t.crew_leads = v)
            }
            JobTypeField::SqsPerCrewLead => {
                let v = parse_quantity(&field, raw)?;
                self.edit_job_type(id, |t| t.sqs_per_crew_lead = v)
            }
            JobTypeField::RequiresCrewLead => {
                let v = parse_flag(&field, raw)?;
                self.edit_job_type(id, |t| t.requires_crew_lead = v)
            }
            JobTypeField::LeadTimeWeeks => {
                let v = parse_count(&field, raw)?;
                self.edit_job_type(id, |t| t.lead_time_weeks = v)
            }
        }
    }

    // ── Derived views ─────────────────────────────────────────

    pub fn project(&self, clock: PlanningClock) -> Vec<ForecastRow> {
        ForecastEngine::new(clock, self.revenue_policy).project(
            &self.ledger,
            &self.hiring,
            &self.sales,
            self.initial_pipeline,
            self.horizon,
        )
    }

    pub fn metrics(&self, clock: PlanningClock) -> CurrentMetrics {
        current_metrics(self, clock.today)
    }

    pub fn staffing_warnings(&self, clock: PlanningClock) -> Vec<StaffingWarning> {
        self.ledger
            .staffing_warnings(self.hiring.ready_supervisor_count(clock.today))
    }
}
