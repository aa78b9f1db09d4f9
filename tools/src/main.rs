//! forecast-runner: headless driver for the roofing production forecaster.
//!
//! Usage:
//!   forecast-runner --data-dir ./data --horizon 26
//!   forecast-runner --db planner.db --save "Spring plan"
//!   forecast-runner --db planner.db --restore <snapshot-id>
//!   forecast-runner --db planner.db --ipc-mode
//!
//! IPC edits carry the raw text typed by the user, e.g.
//!   {"type":"edit","edit":{"field":"sales","week":3,"job_type":"metal","value":"150"}}

use anyhow::Result;
use roofing_forecast_core::{
    clock::PlanningClock,
    config::PlannerConfig,
    forecast::{summarize, ForecastHorizon, ForecastRow, RevenuePolicy},
    hiring::{HireDraft, TrainingStatus},
    job_type::{JobTypeId, StaffingWarning},
    metrics::CurrentMetrics,
    planner::{FieldEdit, PlannerState},
    store::{SnapshotStore, SnapshotSummary},
};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Edit { edit: FieldEdit },
    ResetSales,
    SetHorizon { weeks: usize },
    SetRevenuePolicy { policy: RevenuePolicy },
    AddHire { draft: HireDraft },
    RemoveHire { id: String },
    SetOverride { job_type: JobTypeId },
    ClearOverride { job_type: JobTypeId },
    SaveSnapshot { name: String },
    LoadSnapshot { id: String },
    DeleteSnapshot { id: String },
    Quit,
}

#[derive(serde::Serialize)]
struct UiState {
    metrics:   CurrentMetrics,
    forecast:  Vec<ForecastRow>,
    warnings:  Vec<StaffingWarning>,
    training:  Vec<TrainingStatus>,
    snapshots: Vec<SnapshotSummary>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let horizon_weeks = parse_arg(&args, "--horizon", 0usize);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let produced = args.iter().any(|a| a == "--revenue-from-production");
    let db = str_arg(&args, "--db").unwrap_or(":memory:");
    let data_dir = str_arg(&args, "--data-dir").unwrap_or("./data");

    let config = PlannerConfig::load(data_dir).unwrap_or_else(|e| {
        log::warn!("{e}; using built-in defaults");
        PlannerConfig::default_test()
    });

    let store = SnapshotStore::open(db)?;
    store.migrate()?;

    let mut state = match str_arg(&args, "--restore") {
        Some(id) => store.restore_state(id)?,
        None => PlannerState::from_config(&config)?,
    };
    if horizon_weeks > 0 {
        state.set_horizon(ForecastHorizon::from_weeks(horizon_weeks)?);
    }
    if produced {
        state.set_revenue_policy(RevenuePolicy::ProducedVolume);
    }

    let clock = PlanningClock::now();

    if ipc_mode {
        run_ipc_loop(&mut state, &store, clock)?;
        return Ok(());
    }

    println!("Roofing Production Forecaster - forecast-runner");
    println!("  today:     {}", clock.today);
    println!("  horizon:   {} weeks", state.horizon().weeks());
    println!("  db:        {db}");
    println!("  data_dir:  {data_dir}");
    println!();

    print_summary(&state, clock);

    if let Some(name) = str_arg(&args, "--save") {
        let snapshot = store.save_state(name, &state)?;
        println!();
        println!("Saved snapshot '{}' as {}", snapshot.name, snapshot.id);
    }
    Ok(())
}

fn run_ipc_loop(state: &mut PlannerState, store: &SnapshotStore, clock: PlanningClock) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                write_error(&mut stdout, &e.to_string())?;
                continue;
            }
        };
        if matches!(cmd, IpcCommand::Quit) {
            break;
        }

        // Commands run on a copy so a failed one leaves the state as it was.
        let mut next = state.clone();
        match handle_command(&mut next, store, cmd) {
            Ok(()) => {
                *state = next;
                let ui = build_ui_state(state, store, clock)?;
                writeln!(stdout, "{}", serde_json::to_string(&ui)?)?;
            }
            Err(e) => write_error(&mut stdout, &e.to_string())?,
        }
        stdout.flush()?;
    }
    Ok(())
}

fn handle_command(state: &mut PlannerState, store: &SnapshotStore, cmd: IpcCommand) -> Result<()> {
    match cmd {
        IpcCommand::GetState | IpcCommand::Quit => {}
        IpcCommand::Edit { edit } => state.apply_edit(&edit)?,
        IpcCommand::ResetSales => state.reset_sales()?,
        IpcCommand::SetHorizon { weeks } => state.set_horizon(ForecastHorizon::from_weeks(weeks)?),
        IpcCommand::SetRevenuePolicy { policy } => state.set_revenue_policy(policy),
        IpcCommand::AddHire { draft } => {
            state.add_hire(draft)?;
        }
        IpcCommand::RemoveHire { id } => state.remove_hire(&id),
        IpcCommand::SetOverride { job_type } => state.set_override(job_type),
        IpcCommand::ClearOverride { job_type } => state.clear_override(job_type),
        IpcCommand::SaveSnapshot { name } => {
            store.save_state(&name, state)?;
        }
        IpcCommand::LoadSnapshot { id } => *state = store.restore_state(&id)?,
        IpcCommand::DeleteSnapshot { id } => store.delete_snapshot(&id)?,
    }
    Ok(())
}

fn build_ui_state(state: &PlannerState, store: &SnapshotStore, clock: PlanningClock) -> Result<UiState> {
    Ok(UiState {
        metrics:   state.metrics(clock),
        forecast:  state.project(clock),
        warnings:  state.staffing_warnings(clock),
        training:  state.hiring().training_status(clock.today),
        snapshots: store.list_snapshots()?,
    })
}

fn write_error(out: &mut impl Write, message: &str) -> Result<()> {
    let err_json = serde_json::json!({ "error": message });
    writeln!(out, "{}", err_json)?;
    out.flush()?;
    Ok(())
}

fn print_summary(state: &PlannerState, clock: PlanningClock) {
    let m = state.metrics(clock);
    println!("=== CURRENT METRICS ===");
    println!("  pipeline:            {:.0} SQS", m.pipeline_total);
    println!("  weekly sales:        {:.0} SQS", m.weekly_income);
    println!("  weekly production:   {:.0} SQS", m.weekly_outflow);
    println!("  net weekly change:   {:.0} SQS", m.net_change);
    println!("  weeks of production: {:.1}", m.weeks_of_production);
    println!("  weekly revenue:      ${:.0}", m.total_revenue);
    println!("  active crews:        {}", m.active_crews);
    println!(
        "  supervisors:         {} active, {} ready, {} training",
        m.site_supervisors, m.ready_supervisors, m.supervisors_in_training
    );
    for (id, t) in &m.by_type {
        let flag = if t.crew_lead_status.needs_override { "  NEEDS CREW LEAD" } else { "" };
        println!(
            "  {id:<9} {} crews | {:.0} SQS/wk | ${:.0}/wk | {:.1} wks{flag}",
            t.crews, t.production, t.weekly_revenue, t.weeks_of_production
        );
    }

    println!();
    println!("=== FORECAST ({} weeks) ===", state.horizon().weeks());
    let rows = state.project(clock);
    for r in &rows {
        println!(
            "  W{:<3} {} | sales {:>5.0} | prod {:>5.0} (+{:>4.0}) | pipeline {:>6.0} | ${:>7.0} {}",
            r.week_number,
            r.week_date,
            r.sales_total,
            r.total_production,
            r.new_crew_production,
            r.pipeline,
            r.total_revenue,
            r.notes
        );
    }

    let s = summarize(&rows);
    println!();
    println!("  ending pipeline: {:.0} SQS", s.ending_pipeline);
    println!("  lowest pipeline: {:.0} SQS (week {})", s.min_pipeline, s.min_pipeline_week);
    match s.first_empty_week {
        Some(w) => println!("  backlog runs dry in week {w}"),
        None => println!("  backlog never runs dry"),
    }
    println!("  total revenue:   ${:.0}", s.total_revenue);
}

fn str_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
