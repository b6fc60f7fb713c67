//! CLI surface (spec.md §6): `ingest`, `solve`, `lock`, `export`, `status`,
//! `simulate`. Forecasts and plans persist as JSON files under a working
//! directory; there is no database in this dependency family, so the
//! repository layer described in the design is a thin file store instead.

use clap::{Parser, Subcommand};
use solvereign::audit::run_all;
use solvereign::config::PolicyConfig;
use solvereign::master::solve_master;
use solvereign::model::{Tour, TourInstance};
use solvereign::plan::{CanonicalPlanJson, KillSwitch, PlanOutput, PlanVersion};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "solvereign")]
#[command(about = "Driver-roster scheduling and optimization engine", long_about = None)]
struct Cli {
    /// Directory holding ingested forecasts and solved plans.
    #[arg(long, default_value = ".solvereign_data")]
    data_dir: PathBuf,

    /// Path to a PolicyConfig TOML file. Defaults are used when absent.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingests a forecast (a JSON array of tour templates) under an id.
    Ingest {
        forecast_id: String,
        #[arg(long)]
        file: PathBuf,
    },
    /// Solves a previously ingested forecast into a draft plan.
    Solve {
        forecast_id: String,
        #[arg(long, default_value_t = 94)]
        seed: u64,
        #[arg(long, default_value_t = 3)]
        max_rounds: u32,
    },
    /// Locks a solved plan (refuses if the audit failed or the kill switch is engaged).
    Lock { plan_id: String },
    /// Writes a plan's canonical JSON and audit report to stdout.
    Export { plan_id: String },
    /// Prints the lifecycle state of a plan.
    Status { plan_id: String },
    /// Re-solves a forecast under an alternate seed without persisting the result,
    /// for comparing what-if scenarios against the current plan.
    Simulate {
        forecast_id: String,
        #[arg(long)]
        seed: u64,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .json()
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "command failed");
            eprintln!("error: {err}");
            ExitCode::from(err.exit_code() as u8)
        }
    }
}

fn run(cli: &Cli) -> solvereign::SolverResult<()> {
    let config = load_config(cli.config.as_deref())?;
    match &cli.command {
        Commands::Ingest { forecast_id, file } => ingest(&cli.data_dir, forecast_id, file),
        Commands::Solve { forecast_id, seed, max_rounds } => {
            solve(&cli.data_dir, forecast_id, *seed, *max_rounds, &config)
        }
        Commands::Lock { plan_id } => lock(&cli.data_dir, plan_id),
        Commands::Export { plan_id } => export(&cli.data_dir, plan_id),
        Commands::Status { plan_id } => status(&cli.data_dir, plan_id),
        Commands::Simulate { forecast_id, seed } => {
            simulate(&cli.data_dir, forecast_id, *seed, &config)
        }
    }
}

fn load_config(path: Option<&Path>) -> solvereign::SolverResult<PolicyConfig> {
    match path {
        Some(p) => {
            let raw = fs::read_to_string(p)
                .map_err(|e| solvereign::SolverError::validation("config", e.to_string()))?;
            PolicyConfig::from_toml_str(&raw)
        }
        None => Ok(PolicyConfig::default()),
    }
}

fn forecasts_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("forecasts")
}

fn plans_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("plans")
}

fn ingest(data_dir: &Path, forecast_id: &str, file: &Path) -> solvereign::SolverResult<()> {
    let _span = tracing::info_span!("ingest", forecast_id).entered();
    let raw = fs::read_to_string(file)
        .map_err(|e| solvereign::SolverError::validation("file", e.to_string()))?;
    let templates: Vec<Tour> = serde_json::from_str(&raw)
        .map_err(|e| solvereign::SolverError::validation("file", e.to_string()))?;
    if templates.is_empty() {
        return Err(solvereign::SolverError::validation(
            "file",
            "forecast contains no tour templates",
        ));
    }

    let dir = forecasts_dir(data_dir);
    fs::create_dir_all(&dir)
        .map_err(|e| solvereign::SolverError::internal(format!("forecasts dir: {e}")))?;
    let dest = dir.join(format!("{forecast_id}.json"));
    fs::write(&dest, &raw).map_err(|e| solvereign::SolverError::internal(format!("forecast file: {e}")))?;

    println!("ingested {} tour template(s) as forecast {forecast_id}", templates.len());
    Ok(())
}

fn load_forecast(data_dir: &Path, forecast_id: &str) -> solvereign::SolverResult<Vec<TourInstance>> {
    let path = forecasts_dir(data_dir).join(format!("{forecast_id}.json"));
    let raw = fs::read_to_string(&path).map_err(|_| {
        solvereign::SolverError::validation("forecast_id", format!("unknown forecast {forecast_id}"))
    })?;
    let templates: Vec<Tour> = serde_json::from_str(&raw)
        .map_err(|e| solvereign::SolverError::validation("forecast", e.to_string()))?;
    Ok(templates.into_iter().flat_map(|t| t.expand()).collect())
}

fn solve(
    data_dir: &Path,
    forecast_id: &str,
    seed: u64,
    max_rounds: u32,
    config: &PolicyConfig,
) -> solvereign::SolverResult<()> {
    let _span = tracing::info_span!("solve", forecast_id, seed).entered();
    let instances = load_forecast(data_dir, forecast_id)?;

    let mut seeded_config = config.clone();
    seeded_config.seed = seed;

    let plan_id = solvereign::generate_id();
    let result = match solve_master(&instances, &seeded_config, max_rounds) {
        Ok(r) => r,
        Err(err) => {
            let failed = PlanVersion::new_draft(
                PlanOutput::new(
                    plan_id.clone(),
                    1,
                    forecast_id.to_string(),
                    seed,
                    Vec::new(),
                    solvereign::master::LexCost::from_columns(&[]),
                    seeded_config.config_hash(),
                    solvereign::audit::AuditReport { outcomes: Vec::new() },
                ),
                seeded_config.freeze_horizon_min,
            );
            save_plan(data_dir, &failed)?;
            return Err(err);
        }
    };

    let report = run_all(&result.selected, &instances, &seeded_config, None);
    let output = PlanOutput::new(
        plan_id,
        1,
        forecast_id.to_string(),
        seed,
        result.selected,
        result.lex_cost,
        seeded_config.config_hash(),
        report,
    );
    let mut plan = PlanVersion::new_draft(output, seeded_config.freeze_horizon_min);
    plan.mark_solved()?;

    println!(
        "plan {} solved: {} driver(s), worst check {:?}, output_hash {}",
        plan.id,
        plan.output.columns.len(),
        plan.output.audit_report.worst_status(),
        plan.output.output_hash
    );
    save_plan(data_dir, &plan)
}

fn load_plan(data_dir: &Path, plan_id: &str) -> solvereign::SolverResult<PlanVersion> {
    let path = plans_dir(data_dir).join(format!("{plan_id}.json"));
    let raw = fs::read_to_string(&path)
        .map_err(|_| solvereign::SolverError::validation("plan_id", format!("unknown plan {plan_id}")))?;
    serde_json::from_str(&raw).map_err(|e| solvereign::SolverError::internal(format!("plan file: {e}")))
}

fn save_plan(data_dir: &Path, plan: &PlanVersion) -> solvereign::SolverResult<()> {
    let dir = plans_dir(data_dir);
    fs::create_dir_all(&dir).map_err(|e| solvereign::SolverError::internal(format!("plans dir: {e}")))?;
    let raw = serde_json::to_string_pretty(plan)
        .map_err(|e| solvereign::SolverError::internal(format!("plan serialize: {e}")))?;
    fs::write(dir.join(format!("{}.json", plan.id)), raw)
        .map_err(|e| solvereign::SolverError::internal(format!("plan file: {e}")))
}

fn lock(data_dir: &Path, plan_id: &str) -> solvereign::SolverResult<()> {
    let _span = tracing::info_span!("lock", plan_id).entered();
    let mut plan = load_plan(data_dir, plan_id)?;
    let kill_switch = KillSwitch::new(false);
    if plan.state == solvereign::plan::PlanState::Solved {
        plan.approve()?;
    }
    plan.lock(&kill_switch)?;
    println!("plan {plan_id} locked");
    save_plan(data_dir, &plan)
}

fn export(data_dir: &Path, plan_id: &str) -> solvereign::SolverResult<()> {
    let plan = load_plan(data_dir, plan_id)?;
    let canonical = CanonicalPlanJson::from_columns(
        plan.id.clone(),
        plan.output.forecast_version_id.clone(),
        plan.output.seed,
        plan.output.solver_config_hash.clone(),
        &plan.output.columns,
    );
    let body = serde_json::json!({
        "plan": canonical,
        "output_hash": plan.output.output_hash,
        "audit_report": plan.output.audit_report,
        "state": plan.state,
    });
    println!("{}", serde_json::to_string_pretty(&body).expect("body always serializes"));
    Ok(())
}

fn status(data_dir: &Path, plan_id: &str) -> solvereign::SolverResult<()> {
    let plan = load_plan(data_dir, plan_id)?;
    println!(
        "plan {} state={:?} version={} worst_check={:?}",
        plan.id,
        plan.state,
        plan.version,
        plan.output.audit_report.worst_status()
    );
    Ok(())
}

fn simulate(data_dir: &Path, forecast_id: &str, seed: u64, config: &PolicyConfig) -> solvereign::SolverResult<()> {
    let _span = tracing::info_span!("simulate", forecast_id, seed).entered();
    let instances = load_forecast(data_dir, forecast_id)?;
    let mut seeded_config = config.clone();
    seeded_config.seed = seed;
    let result = solve_master(&instances, &seeded_config, 3)?;
    let report = run_all(&result.selected, &instances, &seeded_config, None);
    println!(
        "simulation under seed {seed}: {} driver(s), lex_cost={}, worst_check={:?}",
        result.selected.len(),
        result.lex_cost.scalar(),
        report.worst_status()
    );
    Ok(())
}
