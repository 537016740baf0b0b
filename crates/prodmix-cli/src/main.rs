use clap::Parser;
use prodmix_model::{LpSolver, PlanData, PlanReport};
use prodmix_solver::{
    Analyzed, BINDING_TOLERANCE, MicrolpSolver, SolverError, available_backends, backend_by_name,
};
use std::io::Write;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "prodmix")]
#[command(about = "Maximize profit over three products and three shifts", long_about = None)]
struct Cli {
    /// Solver backend (microlp)
    #[arg(short, long, default_value = MicrolpSolver::NAME)]
    backend: String,
    /// Show binding constraints and shadow prices, or the violated rows when infeasible
    #[arg(short, long)]
    analysis: bool,
    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    format: String,
    /// Relative tolerance for binding rows and violation checks
    #[arg(long, default_value_t = BINDING_TOLERANCE, value_parser = parse_tolerance)]
    tolerance: f64,
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    if cli.format != "text" && cli.format != "json" {
        eprintln!("Error: unknown format '{}' (expected text or json)", cli.format);
        std::process::exit(1);
    }

    let solver = match select_backend(&cli) {
        Ok(s) => s,
        Err(e @ SolverError::BackendUnavailable(_)) => {
            eprintln!("Error: {} (available: {})", e, available_backends().join(", "));
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let model = prodmix_model::build(&PlanData::standard());

    let plan = match prodmix_model::solve(&model, solver.as_ref()) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let result = if cli.format == "json" {
        let report = PlanReport::new(&model, &plan);
        match serde_json::to_string_pretty(&report) {
            Ok(json) => writeln!(out, "{}", json).map_err(prodmix_model::ModelError::from),
            Err(e) => {
                eprintln!("Error: failed to serialize report: {}", e);
                std::process::exit(1);
            }
        }
    } else if cli.analysis {
        prodmix_model::report_analysis(&model, &plan, &mut out)
    } else {
        prodmix_model::report(&model, &plan, &mut out)
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn parse_tolerance(value: &str) -> Result<f64, String> {
    let tol: f64 = value.parse().map_err(|e| format!("{}", e))?;
    if (0.0..1.0).contains(&tol) {
        Ok(tol)
    } else {
        Err(format!("{} is not in [0, 1)", value))
    }
}

fn select_backend(cli: &Cli) -> Result<Box<dyn LpSolver>, SolverError> {
    let backend = backend_by_name(&cli.backend)?;
    debug!(
        component = "cli",
        backend = backend.name(),
        analysis = cli.analysis,
        "Selected backend"
    );

    // JSON always carries the analysis fields
    if cli.analysis || cli.format == "json" {
        Ok(Box::new(Analyzed::new(backend).with_tolerance(cli.tolerance)?))
    } else {
        Ok(backend)
    }
}

/// Logs go to stderr, filtered by `PRODMIX_LOG` (off by default), so stdout
/// carries only the report.
fn init_logging() {
    let filter = EnvFilter::try_from_env("PRODMIX_LOG").unwrap_or_else(|_| EnvFilter::new("off"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
