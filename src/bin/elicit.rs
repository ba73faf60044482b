//! Elicit command-line tool
//!
//! Sample density curves and inspect, normalize or report on session files.
//! Output is JSON (or session text for `normalize`) on stdout; logs go to stderr.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use elicit::constants::{DEFAULTS, DENSITY_SAMPLE_COUNT};
use elicit::constraints::{enforce, violations, Violation};
use elicit::density::{sample_density, summarize_curve, CurveSummary, DensityPoint};
use elicit::env_config::{init_base_path, init_rayon_threads_lenient, init_tracing};
use elicit::error::CodecError;
use elicit::report::build_report;
use elicit::session::{Completion, Session};

#[derive(Parser, Debug)]
#[command(name = "elicit", version, about = "Expert uncertainty elicitation engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sample the density curve for one distribution.
    Curve {
        #[arg(long)]
        min: f64,
        #[arg(long)]
        max: f64,
        #[arg(long)]
        mode: f64,
        #[arg(long, default_value_t = 100.0)]
        confidence: f64,
        /// Number of sample points.
        #[arg(long, default_value_t = DENSITY_SAMPLE_COUNT)]
        points: usize,
    },
    /// Decode a session file and list constraint violations.
    Check {
        /// Session file, or `-` for stdin.
        file: PathBuf,
    },
    /// Decode, repair every scenario so both invariants hold, and re-encode.
    Normalize {
        file: PathBuf,
        /// Write here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Per-scenario curve summaries and yield impact.
    Report {
        file: PathBuf,
        /// Include the sampled curve points.
        #[arg(long)]
        curves: bool,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct CurveOutput {
    summary: Option<CurveSummary>,
    points: Vec<DensityPoint>,
}

#[derive(Serialize)]
struct ScenarioCheck<'a> {
    scenario_id: &'a str,
    violations: Vec<Violation>,
}

#[derive(Serialize)]
struct CheckOutput<'a> {
    scenarios: usize,
    groups: Vec<&'a str>,
    completion: Completion,
    yield_column: Option<&'a str>,
    invalid: Vec<ScenarioCheck<'a>>,
}

fn read_input(path: &Path) -> Result<String, CliError> {
    let io_err = |source: std::io::Error| CliError::Io {
        path: path.display().to_string(),
        source,
    };
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text).map_err(io_err)?;
        Ok(text)
    } else {
        std::fs::read_to_string(path).map_err(io_err)
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run_curve(min: f64, max: f64, mode: f64, confidence: f64, points: usize) -> Result<(), CliError> {
    let points = sample_density(min, max, mode, confidence, points);
    print_json(&CurveOutput {
        summary: summarize_curve(&points),
        points,
    })
}

fn run_check(file: &Path) -> Result<(), CliError> {
    let session = Session::from_csv(&read_input(file)?)?;
    let invalid: Vec<ScenarioCheck> = session
        .scenarios
        .iter()
        .filter_map(|s| {
            let pair = session.distribution(&s.id).copied().unwrap_or_default();
            let found = violations(&pair, &DEFAULTS);
            (!found.is_empty()).then_some(ScenarioCheck {
                scenario_id: &s.id,
                violations: found,
            })
        })
        .collect();
    info!(
        scenarios = session.scenarios.len(),
        invalid = invalid.len(),
        "checked session"
    );
    print_json(&CheckOutput {
        scenarios: session.scenarios.len(),
        groups: session.groups(),
        completion: session.completion(),
        yield_column: session.yield_column.as_deref(),
        invalid,
    })
}

fn run_normalize(file: &Path, output: Option<&Path>) -> Result<(), CliError> {
    let mut session = Session::from_csv(&read_input(file)?)?;
    let mut changed = 0usize;
    for pair in session.distributions.values_mut() {
        let fixed = enforce(pair, &DEFAULTS);
        if fixed != *pair {
            *pair = fixed;
            changed += 1;
        }
    }
    info!(changed, "normalized session");

    let text = session.to_csv()?;
    match output {
        Some(path) => std::fs::write(path, text).map_err(|source| CliError::Io {
            path: path.display().to_string(),
            source,
        }),
        None => {
            print!("{text}");
            Ok(())
        }
    }
}

fn run_report(file: &Path, curves: bool) -> Result<(), CliError> {
    let session = Session::from_csv(&read_input(file)?)?;
    init_rayon_threads_lenient();
    print_json(&build_report(&session, curves))
}

fn main() {
    init_tracing();

    let cli = Cli::parse();

    if std::env::var_os("ELICIT_BASE_PATH").is_some() {
        if let Err(e) = init_base_path() {
            eprintln!("Error: cannot enter ELICIT_BASE_PATH: {e}");
            process::exit(1);
        }
    }

    let result = match cli.command {
        Commands::Curve {
            min,
            max,
            mode,
            confidence,
            points,
        } => run_curve(min, max, mode, confidence, points),
        Commands::Check { file } => run_check(&file),
        Commands::Normalize { file, output } => run_normalize(&file, output.as_deref()),
        Commands::Report { file, curves } => run_report(&file, curves),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
