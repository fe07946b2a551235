//! Replays a recorded stream of host events through the reporter.
//!
//! The input has one JSON event per line, see [`HostEvent`]. Blank lines are skipped.

use std::{
    error::Error as _,
    fs::File,
    io::{self, BufRead, BufReader},
    path::PathBuf,
    process::ExitCode,
};

use ci_test_reporter::{
    host::HostEvent, Color, ConfigError, ReportError, ReporterConfig, ReporterOutput,
    TestReporterBuilder,
};
use clap::Parser;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(version, about = "Render a recorded test run as a CI-friendly report")]
struct Args {
    /// Events file, one JSON object per line. Reads stdin if omitted.
    input: Option<PathBuf>,

    /// Reporter verbosity (quiet, minimal, normal or detailed).
    #[arg(short, long, default_value = "minimal")]
    verbosity: String,

    /// Additional reporter parameters, e.g. `-p collapseStdOut=false`.
    #[arg(short = 'p', long = "parameter", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    parameters: Vec<(String, String)>,

    /// Whether to colorize output.
    #[arg(long, value_enum, default_value_t)]
    color: Color,
}

#[derive(Debug, Error)]
enum ReplayError {
    #[error("error reading {path}")]
    Read {
        path: String,
        #[source]
        error: io::Error,
    },

    #[error("invalid event on line {line}")]
    Parse {
        line: usize,
        #[source]
        error: serde_json::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("input ended without a run-complete event")]
    Incomplete,
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(key, value)| (key.trim().to_owned(), value.to_owned()))
        .ok_or_else(|| format!("expected KEY=VALUE, got `{s}`"))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env("TEST_REPORTER_LOG"))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    match replay(args) {
        Ok(true) => ExitCode::FAILURE,
        Ok(false) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            let mut source = error.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::from(2)
        }
    }
}

/// Returns whether the replayed run failed.
fn replay(args: Args) -> Result<bool, ReplayError> {
    let parameters =
        std::iter::once(("verbosity".to_owned(), args.verbosity)).chain(args.parameters);
    let config = ReporterConfig::from_parameters(parameters)?;
    let reporter = TestReporterBuilder::new(config)
        .set_color(args.color)
        .build(ReporterOutput::Stdout);

    let (path, reader): (String, Box<dyn BufRead>) = match &args.input {
        Some(path) => {
            let file = File::open(path).map_err(|error| ReplayError::Read {
                path: path.display().to_string(),
                error,
            })?;
            (path.display().to_string(), Box::new(BufReader::new(file)))
        }
        None => ("stdin".to_owned(), Box::new(io::stdin().lock())),
    };

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|error| ReplayError::Read {
            path: path.clone(),
            error,
        })?;
        if line.trim().is_empty() {
            continue;
        }

        let event: HostEvent = serde_json::from_str(&line).map_err(|error| ReplayError::Parse {
            line: index + 1,
            error,
        })?;
        if let Some(conclusion) = reporter.report_event(event.into())? {
            tracing::debug!(?conclusion, "run complete");
            return Ok(conclusion.has_failed());
        }
    }

    Err(ReplayError::Incomplete)
}
