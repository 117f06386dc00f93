mod command;
mod compare;
mod diff;
mod error;
mod executor;
mod fixture;
mod loader;
mod report;
mod runner;
mod settings;

use clap::{Arg, ArgAction, CommandFactory, FromArgMatches, Parser};
use compare::CompareMode;
use loader::Selection;
use report::OutputFormat;
use runner::RunConfig;
use settings::{DEFAULT_EXECUTABLE, SETTINGS_FILENAME, Settings};
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "dirtest")]
#[command(about = "Run an executable against fixture directories and check its output")]
#[command(version, disable_version_flag = true)]
struct Cli {
    /// Run only the named tests
    #[arg(short, long, num_args = 1.., value_name = "NAME", conflicts_with = "skip")]
    run: Vec<String>,
    /// Run every test except the named ones
    #[arg(short, long, num_args = 1.., value_name = "NAME")]
    skip: Vec<String>,
    /// Program under test (overrides the settings file)
    #[arg(long)]
    executable: Option<String>,
    /// Timeout per test in seconds [default: 30]
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,
    /// Output comparison policy [default: exact]
    #[arg(long, value_enum)]
    compare: Option<CompareMode>,
    /// Directory holding one sub-directory per test
    #[arg(long, default_value = loader::DEFAULT_TESTS_DIR)]
    tests_dir: PathBuf,
    /// Settings file
    #[arg(long, default_value = SETTINGS_FILENAME)]
    settings: PathBuf,
    /// Output format
    #[arg(short, long, value_enum, default_value = "human")]
    output: OutputFormat,
    /// Show debug logging
    #[arg(long)]
    verbose: bool,
}

/// Accept the single-dash `-help` spelling as the first argument.
fn legacy_help_flag(mut args: Vec<OsString>) -> Vec<OsString> {
    if args.get(1).is_some_and(|arg| arg == "-help") {
        args[1] = OsString::from("--help");
    }
    args
}

fn parse_cli() -> Cli {
    let args = legacy_help_flag(std::env::args_os().collect());

    let matches = Cli::command()
        .arg(
            Arg::new("version")
                .short('v')
                .long("version")
                .action(ArgAction::Version)
                .help("Print version"),
        )
        .get_matches_from(args);

    Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
}

/// Logs go to stderr so stdout carries only the report.
fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            "dirtest=debug,warn"
        } else {
            "dirtest=info,warn"
        })
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}

/// Merge settings file and command line, the command line winning.
fn resolve_config(cli: &Cli) -> RunConfig {
    let (settings, problem) = match settings::load_settings(&cli.settings) {
        Ok(settings) => (settings, None),
        Err(e) => (Settings::default(), Some(e.to_string())),
    };

    if cli.executable.is_none() && settings.executable.is_none() {
        let reason = problem
            .unwrap_or_else(|| format!("no executable in {}", cli.settings.display()));
        tracing::warn!("{reason}; using default executable {DEFAULT_EXECUTABLE}");
    }
    let executable = cli
        .executable
        .clone()
        .unwrap_or_else(|| settings.executable().to_string());

    if cli.timeout.is_none() && settings.timeout == Some(0) {
        tracing::warn!(
            "timeout of 0 in {} ignored; using {}s",
            cli.settings.display(),
            executor::DEFAULT_TIMEOUT.as_secs()
        );
    }

    RunConfig {
        executable,
        timeout: cli
            .timeout
            .map(Duration::from_secs)
            .or(settings.timeout())
            .unwrap_or(executor::DEFAULT_TIMEOUT),
        compare: cli.compare.or(settings.compare).unwrap_or_default(),
    }
}

fn main() {
    let cli = parse_cli();
    init_logging(cli.verbose);

    let config = resolve_config(&cli);

    let cases = match loader::discover(&cli.tests_dir) {
        Ok(cases) => cases,
        Err(e) => {
            eprintln!("Error finding tests: {e}");
            std::process::exit(1);
        }
    };

    let selection = Selection::from_lists(cli.run, cli.skip);
    for name in selection.unknown_names(&cases) {
        tracing::warn!("no test named {name:?} in {}", cli.tests_dir.display());
    }
    let cases = selection.apply(cases);
    tracing::debug!(
        tests = cases.len(),
        executable = %config.executable,
        timeout = ?config.timeout,
        compare = ?config.compare,
        "starting run"
    );

    let summary = match runner::run_tests(&cases, &config) {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("Internal runner error: {e}");
            std::process::exit(2);
        }
    };

    match report::render(&summary, cli.output) {
        Ok(out) => print!("{out}"),
        Err(e) => {
            eprintln!("Failed to render report: {e}");
            std::process::exit(2);
        }
    }
}
