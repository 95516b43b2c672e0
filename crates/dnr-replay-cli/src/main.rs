// crates/dnr-replay-cli/src/main.rs
// ============================================================================
// Module: DNR Replay CLI Entry Point
// Description: Command dispatcher for replaying past solver runs.
// Purpose: Run, locate, and download replays from the command line.
// Dependencies: clap, dnr-replay-cli, dnr-replay-config, dnr-replay-core.
// ============================================================================

//! ## Overview
//! `dnr-replay` loads `dnr-replay.toml`, wires the S3 stores and the solver,
//! and drives the replay runner. Progress is reported as JSON-line events on
//! the configured sink; each command ends with one JSON summary line on
//! stdout. Errors go to stderr with a failure exit code.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use dnr_replay_cli::wiring::SummaryEventSink;
use dnr_replay_cli::wiring::build_event_sink;
use dnr_replay_cli::wiring::build_runner;
use dnr_replay_config::ReplayConfig;
use dnr_replay_core::CorrelationId;
use dnr_replay_core::FileRoleSet;
use dnr_replay_core::ReplayRunner;
use dnr_replay_core::RunRequest;
use dnr_replay_core::SearchScope;
use dnr_replay_core::runtime::ScopeSource;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "dnr-replay", version, disable_help_subcommand = true)]
struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a run: locate, download, resubmit, and republish.
    Run(RunCommand),
    /// Resolve the scope and print the located file set.
    Locate(LocateCommand),
    /// Resolve, locate, and download a run's artifacts.
    Download(LocateCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Arguments shared by commands that search the source bucket.
#[derive(Args, Debug)]
struct TargetArgs {
    /// Correlation id of the run.
    #[arg(value_name = "CORRELATION_ID")]
    correlation_id: String,
    /// Scope granularity used when no sentinel exists.
    #[arg(long, value_enum, value_name = "SCOPE")]
    scope: Option<ScopeArg>,
    /// Search prefix that bypasses scope resolution.
    #[arg(long, value_name = "PREFIX")]
    prefix: Option<String>,
    /// Config file path (defaults to `dnr-replay.toml`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Arguments for `run`.
#[derive(Args, Debug)]
struct RunCommand {
    /// Search target.
    #[command(flatten)]
    target: TargetArgs,
    /// Reuse the local run directory instead of downloading.
    #[arg(long)]
    skip_download: bool,
}

/// Arguments for `locate` and `download`.
#[derive(Args, Debug)]
struct LocateCommand {
    /// Search target.
    #[command(flatten)]
    target: TargetArgs,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Load and validate a config file.
    Check(ConfigCheckCommand),
}

/// Arguments for `config check`.
#[derive(Args, Debug)]
struct ConfigCheckCommand {
    /// Config file path (defaults to `dnr-replay.toml`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Scope granularity argument.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ScopeArg {
    /// `YYYY`.
    Year,
    /// `YYYY-MM`.
    Month,
    /// `YYYY-MM-DD`.
    Day,
}

impl From<ScopeArg> for SearchScope {
    fn from(value: ScopeArg) -> Self {
        match value {
            ScopeArg::Year => Self::Year,
            ScopeArg::Month => Self::Month,
            ScopeArg::Day => Self::Day,
        }
    }
}

// ============================================================================
// SECTION: Summaries
// ============================================================================

/// Summary printed by `run`.
#[derive(Debug, Serialize)]
struct RunSummary {
    /// Input correlation id.
    correlation_id: String,
    /// Correlation id assigned by the solver.
    new_correlation_id: Option<String>,
    /// Local run directory.
    run_directory: String,
}

/// Summary printed by `locate`.
#[derive(Debug, Serialize)]
struct LocateSummary<'a> {
    /// Input correlation id.
    correlation_id: &'a str,
    /// Prefix that was scanned.
    prefix: &'a str,
    /// How the prefix was chosen.
    scope_source: ScopeSource,
    /// Located artifacts.
    files: &'a FileRoleSet,
}

/// Summary printed by `download`.
#[derive(Debug, Serialize)]
struct DownloadSummary<'a> {
    /// Input correlation id.
    correlation_id: &'a str,
    /// Local run directory.
    run_directory: String,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper carrying a display message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Commands::Run(command) => command_run(&command),
        Commands::Locate(command) => command_locate(&command.target),
        Commands::Download(command) => command_download(&command.target),
        Commands::Config {
            command: ConfigCommand::Check(command),
        } => command_config_check(&command),
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Replays a run end to end.
fn command_run(command: &RunCommand) -> CliResult<ExitCode> {
    let context = ReplayContext::open(&command.target)?;
    let request = RunRequest {
        correlation_id: context.correlation_id.clone(),
        scope_hint: context.scope_hint,
        prefix: command.target.prefix.clone(),
        skip_download: command.skip_download,
    };
    let correlation_id = context
        .runner
        .run(&request)
        .map_err(|err| CliError::new(format!("replay failed: {err}")))?;
    write_json_line(&RunSummary {
        correlation_id: correlation_id.to_string(),
        new_correlation_id: context.events.new_correlation_id(),
        run_directory: context.runner.local().run_dir(&correlation_id).display().to_string(),
    })?;
    Ok(ExitCode::SUCCESS)
}

/// Resolves the scope and prints the located file set.
fn command_locate(target: &TargetArgs) -> CliResult<ExitCode> {
    let context = ReplayContext::open(target)?;
    let scope = context
        .runner
        .resolve_scope(&context.correlation_id, context.scope_hint, target.prefix.as_deref())
        .map_err(|err| CliError::new(format!("scope resolution failed: {err}")))?;
    let files = context
        .runner
        .locate(&context.correlation_id, &scope.prefix)
        .map_err(|err| CliError::new(format!("locate failed: {err}")))?;
    write_json_line(&LocateSummary {
        correlation_id: context.correlation_id.as_str(),
        prefix: &scope.prefix,
        scope_source: scope.source,
        files: &files,
    })?;
    Ok(ExitCode::SUCCESS)
}

/// Resolves, locates, and downloads a run's artifacts.
fn command_download(target: &TargetArgs) -> CliResult<ExitCode> {
    let context = ReplayContext::open(target)?;
    let run_directory = context
        .runner
        .download(&context.correlation_id, context.scope_hint, target.prefix.as_deref())
        .map_err(|err| CliError::new(format!("download failed: {err}")))?;
    write_json_line(&DownloadSummary {
        correlation_id: context.correlation_id.as_str(),
        run_directory: run_directory.display().to_string(),
    })?;
    Ok(ExitCode::SUCCESS)
}

/// Loads and validates a config file.
fn command_config_check(command: &ConfigCheckCommand) -> CliResult<ExitCode> {
    load_config(command.config.as_deref())?;
    write_stdout_line("config ok")
        .map_err(|err| CliError::new(format!("failed to write stdout: {err}")))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Runner and inputs shared by the search commands.
struct ReplayContext {
    /// Parsed correlation id.
    correlation_id: CorrelationId,
    /// Effective scope hint (argument, else config default).
    scope_hint: Option<SearchScope>,
    /// Summary sink wired into the runner.
    events: Arc<SummaryEventSink>,
    /// Wired runner.
    runner: ReplayRunner,
}

impl ReplayContext {
    /// Parses the target, loads config, and wires the runner.
    fn open(target: &TargetArgs) -> CliResult<Self> {
        let correlation_id = CorrelationId::parse(&target.correlation_id)
            .map_err(|err| CliError::new(format!("invalid correlation id: {err}")))?;
        let config = load_config(target.config.as_deref())?;
        let scope_hint = resolve_scope_hint(target.scope, &config);
        let sink = build_event_sink(&config.events)
            .map_err(|err| CliError::new(format!("event sink setup failed: {err}")))?;
        let events = Arc::new(SummaryEventSink::new(sink));
        let runner = build_runner(&config, Arc::clone(&events))
            .map_err(|err| CliError::new(format!("setup failed: {err}")))?;
        Ok(Self {
            correlation_id,
            scope_hint,
            events,
            runner,
        })
    }
}

/// Loads configuration from the given path or the default resolution.
fn load_config(path: Option<&Path>) -> CliResult<ReplayConfig> {
    ReplayConfig::load(path).map_err(|err| CliError::new(format!("failed to load config: {err}")))
}

/// Chooses the scope hint: argument first, then the configured default.
fn resolve_scope_hint(argument: Option<ScopeArg>, config: &ReplayConfig) -> Option<SearchScope> {
    argument.map(SearchScope::from).or(config.locator.default_scope)
}

/// Writes a value as one JSON line to stdout.
fn write_json_line<T: Serialize>(value: &T) -> CliResult<()> {
    let line = serde_json::to_string(value)
        .map_err(|err| CliError::new(format!("failed to serialize summary: {err}")))?;
    write_stdout_line(&line).map_err(|err| CliError::new(format!("failed to write stdout: {err}")))
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
