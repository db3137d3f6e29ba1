// crates/quota-ledger-cli/src/main.rs
// ============================================================================
// Module: Quota Ledger CLI Entry Point
// Description: Command dispatcher for seeding and reserving quota slots.
// Purpose: Give suite tooling a process-level interface to the ledger.
// Dependencies: clap, quota-ledger-config, quota-ledger-core,
//               quota-ledger-store-file, serde_yaml, thiserror
// ============================================================================

//! ## Overview
//! The quota-ledger CLI wraps the reservation engine for use from suite
//! scripts: the suite leader seeds the ledger once, each parallel worker
//! process shells out to `acquire` before provisioning and `release` after
//! teardown. An acquisition timeout exits nonzero with the per-counter
//! shortfall so the failing scenario is diagnosable from logs alone.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use quota_ledger_config::QuotaLedgerConfig;
use quota_ledger_config::config_toml_example;
use quota_ledger_core::Ledger;
use quota_ledger_core::RequestSink;
use quota_ledger_core::ReservationConfig;
use quota_ledger_core::ResourceKind;
use quota_ledger_core::ResourceSet;
use quota_ledger_core::WorkerId;
use quota_ledger_store_file::AdvisoryFileLock;
use quota_ledger_store_file::FileRequestSink;
use quota_ledger_store_file::YamlLedgerStore;
use quota_ledger_store_file::write_initial_artifact;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable supplying the worker number when no flag is given.
const WORKER_ENV: &str = "QUOTA_LEDGER_WORKER";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Quota ledger command-line interface.
#[derive(Debug, Parser)]
#[command(name = "quota-ledger", version, about = "Shared quota ledger for parallel test workers")]
struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Seed the ledger with initial quota values.
    Seed(SeedCommand),
    /// Block until the requested capacity is reserved.
    Acquire(AcquireCommand),
    /// Return previously reserved capacity to the ledger.
    Release(ReleaseCommand),
    /// Print the current ledger contents.
    Status(StatusCommand),
    /// Configuration utilities.
    Config {
        /// Config subcommand to execute.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Arguments for the `seed` command.
#[derive(Debug, Args)]
struct SeedCommand {
    /// Path to the configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed from a quotas YAML file instead of the `[seed]` config values.
    #[arg(long)]
    from: Option<PathBuf>,
}

/// Arguments for the `acquire` command.
#[derive(Debug, Args)]
struct AcquireCommand {
    /// Path to the configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Worker number; falls back to QUOTA_LEDGER_WORKER.
    #[arg(long)]
    worker: Option<u32>,
    /// Scenario name recorded in the request log.
    #[arg(long)]
    scenario: String,
    /// Acquire timeout override in seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,
    /// Requested counters.
    #[command(flatten)]
    resources: ResourceArgs,
}

/// Arguments for the `release` command.
#[derive(Debug, Args)]
struct ReleaseCommand {
    /// Path to the configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Worker number; falls back to QUOTA_LEDGER_WORKER.
    #[arg(long)]
    worker: Option<u32>,
    /// Released counters.
    #[command(flatten)]
    resources: ResourceArgs,
}

/// Arguments for the `status` command.
#[derive(Debug, Args)]
struct StatusCommand {
    /// Path to the configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Config subcommands.
#[derive(Debug, Subcommand)]
enum ConfigCommand {
    /// Validate a configuration file.
    Validate {
        /// Path to the configuration file.
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Print an example configuration.
    Example,
}

/// Per-counter request flags, one per tracked resource kind.
#[derive(Debug, Default, Args)]
struct ResourceArgs {
    /// Normal EC2 capacity in vCPUs.
    #[arg(long = "ec2-normal", default_value_t = 0)]
    ec2_normal: u64,
    /// VPC count.
    #[arg(long, default_value_t = 0)]
    vpc: u64,
    /// Elastic IP count.
    #[arg(long, default_value_t = 0)]
    eip: u64,
    /// Internet gateway count.
    #[arg(long, default_value_t = 0)]
    igw: u64,
    /// NAT gateway count.
    #[arg(long, default_value_t = 0)]
    ngw: u64,
    /// Classic load balancer count.
    #[arg(long = "classiclb", default_value_t = 0)]
    classic_lb: u64,
    /// GPU EC2 capacity in vCPUs.
    #[arg(long = "ec2-gpu", default_value_t = 0)]
    ec2_gpu: u64,
    /// gp2 volume storage units.
    #[arg(long = "volume-gp2", default_value_t = 0)]
    volume_gp2: u64,
    /// EventBridge rule count.
    #[arg(long = "eventbridge-rules", default_value_t = 0)]
    event_bridge_rules: u64,
}

impl ResourceArgs {
    /// Converts the flags into a counter set.
    fn into_set(self) -> ResourceSet {
        ResourceSet::new()
            .with(ResourceKind::Ec2Normal, self.ec2_normal)
            .with(ResourceKind::Vpc, self.vpc)
            .with(ResourceKind::Eip, self.eip)
            .with(ResourceKind::Igw, self.igw)
            .with(ResourceKind::Ngw, self.ngw)
            .with(ResourceKind::ClassicLb, self.classic_lb)
            .with(ResourceKind::Ec2Gpu, self.ec2_gpu)
            .with(ResourceKind::VolumeGp2, self.volume_gp2)
            .with(ResourceKind::EventBridgeRules, self.event_bridge_rules)
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error carrying a preformatted message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

impl From<quota_ledger_config::ConfigError> for CliError {
    fn from(err: quota_ledger_config::ConfigError) -> Self {
        Self::new(err.to_string())
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Seed(command) => command_seed(&command),
        Commands::Acquire(command) => command_acquire(command),
        Commands::Release(command) => command_release(command),
        Commands::Status(command) => command_status(&command),
        Commands::Config {
            command,
        } => command_config(&command),
    }
}

// ============================================================================
// SECTION: Seed Command
// ============================================================================

/// Executes the `seed` command.
fn command_seed(command: &SeedCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref())?;
    let pool = match &command.from {
        Some(path) => read_pool_file(path)?,
        None => *config.seed_values(),
    };
    let ledger = build_ledger(&config, None);
    ledger.seed(&pool).map_err(|err| CliError::new(err.to_string()))?;
    if let Some(dir) = config.artifact_dir() {
        write_initial_artifact(&dir, &pool).map_err(|err| CliError::new(err.to_string()))?;
    }
    write_stdout_line(&format!("ledger seeded at {}", config.ledger_path().display()))?;
    Ok(ExitCode::SUCCESS)
}

/// Reads a counter pool from a YAML file.
fn read_pool_file(path: &Path) -> CliResult<ResourceSet> {
    let content = fs::read_to_string(path)
        .map_err(|err| CliError::new(format!("read {}: {err}", path.display())))?;
    serde_yaml::from_str(&content)
        .map_err(|err| CliError::new(format!("decode {}: {err}", path.display())))
}

// ============================================================================
// SECTION: Acquire and Release Commands
// ============================================================================

/// Executes the `acquire` command.
fn command_acquire(command: AcquireCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref())?;
    let worker = resolve_worker(command.worker);
    let timeout = command.timeout_secs.map(Duration::from_secs);
    let request = command.resources.into_set();

    let sink = FileRequestSink::new(config.request_log_path());
    sink.record(&command.scenario, &request)
        .map_err(|err| CliError::new(format!("request log: {err}")))?;

    let ledger = build_ledger(&config, timeout);
    ledger.acquire(&request, worker).map_err(|err| CliError::new(err.to_string()))?;
    write_stdout_line(&format!("worker {worker}: resources acquired"))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `release` command.
fn command_release(command: ReleaseCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref())?;
    let worker = resolve_worker(command.worker);
    let request = command.resources.into_set();

    let ledger = build_ledger(&config, None);
    ledger.release(&request, worker).map_err(|err| CliError::new(err.to_string()))?;
    write_stdout_line(&format!("worker {worker}: resources released"))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Status and Config Commands
// ============================================================================

/// Executes the `status` command.
fn command_status(command: &StatusCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref())?;
    let ledger = build_ledger(&config, None);
    let pool = ledger.snapshot().map_err(|err| CliError::new(err.to_string()))?;
    let encoded =
        serde_yaml::to_string(&pool).map_err(|err| CliError::new(err.to_string()))?;
    write_stdout_bytes(encoded.as_bytes())?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `config` subcommands.
fn command_config(command: &ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate {
            path,
        } => {
            QuotaLedgerConfig::load(path.as_deref())?;
            write_stdout_line("config ok")?;
            Ok(ExitCode::SUCCESS)
        }
        ConfigCommand::Example => {
            write_stdout_bytes(config_toml_example().as_bytes())?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Loads and validates the configuration.
fn load_config(path: Option<&Path>) -> CliResult<QuotaLedgerConfig> {
    Ok(QuotaLedgerConfig::load(path)?)
}

/// Builds the reservation engine over the configured file backends.
fn build_ledger(config: &QuotaLedgerConfig, timeout: Option<Duration>) -> Ledger {
    let mut timing: ReservationConfig = config.reservation_config();
    if let Some(timeout) = timeout {
        timing.acquire_timeout = timeout;
    }
    let path = config.ledger_path();
    Ledger::with_config(
        Arc::new(YamlLedgerStore::new(&path)),
        Arc::new(AdvisoryFileLock::new(&path)),
        timing,
    )
}

/// Resolves the worker number from the flag or environment.
fn resolve_worker(flag: Option<u32>) -> WorkerId {
    let from_env =
        || std::env::var(WORKER_ENV).ok().and_then(|value| value.parse::<u32>().ok());
    WorkerId::new(flag.or_else(from_env).unwrap_or(0))
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
        .map_err(|err| CliError::new(format!("stdout: {err}")))
}

/// Writes raw bytes to stdout without adding a newline.
fn write_stdout_bytes(bytes: &[u8]) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(bytes).map_err(|err| CliError::new(format!("stdout: {err}")))
}

/// Writes the error to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let mut stderr = std::io::stderr();
    let _ = writeln!(&mut stderr, "error: {message}");
    ExitCode::FAILURE
}
