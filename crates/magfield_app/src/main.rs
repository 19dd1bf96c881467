//! Magnetic Field Analyzer - command-line entry point
//!
//! Loads configuration, initializes logging, then either submits one
//! analysis request or prints the effective configuration.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use magfield_core::config::{ConfigManager, ServiceSettings, Settings};
use magfield_core::logging::{init_tracing, init_tracing_with_file};
use magfield_core::{
    AnalysisWorkflow, ArchiveFile, FileRole, HttpTransport, ParameterName, ServiceEndpoint,
};

mod render;

#[derive(Parser)]
#[command(name = "magfield-analyzer")]
#[command(author, version, long_about = None)]
#[command(about = "Submit magnetic field captures to the analysis service")]
struct Cli {
    /// Config file (default: .config/settings.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Increase log verbosity (repeatable)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a signal/noise pair and save the returned plots
    Analyze(AnalyzeArgs),

    /// Print the effective configuration
    Config {
        /// Overwrite the config file with defaults first
        #[arg(long)]
        init: bool,
    },
}

/// Parameters are taken as text so malformed values reach the form
/// validation instead of failing in the argument parser.
#[derive(Args, Debug, Default)]
struct AnalyzeArgs {
    /// Signal capture archive (.zip)
    #[arg(long, value_name = "ZIP")]
    signal: Option<PathBuf>,

    /// Noise capture archive (.zip)
    #[arg(long, value_name = "ZIP")]
    noise: Option<PathBuf>,

    /// Target frequency in Hz
    #[arg(long, value_name = "HZ")]
    target_freq: Option<String>,

    /// Bandwidth in Hz
    #[arg(long, value_name = "HZ")]
    bw: Option<String>,

    /// Coil current in A
    #[arg(long, value_name = "A")]
    current: Option<String>,

    /// Scaling factor
    #[arg(long)]
    scaling: Option<String>,

    /// Total measurement duration in seconds
    #[arg(long, value_name = "SECS")]
    duration: Option<String>,

    /// Segment interval in seconds
    #[arg(long, value_name = "SECS")]
    interval: Option<String>,

    /// Service base URL (overrides config)
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Folder for the decoded plots (overrides config)
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,
}

impl AnalyzeArgs {
    fn parameter_overrides(&self) -> impl Iterator<Item = (ParameterName, &str)> {
        [
            (ParameterName::TargetFreq, &self.target_freq),
            (ParameterName::Bandwidth, &self.bw),
            (ParameterName::Current, &self.current),
            (ParameterName::Scaling, &self.scaling),
            (ParameterName::TotalDuration, &self.duration),
            (ParameterName::Interval, &self.interval),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_deref().map(|v| (name, v)))
    }
}

/// Default config path: .config/settings.toml (relative to current working directory)
fn default_config_path() -> PathBuf {
    PathBuf::from(".config").join("settings.toml")
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    // Configuration first, it names the logs folder
    let config_path = cli.config.unwrap_or_else(default_config_path);
    let mut config_manager = ConfigManager::new(&config_path);

    if let Err(e) = config_manager.load_or_create() {
        eprintln!("Warning: Failed to load config: {}. Using defaults.", e);
    }

    let settings = config_manager.settings().clone();
    let level = (0..cli.verbose).fold(settings.logging.level, |level, _| level.more_verbose());
    let _log_guard = if settings.logging.file_logging {
        init_tracing_with_file(level, &config_manager.logs_folder())
    } else {
        init_tracing(level);
        None
    };

    tracing::info!("Magnetic Field Analyzer starting");
    tracing::info!("Config: {}", config_path.display());
    tracing::debug!("Core version: {}", magfield_core::version());

    if let Err(e) = config_manager.ensure_dirs_exist() {
        tracing::error!("Failed to create directories: {}", e);
        eprintln!("Warning: Failed to create directories: {}", e);
    }

    match cli.command {
        Commands::Analyze(args) => analyze(args, &config_manager).await,
        Commands::Config { init } => {
            if init {
                *config_manager.settings_mut() = Settings::default();
                config_manager
                    .save()
                    .with_context(|| format!("Failed to write {}", config_path.display()))?;
                tracing::info!("Wrote default config to {}", config_path.display());
            }
            print!("{}", config_manager.render()?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn analyze(args: AnalyzeArgs, config: &ConfigManager) -> Result<ExitCode> {
    let settings = config.settings();

    let endpoint = resolve_endpoint(args.base_url.as_deref(), &settings.service)?;

    let mut workflow = AnalysisWorkflow::new(endpoint, settings.defaults)
        .with_policy(settings.service.overlap_policy);

    for (name, value) in args.parameter_overrides() {
        workflow.set_parameter_text(name, value);
    }

    // Missing archives are left for the workflow to report
    for (role, path) in [(FileRole::Signal, &args.signal), (FileRole::Noise, &args.noise)] {
        if let Some(path) = path {
            workflow.set_file(role, ArchiveFile::read(path)?);
        }
    }

    let transport = HttpTransport::new(settings.service.request_timeout())
        .context("Failed to set up HTTP client")?;
    workflow.submit(&transport).await;

    let output_dir = args.output.unwrap_or_else(|| config.output_folder());
    let succeeded = render::report(&workflow.view(), &output_dir, &mut std::io::stdout().lock())?;

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// `--base-url` wins over the configured service URL.
fn resolve_endpoint(base_url: Option<&str>, service: &ServiceSettings) -> Result<ServiceEndpoint> {
    match base_url {
        Some(url) => ServiceEndpoint::parse(url),
        None => service.endpoint(),
    }
    .context("Cannot use the analysis service URL")
}
