pub mod commands;
pub mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use xsell_core::config::{AppConfig, ConfigOverrides, LoadOptions, LogFormat, LoggingConfig};

use commands::suggest::SuggestArgs;
use commands::{CommandResult, SlotArgs};

#[derive(Debug, Parser)]
#[command(
    name = "xsell",
    about = "Cross-sell dashboard for the point-of-sale counter",
    long_about = "Browse customers and the catalog, fill up to three product slots, and fetch cross-sell suggestions from the recommendation backend.",
    after_help = "Examples:\n  xsell customers\n  xsell customer C0001\n  xsell suggest --customer C0001 --slot1 Washer --slot2 Dryer\n  xsell doctor --json"
)]
pub struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    #[arg(long, global = true, value_name = "PATH", help = "Config file (default: xsell.toml or config/xsell.toml)")]
    config: Option<PathBuf>,
    #[arg(long, global = true, value_name = "URL", help = "Backend base URL")]
    backend_url: Option<String>,
    #[arg(long, global = true, value_name = "SECS", help = "Per-request timeout for backend calls")]
    timeout_secs: Option<u64>,
    #[arg(long, global = true, value_name = "LEVEL", help = "Log level written to stderr")]
    log_level: Option<String>,
    #[arg(long, global = true, value_name = "FORMAT", help = "Log format: compact, pretty or json")]
    log_format: Option<LogFormat>,
}

impl GlobalArgs {
    fn load_options(&self) -> LoadOptions {
        LoadOptions {
            config_path: self.config.clone(),
            require_file: self.config.is_some(),
            overrides: ConfigOverrides {
                backend_base_url: self.backend_url.clone(),
                request_timeout_secs: self.timeout_secs,
                log_level: self.log_level.clone(),
                log_format: self.log_format,
                ..ConfigOverrides::default()
            },
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "List customers as `ID — Name` options")]
    Customers,
    #[command(about = "List catalog products with per-slot availability for a selection")]
    Catalog {
        #[command(flatten)]
        slots: SlotArgs,
    },
    #[command(about = "Show a customer's details, recent invoices, earlier purchases and insights")]
    Customer {
        #[arg(value_name = "ID")]
        id: String,
    },
    #[command(about = "Fetch cross-sell suggestions for the selected products")]
    Suggest(SuggestArgs),
    #[command(about = "Inspect effective configuration values with source attribution and redaction")]
    Config,
    #[command(about = "Validate config and backend reachability")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = cli.global.load_options();

    if let Err(error) = init_logging(&options) {
        eprintln!("xsell: {error:#}");
    }

    let result = match &cli.command {
        Command::Customers => commands::customers::run(&options),
        Command::Catalog { slots } => commands::catalog::run(&options, slots),
        Command::Customer { id } => commands::customer::run(&options, id),
        Command::Suggest(args) => commands::suggest::run(&options, args),
        Command::Config => commands::config::run(&options),
        Command::Doctor { json } => {
            let report = commands::doctor::run(&options, *json);
            CommandResult { exit_code: if report.passed { 0 } else { 1 }, output: report.output }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Logs go to stderr so command output on stdout stays machine-readable.
/// A config that fails to load still gets default logging; the command
/// itself reports the config error.
fn init_logging(options: &LoadOptions) -> Result<()> {
    let logging = match AppConfig::load(options.clone()) {
        Ok(config) => config.logging,
        Err(_) => fallback_logging(options),
    };
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&logging.level)?,
    };

    let builder = tracing_subscriber::fmt().with_target(false).with_env_filter(filter).with_writer(std::io::stderr);
    match logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
    .map_err(|error| anyhow!("failed to initialize logging: {error}"))
}

fn fallback_logging(options: &LoadOptions) -> LoggingConfig {
    let defaults = AppConfig::default().logging;
    LoggingConfig {
        level: options.overrides.log_level.clone().unwrap_or(defaults.level),
        format: options.overrides.log_format.unwrap_or(defaults.format),
    }
}
