//! Strategy launcher - main entry point
//!
//! This binary provides three subcommands:
//! - defaults: Print the default configuration of an order type
//! - validate: Build and validate a configuration without contacting the backend
//! - launch: Apply a configuration on the backend, then start the strategy

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use strategy_launcher::config::DEFAULT_CONFIG_PATH;
use strategy_launcher::OrderVariant;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "strategy-launcher")]
#[command(about = "Configure and launch a sentiment-gated trading strategy", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the default configuration for an order type
    Defaults {
        /// Order type (bracket, limit or market)
        #[arg(short, long)]
        order_type: OrderVariant,
    },

    /// Validate a configuration without contacting the backend
    Validate {
        /// Path to configuration file
        #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
        config: String,

        /// Order type (overrides the preset in the config file)
        #[arg(short, long)]
        order_type: Option<OrderVariant>,

        /// Field assignments, e.g. --set symbol=AAPL --set buyLimitMultiplier=1.02
        #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = commands::parse_assignment)]
        assignments: Vec<(String, String)>,
    },

    /// Apply the configuration on the backend and start the strategy
    Launch {
        /// Path to configuration file
        #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
        config: String,

        /// Order type (overrides the preset in the config file)
        #[arg(short, long)]
        order_type: Option<OrderVariant>,

        /// Field assignments, e.g. --set symbol=AAPL --set buyLimitMultiplier=1.02
        #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = commands::parse_assignment)]
        assignments: Vec<(String, String)>,

        /// Backend base URL (overrides config file and environment)
        #[arg(long)]
        api_url: Option<String>,
    },
}

const LOG_DIR: &str = "logs";

/// HTTP stack targets held at `warn` unless `RUST_LOG` says otherwise
const QUIET_TARGETS: [&str; 5] = ["hyper", "hyper_util", "reqwest", "rustls", "h2"];

/// Console output on stderr plus one JSON-lines file per invocation.
/// Returns the file's path.
fn init_tracing(verbose: bool, command: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(LOG_DIR)?;

    let stamp = chrono::Local::now().format("%Y%m%dT%H%M%S");
    let file_name = format!("{}-{}.log", command, stamp);
    let log_path = PathBuf::from(LOG_DIR).join(&file_name);

    let directives = std::iter::once(if verbose { "debug" } else { "info" }.to_string())
        .chain(QUIET_TARGETS.iter().map(|target| format!("{}=warn", target)))
        .collect::<Vec<_>>()
        .join(",");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));

    let console = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .compact();

    let file = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(tracing_appender::rolling::never(LOG_DIR, &file_name))
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .init();

    Ok(log_path)
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let command_name = match &cli.command {
        Commands::Defaults { .. } => "defaults",
        Commands::Validate { .. } => "validate",
        Commands::Launch { .. } => "launch",
    };

    let log_path = init_tracing(cli.verbose, command_name)?;
    info!(command = command_name, log = %log_path.display(), "Tracing ready");

    match cli.command {
        Commands::Defaults { order_type } => commands::defaults::run(order_type),

        Commands::Validate {
            config,
            order_type,
            assignments,
        } => commands::validate::run(config, order_type, assignments),

        Commands::Launch {
            config,
            order_type,
            assignments,
            api_url,
        } => commands::launch::run(config, order_type, assignments, api_url),
    }
}
