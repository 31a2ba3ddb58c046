use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use modkit::bus::{BroadcastMode, CancellationToken};
use modkit::{run, ModuleCtxBuilder, ModuleHost, RunOptions, ShutdownOptions};
use runtime::{AppConfig, AppConfigProvider, CliArgs};

// Modules register through inventory; referencing them keeps them linked.
fn ensure_modules_linked() {
    let _ = std::any::type_name::<identity::IdentityModule>();
    let _ = std::any::type_name::<sellers::SellersModule>();
    let _ = std::any::type_name::<catalog::CatalogModule>();
    let _ = std::any::type_name::<media::MediaModule>();
}

/// Modulith Server - modular application around an in-process integration bus
#[derive(Parser)]
#[command(name = "modulith-server")]
#[command(about = "Modulith Server - modular application around an in-process integration bus")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print effective configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Default broadcast mode (overrides config): sequential or parallel
    #[arg(long)]
    broadcast_mode: Option<BroadcastMode>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the modules and wait for a shutdown signal
    Run,
    /// Validate configuration and module wiring, then exit
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    ensure_modules_linked();

    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        print_config: cli.print_config,
        verbose: cli.verbose,
        broadcast_mode: cli.broadcast_mode,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    if args.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::init_logging_from_config(&logging_config, &config.home_path());
    tracing::info!(home_dir = %config.home_dir, "Modulith Server starting");

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(config).await,
    }
}

async fn run_server(config: AppConfig) -> Result<()> {
    let run_options = RunOptions {
        modules_cfg: Arc::new(AppConfigProvider::new(&config)),
        bus: config.bus.clone(),
        shutdown: ShutdownOptions::Signals,
    };
    run(run_options).await
}

/// Builds the host without running it: config sections, registrations and
/// strict request wiring are all validated.
async fn check_config(config: AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    let ctx = ModuleCtxBuilder::new(CancellationToken::new())
        .with_config_provider(Arc::new(AppConfigProvider::new(&config)))
        .build();
    let host = ModuleHost::builder()
        .discover()
        .build(&ctx, &config.bus)
        .await
        .context("module wiring check failed")?;

    println!("Configuration check passed");
    println!("Modules: {}", host.modules().join(", "));
    println!("Handlers:");
    println!("{}", serde_json::to_string_pretty(host.catalog())?);
    Ok(())
}
