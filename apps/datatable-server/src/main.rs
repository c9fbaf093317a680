use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Datatable Server - sortable, paginated table endpoints
#[derive(Parser)]
#[command(name = "datatable-server")]
#[command(about = "Datatable Server - sortable, paginated table endpoints")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory SQLite database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // home_dir is normalized while loading
    let config = AppConfig::load_for_cli(&args)?;

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::init_logging_from_config(&logging_config, config.home_dir());
    tracing::info!("Datatable Server starting");

    if args.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, args).await,
        Commands::Check => check_config(config),
    }
}

async fn run_server(config: AppConfig, args: CliArgs) -> Result<()> {
    let conn = datatable_server::db::open(config.database.as_ref(), config.home_dir(), args.mock)
        .await?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server.host / server.port")?;

    let app = datatable_server::router(datatable_server::build_state(config, conn));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}

fn check_config(config: AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");
    if let Some(db) = &config.database {
        datatable_db::detect(&db.url).context("database.url")?;
    }
    for (name, table) in &config.tables {
        if table.per_page == Some(0) {
            anyhow::bail!("tables.{name}.per_page must be a positive integer");
        }
    }
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(())
}
