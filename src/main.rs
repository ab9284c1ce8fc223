use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use shiurfeed::deploy::{Deployer, NetlifyDeployer};
use shiurfeed::web::{AppState, WebServer};
use shiurfeed::{Config, FeedGenerator, ReqwestClient, Result, SearchService};

#[derive(Parser)]
#[command(name = "shiurfeed")]
#[command(about = "Podcast feeds and search for online shiurim", long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate every configured feed into the output directory
    Generate,
    /// Generate feeds, then deploy the output directory
    Publish,
    /// Run the search HTTP server
    Serve,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load_with_env(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {}: {e}", cli.config);
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    if let Err(e) = shiurfeed::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        shiurfeed::logging::init_console_only(&config.logging.level);
    }

    let result = match cli.command {
        Command::Generate => generate(&config).await,
        Command::Publish => publish(&config).await,
        Command::Serve => serve(&config).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn generate(config: &Config) -> Result<()> {
    let http = Arc::new(ReqwestClient::new(&config.http)?);
    let generator = FeedGenerator::new(http, &config.output, &config.http);

    let reports = generator.generate_all(&config.feeds).await?;
    for report in &reports {
        info!(
            "{}: {} new, {} already published, {} rejected",
            report.feed_name, report.added, report.duplicates, report.rejected
        );
    }
    Ok(())
}

async fn publish(config: &Config) -> Result<()> {
    config.validate_for_deploy()?;

    generate(config).await?;

    let deployer = NetlifyDeployer::new(&config.deploy);
    let report = deployer
        .deploy(std::path::Path::new(&config.output.directory))
        .await?;
    info!("Feeds published at {}", report.site_url);
    Ok(())
}

async fn serve(config: &Config) -> Result<()> {
    let http = Arc::new(ReqwestClient::new(&config.http)?);
    let state = AppState::new(SearchService::new(http, config.search.clone())).shared();

    WebServer::new(&config.web, state)?.run().await
}
