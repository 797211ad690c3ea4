mod commands;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use shopintel::models::UserId;
use shopintel::DashboardView;

#[derive(Parser)]
#[clap(author, version, about = "ShopIntel sales analytics and forecasting client")]
struct Cli {
    #[clap(short, long, global = true)]
    log_level: Option<String>,
    #[clap(flatten)]
    connection: ConnectionArgs,
    #[clap(subcommand)]
    command: Commands,
}

/// Overrides for the `SHOPINTEL_*` environment settings.
#[derive(Args, Debug, Default)]
pub struct ConnectionArgs {
    #[clap(long, global = true)]
    pub api_url: Option<String>,
    #[clap(long, global = true)]
    pub token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the terms of service
    Terms,
    /// Upload a sales dataset and show its KPIs, forecast and insights
    Analyze(AnalyzeArgs),
    /// Account administration
    Admin {
        #[clap(subcommand)]
        command: AdminCommand,
    },
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// CSV or Excel file to upload
    pub file: PathBuf,
    /// Dashboard tab to display (overview, analytics, forecast, insights)
    #[clap(long, default_value = "overview")]
    pub view: DashboardView,
    /// Export a report after analysis
    #[clap(long)]
    pub export: bool,
    /// Report format (markdown, html, json)
    #[clap(long)]
    pub format: Option<String>,
    /// Directory the report is written to
    #[clap(long)]
    pub report_dir: Option<PathBuf>,
    /// Register a public share link after analysis
    #[clap(long)]
    pub share: bool,
    /// Accept the terms of service
    #[clap(long)]
    pub accept_terms: bool,
}

#[derive(Subcommand, Debug)]
pub enum AdminCommand {
    /// List all users
    Users,
    /// Show platform statistics
    Stats,
    /// Show system health
    Health,
    /// Reactivate a user account
    Activate { user_id: UserId },
    /// Deactivate a user account
    Deactivate {
        user_id: UserId,
        /// Skip the confirmation prompt
        #[clap(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(&cli.log_level);

    match cli.command {
        Commands::Terms => output::print_terms(),
        Commands::Analyze(args) => commands::analyze(&cli.connection, args).await?,
        Commands::Admin { command } => commands::admin(&cli.connection, command).await?,
    }

    Ok(())
}

fn setup_logging(log_level: &Option<String>) {
    let log_level = match log_level
        .as_ref()
        .unwrap_or(&"info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!(
            "handlebars=off,hyper=warn,reqwest=warn,{}",
            log_level
        )))
        .without_time()
        .init();
}
