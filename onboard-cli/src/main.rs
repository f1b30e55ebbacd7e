mod chat;
mod files;
mod wizard;

use anyhow::Result;
use clap::{Parser, Subcommand};
use onboard_flow::{FlowConfig, HttpBackend};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "onboard", about = "Drive the onboarding wizard and chat from a terminal")]
struct Cli {
    /// YAML config file; environment variables still override it
    #[arg(long, global = true, env = "ONBOARD_CONFIG")]
    config: Option<PathBuf>,

    /// Backend base URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true, env = "ONBOARD_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the wizard routes in order
    Routes,
    /// Upload a resume, then optionally a job description
    Wizard {
        #[arg(long)]
        resume: PathBuf,
        #[arg(long)]
        job_description: Option<PathBuf>,
    },
    /// Talk to the assistant; `/quit` leaves
    Chat,
}

fn load_config(cli: &Cli) -> Result<FlowConfig> {
    let mut config = match &cli.config {
        Some(path) => FlowConfig::from_yaml_file(path)?.with_env_overrides()?,
        None => FlowConfig::from_env()?,
    };
    if let Some(url) = &cli.api_url {
        config.api_base_url = url.clone();
    }
    Ok(config.validate()?)
}

fn connect(cli: &Cli) -> Result<(FlowConfig, Arc<HttpBackend>)> {
    let config = load_config(cli)?;
    info!("Using backend at {}", config.api_base_url);
    let backend = Arc::new(HttpBackend::new(&config)?);
    Ok((config, backend))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "onboard_cli=info,onboard_flow=info".into()),
        )
        .with(
            cli.log_json
                .then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)),
        )
        .with(
            (!cli.log_json)
                .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
        )
        .init();

    match &cli.command {
        Commands::Routes => wizard::print_routes(),
        Commands::Wizard {
            resume,
            job_description,
        } => {
            let (config, backend) = connect(&cli)?;
            wizard::run_wizard(&config, backend, resume, job_description.as_deref()).await?;
        }
        Commands::Chat => {
            let (_, backend) = connect(&cli)?;
            chat::run_chat(backend).await?;
        }
    }

    Ok(())
}
