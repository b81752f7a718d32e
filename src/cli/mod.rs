pub mod client;
pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SERVER: &str = "http://localhost:3000";

#[derive(Parser)]
#[command(name = "alertctl")]
#[command(about = "alertctl - Command-line interface for the Alert Feedback API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output raw JSON instead of text")]
    pub json: bool,

    #[arg(
        long,
        global = true,
        env = "ALERT_API_URL",
        default_value = DEFAULT_SERVER,
        help = "Base URL of a running API server"
    )]
    pub server: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Load alerts and transactions from a JSON file into the configured store")]
    Seed {
        #[arg(help = "Path to a file shaped like {\"transactions\": [...], \"alerts\": [...]}")]
        file: std::path::PathBuf,
    },

    #[command(about = "Browse alerts with their transactions")]
    Alerts {
        #[command(subcommand)]
        cmd: commands::alerts::AlertCommands,
    },

    #[command(about = "Submit analyst feedback")]
    Feedback {
        #[command(subcommand)]
        cmd: commands::feedback::FeedbackCommands,
    },

    #[command(about = "Account registration and token acquisition")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let client = client::ApiClient::new(&cli.server)?;

    match cli.command {
        Commands::Seed { file } => commands::seed::handle(file, output_format).await,
        Commands::Alerts { cmd } => commands::alerts::handle(cmd, &client, output_format).await,
        Commands::Feedback { cmd } => commands::feedback::handle(cmd, &client, output_format).await,
        Commands::Auth { cmd } => commands::auth::handle(cmd, &client, output_format).await,
    }
}
