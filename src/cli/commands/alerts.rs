use clap::Subcommand;
use serde_json::Value;

use crate::cli::client::ApiClient;
use crate::cli::utils::{format_alert, output_value};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum AlertCommands {
    #[command(about = "List a page of alerts")]
    List {
        #[arg(long, help = "Page size (server default when omitted)")]
        limit: Option<i64>,
        #[arg(long, help = "Number of alerts to skip")]
        skip: Option<i64>,
    },

    #[command(about = "Show one alert with its transactions")]
    Show {
        #[arg(help = "Alert id")]
        id: String,
    },
}

pub async fn handle(cmd: AlertCommands, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AlertCommands::List { limit, skip } => {
            let mut query = Vec::new();
            if let Some(limit) = limit {
                query.push(("limit", limit.to_string()));
            }
            if let Some(skip) = skip {
                query.push(("skip", skip.to_string()));
            }

            let alerts = client.get("/api/alerts/", &query).await?;
            output_value(output_format, &alerts, |alerts| {
                let alerts = alerts.as_array().map(Vec::as_slice).unwrap_or_default();
                if alerts.is_empty() {
                    println!("No alerts found");
                }
                for alert in alerts {
                    println!("{}", format_alert(alert));
                }
            })
        }
        AlertCommands::Show { id } => {
            let alert: Value = client.get(&format!("/api/alerts/{}/", id), &[]).await?;
            output_value(output_format, &alert, |alert| println!("{}", format_alert(alert)))
        }
    }
}
