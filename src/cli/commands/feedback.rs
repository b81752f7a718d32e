use clap::Subcommand;
use serde_json::json;

use crate::cli::client::ApiClient;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum FeedbackCommands {
    #[command(about = "Submit feedback on an alert")]
    Submit {
        #[arg(help = "Alert id")]
        alert_id: String,
        #[arg(long, help = "Rating score")]
        rating: Option<i64>,
        #[arg(long, help = "Free-text comment")]
        comment: Option<String>,
        #[arg(long, help = "Whether the alert was correct")]
        correct: Option<bool>,
        #[arg(long, help = "Alert message to record alongside the feedback")]
        message: Option<String>,
    },
}

pub async fn handle(cmd: FeedbackCommands, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        FeedbackCommands::Submit { alert_id, rating, comment, correct, message } => {
            let body = json!({
                "alert_id": alert_id,
                "alert_message": message,
                "rating": rating,
                "comment": comment,
                "is_correct": correct,
            });

            let data = client.post("/api/feedback/", &body).await?;
            let id = data.get("id").and_then(|id| id.as_str()).unwrap_or_default();
            output_success(
                output_format,
                &format!("Feedback {} recorded for alert {}", id, alert_id),
                Some(data),
            )
        }
    }
}
