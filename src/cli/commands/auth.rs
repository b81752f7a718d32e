use clap::Subcommand;
use serde_json::json;

use crate::cli::client::ApiClient;
use crate::cli::utils::output_value;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Register new account and print its tokens")]
    Register {
        #[arg(help = "Username")]
        username: String,
        #[arg(help = "Email")]
        email: String,
        #[arg(long, env = "ALERT_API_PASSWORD", help = "Password")]
        password: String,
    },

    #[command(about = "Login and print an access/refresh token pair")]
    Login {
        #[arg(help = "Email")]
        email: String,
        #[arg(long, env = "ALERT_API_PASSWORD", help = "Password")]
        password: String,
    },

    #[command(about = "Exchange a refresh token for a new access token")]
    Refresh {
        #[arg(help = "Refresh token")]
        refresh: String,
    },
}

pub async fn handle(cmd: AuthCommands, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    let data = match cmd {
        AuthCommands::Register { username, email, password } => {
            let body = json!({ "username": username, "email": email, "password": password });
            client.post("/api/register/", &body).await?
        }
        AuthCommands::Login { email, password } => {
            let body = json!({ "email": email, "password": password });
            client.post("/api/token/", &body).await?
        }
        AuthCommands::Refresh { refresh } => {
            client.post("/api/token/refresh/", &json!({ "refresh": refresh })).await?
        }
    };

    output_value(output_format, &data, |tokens| {
        for key in ["access", "refresh"] {
            if let Some(token) = tokens.get(key).and_then(|t| t.as_str()) {
                println!("{}: {}", key, token);
            }
        }
    })
}
