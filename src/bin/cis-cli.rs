use clap::{Parser, Subcommand};
use serde_json::Value;

use cis_gateway::cis::GetSubscriptionDtls;
use cis_gateway::http::{X_CIS_OUTCOME, X_REQUEST_ID};

#[derive(Parser)]
#[command(name = "cis-cli")]
#[command(about = "Command-line client for the CIS pull gateway", long_about = None)]
struct Cli {
    #[arg(short, long, env = "CIS_GATEWAY_URL", default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up a customer's subscription details
    Pull {
        #[arg(long)]
        customer_id: Option<String>,
        #[arg(long)]
        service_type: Option<String>,
        #[arg(long)]
        request_id: Option<String>,
    },
    /// Check gateway health
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Pull {
            customer_id,
            service_type,
            request_id,
        } => {
            let request = GetSubscriptionDtls {
                customer_id,
                service_type,
                request_id,
            };
            let res = client
                .post(format!("{}/api/cis/pull", base))
                .json(&request)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Health => {
            let res = client.get(format!("{}/health", base)).send().await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let header = |name: &str| {
        res.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let outcome = header(X_CIS_OUTCOME);
    let request_id = header(X_REQUEST_ID);

    if let Some(id) = request_id {
        eprintln!("Request ID: {}", id);
    }
    if let Some(outcome) = outcome {
        eprintln!("Outcome: {}", outcome);
    }

    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
