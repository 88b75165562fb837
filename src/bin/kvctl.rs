use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "kvctl")]
#[command(about = "CLI for quorumkv nodes")]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:8000")]
    addr: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Health,
    Data,
    Get {
        key: String,
    },
    /// VALUE is parsed as JSON, falling back to a plain string.
    Write {
        key: String,
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base_url = cli.addr.trim_end_matches('/').to_string();

    let resp = match cli.command {
        Commands::Health => client.get(format!("{}/", base_url)).send().await?,
        Commands::Data => client.get(format!("{}/data", base_url)).send().await?,
        Commands::Get { key } => {
            client
                .get(format!("{}/get/{}", base_url, key))
                .send()
                .await?
        }
        Commands::Write { key, value } => {
            let value = serde_json::from_str(&value).unwrap_or(Value::String(value));
            let body = serde_json::json!({ "key": key, "value": value });
            client
                .post(format!("{}/write", base_url))
                .json(&body)
                .send()
                .await?
        }
    };

    let status = resp.status();
    let body: Value = resp.json().await?;
    println!("{}", serde_json::to_string_pretty(&body)?);

    if !status.is_success() {
        anyhow::bail!("request failed with status {}", status);
    }

    Ok(())
}
