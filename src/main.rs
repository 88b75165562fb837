use anyhow::Result;
use clap::{Parser, Subcommand};
use quorumkv::{create_router, KvNode, NodeConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "quorumkv")]
#[command(about = "Leader/follower key-value node with quorum writes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Run {
        #[arg(short, long, default_value = "quorumkv.toml")]
        config: PathBuf,
    },
    Init {
        #[arg(short, long, default_value = "quorumkv.toml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quorumkv=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config: config_path } => {
            run_node(config_path).await?;
        }
        Commands::Init { config: config_path } => {
            init_config(config_path)?;
        }
    }

    Ok(())
}

async fn run_node(config_path: PathBuf) -> Result<()> {
    let mut config = if config_path.exists() {
        info!("Loading config from {:?}", config_path);
        NodeConfig::load(&config_path)?
    } else {
        info!("Config file not found, using defaults");
        NodeConfig::default()
    };
    config.apply_env()?;

    let node = Arc::new(KvNode::from_config(&config)?);
    let router = create_router(node.clone());

    let listener = TcpListener::bind(&config.listen_addr()).await?;
    info!("{} listening on {}", config.role, config.listen_addr());

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down...");
        })
        .await?;

    let aborted = node.drain().await;
    if aborted > 0 {
        warn!("{} replication attempt(s) did not finish before shutdown", aborted);
    }

    Ok(())
}

fn init_config(config_path: PathBuf) -> Result<()> {
    if config_path.exists() {
        anyhow::bail!("Config file already exists: {:?}", config_path);
    }

    let config = NodeConfig::default();
    config.save(&config_path)?;
    println!("Created config file: {:?}", config_path);
    println!("\nEdit the config file (or set ROLE, FOLLOWERS, WRITE_QUORUM, ...) to:");
    println!("  - Choose the node role (leader or follower)");
    println!("  - List follower addresses on the leader");
    println!("  - Set the write quorum and simulated delay bounds");

    Ok(())
}
