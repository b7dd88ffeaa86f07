use anyhow::Context;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use cloud_dancer::api::{self, AppState};
use cloud_dancer::backend::HttpSearchBackend;
use cloud_dancer::config::CONFIG;
use cloud_dancer::lexicon::Lexicon;
use cloud_dancer::orchestrator::{Orchestrator, RoundStart};

#[derive(Parser)]
#[command(name = "cloud-dancer", about = "Mood-driven close/contrast artist search")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the search gateway HTTP server
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Resolve a mood sentence and run both searches against a running gateway
    Explore {
        text: String,
        #[arg(long)]
        api_base_url: Option<String>,
        /// Give up waiting for results after this many seconds
        #[arg(long, default_value_t = 30)]
        timeout_secs: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber (handles both tracing and log crate)
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(true)
        .init();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Serve {
        host: None,
        port: None,
    }) {
        Command::Serve { host, port } => {
            let host = host.unwrap_or_else(|| CONFIG.host.clone());
            let port = port.unwrap_or(CONFIG.port);
            let addr: SocketAddr = format!("{host}:{port}")
                .parse()
                .with_context(|| format!("invalid listen address {host}:{port}"))?;
            let lexicon = Lexicon::builtin();
            tracing::info!(
                entries = lexicon.len(),
                unpaired_antonyms = lexicon.dangling_antonyms().len(),
                "lexicon loaded"
            );
            api::serve(addr, Arc::new(AppState::from_config())).await
        }
        Command::Explore {
            text,
            api_base_url,
            timeout_secs,
        } => {
            let base_url = api_base_url.unwrap_or_else(|| CONFIG.api_base_url.clone());
            explore(&text, &base_url, Duration::from_secs(timeout_secs)).await
        }
    }
}

async fn explore(text: &str, base_url: &str, timeout: Duration) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::new(Arc::new(HttpSearchBackend::new(base_url)));
    let mut snapshots = orchestrator.subscribe();

    orchestrator.set_text(text);
    if !orchestrator.enter() {
        anyhow::bail!("nothing to search for");
    }
    if let RoundStart::Started { round, calls } = orchestrator.arrive() {
        tracing::info!(round, calls, "waiting for search results");
        tokio::time::timeout(
            timeout,
            snapshots.wait_for(|s| !s.loading_close && !s.loading_contrast),
        )
        .await
        .context("timed out waiting for search results")?
        .context("orchestrator dropped")?;
    }

    let snapshot = orchestrator.snapshot();
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
