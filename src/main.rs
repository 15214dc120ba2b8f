use anyhow::Result;
use clap::Parser;
use std::path::Path;
use tracing_subscriber::EnvFilter;

use tropism_core::EngineContext;
use tropism_lib::config::RunConfig;
use tropism_lib::runner;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Custom config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Override the number of generations to run
    #[arg(short, long)]
    generations: Option<u64>,

    /// Override the RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Write a JSON run summary to this path
    #[arg(long)]
    summary: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut config = RunConfig::load(Path::new(&args.config))?;
    if let Some(generations) = args.generations {
        config.run.generations = generations;
    }
    if let Some(seed) = args.seed {
        config.run.seed = seed;
    }

    let ctx = EngineContext::new();

    // Ctrl+C feeds the engine's cooperative shutdown flag.
    let shutdown_ctx = ctx.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Ctrl+C received, initiating graceful shutdown...");
        shutdown_ctx.request_shutdown();
    });

    let run_ctx = ctx.clone();
    let summaries = tokio::task::spawn_blocking(move || runner::run(run_ctx, config)).await??;

    if let Some(path) = args.summary {
        runner::write_summary(Path::new(&path), &summaries)?;
    }
    tracing::info!(generations = summaries.len(), "Run finished");
    Ok(())
}
