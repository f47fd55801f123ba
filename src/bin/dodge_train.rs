use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use dodge_evo::{trainer::DEFAULT_MAX_TICKS, SimConfig, Trainer};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

#[derive(Parser, Debug)]
#[command(name = "dodge-train")]
#[command(about = "Evolve dodging agents against a simulated shooter without a window")]
struct Cli {
    /// Seed for the simulation RNG; random when omitted
    #[arg(long)]
    seed: Option<u64>,
    /// Generations to run
    #[arg(long, default_value_t = 50)]
    generations: u32,
    /// Ticks after which a round is aborted
    #[arg(long, default_value_t = DEFAULT_MAX_TICKS)]
    max_ticks: u32,
    /// JSON config file; missing fields keep their defaults
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Write per-generation stats as JSON
    #[arg(long, value_name = "FILE")]
    stats_json: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => SimConfig::from_json_file(path)
            .with_context(|| format!("failed to load config: {}", path.display()))?,
        None => SimConfig::default(),
    };
    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut trainer =
        Trainer::new(config, rng, cli.max_ticks).context("invalid simulation config")?;
    let stats = trainer.run(cli.generations);

    for s in &stats {
        println!("{s}");
    }
    if let Some(best) = stats.iter().max_by(|a, b| a.best_fitness.total_cmp(&b.best_fitness)) {
        println!(
            "Best: gen {} fitness {:.2} genome {}",
            best.generation, best.best_fitness, best.best_genome
        );
    }

    if let Some(path) = cli.stats_json {
        let json =
            serde_json::to_vec_pretty(&stats).context("failed to serialize generation stats")?;
        fs::write(&path, json)
            .with_context(|| format!("failed writing stats output: {}", path.display()))?;
        println!("Stats JSON: {}", path.display());
    }

    Ok(())
}
