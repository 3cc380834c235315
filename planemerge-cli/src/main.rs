//! planemerge - merge over-segmented planar patches of a point cloud frame
//!
//! Usage:
//!   planemerge --input frame.json
//!   planemerge --input frame.json --config concat.toml --output merged.json
//!
//! Enable debug logging to see which patches connect:
//!   RUST_LOG=debug planemerge --input frame.json

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use planemerge_algorithms::{ConcatenatorConfig, PlaneConcatenator, VitalStatus};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "planemerge")]
#[command(author, version, about = "Merge over-segmented planar patches", long_about = None)]
struct Args {
    /// Input frame (.json) with the cloud, patch indices, coefficients and polygons
    #[arg(short, long)]
    input: PathBuf,

    /// Concatenator configuration (.toml); defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output file (.json); the result goes to stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Override the maximum angle between connected patches (radians)
    #[arg(long)]
    angular_threshold: Option<f32>,

    /// Override the maximum gap between connected patches
    #[arg(long)]
    distance_threshold: Option<f32>,

    /// Override the minimum number of points of an emitted plane
    #[arg(long)]
    min_size: Option<usize>,

    /// Seed for refinement sampling
    #[arg(long)]
    seed: Option<u64>,
}

impl Args {
    fn load_config(&self) -> Result<ConcatenatorConfig> {
        let mut config = match &self.config {
            Some(path) => planemerge_io::load_config(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?,
            None => ConcatenatorConfig::default(),
        };

        if let Some(angular_threshold) = self.angular_threshold {
            config.connect_angular_threshold = angular_threshold;
        }
        if let Some(distance_threshold) = self.distance_threshold {
            config.connect_distance_threshold = distance_threshold;
        }
        if let Some(min_size) = self.min_size {
            config.min_size = min_size;
        }
        if self.seed.is_some() {
            config.random_seed = self.seed;
        }

        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = args.load_config()?;
    let concatenator = PlaneConcatenator::new(config).context("Invalid concatenator configuration")?;

    let frame = planemerge_io::read_frame(&args.input)
        .with_context(|| format!("Failed to read frame {}", args.input.display()))?;
    info!(
        "Loaded {} patches over {} points from {}",
        frame.patch_count(),
        frame.cloud.len(),
        args.input.display()
    );

    let start = Instant::now();
    let output = concatenator
        .concatenate(&frame)
        .context("Failed to concatenate planes")?;
    info!("Merged into {} planes in {:.2?}", output.len(), start.elapsed());

    if let VitalStatus::Stalled { since_last } = concatenator.diagnostic() {
        warn!("Concatenator reports a stall: {:?}", since_last);
    }

    match &args.output {
        Some(path) => {
            planemerge_io::write_output(&output, path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {}", path.display());
        }
        None => {
            let text = planemerge_io::output_to_string(&output).context("Failed to encode output")?;
            println!("{}", text);
        }
    }

    Ok(())
}
