//! Lumen command line driver.
//!
//! Loads a config, builds the scene and camera, renders on the rayon pool
//! and writes the image to disk.

mod cli;
mod config;

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;
use lumen_renderer::{render_parallel, CancelToken, ImageBuffer, RenderError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Instant;

use crate::cli::Args;
use crate::config::Config;

fn init_logger(level: LevelFilter) {
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(args.log_level.into());

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    config.apply_args(&args);
    config.render.validate()?;

    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to configure the render thread pool")?;
    }

    // Build the scene
    let start = Instant::now();
    let mut scene_rng = StdRng::seed_from_u64(config.render.seed);
    let world = config.scene.build(&mut scene_rng);
    log::info!(
        "Built '{}' scene with {} spheres in {:?}",
        config.scene,
        world.len(),
        start.elapsed()
    );

    let camera = config
        .camera
        .build(config.render.aspect_ratio())
        .context("Failed to set up the camera")?;

    let mut image = ImageBuffer::new(config.render.width, config.render.height);
    match render_parallel(&camera, &world, &config.render, &mut image, &CancelToken::new()) {
        Ok(stats) => log::info!("Rendered {} rows in {:?}", stats.rows, stats.elapsed),
        // Keep whatever finished before the deadline
        Err(err @ RenderError::TimedOut { .. }) => log::warn!("{err}; saving partial image"),
        Err(err) => return Err(err).context("Render failed"),
    }

    image
        .save(&args.output)
        .with_context(|| format!("Failed to save {}", args.output.display()))?;

    Ok(())
}
