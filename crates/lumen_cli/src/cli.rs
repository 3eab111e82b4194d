use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;
use lumen_renderer::SceneKind;

/// Log levels accepted on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Render a scene of spheres with a Monte Carlo path tracer.
///
/// Values given on the command line override the config file.
#[derive(Debug, Parser)]
#[command(name = "lumen", version)]
pub struct Args {
    /// JSON config file with `render`, `camera` and `scene` sections
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output image; `.ppm` is written as text PPM, otherwise PNG
    #[arg(short, long, default_value = "output.png")]
    pub output: PathBuf,

    /// Logging level (RUST_LOG takes precedence)
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Image width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Image height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Samples per pixel
    #[arg(short, long)]
    pub samples: Option<u32>,

    /// Maximum bounce depth
    #[arg(short, long)]
    pub depth: Option<u32>,

    /// Master random seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Scene to render: random, diffuse, mixed_materials, camera_test
    #[arg(long)]
    pub scene: Option<SceneKind>,

    /// Shade by surface normal instead of tracing materials
    #[arg(long)]
    pub normals: bool,

    /// Worker threads (defaults to one per core)
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,

    /// Stop rendering after this many seconds and keep the finished rows
    #[arg(long)]
    pub time_limit: Option<f32>,
}
