//! Error types for the renderer.
//!
//! Misses, total internal reflection, absorbed rays and exhausted bounce
//! depth are ordinary outcomes and never show up here.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while setting up or running a render.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Invalid render settings: {0}")]
    InvalidSettings(String),

    #[error("Invalid camera: {0}")]
    InvalidCamera(String),

    #[error("Pixel ({x}, {y}) is outside the {width}x{height} image")]
    OutOfBounds { x: u32, y: u32, width: u32, height: u32 },

    #[error("Render cancelled after {rows_completed} of {rows_total} rows")]
    Cancelled { rows_completed: u32, rows_total: u32 },

    #[error("Render exceeded its {limit:?} time limit after {rows_completed} of {rows_total} rows")]
    TimedOut {
        limit: Duration,
        rows_completed: u32,
        rows_total: u32,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
}

pub type RenderResult<T> = Result<T, RenderError>;
