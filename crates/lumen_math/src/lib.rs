// Re-export glam for convenience
pub use glam::*;

// Lumen math types
mod interval;
mod ray;
pub mod vector;

pub use interval::Interval;
pub use ray::Ray;
pub use vector::{reflect, refract, unit_vector};
