//! Lumen Renderer - CPU Path Tracing
//!
//! A Monte Carlo path tracer for scenes made of spheres. Every pixel is
//! supersampled with jittered camera rays that bounce off Lambertian, metal
//! and dielectric surfaces until they escape to the sky or run out of depth.

mod bucket;
mod camera;
mod error;
mod hittable;
mod material;
mod renderer;
pub mod sampling;
mod scene;
mod sink;
mod sphere;

pub use bucket::{render_parallel, CancelToken, RenderStats};
pub use camera::{Camera, CameraConfig};
pub use error::{RenderError, RenderResult};
pub use hittable::{HitRecord, Hittable, HittableList};
pub use material::{Color, Dielectric, Lambertian, Material, Metal, ScatterResult};
pub use renderer::{
    color_to_rgb8, linear_to_gamma, normal_color, ray_color, render, render_pixel,
    sky_gradient, RenderConfig, ShadingMode, HIT_EPSILON,
};
pub use scene::{camera_test_scene, diffuse_scene, mixed_materials_scene, random_scene, SceneKind};
pub use sink::{ImageBuffer, PixelSink, Rgb8};
pub use sphere::Sphere;

/// Re-export Vec3 and common math types from lumen_math
pub use lumen_math::{Interval, Ray, Vec3};
