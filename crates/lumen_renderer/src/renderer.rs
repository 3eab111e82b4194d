//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Recursive ray tracing bounded by a maximum bounce depth
//! - Anti-aliasing via jittered multi-sampling
//! - Gamma correction (gamma 2.0)

use std::time::{Duration, Instant};

use crate::sampling::gen_f32;
use crate::{Camera, Color, Hittable, PixelSink, Ray, RenderError, RenderResult, Rgb8};
use lumen_math::{unit_vector, Interval};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Lower bound of the hit interval for traced rays.
///
/// Keeps bounced rays from re-hitting the surface they start on.
pub const HIT_EPSILON: f32 = 1e-4;

/// Scale from a gamma-corrected channel in [0, 1] to a byte.
const BYTE_SCALE: f32 = 255.99;

/// What a primary ray sample evaluates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShadingMode {
    /// Full path tracing through the scene materials
    #[default]
    Material,
    /// Surface normals mapped to RGB, no bounces
    Normals,
}

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Maximum ray bounce depth
    pub max_depth: u32,
    /// Master seed for the random streams
    pub seed: u64,
    pub shading: ShadingMode,
    /// Optional wall-clock budget for the parallel driver, in seconds
    pub time_limit_secs: Option<f32>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            samples_per_pixel: 75,
            max_depth: 35,
            seed: 0,
            shading: ShadingMode::Material,
            time_limit_secs: None,
        }
    }
}

impl RenderConfig {
    /// Width over height.
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Time limit as a `Duration`, if one is set.
    ///
    /// Negative, non-finite or out-of-range values are `InvalidSettings`.
    pub fn time_limit(&self) -> RenderResult<Option<Duration>> {
        self.time_limit_secs
            .map(|secs| {
                Duration::try_from_secs_f32(secs).map_err(|_| {
                    RenderError::InvalidSettings(format!(
                        "time limit must be a non-negative number of seconds, got {secs}"
                    ))
                })
            })
            .transpose()
    }

    /// Reject settings that cannot produce an image.
    pub fn validate(&self) -> RenderResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::InvalidSettings(format!(
                "resolution must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.samples_per_pixel == 0 {
            return Err(RenderError::InvalidSettings(
                "samples_per_pixel must be at least 1".into(),
            ));
        }
        if self.max_depth == 0 {
            return Err(RenderError::InvalidSettings(
                "max_depth must be at least 1".into(),
            ));
        }
        self.time_limit()?;
        Ok(())
    }
}

/// Compute the color seen by a ray.
///
/// This is the core path tracing function. It traces the ray through
/// the scene, bouncing off surfaces and multiplying in their attenuation.
/// `depth` counts bounces taken so far and starts at 0 for camera rays.
pub fn ray_color(
    ray: &Ray,
    world: &dyn Hittable,
    depth: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let Some(rec) = world.hit(ray, Interval::new(HIT_EPSILON, f32::INFINITY)) else {
        return sky_gradient(ray);
    };

    // Out of bounces: the path carries no light
    if depth >= config.max_depth {
        return Color::ZERO;
    }

    match rec.material.scatter(ray, &rec, rng) {
        Some(result) => {
            result.attenuation * ray_color(&result.scattered, world, depth + 1, config, rng)
        }
        None => Color::ZERO,
    }
}

/// Color a ray by the normal of the first surface it hits.
pub fn normal_color(ray: &Ray, world: &dyn Hittable) -> Color {
    match world.hit(ray, Interval::new(0.0, f32::INFINITY)) {
        Some(rec) => 0.5 * (rec.normal + Color::ONE),
        None => sky_gradient(ray),
    }
}

/// Sky background: white at the horizon blending to blue at the zenith.
pub fn sky_gradient(ray: &Ray) -> Color {
    let unit_direction = unit_vector(ray.direction());
    let a = 0.5 * (unit_direction.y + 1.0);
    let white = Color::new(1.0, 1.0, 1.0);
    let blue = Color::new(0.5, 0.7, 1.0);
    white * (1.0 - a) + blue * a
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert an averaged linear color to gamma-corrected 8-bit RGB.
pub fn color_to_rgb8(color: Color) -> Rgb8 {
    let channel = |c: f32| (BYTE_SCALE * linear_to_gamma(Interval::UNIT.clamp(c))) as u8;
    [channel(color.x), channel(color.y), channel(color.z)]
}

/// Render a single pixel with multi-sampling and return the averaged
/// linear color.
///
/// `y` is the output row with 0 at the top of the image; the viewport
/// coordinate is flipped so row 0 samples the top of the view. Pixels outside
/// the configured resolution are `OutOfBounds`.
pub fn render_pixel(
    camera: &Camera,
    world: &dyn Hittable,
    x: u32,
    y: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> RenderResult<Color> {
    if x >= config.width || y >= config.height {
        return Err(RenderError::OutOfBounds {
            x,
            y,
            width: config.width,
            height: config.height,
        });
    }
    Ok(sample_pixel(camera, world, x, y, config, rng))
}

/// Pixel sampling loop; `(x, y)` must lie inside the image.
pub(crate) fn sample_pixel(
    camera: &Camera,
    world: &dyn Hittable,
    x: u32,
    y: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let width = config.width as f32;
    let height = config.height as f32;
    let flipped_y = (config.height - 1 - y) as f32;

    let mut pixel_color = Color::ZERO;
    for _ in 0..config.samples_per_pixel {
        let s = (x as f32 + gen_f32(rng)) / width;
        let t = (flipped_y + gen_f32(rng)) / height;
        let ray = camera.get_ray(s, t, rng);

        pixel_color += match config.shading {
            ShadingMode::Material => ray_color(&ray, world, 0, config, rng),
            ShadingMode::Normals => normal_color(&ray, world),
        };
    }

    // Average the samples
    pixel_color / config.samples_per_pixel as f32
}

/// Render the entire scene on the calling thread.
///
/// Rows are processed bottom-up and each finished pixel is handed to `sink`
/// immediately. All randomness comes from `rng`, so a seeded generator gives
/// a reproducible image.
pub fn render(
    camera: &Camera,
    world: &dyn Hittable,
    config: &RenderConfig,
    sink: &mut dyn PixelSink,
    rng: &mut dyn RngCore,
) -> RenderResult<()> {
    config.validate()?;

    log::info!(
        "Rendering {}x{} @ {} spp, depth {} (single-threaded)",
        config.width,
        config.height,
        config.samples_per_pixel,
        config.max_depth
    );
    let start = Instant::now();

    for y in (0..config.height).rev() {
        for x in 0..config.width {
            let color = sample_pixel(camera, world, x, y, config, rng);
            sink.put_pixel(x, y, color_to_rgb8(color))?;
        }
    }

    log::info!("Rendered in {:?}", start.elapsed());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HittableList, ImageBuffer, Lambertian, Metal, Sphere, Vec3};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn small_config() -> RenderConfig {
        RenderConfig {
            width: 8,
            height: 4,
            samples_per_pixel: 2,
            max_depth: 8,
            ..RenderConfig::default()
        }
    }

    fn single_sphere() -> HittableList {
        let mut world = HittableList::new();
        world.add(Box::new(Sphere::new(
            Vec3::new(0.0, 0.0, -1.0),
            0.5,
            Lambertian::new(Color::new(0.5, 0.5, 0.5)),
        )));
        world
    }

    #[test]
    fn test_sky_gradient_formula() {
        let direction = Vec3::new(0.3, 0.4, -1.2);
        let ray = Ray::new(Vec3::ZERO, direction);

        let t = 0.5 * (direction.normalize().y + 1.0);
        let expected = (1.0 - t) * Color::ONE + t * Color::new(0.5, 0.7, 1.0);
        assert!((sky_gradient(&ray) - expected).length() < 1e-6);

        // Nothing to hit, so the integrator returns the sky exactly
        let world = HittableList::new();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            ray_color(&ray, &world, 0, &small_config(), &mut rng),
            sky_gradient(&ray)
        );
    }

    #[test]
    fn test_sky_gradient_endpoints() {
        let up = sky_gradient(&Ray::new(Vec3::ZERO, Vec3::Y));
        let down = sky_gradient(&Ray::new(Vec3::ZERO, Vec3::NEG_Y));
        assert!((up - Color::new(0.5, 0.7, 1.0)).length() < 1e-6);
        assert!((down - Color::ONE).length() < 1e-6);
    }

    #[test]
    fn test_depth_exhausted_returns_black() {
        let world = single_sphere();
        let config = small_config();
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let mut rng = StdRng::seed_from_u64(1);

        let color = ray_color(&ray, &world, config.max_depth, &config, &mut rng);
        assert_eq!(color, Color::ZERO);
    }

    #[test]
    fn test_absorbed_ray_returns_black() {
        let mut world = HittableList::new();
        // A camera placed inside a mirror sphere: every reflection heads
        // back into the surface and is absorbed.
        world.add(Box::new(Sphere::new(
            Vec3::ZERO,
            10.0,
            Metal::new(Color::ONE, 0.0),
        )));
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(ray_color(&ray, &world, 0, &small_config(), &mut rng), Color::ZERO);
    }

    #[test]
    fn test_diffuse_hit_is_tinted_by_albedo() {
        let world = single_sphere();
        let config = small_config();
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let mut rng = StdRng::seed_from_u64(4);

        // One bounce off a 0.5 gray sphere into the sky can be at most half
        // of white.
        for _ in 0..50 {
            let color = ray_color(&ray, &world, 0, &config, &mut rng);
            assert!(color.max_element() <= 0.5 + 1e-6);
            assert!(color.min_element() >= 0.0);
        }
    }

    #[test]
    fn test_normal_color() {
        let world = single_sphere();
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        assert!((normal_color(&ray, &world) - Color::new(0.5, 0.5, 1.0)).length() < 1e-6);

        let miss = Ray::new(Vec3::ZERO, Vec3::Y);
        assert_eq!(normal_color(&miss, &world), sky_gradient(&miss));
    }

    #[test]
    fn test_linear_to_gamma() {
        assert_eq!(linear_to_gamma(0.0), 0.0);
        assert_eq!(linear_to_gamma(-1.0), 0.0);
        assert!((linear_to_gamma(1.0) - 1.0).abs() < 0.0001);
        assert!((linear_to_gamma(0.25) - 0.5).abs() < 0.0001);
    }

    #[test]
    fn test_color_to_rgb8() {
        assert_eq!(color_to_rgb8(Color::ZERO), [0, 0, 0]);
        assert_eq!(color_to_rgb8(Color::ONE), [255, 255, 255]);
        // sqrt(0.25) = 0.5 -> floor(127.995)
        assert_eq!(color_to_rgb8(Color::splat(0.25)), [127, 127, 127]);
        // Out-of-range and NaN channels are clamped rather than wrapped
        assert_eq!(color_to_rgb8(Color::new(4.0, -1.0, f32::NAN)), [255, 0, 0]);
    }

    #[test]
    fn test_render_pixel_hits_sphere() {
        let world = single_sphere();
        let config = small_config();
        // Narrow field of view so the whole center pixel lands on the sphere
        let camera = Camera::new(
            Vec3::ZERO,
            Vec3::NEG_Z,
            Vec3::Y,
            30.0,
            config.aspect_ratio(),
            0.0,
            1.0,
        );
        let mut rng = StdRng::seed_from_u64(42);

        // Center pixel sees the gray sphere: darker than the sky behind it
        let color = render_pixel(&camera, &world, 4, 2, &config, &mut rng).unwrap();
        assert!(color.length() > 0.0);
        assert!(color.max_element() <= 0.5 + 1e-6);
    }

    #[test]
    fn test_render_flips_rows() {
        let config = small_config();
        let camera = Camera::new(
            Vec3::ZERO,
            Vec3::NEG_Z,
            Vec3::Y,
            90.0,
            config.aspect_ratio(),
            0.0,
            1.0,
        );
        let world = HittableList::new();
        let mut image = ImageBuffer::new(config.width, config.height);
        let mut rng = StdRng::seed_from_u64(42);

        render(&camera, &world, &config, &mut image, &mut rng).unwrap();

        // Top row looks up into the bluer sky: less red than the bottom row
        let top = image.get(0, 0).unwrap();
        let bottom = image.get(0, config.height - 1).unwrap();
        assert!(top[0] < bottom[0], "top={top:?} bottom={bottom:?}");
    }

    #[test]
    fn test_render_pixel_outside_image_is_an_error() {
        let world = single_sphere();
        let config = small_config();
        let camera = Camera::new(
            Vec3::ZERO,
            Vec3::NEG_Z,
            Vec3::Y,
            90.0,
            config.aspect_ratio(),
            0.0,
            1.0,
        );
        let mut rng = StdRng::seed_from_u64(3);

        for (x, y) in [(config.width, 0), (0, config.height), (u32::MAX, u32::MAX)] {
            assert!(matches!(
                render_pixel(&camera, &world, x, y, &config, &mut rng),
                Err(RenderError::OutOfBounds { .. })
            ));
        }
    }

    #[test]
    fn test_hit_just_past_the_epsilon_is_found() {
        // A tiny sphere spanning t in (3e-4, 9e-4) right in front of the ray
        let mut world = HittableList::new();
        world.add(Box::new(Sphere::new(
            Vec3::new(0.0, 0.0, -6e-4),
            3e-4,
            Lambertian::new(Color::splat(0.5)),
        )));
        let config = small_config();
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let mut rng = StdRng::seed_from_u64(1);

        let rec = world
            .hit(&ray, Interval::new(HIT_EPSILON, f32::INFINITY))
            .unwrap();
        assert!((rec.t - 3e-4).abs() < 1e-5);
        // Out of depth on a hit is black, not sky
        assert_eq!(
            ray_color(&ray, &world, config.max_depth, &config, &mut rng),
            Color::ZERO
        );
    }

    #[test]
    fn test_time_limit_conversion() {
        let config = RenderConfig {
            time_limit_secs: Some(2.5),
            ..RenderConfig::default()
        };
        assert_eq!(config.time_limit().unwrap(), Some(Duration::from_millis(2500)));
        assert_eq!(RenderConfig::default().time_limit().unwrap(), None);

        // Finite but too large for a Duration
        let config = RenderConfig {
            time_limit_secs: Some(1e20),
            ..RenderConfig::default()
        };
        assert!(matches!(
            config.time_limit(),
            Err(RenderError::InvalidSettings(_))
        ));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_image() {
        let config = RenderConfig {
            width: 0,
            ..RenderConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(RenderError::InvalidSettings(_))
        ));

        let config = RenderConfig {
            samples_per_pixel: 0,
            ..RenderConfig::default()
        };
        assert!(config.validate().is_err());

        for secs in [-2.0, f32::NAN, f32::INFINITY] {
            let config = RenderConfig {
                time_limit_secs: Some(secs),
                ..RenderConfig::default()
            };
            assert!(config.validate().is_err(), "accepted {secs}");
        }
    }
}
