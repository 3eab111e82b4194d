//! Thin-lens camera for ray generation.

use crate::sampling::random_in_unit_disk;
use crate::{Ray, RenderError, RenderResult};
use lumen_math::{unit_vector, Vec3};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Camera placement and lens settings, as read from a config file.
///
/// The aspect ratio is not stored here; it comes from the image resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub look_from: Vec3,
    pub look_at: Vec3,
    pub vup: Vec3,
    /// Vertical field of view in degrees
    pub vfov: f32,
    /// Lens diameter, 0.0 = pinhole
    pub aperture: f32,
    /// Distance to the plane of perfect focus; `None` focuses on `look_at`
    pub focus_dist: Option<f32>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            look_from: Vec3::new(13.0, 2.0, 3.0),
            look_at: Vec3::ZERO,
            vup: Vec3::Y,
            vfov: 45.0,
            aperture: 0.05,
            focus_dist: None,
        }
    }
}

impl CameraConfig {
    /// Build a camera for the given aspect ratio, rejecting degenerate setups.
    pub fn build(&self, aspect_ratio: f32) -> RenderResult<Camera> {
        let view = self.look_from - self.look_at;
        if view.length_squared() == 0.0 {
            return Err(RenderError::InvalidCamera(
                "look_from and look_at are the same point".into(),
            ));
        }
        if self.vup.cross(view).length_squared() == 0.0 {
            return Err(RenderError::InvalidCamera(
                "vup is parallel to the view direction".into(),
            ));
        }
        if !(self.vfov > 0.0 && self.vfov < 180.0) {
            return Err(RenderError::InvalidCamera(format!(
                "vertical field of view must be in (0, 180) degrees, got {}",
                self.vfov
            )));
        }
        if !(self.aperture >= 0.0 && self.aperture.is_finite()) {
            return Err(RenderError::InvalidCamera(format!(
                "aperture must be non-negative, got {}",
                self.aperture
            )));
        }
        if !(aspect_ratio > 0.0 && aspect_ratio.is_finite()) {
            return Err(RenderError::InvalidCamera(format!(
                "aspect ratio must be positive, got {aspect_ratio}"
            )));
        }

        let focus_dist = self.focus_dist.unwrap_or_else(|| view.length());
        if !(focus_dist > 0.0 && focus_dist.is_finite()) {
            return Err(RenderError::InvalidCamera(format!(
                "focus distance must be positive, got {focus_dist}"
            )));
        }

        Ok(Camera::new(
            self.look_from,
            self.look_at,
            self.vup,
            self.vfov,
            aspect_ratio,
            self.aperture,
            focus_dist,
        ))
    }
}

/// Camera for generating rays into the scene.
///
/// Immutable once built, so one camera can be shared by every render thread.
#[derive(Debug, Clone)]
pub struct Camera {
    origin: Vec3,
    lower_left_corner: Vec3,
    horizontal: Vec3,
    vertical: Vec3,
    u: Vec3,
    v: Vec3,
    lens_radius: f32,
}

impl Camera {
    /// Create a camera.
    ///
    /// - `vfov`: vertical field of view in degrees
    /// - `aperture`: lens diameter (0.0 = pinhole)
    /// - `focus_dist`: distance from `look_from` to the plane in focus
    pub fn new(
        look_from: Vec3,
        look_at: Vec3,
        vup: Vec3,
        vfov: f32,
        aspect_ratio: f32,
        aperture: f32,
        focus_dist: f32,
    ) -> Self {
        let theta = vfov.to_radians();
        let half_height = (theta / 2.0).tan();
        let half_width = aspect_ratio * half_height;

        // Calculate camera basis vectors
        let w = unit_vector(look_from - look_at);
        let u = unit_vector(vup.cross(w));
        let v = w.cross(u);

        let origin = look_from;
        let lower_left_corner = origin
            - half_width * focus_dist * u
            - half_height * focus_dist * v
            - focus_dist * w;

        Self {
            origin,
            lower_left_corner,
            horizontal: 2.0 * half_width * focus_dist * u,
            vertical: 2.0 * half_height * focus_dist * v,
            u,
            v,
            lens_radius: aperture / 2.0,
        }
    }

    /// Generate a ray through normalized image coordinates `(s, t)`.
    ///
    /// `(0, 0)` is the lower-left corner of the viewport and `(1, 1)` the
    /// upper-right. The origin is jittered over the lens disk.
    pub fn get_ray(&self, s: f32, t: f32, rng: &mut dyn RngCore) -> Ray {
        let rd = self.lens_radius * random_in_unit_disk(rng);
        let offset = self.u * rd.x + self.v * rd.y;

        Ray::new(
            self.origin + offset,
            self.lower_left_corner + s * self.horizontal + t * self.vertical
                - self.origin
                - offset,
        )
    }
}
