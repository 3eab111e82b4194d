//! Vector helpers for shading: normalization, reflection and refraction.
//!
//! Arithmetic, `dot`, `cross` and `length` come straight from [`glam::Vec3`].

use crate::Vec3;

/// Normalize `v`.
///
/// Normalizing a zero vector is a caller bug; it would otherwise push NaNs
/// through the whole render.
#[inline]
pub fn unit_vector(v: Vec3) -> Vec3 {
    debug_assert!(
        v.length_squared() > 0.0,
        "unit_vector called on a zero-length vector"
    );
    v / v.length()
}

/// Reflect a vector about a normal.
///
/// `n` is expected to be unit length.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract a vector through a surface with relative index `ni_over_nt`.
///
/// Returns `None` past the critical angle (total internal reflection).
pub fn refract(v: Vec3, n: Vec3, ni_over_nt: f32) -> Option<Vec3> {
    let uv = unit_vector(v);
    let dt = uv.dot(n);
    let discriminant = 1.0 - ni_over_nt * ni_over_nt * (1.0 - dt * dt);
    if discriminant > 0.0 {
        Some(ni_over_nt * (uv - n * dt) - n * discriminant.sqrt())
    } else {
        None
    }
}
