//! Hittable trait and HitRecord for ray-object intersection.

use crate::{Material, Ray};
use lumen_math::{Interval, Vec3};

/// Record of a ray-object intersection.
#[derive(Clone, Copy)]
pub struct HitRecord<'a> {
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// Point of intersection
    pub p: Vec3,
    /// Unit surface normal, pointing out of the surface
    pub normal: Vec3,
    /// Material of the surface that was hit
    pub material: &'a dyn Material,
}

impl std::fmt::Debug for HitRecord<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HitRecord")
            .field("t", &self.t)
            .field("p", &self.p)
            .field("normal", &self.normal)
            .finish_non_exhaustive()
    }
}

/// Trait for objects that can be hit by rays.
pub trait Hittable: Send + Sync {
    /// Test if a ray hits this object strictly inside `ray_t`.
    ///
    /// Returns the nearest intersection, or `None` on a miss.
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>>;
}

/// An ordered list of hittable objects.
pub struct HittableList {
    objects: Vec<Box<dyn Hittable>>,
}

impl HittableList {
    /// Create a new empty hittable list.
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
        }
    }

    /// Add an object to the list.
    pub fn add(&mut self, object: Box<dyn Hittable>) {
        self.objects.push(object);
    }

    /// Get the number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl Default for HittableList {
    fn default() -> Self {
        Self::new()
    }
}

impl Hittable for HittableList {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        debug_assert!(
            ray_t.is_open_range(),
            "hit called with t_min >= t_max: {ray_t:?}"
        );

        let mut closest = None;
        let mut closest_so_far = ray_t.max;

        // Every improved hit tightens the interval for the remaining objects.
        for object in &self.objects {
            if let Some(rec) = object.hit(ray, ray_t.with_max(closest_so_far)) {
                closest_so_far = rec.t;
                closest = Some(rec);
            }
        }

        closest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Lambertian, Sphere};

    fn sphere_at(z: f32, radius: f32) -> Box<dyn Hittable> {
        Box::new(Sphere::new(
            Vec3::new(0.0, 0.0, z),
            radius,
            Lambertian::new(Vec3::splat(0.5)),
        ))
    }

    #[test]
    fn test_nearest_hit_regardless_of_order() {
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let interval = Interval::new(0.001, f32::INFINITY);

        let mut near_first = HittableList::new();
        near_first.add(sphere_at(-2.0, 0.5));
        near_first.add(sphere_at(-2.6, 0.5));

        let mut far_first = HittableList::new();
        far_first.add(sphere_at(-2.6, 0.5));
        far_first.add(sphere_at(-2.0, 0.5));

        let a = near_first.hit(&ray, interval).unwrap();
        let b = far_first.hit(&ray, interval).unwrap();
        assert!((a.t - 1.5).abs() < 1e-5);
        assert!((b.t - 1.5).abs() < 1e-5);
    }

    #[test]
    fn test_empty_list_misses() {
        let world = HittableList::new();
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        assert!(world.is_empty());
        assert!(world.hit(&ray, Interval::new(0.001, f32::INFINITY)).is_none());
    }

    #[test]
    fn test_interval_excludes_far_objects() {
        let mut world = HittableList::new();
        world.add(sphere_at(-10.0, 1.0));
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        assert!(world.hit(&ray, Interval::new(0.001, 5.0)).is_none());
        assert!(world.hit(&ray, Interval::new(0.001, 50.0)).is_some());
    }

    #[test]
    fn test_len() {
        let mut world = HittableList::default();
        assert!(world.is_empty());
        world.add(sphere_at(-1.0, 0.5));
        world.add(sphere_at(-3.0, 0.5));
        assert_eq!(world.len(), 2);
        assert!(!world.is_empty());
    }
}
