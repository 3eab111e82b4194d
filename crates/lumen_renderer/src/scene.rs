//! Scene builders.
//!
//! `random_scene` is the procedurally generated field of small spheres
//! around three large ones; the rest are small hand-built test scenes.

use std::f32::consts::FRAC_PI_4;
use std::fmt;
use std::str::FromStr;

use crate::sampling::gen_f32;
use crate::{Color, Dielectric, HittableList, Lambertian, Metal, Sphere, Vec3};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Radius of the small randomized spheres.
const SMALL_RADIUS: f32 = 0.2;

/// Which scene to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneKind {
    /// Ground plane, a grid of small random spheres and three hero spheres
    #[default]
    Random,
    /// Single sphere resting on a large ground sphere
    Diffuse,
    /// Diffuse, metal and glass spheres side by side
    MixedMaterials,
    /// Two touching spheres, for checking camera framing
    CameraTest,
}

impl SceneKind {
    pub const ALL: [SceneKind; 4] = [
        SceneKind::Random,
        SceneKind::Diffuse,
        SceneKind::MixedMaterials,
        SceneKind::CameraTest,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SceneKind::Random => "random",
            SceneKind::Diffuse => "diffuse",
            SceneKind::MixedMaterials => "mixed_materials",
            SceneKind::CameraTest => "camera_test",
        }
    }

    /// Build the scene. Only `Random` draws from `rng`.
    pub fn build(self, rng: &mut dyn RngCore) -> HittableList {
        match self {
            SceneKind::Random => random_scene(rng),
            SceneKind::Diffuse => diffuse_scene(),
            SceneKind::MixedMaterials => mixed_materials_scene(),
            SceneKind::CameraTest => camera_test_scene(),
        }
    }
}

impl fmt::Display for SceneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SceneKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        SceneKind::ALL
            .into_iter()
            .find(|kind| kind.name() == normalized)
            .ok_or_else(|| {
                let names: Vec<_> = SceneKind::ALL.iter().map(|k| k.name()).collect();
                format!("unknown scene '{s}', expected one of: {}", names.join(", "))
            })
    }
}

/// Build the random sphere field.
pub fn random_scene(rng: &mut dyn RngCore) -> HittableList {
    let mut world = HittableList::new();

    // Ground
    world.add(Box::new(Sphere::new(
        Vec3::new(0.0, -1000.0, 0.0),
        1000.0,
        Lambertian::new(Color::new(0.5, 0.5, 0.5)),
    )));

    // Small random spheres, kept clear of the metal hero sphere
    let keep_clear = Vec3::new(4.0, SMALL_RADIUS, 0.0);
    for a in -11..11 {
        for b in -11..11 {
            let choose_mat = gen_f32(rng);
            let center = Vec3::new(
                a as f32 + 0.9 * gen_f32(rng),
                SMALL_RADIUS,
                b as f32 + 0.9 * gen_f32(rng),
            );

            if (center - keep_clear).length() <= 0.9 {
                continue;
            }

            if choose_mat < 0.8 {
                // Diffuse
                let albedo = Color::new(
                    gen_f32(rng) * gen_f32(rng),
                    gen_f32(rng) * gen_f32(rng),
                    gen_f32(rng) * gen_f32(rng),
                );
                world.add(Box::new(Sphere::new(
                    center,
                    SMALL_RADIUS,
                    Lambertian::new(albedo),
                )));
            } else if choose_mat < 0.95 {
                // Metal
                let albedo = Color::new(
                    0.5 * (1.0 + gen_f32(rng)),
                    0.5 * (1.0 + gen_f32(rng)),
                    0.5 * (1.0 + gen_f32(rng)),
                );
                let fuzz = 0.5 * gen_f32(rng);
                world.add(Box::new(Sphere::new(
                    center,
                    SMALL_RADIUS,
                    Metal::new(albedo, fuzz),
                )));
            } else {
                // Glass
                world.add(Box::new(Sphere::new(
                    center,
                    SMALL_RADIUS,
                    Dielectric::new(1.5),
                )));
            }
        }
    }

    // Three hero spheres
    world.add(Box::new(Sphere::new(
        Vec3::new(0.0, 1.0, 0.0),
        1.0,
        Dielectric::new(1.5),
    )));
    world.add(Box::new(Sphere::new(
        Vec3::new(-4.0, 1.0, 0.0),
        1.0,
        Lambertian::new(Color::new(0.4, 0.2, 0.1)),
    )));
    world.add(Box::new(Sphere::new(
        Vec3::new(4.0, 1.0, 0.0),
        1.0,
        Metal::new(Color::new(0.7, 0.6, 0.5), 0.0),
    )));

    log::debug!("Built random scene with {} spheres", world.len());
    world
}

/// A sphere resting on a much larger ground sphere, both 50% gray diffuse.
pub fn diffuse_scene() -> HittableList {
    let material = || Lambertian::new(Color::splat(0.5));

    let mut world = HittableList::new();
    world.add(Box::new(Sphere::new(
        Vec3::new(0.0, 0.0, -1.0),
        0.5,
        material(),
    )));
    world.add(Box::new(Sphere::new(
        Vec3::new(0.0, -100.5, -1.0),
        100.0,
        material(),
    )));
    world
}

/// Diffuse center sphere flanked by fuzzy gold metal and glass.
pub fn mixed_materials_scene() -> HittableList {
    let mut world = HittableList::new();
    world.add(Box::new(Sphere::new(
        Vec3::new(0.0, 0.0, -1.0),
        0.5,
        Lambertian::new(Color::new(0.1, 0.2, 0.5)),
    )));
    world.add(Box::new(Sphere::new(
        Vec3::new(0.0, -100.5, -1.0),
        100.0,
        Lambertian::new(Color::new(0.8, 0.8, 0.0)),
    )));
    world.add(Box::new(Sphere::new(
        Vec3::new(1.0, 0.0, -1.0),
        0.5,
        Metal::new(Color::new(0.8, 0.6, 0.2), 0.05),
    )));
    world.add(Box::new(Sphere::new(
        Vec3::new(-1.0, 0.0, -1.0),
        0.4,
        Dielectric::new(1.5),
    )));
    world
}

/// Blue and red spheres touching at the origin.
pub fn camera_test_scene() -> HittableList {
    let r = FRAC_PI_4.cos();

    let mut world = HittableList::new();
    world.add(Box::new(Sphere::new(
        Vec3::new(-r, 0.0, -1.0),
        r,
        Lambertian::new(Color::new(0.0, 0.0, 1.0)),
    )));
    world.add(Box::new(Sphere::new(
        Vec3::new(r, 0.0, -1.0),
        r,
        Lambertian::new(Color::new(1.0, 0.0, 0.0)),
    )));
    world
}
