use std::f32::consts::TAU;

use bevy::prelude::*;
use rand::Rng;

use crate::asset::{BackdropSettings, GalaxyParameters};
use crate::cloud::{PointCloud, PointCloudBuilder};

/// Points closer than this to the center fall in the galactic core.
pub const CORE_RADIUS: f32 = 30.0;

// the background galaxy keeps a sparse core, constellations drop it entirely
const CORE_KEEP_CHANCE: f32 = 0.2;

const GALAXY_VERTICAL_JITTER: f32 = 1.2;
pub(crate) const GROUP_VERTICAL_JITTER: f32 = 0.5;

const GALAXY_INSIDE_HUE: Srgba = Srgba::rgb(1.0, 0.4, 1.0); // #ff66ff
const GALAXY_OUTSIDE_HUE: Srgba = Srgba::rgb(0.4, 1.0, 1.0); // #66ffff

const BRIGHTNESS_MIN: f32 = 0.7;

const NEBULA_SATURATION: f32 = 0.8;
const NEBULA_LIGHTNESS: f32 = 0.5;

/// Draws a distance from the galaxy center.
///
/// A uniform sample raised to `randomness_power` collapses toward zero, so
/// higher powers produce a tighter core.
pub(crate) fn sample_radius(params: &GalaxyParameters, rng: &mut impl Rng) -> f32 {
    rng.r#gen::<f32>().powf(params.randomness_power) * params.radius
}

/// Places a point at `radius` on the arm selected by `index`, swept by the
/// galaxy spin and jittered on every axis.
pub(crate) fn place_on_arm(
    params: &GalaxyParameters,
    index: u64,
    radius: f32,
    vertical_jitter: f32,
    rng: &mut impl Rng,
) -> Vec3 {
    let arms = u64::from(params.arms.max(1));
    let branch_angle = (index % arms) as f32 / arms as f32 * TAU;
    let spin_angle = radius * params.spin;
    let angle = branch_angle + spin_angle;

    let spread = params.randomness * radius;
    let jitter = Vec3::new(
        (rng.r#gen::<f32>() - 0.5) * spread,
        (rng.r#gen::<f32>() - 0.5) * spread * vertical_jitter,
        (rng.r#gen::<f32>() - 0.5) * spread,
    );

    Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius) + jitter
}

/// Blends `inside` toward `outside` by `radius / max_radius` and dims the
/// result by a random brightness in `[0.7, 1.0)`.
pub(crate) fn radial_color(
    inside: LinearRgba,
    outside: LinearRgba,
    radius: f32,
    max_radius: f32,
    rng: &mut impl Rng,
) -> [f32; 3] {
    let t = (radius / max_radius).clamp(0.0, 1.0);
    let brightness = rng.gen_range(BRIGHTNESS_MIN..1.0);
    [
        (inside.red + (outside.red - inside.red) * t) * brightness,
        (inside.green + (outside.green - inside.green) * t) * brightness,
        (inside.blue + (outside.blue - inside.blue) * t) * brightness,
    ]
}

pub(crate) fn linear_from_srgb(color: [f32; 3]) -> LinearRgba {
    let [r, g, b] = color.map(|c| c.clamp(0.0, 1.0));
    LinearRgba::from(Srgba::rgb(r, g, b))
}

/// Generates the background spiral galaxy.
///
/// Every candidate in `0..params.count` is placed on its arm; candidates that
/// land inside [`CORE_RADIUS`] are kept only one time in five, which thins the
/// core without emptying it. The result is compacted to the survivors.
pub fn generate_galaxy_field(params: &GalaxyParameters, rng: &mut impl Rng) -> PointCloud {
    let inside = LinearRgba::from(GALAXY_INSIDE_HUE);
    let outside = LinearRgba::from(GALAXY_OUTSIDE_HUE);
    let mut cloud = PointCloudBuilder::with_capacity(params.count as usize);

    for i in 0..params.count {
        let radius = sample_radius(params, rng);
        if radius < CORE_RADIUS && rng.r#gen::<f32>() >= CORE_KEEP_CHANCE {
            continue;
        }

        let position = place_on_arm(params, u64::from(i), radius, GALAXY_VERTICAL_JITTER, rng);
        let color = radial_color(inside, outside, radius, params.radius, rng);
        cloud.push(position, color);
    }

    cloud.finish()
}

/// Generates the distant star box: white points uniformly filling a cube of
/// side `settings.extent` centered on the origin.
pub fn generate_backdrop_field(settings: &BackdropSettings, rng: &mut impl Rng) -> PointCloud {
    let mut cloud = PointCloudBuilder::with_capacity(settings.star_count as usize);
    for _ in 0..settings.star_count {
        cloud.push(random_in_cube(settings.extent, rng), [1.0; 3]);
    }
    cloud.finish()
}

/// Scatters nebula glow centers in a cube of side `settings.nebula_extent`,
/// each with a random saturated hue.
pub fn generate_nebula_field(settings: &BackdropSettings, rng: &mut impl Rng) -> PointCloud {
    let mut cloud = PointCloudBuilder::with_capacity(settings.nebula_count as usize);
    for _ in 0..settings.nebula_count {
        let hue = rng.gen_range(0.0..360.0);
        let color = LinearRgba::from(Srgba::from(Hsla::hsl(hue, NEBULA_SATURATION, NEBULA_LIGHTNESS)));
        cloud.push(
            random_in_cube(settings.nebula_extent, rng),
            [color.red, color.green, color.blue],
        );
    }
    cloud.finish()
}

pub(crate) fn random_in_cube(extent: f32, rng: &mut impl Rng) -> Vec3 {
    Vec3::new(
        (rng.r#gen::<f32>() - 0.5) * extent,
        (rng.r#gen::<f32>() - 0.5) * extent,
        (rng.r#gen::<f32>() - 0.5) * extent,
    )
}
