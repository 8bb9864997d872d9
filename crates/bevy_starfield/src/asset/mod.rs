mod serde_helpers;
/// Starfield file format version tracking and compatibility validation.
pub mod versioning;

use bevy::{
    asset::{AssetLoader, LoadContext, io::Reader},
    prelude::*,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use serde_helpers::serde_default;
use versioning::{FormatVersion, VersionStatus, current_format_version};

use crate::texture::{MAX_NEON_TEXTURE_SIZE, NEON_TEXTURE_SIZE};

/// Asset loader for [`StarfieldAsset`] files in RON format.
#[derive(Default, TypePath)]
pub struct StarfieldAssetLoader;

/// Errors that can occur when loading a [`StarfieldAsset`].
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StarfieldAssetLoaderError {
    /// An I/O error occurred while reading the asset file.
    #[error("Could not load asset: {0}")]
    Io(#[from] std::io::Error),
    /// The asset file contained invalid RON syntax.
    #[error("Could not parse RON: {0}")]
    Ron(#[from] ron::error::SpannedError),
    /// The asset file has an unknown format version, likely from a newer release.
    #[error("Unknown starfield_version. You may need a newer version of bevy_starfield.")]
    UnknownVersion,
    /// The file parsed but describes a galaxy that cannot be generated.
    #[error("Invalid starfield parameters: {0}")]
    InvalidParameters(#[from] ParameterError),
}

/// A parameter combination the generators cannot work with.
#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParameterError {
    /// `arms` was zero.
    #[error("a galaxy needs at least one arm")]
    NoArms,
    /// `radius` was zero, negative or NaN.
    #[error("galaxy radius must be positive, got {0}")]
    NonPositiveRadius(f32),
    /// A shooting star trail needs two points to form a line.
    #[error("shooting star trails need at least 2 points, got {0}")]
    TrailTooShort(usize),
    /// `constellations.texture_size` was zero or too large to bake.
    #[error(
        "constellation texture size must be between 1 and {max}, got {0}",
        max = MAX_NEON_TEXTURE_SIZE
    )]
    TextureSizeOutOfRange(u32),
    /// A shooting star speed bound was negative, infinite or NaN.
    #[error("shooting star speed bounds must be finite and non-negative, got {min}..{max}")]
    InvalidSpeed {
        /// Lower bound found in the file.
        min: f32,
        /// Upper bound found in the file.
        max: f32,
    },
}

impl AssetLoader for StarfieldAssetLoader {
    type Asset = StarfieldAsset;
    type Settings = ();
    type Error = StarfieldAssetLoaderError;

    async fn load(
        &self,
        reader: &mut dyn Reader,
        _settings: &(),
        load_context: &mut LoadContext<'_>,
    ) -> Result<Self::Asset, Self::Error> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).await?;
        let mut asset = ron::de::from_bytes::<StarfieldAsset>(&bytes)?;

        match asset.try_upgrade_version() {
            VersionStatus::Current => {}
            VersionStatus::Outdated { found } => {
                let path = load_context.path();
                warn!(
                    "{path:?}: upgraded starfield_version \"{found}\" to \"{}\"",
                    FormatVersion::CURRENT
                );
            }
            VersionStatus::Unknown => {
                return Err(StarfieldAssetLoaderError::UnknownVersion);
            }
        }

        asset.validate()?;

        Ok(asset)
    }

    fn extensions(&self) -> &[&str] {
        &["ron"]
    }
}

serde_default!(count, u32, 100_000);
serde_default!(arms, u32, 6);
serde_default!(radius, f32, 100.0);
serde_default!(spin, f32, 0.5);
serde_default!(randomness, f32, 0.2);
serde_default!(randomness_power, f32, 20.0);
serde_default!(inside_color, [f32; 3], [0.839, 0.243, 0.839]);
serde_default!(outside_color, [f32; 3], [0.282, 0.722, 0.722]);

/// Shape of the spiral galaxy and of every photo constellation placed on it.
///
/// Colors are sRGB triples in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
pub struct GalaxyParameters {
    /// Number of candidate points. Also the shared point budget for constellations.
    ///
    /// Defaults to `100000`.
    #[serde(default = "default_count", skip_serializing_if = "is_default_count")]
    pub count: u32,
    /// Number of evenly spaced spiral arms. Must be at least `1`.
    ///
    /// Defaults to `6`.
    #[serde(default = "default_arms", skip_serializing_if = "is_default_arms")]
    pub arms: u32,
    /// Outer radius in world units. Must be positive.
    ///
    /// Defaults to `100.0`.
    #[serde(default = "default_radius", skip_serializing_if = "is_default_radius")]
    pub radius: f32,
    /// Extra rotation per world unit of distance from the center, in radians.
    ///
    /// Defaults to `0.5`.
    #[serde(default = "default_spin", skip_serializing_if = "is_default_spin")]
    pub spin: f32,
    /// Jitter amplitude, as a fraction of a point's distance from the center.
    ///
    /// Defaults to `0.2`.
    #[serde(
        default = "default_randomness",
        skip_serializing_if = "is_default_randomness"
    )]
    pub randomness: f32,
    /// Exponent applied to the uniform radial sample. Higher values pull
    /// points toward the core.
    ///
    /// Defaults to `20.0`.
    #[serde(
        default = "default_randomness_power",
        skip_serializing_if = "is_default_randomness_power"
    )]
    pub randomness_power: f32,
    /// Far-variant constellation color at the center. Defaults to `#d63ed6`.
    #[serde(
        default = "default_inside_color",
        skip_serializing_if = "is_default_inside_color"
    )]
    pub inside_color: [f32; 3],
    /// Far-variant constellation color at the rim. Defaults to `#48b8b8`.
    #[serde(
        default = "default_outside_color",
        skip_serializing_if = "is_default_outside_color"
    )]
    pub outside_color: [f32; 3],
}

impl Default for GalaxyParameters {
    fn default() -> Self {
        Self {
            count: default_count(),
            arms: default_arms(),
            radius: default_radius(),
            spin: default_spin(),
            randomness: default_randomness(),
            randomness_power: default_randomness_power(),
            inside_color: default_inside_color(),
            outside_color: default_outside_color(),
        }
    }
}

impl GalaxyParameters {
    /// Checks the invariants the generators rely on.
    pub fn validate(&self) -> Result<(), ParameterError> {
        if self.arms == 0 {
            return Err(ParameterError::NoArms);
        }
        if self.radius.is_nan() || self.radius <= 0.0 {
            return Err(ParameterError::NonPositiveRadius(self.radius));
        }
        Ok(())
    }
}

/// How the shared point budget is split between photo constellations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct DensitySettings {
    /// Points per group when there is a single image. Defaults to `50000`.
    pub max_density: u32,
    /// Points per group once the group count reaches [`saturation`](Self::saturation).
    /// Defaults to `2000`.
    pub min_density: u32,
    /// Group count at which density bottoms out. Defaults to `14`.
    pub saturation: u32,
}

impl Default for DensitySettings {
    fn default() -> Self {
        Self {
            max_density: 50_000,
            min_density: 2_000,
            saturation: 14,
        }
    }
}

/// Look of the photo constellations once their image has loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct ConstellationSettings {
    /// World-space sprite size of each point. Defaults to `1.8`.
    pub point_size: f32,
    /// Texels with alpha below this are discarded on both layers. Defaults to `0.2`.
    pub alpha_cutoff: f32,
    /// Side of the square texture the photo is cropped into, in pixels.
    /// Defaults to `256`.
    pub texture_size: u32,
    /// Corner radius of the cropped photo, as a fraction of
    /// [`texture_size`](Self::texture_size). Defaults to `0.1`.
    pub corner_radius: f32,
}

impl Default for ConstellationSettings {
    fn default() -> Self {
        Self {
            point_size: 1.8,
            alpha_cutoff: 0.2,
            texture_size: NEON_TEXTURE_SIZE,
            corner_radius: 0.1,
        }
    }
}

/// A minimum/maximum range of `f32` values, sampled uniformly.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Reflect)]
pub struct Range {
    /// Inclusive lower bound.
    pub min: f32,
    /// Exclusive upper bound.
    pub max: f32,
}

impl Range {
    /// Creates a new range with the given bounds.
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Draws a value in `[min, max)`, or `min` when the range is empty or
    /// either bound is not finite.
    pub fn sample(&self, rng: &mut impl Rng) -> f32 {
        if !self.is_finite() || self.max <= self.min {
            return self.min;
        }
        rng.gen_range(self.min..self.max)
    }

    /// Returns `true` if both bounds are finite.
    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }
}

/// Spawn-time settings for shooting stars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct ShootingStarSettings {
    /// Number of curve samples kept in the trail. Defaults to `100`.
    pub trail_length: usize,
    /// Frames a star may live before it is retired. Defaults to `300`.
    pub max_life: u32,
    /// Curve progress added per frame. Defaults to `0.001..0.002`.
    pub speed: Range,
    /// Radius of the head sphere. Defaults to `2.0`.
    pub head_radius: f32,
}

impl Default for ShootingStarSettings {
    fn default() -> Self {
        Self {
            trail_length: 100,
            max_life: 300,
            speed: Range::new(0.001, 0.002),
            head_radius: 2.0,
        }
    }
}

/// Animated effect settings: galaxy point size, ripple pulse and shooting stars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct EffectSettings {
    /// Screen-space size of galaxy points, in pixels at unit depth. Defaults to `50.0`.
    pub point_size: f32,
    /// Ripple front speed in world units per second. Defaults to `40.0`.
    pub ripple_speed: f32,
    /// Half-thickness of the ripple shell. Defaults to `20.0`.
    pub ripple_width: f32,
    /// Shooting star settings.
    pub shooting_star: ShootingStarSettings,
}

impl Default for EffectSettings {
    fn default() -> Self {
        Self {
            point_size: 50.0,
            ripple_speed: 40.0,
            ripple_width: 20.0,
            shooting_star: ShootingStarSettings::default(),
        }
    }
}

/// Static scenery around the galaxy: a distant star box and nebula glows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct BackdropSettings {
    /// Number of background stars. `0` disables them. Defaults to `20000`.
    pub star_count: u32,
    /// Side of the cube the background stars fill. Defaults to `900.0`.
    pub extent: f32,
    /// World-space size of a background star. Defaults to `0.7`.
    pub star_size: f32,
    /// Opacity of background stars. Defaults to `0.7`.
    pub star_opacity: f32,
    /// Number of colored nebula glows. Defaults to `15`.
    pub nebula_count: u32,
    /// Side of the cube nebulae are scattered in. Defaults to `175.0`.
    pub nebula_extent: f32,
    /// World-space size of a nebula glow. Defaults to `100.0`.
    pub nebula_scale: f32,
    /// Opacity of nebula glows. Defaults to `0.55`.
    pub nebula_opacity: f32,
    /// Size of the white glow at the galaxy core. `0.0` disables it. Defaults to `8.0`.
    pub core_glow_scale: f32,
}

impl Default for BackdropSettings {
    fn default() -> Self {
        Self {
            star_count: 20_000,
            extent: 900.0,
            star_size: 0.7,
            star_opacity: 0.7,
            nebula_count: 15,
            nebula_extent: 175.0,
            nebula_scale: 100.0,
            nebula_opacity: 0.55,
            core_glow_scale: 8.0,
        }
    }
}

/// A complete starfield scene description, loadable from RON files.
///
/// Reference it from a [`Starfield`](crate::Starfield) component to build the scene.
#[derive(Asset, TypePath, Debug, Clone, Serialize, Deserialize)]
pub struct StarfieldAsset {
    starfield_version: String,
    /// Display name for this scene.
    pub name: String,
    /// Galaxy shape, shared by the background galaxy and every constellation.
    #[serde(default)]
    pub galaxy: GalaxyParameters,
    /// Constellation density policy.
    #[serde(default)]
    pub density: DensitySettings,
    /// Constellation look.
    #[serde(default)]
    pub constellations: ConstellationSettings,
    /// Image paths, one constellation per entry.
    #[serde(default)]
    pub images: Vec<String>,
    /// Animated effects.
    #[serde(default)]
    pub effects: EffectSettings,
    /// Static scenery.
    #[serde(default)]
    pub backdrop: BackdropSettings,
}

impl StarfieldAsset {
    /// Creates a scene with the current format version and default settings.
    pub fn new(name: impl Into<String>, images: Vec<String>) -> Self {
        Self {
            starfield_version: current_format_version().to_string(),
            name: name.into(),
            galaxy: GalaxyParameters::default(),
            density: DensitySettings::default(),
            constellations: ConstellationSettings::default(),
            images,
            effects: EffectSettings::default(),
            backdrop: BackdropSettings::default(),
        }
    }

    /// Returns the format version this asset was written with.
    pub fn version(&self) -> &str {
        &self.starfield_version
    }

    /// Validates this asset's `starfield_version` against the current format version.
    ///
    /// If the version is outdated but compatible, it is upgraded in place.
    /// Returns the original [`VersionStatus`] so the caller can react accordingly.
    pub fn try_upgrade_version(&mut self) -> VersionStatus {
        let status = versioning::check_version(&self.starfield_version);
        if matches!(status, VersionStatus::Outdated { .. }) {
            self.starfield_version = current_format_version().to_string();
        }
        status
    }

    /// Checks every parameter the generators and the animator depend on.
    pub fn validate(&self) -> Result<(), ParameterError> {
        self.galaxy.validate()?;
        let texture_size = self.constellations.texture_size;
        if texture_size == 0 || texture_size > MAX_NEON_TEXTURE_SIZE {
            return Err(ParameterError::TextureSizeOutOfRange(texture_size));
        }
        let shooting_star = &self.effects.shooting_star;
        if shooting_star.trail_length < 2 {
            return Err(ParameterError::TrailTooShort(shooting_star.trail_length));
        }
        let speed = shooting_star.speed;
        if !speed.is_finite() || speed.min < 0.0 || speed.max < 0.0 {
            return Err(ParameterError::InvalidSpeed {
                min: speed.min,
                max: speed.max,
            });
        }
        Ok(())
    }
}
