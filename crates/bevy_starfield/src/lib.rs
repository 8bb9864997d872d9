#![deny(missing_docs)]
//! **Starfield** renders an animated spiral galaxy for the
//! [Bevy game engine](https://bevyengine.org/), with photo "constellations"
//! scattered along its arms, an expanding ripple pulse and shooting stars.
//!
//! # Getting started
//!
//! Add [`StarfieldPlugin`] to your app and spawn a [`Starfield`] pointing at a
//! [`StarfieldAsset`]:
//!
//! ```no_run
//! use bevy::prelude::*;
//! use bevy_starfield::prelude::*;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins((DefaultPlugins, StarfieldPlugin))
//!         .add_systems(Startup, setup)
//!         .run();
//! }
//!
//! fn setup(mut commands: Commands, asset_server: Res<AssetServer>) {
//!     commands.spawn(Starfield::new(asset_server.load("galaxy.ron")));
//! }
//! ```
//!
//! Scenes can also be built in code with [`StarfieldAsset::new`].
//!
//! # How a scene is built
//!
//! - The [background galaxy](galaxy::generate_galaxy_field) is generated once,
//!   with a thinned core.
//! - A [density policy](DensityAllocator) splits the galaxy's point budget
//!   between one [constellation](groups::generate_group_field) per image.
//! - Each constellation stays hidden until its image loads
//!   ([`GroupLoadState`]); a failed image hides only its own constellation.
//! - [`AnimatorState`] owns the shader clock, the [ripple](TriggerRipple) and
//!   the [shooting stars](SpawnShootingStar). Trigger those events at any time.

/// Starfield asset definitions, loader and format versioning.
pub mod asset;
/// Immutable point clouds and their builder.
pub mod cloud;
/// Per-constellation point budget.
pub mod density;
/// Shader clock, ripple and shooting stars.
pub mod effects;
/// Background galaxy, star box and nebula generators.
pub mod galaxy;
/// Photo constellations.
pub mod groups;
/// Material extensions for galaxy points and point sprites.
pub mod material;
/// Billboard and trail meshes.
pub mod mesh;
/// Convenience re-exports.
pub mod prelude;
/// Components and resources attached to running starfields.
pub mod runtime;
/// Systems that build, animate and tear down starfields.
pub mod spawning;
/// CPU-side texture baking.
pub mod texture;

use bevy::{asset::embedded_asset, pbr::MaterialPlugin, prelude::*};

use asset::{StarfieldAsset, StarfieldAssetLoader};
use effects::{on_spawn_shooting_star, on_trigger_ripple};
use spawning::{
    advance_animator, cleanup_starfield_entities, poll_group_assets, setup_starfields,
    sync_galaxy_uniforms, sync_shooting_stars,
};

/// Plugin that generates and animates starfields.
///
/// Registers the asset loader, both materials, the animator resource, the
/// trigger observers and the per-frame systems.
pub struct StarfieldPlugin;

impl Plugin for StarfieldPlugin {
    fn build(&self, app: &mut App) {
        embedded_asset!(app, "shaders/galaxy_points.wgsl");
        embedded_asset!(app, "shaders/point_sprite.wgsl");

        app.init_asset::<StarfieldAsset>()
            .init_asset_loader::<StarfieldAssetLoader>();

        app.add_plugins((
            MaterialPlugin::<GalaxyMaterial>::default(),
            MaterialPlugin::<PointSpriteMaterial>::default(),
        ));

        app.init_resource::<AnimatorState>()
            .init_resource::<ShootingStarAssets>()
            .add_observer(on_spawn_shooting_star)
            .add_observer(on_trigger_ripple);

        app.add_systems(
            Update,
            (
                setup_starfields,
                poll_group_assets,
                advance_animator,
                sync_shooting_stars,
                sync_galaxy_uniforms,
                cleanup_starfield_entities,
            )
                .chain(),
        );
    }
}

pub use asset::{
    BackdropSettings, ConstellationSettings, DensitySettings, EffectSettings, GalaxyParameters,
    ParameterError, ShootingStarSettings, StarfieldAssetLoaderError,
};
pub use cloud::{PointCloud, PointCloudBuilder};
pub use density::DensityAllocator;
pub use effects::{AnimatorState, RippleState, ShootingStar, SpawnShootingStar, TriggerRipple};
pub use groups::{GroupError, GroupLoadState, ParticleGroup};
pub use material::{GalaxyMaterial, PointSpriteMaterial};
pub use runtime::{
    AttachedGroup, GroupLayer, GroupMeshes, ParticleGroupBinding, ShootingStarAssets,
    ShootingStarEntity, Starfield, StarfieldRuntime,
};
pub use texture::NeonTextureError;
