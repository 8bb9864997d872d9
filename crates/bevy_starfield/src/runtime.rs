use bevy::prelude::*;

use crate::asset::StarfieldAsset;
use crate::effects::ShootingStarId;
use crate::groups::GroupLoadState;

/// Builds a starfield scene from a [`StarfieldAsset`].
///
/// Generation runs once, on the first frame the asset is available.
#[derive(Component, Debug, Clone)]
pub struct Starfield {
    /// Scene description.
    pub handle: Handle<StarfieldAsset>,
    /// Fixed seed for the point generators. `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Starfield {
    /// A starfield with a random seed.
    pub fn new(handle: Handle<StarfieldAsset>) -> Self {
        Self { handle, seed: None }
    }

    /// A starfield that generates the same points every run.
    pub fn seeded(handle: Handle<StarfieldAsset>, seed: u64) -> Self {
        Self {
            handle,
            seed: Some(seed),
        }
    }
}

/// Inserted on a [`Starfield`] once its points have been generated.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct StarfieldRuntime {
    /// Number of photo constellations.
    pub group_count: u32,
    /// Candidate points each constellation was allowed to sample.
    pub points_per_group: u32,
    /// Points in the background galaxy after core thinning.
    pub galaxy_points: usize,
}

/// Marks every entity spawned on behalf of a starfield.
#[derive(Component, Debug, Clone, Copy)]
pub struct StarfieldPart {
    /// The [`Starfield`] entity.
    pub parent: Entity,
}

/// The background spiral galaxy.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct GalaxyField;

/// The distant star box.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct BackdropField;

/// Nebula glows and the core glow.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct NebulaField;

/// Billboard meshes of a constellation, shared by its near and far layers.
#[derive(Debug, Clone)]
pub struct GroupMeshes {
    /// White-tinted points.
    pub near: Handle<Mesh>,
    /// Radius-gradient points.
    pub far: Handle<Mesh>,
}

/// One photo constellation and the progress of its image.
///
/// The entity stays hidden until [`state`](Self::state) becomes
/// [`GroupLoadState::Loaded`]; its layers are then spawned as children and
/// [`AttachedGroup`] is inserted. Failed groups drop their
/// [`meshes`](Self::meshes).
#[derive(Component, Debug)]
pub struct ParticleGroupBinding {
    /// Position in the asset's image list.
    pub index: usize,
    /// Requested image. `None` for groups that never load.
    pub image: Option<Handle<Image>>,
    /// Load progress.
    pub state: GroupLoadState,
    /// Point meshes, built up front. `None` once the group has failed.
    pub meshes: Option<GroupMeshes>,
    /// Points that survived the core cutoff.
    pub point_count: usize,
}

/// Present on constellations whose layers are in the scene.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct AttachedGroup;

/// Which half of a constellation a render entity draws.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupLayer {
    /// Opaque, alpha-tested, depth-writing.
    Near,
    /// Additive.
    Far,
}

/// Scene entity of an active shooting star; its trail is this entity's mesh.
#[derive(Component, Debug, Clone)]
pub struct ShootingStarEntity {
    /// Star in [`AnimatorState`](crate::effects::AnimatorState).
    pub id: ShootingStarId,
    /// Line strip updated every frame.
    pub trail_mesh: Handle<Mesh>,
    /// Head sphere, a child of this entity.
    pub head: Entity,
}

/// Head sphere of a shooting star.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct ShootingStarHead;

const TRAIL_COLOR: Srgba = Srgba::rgb(0.6, 0.918, 1.0); // #99eaff
const TRAIL_OPACITY: f32 = 0.7;
const GLOW_OPACITY: f32 = 0.35;
const GLOW_SCALE: f32 = 1.5;

/// Meshes and materials shared by every shooting star.
#[derive(Resource, Debug, Clone)]
pub struct ShootingStarAssets {
    /// Unit sphere, scaled by the configured head radius.
    pub head_mesh: Handle<Mesh>,
    /// Bright additive head.
    pub head_material: Handle<StandardMaterial>,
    /// Faint halo around the head.
    pub glow_material: Handle<StandardMaterial>,
    /// Translucent cyan trail.
    pub trail_material: Handle<StandardMaterial>,
    /// Halo size relative to the head.
    pub glow_scale: f32,
}

impl FromWorld for ShootingStarAssets {
    fn from_world(world: &mut World) -> Self {
        let head_mesh = world
            .resource_mut::<Assets<Mesh>>()
            .add(Sphere::new(1.0).mesh().uv(32, 18));

        let mut materials = world.resource_mut::<Assets<StandardMaterial>>();
        let head_material = materials.add(StandardMaterial {
            base_color: Color::WHITE,
            unlit: true,
            alpha_mode: AlphaMode::Add,
            ..default()
        });
        let glow_material = materials.add(StandardMaterial {
            base_color: Color::srgba(1.0, 1.0, 1.0, GLOW_OPACITY),
            unlit: true,
            alpha_mode: AlphaMode::Add,
            ..default()
        });
        let trail_material = materials.add(StandardMaterial {
            base_color: TRAIL_COLOR.with_alpha(TRAIL_OPACITY).into(),
            unlit: true,
            alpha_mode: AlphaMode::Blend,
            ..default()
        });

        Self {
            head_mesh,
            head_material,
            glow_material,
            trail_material,
            glow_scale: GLOW_SCALE,
        }
    }
}
