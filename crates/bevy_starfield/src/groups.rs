use bevy::prelude::*;
use rand::Rng;
use thiserror::Error;

use crate::asset::GalaxyParameters;
use crate::cloud::{PointCloud, PointCloudBuilder};
use crate::galaxy::{
    CORE_RADIUS, GROUP_VERTICAL_JITTER, linear_from_srgb, place_on_arm, radial_color,
    sample_radius,
};
use crate::material::PointSpriteMaterial;

const NEAR_TINT: [f32; 3] = [1.0, 1.0, 1.0];

/// The point clouds of one photo constellation.
///
/// Positions are stored relative to the group's own centroid; place the group
/// in the world by translating it by [`offset`](Self::offset).
#[derive(Debug, Clone)]
pub struct ParticleGroup {
    /// Position of the group's image in the configured image list.
    pub index: usize,
    /// Candidate points this group was allowed to sample.
    pub quota: u32,
    /// White-tinted cloud for the opaque, depth-tested layer.
    pub near: PointCloud,
    /// Radius-gradient cloud for the additive layer. Shares positions with `near`.
    pub far: PointCloud,
    /// Centroid of the generated points before re-centering.
    pub offset: Vec3,
}

impl ParticleGroup {
    /// Number of points that survived the core cutoff.
    pub fn len(&self) -> usize {
        self.near.len()
    }

    /// Returns `true` when the core cutoff rejected every candidate.
    pub fn is_degenerate(&self) -> bool {
        self.near.is_empty()
    }
}

/// Generates the point clouds for constellation `group_index`.
///
/// Uses the galaxy placement law with two differences from the background
/// galaxy: every candidate inside [`CORE_RADIUS`] is dropped, so the cloud reads
/// as a crisp cluster, and each survivor gets both a flat near tint and a
/// radius-gradient far tint from `params.inside_color`/`params.outside_color`.
///
/// Candidates are numbered globally (`group_index * quota + i`) so consecutive
/// groups continue the arm assignment where the previous one stopped.
pub fn generate_group_field(
    group_index: usize,
    quota: u32,
    params: &GalaxyParameters,
    rng: &mut impl Rng,
) -> ParticleGroup {
    let inside = linear_from_srgb(params.inside_color);
    let outside = linear_from_srgb(params.outside_color);

    let mut near = PointCloudBuilder::with_capacity(quota as usize);
    let mut far_colors = Vec::with_capacity(quota as usize);
    let first_index = group_index as u64 * u64::from(quota);

    for i in 0..u64::from(quota) {
        let radius = sample_radius(params, rng);
        if radius < CORE_RADIUS {
            continue;
        }

        let position = place_on_arm(params, first_index + i, radius, GROUP_VERTICAL_JITTER, rng);
        near.push(position, NEAR_TINT);
        far_colors.push(radial_color(inside, outside, radius, params.radius, rng));
    }

    let offset = near.centroid();
    near.translate(offset);
    let (near, far) = near.finish_with_variant(far_colors);

    ParticleGroup {
        index: group_index,
        quota,
        near,
        far,
        offset,
    }
}

/// Why a constellation will never be shown.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GroupError {
    /// The bound image could not be loaded.
    #[error("image failed to load: {0}")]
    AssetLoad(String),
    /// The core cutoff rejected every candidate point.
    #[error("no point survived the core cutoff")]
    Degenerate,
}

/// Materials built for a constellation once its image is available.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupMaterials {
    /// Rounded, aspect-fit crop of the source image.
    pub texture: Handle<Image>,
    /// Opaque, alpha-tested, depth-writing layer.
    pub near: Handle<PointSpriteMaterial>,
    /// Additive, non-depth-writing layer.
    pub far: Handle<PointSpriteMaterial>,
}

/// Load progress of a constellation's image.
///
/// `Loaded` and `Failed` are terminal.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum GroupLoadState {
    /// The image has been requested and has not resolved yet.
    #[default]
    Pending,
    /// The image loaded and the group's materials are built.
    Loaded(GroupMaterials),
    /// The group will never be attached.
    Failed(GroupError),
}

impl GroupLoadState {
    /// Returns `true` while the image has not resolved.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Returns the materials of a loaded group.
    pub fn materials(&self) -> Option<&GroupMaterials> {
        match self {
            Self::Loaded(materials) => Some(materials),
            _ => None,
        }
    }

    /// Returns the failure reason of a failed group.
    pub fn error(&self) -> Option<&GroupError> {
        match self {
            Self::Failed(error) => Some(error),
            _ => None,
        }
    }
}
