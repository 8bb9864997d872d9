use std::sync::Arc;

use bevy::{math::DVec3, prelude::*};

/// An immutable set of colored points.
///
/// Colors are linear RGB with every channel in `[0, 1]`. Positions are shared
/// behind an [`Arc`], so two clouds with different colors over the same points
/// (see [`PointCloud::with_colors`]) do not duplicate position data.
#[derive(Debug, Clone, Default)]
pub struct PointCloud {
    positions: Arc<[Vec3]>,
    colors: Vec<[f32; 3]>,
}

impl PointCloud {
    /// Number of points.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns `true` if the cloud has no points.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Point positions, in generation order.
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Point colors, parallel to [`positions`](Self::positions).
    pub fn colors(&self) -> &[[f32; 3]] {
        &self.colors
    }

    /// Iterates `(position, color)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Vec3, [f32; 3])> + '_ {
        self.positions.iter().copied().zip(self.colors.iter().copied())
    }

    /// Returns `true` if `other` reuses this cloud's position storage.
    pub fn shares_positions_with(&self, other: &PointCloud) -> bool {
        Arc::ptr_eq(&self.positions, &other.positions)
    }

    /// Builds a second cloud over the same positions with different colors.
    ///
    /// Returns `None` when `colors` does not have one entry per point.
    pub fn with_colors(&self, colors: Vec<[f32; 3]>) -> Option<PointCloud> {
        (colors.len() == self.positions.len()).then(|| PointCloud {
            positions: Arc::clone(&self.positions),
            colors,
        })
    }

    /// Arithmetic mean of all positions, or [`Vec3::ZERO`] for an empty cloud.
    pub fn centroid(&self) -> Vec3 {
        centroid(&self.positions)
    }
}

pub(crate) fn centroid(positions: &[Vec3]) -> Vec3 {
    if positions.is_empty() {
        return Vec3::ZERO;
    }
    // accumulate in f64, large clouds lose precision in f32
    let sum = positions
        .iter()
        .fold(DVec3::ZERO, |acc, p| acc + p.as_dvec3());
    (sum / positions.len() as f64).as_vec3()
}

/// Append-only staging buffer for a [`PointCloud`].
///
/// Generators reserve the candidate count up front and push only the points
/// that survive, so [`finish`](Self::finish) yields a compacted cloud.
#[derive(Debug, Default)]
pub struct PointCloudBuilder {
    positions: Vec<Vec3>,
    colors: Vec<[f32; 3]>,
}

impl PointCloudBuilder {
    /// Creates a builder with room for `capacity` points.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            positions: Vec::with_capacity(capacity),
            colors: Vec::with_capacity(capacity),
        }
    }

    /// Appends a point. Color channels are clamped to `[0, 1]`.
    pub fn push(&mut self, position: Vec3, color: [f32; 3]) {
        self.positions.push(position);
        self.colors.push(color.map(|c| c.clamp(0.0, 1.0)));
    }

    /// Number of points pushed so far.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns `true` if nothing was pushed.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Subtracts `offset` from every position pushed so far.
    pub fn translate(&mut self, offset: Vec3) {
        for position in &mut self.positions {
            *position -= offset;
        }
    }

    /// Mean of the positions pushed so far.
    pub fn centroid(&self) -> Vec3 {
        centroid(&self.positions)
    }

    /// Freezes the builder into two clouds over one shared position buffer: the
    /// first with the pushed colors, the second with `variant_colors`.
    ///
    /// `variant_colors` must hold one color per pushed point; missing entries
    /// are filled with black and extra ones dropped.
    pub fn finish_with_variant(self, mut variant_colors: Vec<[f32; 3]>) -> (PointCloud, PointCloud) {
        variant_colors.resize(self.positions.len(), [0.0; 3]);
        for color in &mut variant_colors {
            *color = color.map(|c| c.clamp(0.0, 1.0));
        }
        let primary = self.finish();
        let variant = PointCloud {
            positions: Arc::clone(&primary.positions),
            colors: variant_colors,
        };
        (primary, variant)
    }

    /// Freezes the builder into a cloud sized to exactly the pushed points.
    pub fn finish(self) -> PointCloud {
        let mut colors = self.colors;
        colors.shrink_to_fit();
        PointCloud {
            positions: Arc::from(self.positions),
            colors,
        }
    }
}
