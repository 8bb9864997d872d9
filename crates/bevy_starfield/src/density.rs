use crate::asset::DensitySettings;

/// Splits a shared point budget between photo constellations.
///
/// Few groups get dense clouds, many groups get sparse ones. The density is
/// interpolated linearly between [`max_density`](Self::max_density) for a
/// single group and [`min_density`](Self::min_density) once the group count
/// reaches [`saturation`](Self::saturation), then clamped so the groups never
/// exceed the budget together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DensityAllocator {
    /// Points per group for zero or one group.
    pub max_density: u32,
    /// Points per group at and beyond the saturation count.
    pub min_density: u32,
    /// Group count at which the density reaches its minimum.
    pub saturation: u32,
}

impl Default for DensityAllocator {
    fn default() -> Self {
        Self::from(&DensitySettings::default())
    }
}

impl From<&DensitySettings> for DensityAllocator {
    fn from(settings: &DensitySettings) -> Self {
        Self {
            max_density: settings.max_density,
            min_density: settings.min_density,
            saturation: settings.saturation,
        }
    }
}

impl DensityAllocator {
    /// Returns the number of candidate points each of `group_count` groups may use.
    ///
    /// For `group_count >= 1` the result times `group_count` never exceeds
    /// `total_budget`. A `group_count` of `0` returns the unclamped maximum; the
    /// caller has nothing to generate in that case.
    pub fn allocate(&self, total_budget: u32, group_count: u32) -> u32 {
        let per_group = self.unclamped(group_count);

        if group_count > 0 && u64::from(per_group) * u64::from(group_count) > u64::from(total_budget)
        {
            return total_budget / group_count;
        }

        per_group
    }

    fn unclamped(&self, group_count: u32) -> u32 {
        if group_count <= 1 {
            return self.max_density;
        }
        if group_count >= self.saturation {
            return self.min_density;
        }

        // 1 < group_count < saturation, so saturation - 1 >= 2
        let t = f64::from(group_count - 1) / f64::from(self.saturation - 1);
        let density = f64::from(self.max_density) * (1.0 - t) + f64::from(self.min_density) * t;
        density.floor() as u32
    }
}
