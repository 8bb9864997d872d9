use bevy::prelude::*;
use rand::Rng;

use crate::asset::Range;

/// A cubic Bézier segment in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BezierPath {
    /// Start, first control, second control, end.
    pub points: [Vec3; 4],
}

impl BezierPath {
    /// Creates a path from its four control points.
    pub fn new(start: Vec3, control_a: Vec3, control_b: Vec3, end: Vec3) -> Self {
        Self {
            points: [start, control_a, control_b, end],
        }
    }

    /// First control point.
    pub fn start(&self) -> Vec3 {
        self.points[0]
    }

    /// Last control point.
    pub fn end(&self) -> Vec3 {
        self.points[3]
    }

    /// Evaluates the curve at `t`, clamped to `[0, 1]`.
    pub fn sample(&self, t: f32) -> Vec3 {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        let [p0, p1, p2, p3] = self.points;
        p0 * (u * u * u) + p1 * (3.0 * u * u * t) + p2 * (3.0 * u * t * t) + p3 * (t * t * t)
    }

    /// A random left-to-right sweep across the scene.
    ///
    /// The path starts well to the left of the galaxy, ends far to the right,
    /// and bows through two control points pulled toward the middle.
    pub fn random_sweep(rng: &mut impl Rng) -> Self {
        let start = Vec3::new(
            SWEEP_START_X.sample(rng),
            SWEEP_START_YZ.sample(rng),
            SWEEP_START_YZ.sample(rng),
        );
        let end = Vec3::new(
            SWEEP_END_X.sample(rng),
            start.y + SWEEP_END_DRIFT.sample(rng),
            start.z + SWEEP_END_DRIFT.sample(rng),
        );
        let control_a = start
            + Vec3::new(
                SWEEP_CONTROL_REACH.sample(rng),
                SWEEP_CONTROL_BOW.sample(rng),
                SWEEP_CONTROL_BOW.sample(rng),
            );
        let control_b = end
            + Vec3::new(
                SWEEP_CONTROL_RETURN.sample(rng),
                SWEEP_CONTROL_BOW.sample(rng),
                SWEEP_CONTROL_BOW.sample(rng),
            );
        Self::new(start, control_a, control_b, end)
    }
}

const SWEEP_START_X: Range = Range {
    min: -200.0,
    max: -100.0,
};
const SWEEP_START_YZ: Range = Range {
    min: -100.0,
    max: 100.0,
};
const SWEEP_END_X: Range = Range {
    min: 600.0,
    max: 800.0,
};
const SWEEP_END_DRIFT: Range = Range {
    min: -100.0,
    max: 100.0,
};
const SWEEP_CONTROL_REACH: Range = Range {
    min: 200.0,
    max: 300.0,
};
const SWEEP_CONTROL_RETURN: Range = Range {
    min: -200.0,
    max: -100.0,
};
const SWEEP_CONTROL_BOW: Range = Range {
    min: -50.0,
    max: 50.0,
};
