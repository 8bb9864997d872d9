use bevy::prelude::*;

/// Fixed-capacity ring of recent head positions.
///
/// The buffer is filled at construction and never grows; [`push`](Self::push)
/// overwrites the oldest slot.
#[derive(Debug, Clone, PartialEq)]
pub struct TrailBuffer {
    points: Vec<Vec3>,
    head: usize,
}

impl TrailBuffer {
    /// Creates a trail from its initial samples, oldest first.
    ///
    /// An empty iterator yields a single-point trail at the origin.
    pub fn from_samples(samples: impl IntoIterator<Item = Vec3>) -> Self {
        let mut points: Vec<Vec3> = samples.into_iter().collect();
        if points.is_empty() {
            points.push(Vec3::ZERO);
        }
        Self { points, head: 0 }
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false`; a trail holds at least one point.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Overwrites the oldest sample with `point`.
    pub fn push(&mut self, point: Vec3) {
        self.points[self.head] = point;
        self.head = (self.head + 1) % self.points.len();
    }

    /// The most recently pushed sample.
    pub fn newest(&self) -> Vec3 {
        let index = (self.head + self.points.len() - 1) % self.points.len();
        self.points[index]
    }

    /// Samples from oldest to newest.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = Vec3> + '_ {
        let len = self.points.len();
        (0..len).map(move |offset| self.points[(self.head + offset) % len])
    }
}
