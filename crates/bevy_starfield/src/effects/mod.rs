/// Cubic Bézier paths for shooting stars.
pub mod bezier;
/// Fixed-length trail ring buffer.
pub mod trail;

use bevy::prelude::*;
use rand::Rng;

use crate::asset::EffectSettings;
use crate::material::GalaxyUniforms;
use bezier::BezierPath;
use trail::TrailBuffer;

/// Identifies a shooting star for as long as it lives. Never reused.
pub type ShootingStarId = u64;

/// A single streak crossing the scene along a fixed curve.
#[derive(Debug, Clone)]
pub struct ShootingStar {
    /// Stable identifier, see [`ShootingStarId`].
    pub id: ShootingStarId,
    /// Path followed by the head.
    pub curve: BezierPath,
    /// Position along the curve, `0` at spawn.
    pub progress: f32,
    /// Progress added per frame.
    pub speed: f32,
    /// Frames lived.
    pub age: u32,
    /// Frames after which the star is retired even if it has not arrived.
    pub max_life: u32,
    /// Recent head positions.
    pub trail: TrailBuffer,
}

impl ShootingStar {
    /// Creates a star at the start of `curve` with its trail pre-sampled along
    /// the whole curve.
    pub fn new(
        id: ShootingStarId,
        curve: BezierPath,
        speed: f32,
        max_life: u32,
        trail_length: usize,
    ) -> Self {
        let last = trail_length.saturating_sub(1).max(1) as f32;
        let trail =
            TrailBuffer::from_samples((0..trail_length).map(|i| curve.sample(i as f32 / last)));
        Self {
            id,
            curve,
            progress: 0.0,
            speed,
            age: 0,
            max_life,
            trail,
        }
    }

    /// Current head position.
    pub fn head(&self) -> Vec3 {
        self.curve.sample(self.progress.min(1.0))
    }

    /// Advances one frame. Returns `false` once the star should be retired.
    pub fn step(&mut self) -> bool {
        self.progress += self.speed;
        self.age += 1;
        self.trail.push(self.head());
        !self.is_finished()
    }

    /// `true` once the star outlived `max_life` or reached the end of its curve.
    pub fn is_finished(&self) -> bool {
        self.age > self.max_life || self.progress >= 1.0
    }
}

/// The single expanding brightness pulse travelling through the galaxy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RippleState {
    started_at: Option<f32>,
    /// Front speed in world units per second.
    pub speed: f32,
    /// Half-thickness of the bright shell.
    pub width: f32,
}

impl Default for RippleState {
    fn default() -> Self {
        let settings = EffectSettings::default();
        Self {
            started_at: None,
            speed: settings.ripple_speed,
            width: settings.ripple_width,
        }
    }
}

impl RippleState {
    /// Starts a new ripple at `now`, replacing any ripple in flight.
    pub fn trigger(&mut self, now: f32) {
        self.started_at = Some(now);
    }

    /// Time the current ripple started, if any.
    pub fn started_at(&self) -> Option<f32> {
        self.started_at
    }

    /// Distance of the ripple front from the center at `now`.
    pub fn radius(&self, now: f32) -> Option<f32> {
        self.started_at
            .map(|start| (now - start).max(0.0) * self.speed)
    }

    /// Start time as the shader expects it: `-1.0` when no ripple is active.
    pub fn shader_time(&self) -> f32 {
        self.started_at.unwrap_or(-1.0)
    }
}

/// All animated state of the scene: the shader clock, the ripple and the
/// shooting star pool.
///
/// Advanced once per frame by [`advance`](Self::advance). Scene entities for
/// stars are created and released by systems reading
/// [`drain_spawned`](Self::drain_spawned) and [`drain_expired`](Self::drain_expired).
#[derive(Resource, Debug, Default)]
pub struct AnimatorState {
    u_time: f32,
    ripple: RippleState,
    settings: EffectSettings,
    stars: Vec<ShootingStar>,
    next_id: ShootingStarId,
    spawned: Vec<ShootingStarId>,
    expired: Vec<ShootingStarId>,
}

impl AnimatorState {
    /// Creates an animator using `settings`.
    pub fn new(settings: &EffectSettings) -> Self {
        let mut state = Self::default();
        state.configure(settings);
        state
    }

    /// Applies new effect settings. Running stars keep their own speed and lifetime.
    pub fn configure(&mut self, settings: &EffectSettings) {
        self.ripple.speed = settings.ripple_speed;
        self.ripple.width = settings.ripple_width;
        self.settings = settings.clone();
    }

    /// Settings applied to newly spawned stars and the galaxy shader.
    pub fn settings(&self) -> &EffectSettings {
        &self.settings
    }

    /// Seconds accumulated by [`advance`](Self::advance).
    pub fn time(&self) -> f32 {
        self.u_time
    }

    /// Current ripple.
    pub fn ripple(&self) -> &RippleState {
        &self.ripple
    }

    /// Active stars, in spawn order.
    pub fn stars(&self) -> &[ShootingStar] {
        &self.stars
    }

    /// Looks up an active star.
    pub fn star(&self, id: ShootingStarId) -> Option<&ShootingStar> {
        self.stars.iter().find(|star| star.id == id)
    }

    /// Advances the clock by `dt` seconds and every star by one frame.
    ///
    /// Stars that finish during this call are removed and queued for
    /// [`drain_expired`](Self::drain_expired).
    pub fn advance(&mut self, dt: f32) {
        self.u_time += dt.max(0.0);

        let expired = &mut self.expired;
        self.stars.retain_mut(|star| {
            let alive = star.step();
            if !alive {
                expired.push(star.id);
            }
            alive
        });
    }

    /// Starts a ripple at the current time, replacing any ripple in flight.
    pub fn trigger_ripple(&mut self) {
        self.ripple.trigger(self.u_time);
    }

    /// Distance of the ripple front from the center, if a ripple is active.
    pub fn ripple_radius(&self) -> Option<f32> {
        self.ripple.radius(self.u_time)
    }

    /// Spawns a star on a random sweep and returns its id.
    pub fn spawn_shooting_star(&mut self, rng: &mut impl Rng) -> ShootingStarId {
        let settings = &self.settings.shooting_star;
        let id = self.next_id;
        self.next_id += 1;

        let star = ShootingStar::new(
            id,
            BezierPath::random_sweep(rng),
            settings.speed.sample(rng),
            settings.max_life,
            settings.trail_length,
        );
        self.stars.push(star);
        self.spawned.push(id);
        id
    }

    /// Takes the ids of stars spawned since the last call.
    pub fn drain_spawned(&mut self) -> impl Iterator<Item = ShootingStarId> + '_ {
        self.spawned.drain(..)
    }

    /// Takes the ids of stars retired since the last call.
    pub fn drain_expired(&mut self) -> impl Iterator<Item = ShootingStarId> + '_ {
        self.expired.drain(..)
    }

    /// Uniform block for the galaxy shader.
    pub fn uniforms(&self) -> GalaxyUniforms {
        GalaxyUniforms {
            time: self.u_time,
            size: self.settings.point_size,
            ripple_time: self.ripple.shader_time(),
            ripple_speed: self.ripple.speed,
            ripple_width: self.ripple.width,
        }
    }
}

/// Spawns one shooting star when triggered.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct SpawnShootingStar;

/// Starts a ripple when triggered.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct TriggerRipple;

/// Observer for [`SpawnShootingStar`].
pub fn on_spawn_shooting_star(
    _trigger: On<SpawnShootingStar>,
    mut animator: ResMut<AnimatorState>,
) {
    let id = animator.spawn_shooting_star(&mut rand::thread_rng());
    debug!("spawned shooting star {id}");
}

/// Observer for [`TriggerRipple`].
pub fn on_trigger_ripple(_trigger: On<TriggerRipple>, mut animator: ResMut<AnimatorState>) {
    animator.trigger_ripple();
}
