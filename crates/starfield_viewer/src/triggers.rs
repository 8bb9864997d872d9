use bevy::prelude::*;
use bevy_starfield::prelude::*;

const SHOOTING_STAR_INTERVAL: f32 = 1.5;

/// Paces automatic shooting stars.
#[derive(Resource)]
pub struct ShootingStarTimer(pub Timer);

impl Default for ShootingStarTimer {
    fn default() -> Self {
        Self(Timer::from_seconds(
            SHOOTING_STAR_INTERVAL,
            TimerMode::Repeating,
        ))
    }
}

pub fn spawn_shooting_stars(
    mut commands: Commands,
    mut timer: ResMut<ShootingStarTimer>,
    time: Res<Time>,
) {
    timer.0.tick(time.delta());
    for _ in 0..timer.0.times_finished_this_tick() {
        commands.trigger(SpawnShootingStar);
    }
}

pub fn trigger_ripple_on_input(
    mut commands: Commands,
    keys: Res<ButtonInput<KeyCode>>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
) {
    if keys.just_pressed(KeyCode::Space) || mouse_buttons.just_pressed(MouseButton::Left) {
        commands.trigger(TriggerRipple);
    }
}
