use std::f32::consts::{FRAC_PI_2, TAU};
use std::ops::Range;

use bevy::input::mouse::{AccumulatedMouseMotion, AccumulatedMouseScroll};
use bevy::post_process::bloom::Bloom;
use bevy::prelude::*;

const MIN_ZOOM_DISTANCE: f32 = 15.0;
const MAX_ZOOM_DISTANCE: f32 = 300.0;
const ZOOM_SPEED: f32 = 3.0;
const INITIAL_POSITION: Vec3 = Vec3::new(0.0, 20.0, 30.0);
const ORBIT_TARGET: Vec3 = Vec3::ZERO;
const FOG_DENSITY: f32 = 0.0015;

#[derive(Component)]
pub struct ViewerCamera;

#[derive(Debug, Resource)]
pub struct OrbitCameraSettings {
    pub orbit_distance: f32,
    pub pitch_speed: f32,
    pub pitch_range: Range<f32>,
    pub yaw_speed: f32,
    /// Radians per second around the vertical axis while the user is idle.
    pub auto_rotate_speed: f32,
}

impl Default for OrbitCameraSettings {
    fn default() -> Self {
        let pitch_limit = FRAC_PI_2 - 0.01;
        Self {
            orbit_distance: INITIAL_POSITION.distance(ORBIT_TARGET),
            pitch_speed: 0.003,
            pitch_range: -pitch_limit..pitch_limit,
            yaw_speed: 0.004,
            // one turn every two minutes
            auto_rotate_speed: TAU / 120.0,
        }
    }
}

pub fn setup_camera(mut commands: Commands) {
    commands.spawn((
        ViewerCamera,
        Name::new("ViewerCamera"),
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: 75f32.to_radians(),
            far: 10_000.0,
            ..default()
        }),
        Transform::from_translation(INITIAL_POSITION).looking_at(ORBIT_TARGET, Vec3::Y),
        Bloom::NATURAL,
        DistanceFog {
            color: Color::BLACK,
            falloff: FogFalloff::Exponential {
                density: FOG_DENSITY,
            },
            ..default()
        },
    ));
}

pub fn auto_rotate_camera(
    mut camera: Single<&mut Transform, With<ViewerCamera>>,
    settings: Res<OrbitCameraSettings>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    time: Res<Time>,
) {
    if mouse_buttons.pressed(MouseButton::Right) {
        return;
    }

    let angle = settings.auto_rotate_speed * time.delta_secs();
    camera.rotate_around(ORBIT_TARGET, Quat::from_rotation_y(angle));
}

pub fn orbit_camera(
    mut camera: Single<&mut Transform, With<ViewerCamera>>,
    settings: Res<OrbitCameraSettings>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    mouse_motion: Res<AccumulatedMouseMotion>,
) {
    if !mouse_buttons.pressed(MouseButton::Right) {
        return;
    }

    let delta = -mouse_motion.delta;
    let delta_pitch = delta.y * settings.pitch_speed;
    let delta_yaw = delta.x * settings.yaw_speed;

    let (yaw, pitch, roll) = camera.rotation.to_euler(EulerRot::YXZ);
    let pitch = (pitch + delta_pitch).clamp(settings.pitch_range.start, settings.pitch_range.end);
    let yaw = yaw + delta_yaw;
    camera.rotation = Quat::from_euler(EulerRot::YXZ, yaw, pitch, roll);

    camera.translation = ORBIT_TARGET - camera.forward() * settings.orbit_distance;
}

pub fn zoom_camera(
    mut camera: Single<&mut Transform, With<ViewerCamera>>,
    mut settings: ResMut<OrbitCameraSettings>,
    mouse_scroll: Res<AccumulatedMouseScroll>,
) {
    let delta = mouse_scroll.delta.y;
    if delta == 0.0 {
        return;
    }

    settings.orbit_distance = (settings.orbit_distance - delta * ZOOM_SPEED)
        .clamp(MIN_ZOOM_DISTANCE, MAX_ZOOM_DISTANCE);

    camera.translation = ORBIT_TARGET - camera.forward() * settings.orbit_distance;
}
