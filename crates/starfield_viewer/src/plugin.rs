use bevy::prelude::*;
use bevy_starfield::prelude::*;

use crate::triggers::{ShootingStarTimer, spawn_shooting_stars, trigger_ripple_on_input};
use crate::viewport::{
    OrbitCameraSettings, auto_rotate_camera, orbit_camera, setup_camera, zoom_camera,
};

/// Asset path of the scene to show, relative to the asset folder.
#[derive(Resource, Debug, Clone)]
pub struct ViewerConfig {
    pub scene: String,
}

pub struct StarfieldViewerPlugin;

impl Plugin for StarfieldViewerPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(StarfieldPlugin)
            .insert_resource(ClearColor(Color::BLACK))
            .init_resource::<OrbitCameraSettings>()
            .init_resource::<ShootingStarTimer>()
            .add_systems(Startup, (setup_camera, spawn_scene))
            .add_systems(
                Update,
                (
                    (auto_rotate_camera, orbit_camera, zoom_camera).chain(),
                    spawn_shooting_stars,
                    trigger_ripple_on_input,
                ),
            );
    }
}

fn spawn_scene(mut commands: Commands, config: Res<ViewerConfig>, asset_server: Res<AssetServer>) {
    info!("loading scene {}", config.scene);
    commands.spawn((
        Name::new("Starfield"),
        Starfield::new(asset_server.load(config.scene.clone())),
    ));
}
