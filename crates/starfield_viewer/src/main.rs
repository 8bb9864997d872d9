mod plugin;
mod triggers;
mod viewport;

use bevy::prelude::*;
use bevy::window::WindowResolution;

use plugin::{StarfieldViewerPlugin, ViewerConfig};

fn main() {
    let scene = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "galaxy.ron".to_string());

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Starfield".into(),
                resolution: WindowResolution::new(1280, 720),
                ..default()
            }),
            ..default()
        }))
        .insert_resource(ViewerConfig { scene })
        .add_plugins(StarfieldViewerPlugin)
        .run();
}
