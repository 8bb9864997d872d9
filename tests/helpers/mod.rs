#![allow(dead_code)]

use bevy::asset::{AssetPlugin, AssetServer, LoadState, RenderAssetUsages};
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use bevy_starfield::asset::{StarfieldAsset, StarfieldAssetLoader};
use bevy_starfield::effects::{AnimatorState, on_spawn_shooting_star, on_trigger_ripple};
use bevy_starfield::groups::GroupLoadState;
use bevy_starfield::material::{GalaxyMaterial, PointSpriteMaterial};
use bevy_starfield::runtime::{ParticleGroupBinding, ShootingStarAssets, Starfield};
use std::path::Path;

pub const TEST_SEED: u64 = 7;

pub fn fixtures_path() -> String {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .to_string_lossy()
        .to_string()
}

pub fn create_minimal_app() -> App {
    let mut app = App::new();

    app.add_plugins(
        MinimalPlugins.set(bevy::app::ScheduleRunnerPlugin::run_loop(
            std::time::Duration::from_millis(10),
        )),
    );

    app.add_plugins(AssetPlugin {
        file_path: fixtures_path(),
        ..default()
    });

    app.init_asset::<StarfieldAsset>()
        .init_asset_loader::<StarfieldAssetLoader>();

    app.init_asset::<Image>();
    app.init_asset::<Mesh>();
    app.init_asset::<StandardMaterial>();
    app.init_asset::<GalaxyMaterial>();
    app.init_asset::<PointSpriteMaterial>();

    app.init_resource::<AnimatorState>()
        .init_resource::<ShootingStarAssets>()
        .add_observer(on_spawn_shooting_star)
        .add_observer(on_trigger_ripple);

    app.add_systems(
        Update,
        (
            bevy_starfield::spawning::setup_starfields,
            bevy_starfield::spawning::poll_group_assets,
            bevy_starfield::spawning::advance_animator,
            bevy_starfield::spawning::sync_shooting_stars,
            bevy_starfield::spawning::sync_galaxy_uniforms,
            bevy_starfield::spawning::cleanup_starfield_entities,
        )
            .chain(),
    );

    app
}

pub fn load_fixture(app: &mut App, filename: &str) -> Handle<StarfieldAsset> {
    let asset_server = app.world().resource::<AssetServer>();
    asset_server.load(filename.to_string())
}

pub fn run_until_loaded<T: Asset>(app: &mut App, handle: &Handle<T>, max_updates: u32) -> bool {
    for _ in 0..max_updates {
        app.update();

        let asset_server = app.world().resource::<AssetServer>();
        match asset_server.load_state(handle) {
            LoadState::Loaded => return true,
            LoadState::Failed(_) => return false,
            _ => continue,
        }
    }
    false
}

pub fn run_until_failed<T: Asset>(app: &mut App, handle: &Handle<T>, max_updates: u32) -> bool {
    for _ in 0..max_updates {
        app.update();

        let asset_server = app.world().resource::<AssetServer>();
        match asset_server.load_state(handle) {
            LoadState::Failed(_) => return true,
            LoadState::Loaded => return false,
            _ => continue,
        }
    }
    false
}

pub fn load_asset(app: &mut App, fixture: &str) -> StarfieldAsset {
    let handle = load_fixture(app, fixture);
    for _ in 0..100 {
        app.update();
        let asset_server = app.world().resource::<AssetServer>();
        match asset_server.load_state(&handle) {
            LoadState::Loaded => {
                let assets = app.world().resource::<Assets<StarfieldAsset>>();
                return assets.get(&handle).expect("asset should exist").clone();
            }
            LoadState::Failed(err) => {
                panic!("fixture failed to load '{fixture}': {err:?}");
            }
            _ => continue,
        }
    }
    panic!("fixture timed out loading: {fixture}");
}

pub fn spawn_starfield(app: &mut App, handle: Handle<StarfieldAsset>) -> Entity {
    app.world_mut()
        .spawn(Starfield::seeded(handle, TEST_SEED))
        .id()
}

/// loads `fixture`, spawns a seeded starfield for it and runs until the scene is generated.
pub fn setup_loaded_starfield(fixture: &str) -> (App, Handle<StarfieldAsset>, Entity) {
    let mut app = create_minimal_app();
    let handle = load_fixture(&mut app, fixture);
    let entity = spawn_starfield(&mut app, handle.clone());
    assert!(
        run_until_loaded(&mut app, &handle, 100),
        "fixture should load"
    );
    advance_frames(&mut app, 2);
    (app, handle, entity)
}

pub fn advance_frames(app: &mut App, n: u32) {
    for _ in 0..n {
        app.update();
    }
}

/// advances the app for approximately the given number of seconds of real time.
pub fn advance_time(app: &mut App, seconds: f32) {
    let frame_count = (seconds / 0.016).ceil() as u32 + 2;
    let sleep_per_frame = std::time::Duration::from_secs_f64(seconds as f64 / frame_count as f64);
    for _ in 0..frame_count {
        std::thread::sleep(sleep_per_frame);
        app.update();
    }
}

pub fn solid_image(width: u32, height: u32, rgba: [u8; 4]) -> Image {
    Image::new_fill(
        Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        &rgba,
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::default(),
    )
}

/// the test app has no image loader, so group images are provided by hand.
pub fn provide_group_image(app: &mut App, index: usize, image: Image) {
    let handle = app
        .world_mut()
        .query::<&ParticleGroupBinding>()
        .iter(app.world())
        .find(|binding| binding.index == index)
        .and_then(|binding| binding.image.clone())
        .expect("group should have requested an image");
    let mut images = app.world_mut().resource_mut::<Assets<Image>>();
    let _ = images.insert(handle.id(), image);
}

pub fn group_states(app: &mut App) -> Vec<(usize, GroupLoadState)> {
    let mut states: Vec<_> = app
        .world_mut()
        .query::<&ParticleGroupBinding>()
        .iter(app.world())
        .map(|binding| (binding.index, binding.state.clone()))
        .collect();
    states.sort_by_key(|(index, _)| *index);
    states
}

pub fn count<F: bevy::ecs::query::QueryFilter>(app: &mut App) -> usize {
    app.world_mut()
        .query_filtered::<Entity, F>()
        .iter(app.world())
        .count()
}

/// stands in for an image loader that is never registered.
#[derive(Default, TypePath)]
pub struct HeldImageLoader;

impl bevy::asset::AssetLoader for HeldImageLoader {
    type Asset = Image;
    type Settings = ();
    type Error = std::io::Error;

    async fn load(
        &self,
        _reader: &mut dyn bevy::asset::io::Reader,
        _settings: &(),
        _load_context: &mut bevy::asset::LoadContext<'_>,
    ) -> Result<Self::Asset, Self::Error> {
        Err(std::io::Error::other("held loader never runs"))
    }

    fn extensions(&self) -> &[&str] {
        &["png"]
    }
}

/// keeps every png load pending so tests decide when each image arrives.
pub fn hold_image_loads(app: &mut App) {
    app.preregister_asset_loader::<HeldImageLoader>(&["png"]);
}

pub fn run_until_groups_spawned(app: &mut App, max_updates: u32) {
    for _ in 0..max_updates {
        app.update();
        if count::<With<ParticleGroupBinding>>(app) > 0 {
            return;
        }
    }
    panic!("starfield never spawned its groups");
}

pub fn attached_groups(app: &mut App) -> Vec<usize> {
    let mut indices: Vec<usize> = app
        .world_mut()
        .query_filtered::<&ParticleGroupBinding, With<bevy_starfield::runtime::AttachedGroup>>()
        .iter(app.world())
        .map(|binding| binding.index)
        .collect();
    indices.sort();
    indices
}
