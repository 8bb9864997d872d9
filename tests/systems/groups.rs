use super::helpers::*;

use bevy::prelude::*;
use bevy_starfield::groups::{GroupError, GroupLoadState};
use bevy_starfield::runtime::{GroupLayer, ParticleGroupBinding};

fn spawn_groups(fixture: &str, hold_images: bool) -> App {
    let mut app = create_minimal_app();
    if hold_images {
        hold_image_loads(&mut app);
    }
    let handle = load_fixture(&mut app, fixture);
    spawn_starfield(&mut app, handle);
    run_until_groups_spawned(&mut app, 100);
    app
}

fn group_entity(app: &mut App, index: usize) -> Entity {
    app.world_mut()
        .query::<(Entity, &ParticleGroupBinding)>()
        .iter(app.world())
        .find(|(_, binding)| binding.index == index)
        .map(|(entity, _)| entity)
        .expect("group should exist")
}

fn mesh_ids(app: &mut App, index: usize) -> Option<(AssetId<Mesh>, AssetId<Mesh>)> {
    app.world_mut()
        .query::<&ParticleGroupBinding>()
        .iter(app.world())
        .find(|binding| binding.index == index)
        .and_then(|binding| binding.meshes.as_ref())
        .map(|meshes| (meshes.near.id(), meshes.far.id()))
}

fn state_of(app: &mut App, index: usize) -> GroupLoadState {
    group_states(app)
        .into_iter()
        .find(|(i, _)| *i == index)
        .map(|(_, state)| state)
        .expect("group should exist")
}

#[test]
fn loaded_image_attaches_both_layers() {
    let mut app = spawn_groups("minimal_starfield.ron", true);
    provide_group_image(&mut app, 0, solid_image(4, 2, [255, 0, 0, 255]));
    app.update();

    assert_eq!(attached_groups(&mut app), vec![0]);

    let entity = group_entity(&mut app, 0);
    let visibility = app.world().entity(entity).get::<Visibility>().copied();
    assert_eq!(visibility, Some(Visibility::Inherited));

    let children: Vec<Entity> = app
        .world()
        .entity(entity)
        .get::<Children>()
        .expect("attached group should have layer children")
        .to_vec();
    let mut layers: Vec<GroupLayer> = children
        .iter()
        .filter_map(|child| app.world().entity(*child).get::<GroupLayer>().copied())
        .collect();
    layers.sort_by_key(|layer| *layer == GroupLayer::Far);
    assert_eq!(layers, vec![GroupLayer::Near, GroupLayer::Far]);
}

#[test]
fn loaded_group_gets_a_square_neon_texture() {
    let mut app = spawn_groups("minimal_starfield.ron", true);
    provide_group_image(&mut app, 1, solid_image(8, 3, [0, 255, 0, 255]));
    app.update();

    let GroupLoadState::Loaded(materials) = state_of(&mut app, 1) else {
        panic!("group 1 should be loaded");
    };
    let images = app.world().resource::<Assets<Image>>();
    let texture = images
        .get(&materials.texture)
        .expect("neon texture should be stored");
    assert_eq!(texture.width(), 256);
    assert_eq!(texture.height(), 256);
    assert_ne!(materials.near, materials.far);
}

#[test]
fn failed_image_only_hides_its_own_group() {
    let mut app = spawn_groups("three_groups.ron", false);
    provide_group_image(&mut app, 0, solid_image(2, 2, [255; 4]));
    provide_group_image(&mut app, 2, solid_image(2, 2, [255; 4]));

    for _ in 0..100 {
        app.update();
        if !state_of(&mut app, 1).is_pending() {
            break;
        }
    }

    assert!(matches!(
        state_of(&mut app, 1),
        GroupLoadState::Failed(GroupError::AssetLoad(_))
    ));
    assert!(state_of(&mut app, 0).materials().is_some());
    assert!(state_of(&mut app, 2).materials().is_some());
    assert_eq!(attached_groups(&mut app), vec![0, 2]);

    let failed = group_entity(&mut app, 1);
    let hidden = app
        .world()
        .entity(failed)
        .get::<Visibility>()
        .copied();
    assert_eq!(hidden, Some(Visibility::Hidden));
}

#[test]
fn failed_group_releases_its_meshes() {
    let mut app = spawn_groups("three_groups.ron", false);
    provide_group_image(&mut app, 0, solid_image(2, 2, [255; 4]));

    let (near, far) = mesh_ids(&mut app, 1).expect("pending group should own its meshes");
    {
        let meshes = app.world().resource::<Assets<Mesh>>();
        assert!(meshes.get(near).is_some());
        assert!(meshes.get(far).is_some());
    }

    for _ in 0..100 {
        app.update();
        if !state_of(&mut app, 1).is_pending() {
            break;
        }
    }
    assert!(state_of(&mut app, 1).error().is_some());
    assert!(mesh_ids(&mut app, 1).is_none());

    let meshes = app.world().resource::<Assets<Mesh>>();
    assert!(meshes.get(near).is_none());
    assert!(meshes.get(far).is_none());

    let (kept_near, _) = mesh_ids(&mut app, 0).expect("attached group keeps its meshes");
    let meshes = app.world().resource::<Assets<Mesh>>();
    assert!(meshes.get(kept_near).is_some());
}

#[test]
fn groups_attach_in_any_completion_order() {
    let mut app = spawn_groups("three_groups.ron", true);

    provide_group_image(&mut app, 2, solid_image(2, 2, [255; 4]));
    app.update();
    assert_eq!(attached_groups(&mut app), vec![2]);
    assert!(state_of(&mut app, 0).is_pending());

    advance_frames(&mut app, 3);
    provide_group_image(&mut app, 0, solid_image(2, 2, [255; 4]));
    app.update();
    assert_eq!(attached_groups(&mut app), vec![0, 2]);

    advance_frames(&mut app, 3);
    assert!(state_of(&mut app, 1).is_pending());
    assert_eq!(attached_groups(&mut app), vec![0, 2]);
}

#[test]
fn failed_group_stays_failed_if_the_image_shows_up_later() {
    let mut app = spawn_groups("three_groups.ron", false);

    for _ in 0..100 {
        app.update();
        if !state_of(&mut app, 1).is_pending() {
            break;
        }
    }
    assert!(state_of(&mut app, 1).error().is_some());

    provide_group_image(&mut app, 1, solid_image(2, 2, [255; 4]));
    advance_frames(&mut app, 3);

    assert!(state_of(&mut app, 1).error().is_some());
    assert!(!attached_groups(&mut app).contains(&1));
}

#[test]
fn group_is_placed_at_its_centroid() {
    let mut app = spawn_groups("minimal_starfield.ron", true);
    let entity = group_entity(&mut app, 0);
    let transform = app
        .world()
        .entity(entity)
        .get::<Transform>()
        .copied()
        .expect("group should have a transform");

    assert!(transform.translation.length() > 0.0);
}
