use super::helpers::*;

use bevy::prelude::*;
use bevy_starfield::effects::{AnimatorState, SpawnShootingStar, TriggerRipple};
use bevy_starfield::material::{GalaxyMaterial, GalaxyUniforms};
use bevy_starfield::runtime::{GalaxyField, ShootingStarEntity, ShootingStarHead};

fn galaxy_uniforms(app: &mut App) -> GalaxyUniforms {
    let handle = app
        .world_mut()
        .query_filtered::<&MeshMaterial3d<GalaxyMaterial>, With<GalaxyField>>()
        .iter(app.world())
        .next()
        .map(|material| material.0.clone())
        .expect("galaxy should have a material");
    app.world()
        .resource::<Assets<GalaxyMaterial>>()
        .get(&handle)
        .expect("galaxy material should exist")
        .extension
        .uniforms
}

#[test]
fn starfield_configures_the_animator() {
    let (mut app, ..) = setup_loaded_starfield("fast_stars.ron");

    let uniforms = galaxy_uniforms(&mut app);
    assert_eq!(uniforms.size, 12.0);
    assert_eq!(uniforms.ripple_speed, 10.0);
    assert_eq!(uniforms.ripple_width, 5.0);
    assert_eq!(uniforms.ripple_time, -1.0);
}

#[test]
fn shader_clock_follows_animator() {
    let (mut app, ..) = setup_loaded_starfield("fast_stars.ron");
    advance_time(&mut app, 0.1);

    let time = app.world().resource::<AnimatorState>().time();
    assert!(time > 0.0, "animator clock should advance");
    assert_eq!(galaxy_uniforms(&mut app).time, time);
}

#[test]
fn ripple_trigger_reaches_the_galaxy_material() {
    let (mut app, ..) = setup_loaded_starfield("fast_stars.ron");
    advance_time(&mut app, 0.05);

    app.world_mut().trigger(TriggerRipple);
    app.update();

    let started_at = app
        .world()
        .resource::<AnimatorState>()
        .ripple()
        .started_at()
        .expect("ripple should be active");
    assert_eq!(galaxy_uniforms(&mut app).ripple_time, started_at);
}

#[test]
fn shooting_star_entity_lives_as_long_as_the_star() {
    let (mut app, ..) = setup_loaded_starfield("fast_stars.ron");

    app.world_mut().trigger(SpawnShootingStar);
    assert_eq!(app.world().resource::<AnimatorState>().stars().len(), 1);

    app.update();
    assert_eq!(count::<With<ShootingStarEntity>>(&mut app), 1);
    assert_eq!(count::<With<ShootingStarHead>>(&mut app), 1);

    let head_scale = app
        .world_mut()
        .query_filtered::<&Transform, With<ShootingStarHead>>()
        .iter(app.world())
        .next()
        .map(|transform| transform.scale);
    assert_eq!(head_scale, Some(Vec3::splat(1.5)));

    // speed 0.5 reaches the end of the curve on the second frame
    app.update();
    assert!(app.world().resource::<AnimatorState>().stars().is_empty());
    assert_eq!(count::<With<ShootingStarEntity>>(&mut app), 0);
    assert_eq!(count::<With<ShootingStarHead>>(&mut app), 0);
}

#[test]
fn trail_mesh_holds_every_trail_sample() {
    let (mut app, ..) = setup_loaded_starfield("fast_stars.ron");

    app.world_mut().trigger(SpawnShootingStar);
    app.update();

    let trail_mesh = app
        .world_mut()
        .query::<&ShootingStarEntity>()
        .iter(app.world())
        .next()
        .map(|star| star.trail_mesh.clone())
        .expect("star entity should exist");
    let meshes = app.world().resource::<Assets<Mesh>>();
    let vertices = meshes
        .get(&trail_mesh)
        .and_then(|mesh| mesh.attribute(Mesh::ATTRIBUTE_POSITION))
        .map(|positions| positions.len());
    assert_eq!(vertices, Some(6));
}

#[test]
fn concurrent_stars_get_their_own_entities() {
    let (mut app, ..) = setup_loaded_starfield("fast_stars.ron");

    app.world_mut().trigger(SpawnShootingStar);
    app.world_mut().trigger(SpawnShootingStar);
    app.world_mut().trigger(SpawnShootingStar);
    app.update();

    let mut ids: Vec<u64> = app
        .world_mut()
        .query::<&ShootingStarEntity>()
        .iter(app.world())
        .map(|star| star.id)
        .collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 3);
}
