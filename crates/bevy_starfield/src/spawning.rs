use bevy::{asset::LoadState, light::NotShadowCaster, prelude::*};
use rand::{SeedableRng, rngs::StdRng};

use crate::{
    asset::{BackdropSettings, ConstellationSettings, StarfieldAsset},
    cloud::PointCloudBuilder,
    density::DensityAllocator,
    effects::{AnimatorState, ShootingStarId},
    galaxy::{generate_backdrop_field, generate_galaxy_field, generate_nebula_field},
    groups::{GroupError, GroupLoadState, GroupMaterials, generate_group_field},
    material::{
        GalaxyMaterial, PointMaterialFlags, PointSpriteMaterial, galaxy_material,
        point_sprite_material,
    },
    mesh::{create_point_cloud_mesh, create_trail_mesh, update_trail_mesh},
    runtime::{
        AttachedGroup, BackdropField, GalaxyField, GroupLayer, GroupMeshes, NebulaField,
        ParticleGroupBinding,
        ShootingStarAssets, ShootingStarEntity, ShootingStarHead, Starfield, StarfieldPart,
        StarfieldRuntime,
    },
    texture::{GLOW_TEXTURE_SIZE, glow_texture, neon_texture},
};

const CORE_GLOW_COLOR: Color = Color::srgba(1.0, 1.0, 1.0, 0.8);
const CORE_GLOW_OPACITY: f32 = 0.25;

/// Generates every point cloud of newly available starfields.
///
/// The galaxy, the backdrop and every constellation are generated in this one
/// pass. Constellations start hidden and request their image; see
/// [`poll_group_assets`].
pub fn setup_starfields(
    mut commands: Commands,
    query: Query<(Entity, &Starfield), Without<StarfieldRuntime>>,
    assets: Res<Assets<StarfieldAsset>>,
    asset_server: Res<AssetServer>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut images: ResMut<Assets<Image>>,
    mut galaxy_materials: ResMut<Assets<GalaxyMaterial>>,
    mut sprite_materials: ResMut<Assets<PointSpriteMaterial>>,
    mut animator: ResMut<AnimatorState>,
) {
    for (starfield_entity, starfield) in query.iter() {
        let Some(asset) = assets.get(&starfield.handle) else {
            continue;
        };

        let mut rng = match starfield.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        animator.configure(&asset.effects);

        let galaxy = generate_galaxy_field(&asset.galaxy, &mut rng);
        let galaxy_entity = commands
            .spawn((
                GalaxyField,
                StarfieldPart {
                    parent: starfield_entity,
                },
                Mesh3d(meshes.add(create_point_cloud_mesh(&galaxy, 1.0))),
                MeshMaterial3d(galaxy_materials.add(galaxy_material(animator.uniforms()))),
                Transform::default(),
                Visibility::default(),
                NotShadowCaster,
            ))
            .id();
        commands.entity(starfield_entity).add_child(galaxy_entity);

        let group_count = asset.images.len() as u32;
        let points_per_group =
            DensityAllocator::from(&asset.density).allocate(asset.galaxy.count, group_count);
        info!("images: {group_count}, points per group: {points_per_group}");

        for (index, path) in asset.images.iter().enumerate() {
            let group = generate_group_field(index, points_per_group, &asset.galaxy, &mut rng);

            let (image, state, group_meshes) = if group.is_degenerate() {
                info!("constellation {index} ({path}) has no points and will not be shown");
                (None, GroupLoadState::Failed(GroupError::Degenerate), None)
            } else {
                let group_meshes = GroupMeshes {
                    near: meshes.add(create_point_cloud_mesh(&group.near, 1.0)),
                    far: meshes.add(create_point_cloud_mesh(&group.far, 1.0)),
                };
                (
                    Some(asset_server.load::<Image>(path)),
                    GroupLoadState::Pending,
                    Some(group_meshes),
                )
            };

            let group_entity = commands
                .spawn((
                    ParticleGroupBinding {
                        index,
                        image,
                        state,
                        meshes: group_meshes,
                        point_count: group.len(),
                    },
                    StarfieldPart {
                        parent: starfield_entity,
                    },
                    Transform::from_translation(group.offset),
                    Visibility::Hidden,
                ))
                .id();
            commands.entity(starfield_entity).add_child(group_entity);
        }

        spawn_backdrop(
            &mut commands,
            starfield_entity,
            &asset.backdrop,
            &mut rng,
            &mut meshes,
            &mut images,
            &mut sprite_materials,
        );

        commands.entity(starfield_entity).insert((
            StarfieldRuntime {
                group_count,
                points_per_group,
                galaxy_points: galaxy.len(),
            },
            Transform::default(),
            Visibility::default(),
        ));
    }
}

fn spawn_backdrop(
    commands: &mut Commands,
    starfield_entity: Entity,
    settings: &BackdropSettings,
    rng: &mut StdRng,
    meshes: &mut Assets<Mesh>,
    images: &mut Assets<Image>,
    materials: &mut Assets<PointSpriteMaterial>,
) {
    let part = StarfieldPart {
        parent: starfield_entity,
    };
    let mut children = Vec::with_capacity(3);

    if settings.star_count > 0 {
        let stars = generate_backdrop_field(settings, rng);
        let material = point_sprite_material(
            None,
            settings.star_size,
            settings.star_opacity,
            0.0,
            PointMaterialFlags::TRANSPARENT | PointMaterialFlags::ROUND,
        );
        children.push(
            commands
                .spawn((
                    BackdropField,
                    part,
                    Mesh3d(meshes.add(create_point_cloud_mesh(&stars, 1.0))),
                    MeshMaterial3d(materials.add(material)),
                    Transform::default(),
                    Visibility::default(),
                    NotShadowCaster,
                ))
                .id(),
        );
    }

    if settings.nebula_count > 0 {
        let nebulae = generate_nebula_field(settings, rng);
        let texture = images.add(glow_texture(Color::WHITE, GLOW_TEXTURE_SIZE));
        let material = point_sprite_material(
            Some(texture),
            settings.nebula_scale,
            settings.nebula_opacity,
            0.0,
            PointMaterialFlags::ADDITIVE,
        );
        children.push(
            commands
                .spawn((
                    NebulaField,
                    part,
                    Mesh3d(meshes.add(create_point_cloud_mesh(&nebulae, 1.0))),
                    MeshMaterial3d(materials.add(material)),
                    Transform::default(),
                    Visibility::default(),
                    NotShadowCaster,
                ))
                .id(),
        );
    }

    if settings.core_glow_scale > 0.0 {
        let mut core = PointCloudBuilder::with_capacity(1);
        core.push(Vec3::ZERO, [1.0; 3]);
        let texture = images.add(glow_texture(CORE_GLOW_COLOR, GLOW_TEXTURE_SIZE));
        let material = point_sprite_material(
            Some(texture),
            settings.core_glow_scale,
            CORE_GLOW_OPACITY,
            0.0,
            PointMaterialFlags::ADDITIVE,
        );
        children.push(
            commands
                .spawn((
                    NebulaField,
                    part,
                    Mesh3d(meshes.add(create_point_cloud_mesh(&core.finish(), 1.0))),
                    MeshMaterial3d(materials.add(material)),
                    Transform::default(),
                    Visibility::default(),
                    NotShadowCaster,
                ))
                .id(),
        );
    }

    commands.entity(starfield_entity).add_children(&children);
}

/// Resolves pending constellation images.
///
/// A loaded image is cropped into a neon texture, the near and far layers are
/// spawned and the group becomes visible. A failed load is logged, the group's
/// meshes are released and it stays hidden for good. Each group resolves on its
/// own, in any order.
pub fn poll_group_assets(
    mut commands: Commands,
    mut groups: Query<(Entity, &StarfieldPart, &mut ParticleGroupBinding), Without<AttachedGroup>>,
    starfields: Query<&Starfield>,
    assets: Res<Assets<StarfieldAsset>>,
    asset_server: Res<AssetServer>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut images: ResMut<Assets<Image>>,
    mut materials: ResMut<Assets<PointSpriteMaterial>>,
) {
    for (group_entity, part, mut binding) in groups.iter_mut() {
        if !binding.state.is_pending() {
            continue;
        }
        let Some(image) = binding.image.clone() else {
            continue;
        };

        let settings = starfields
            .get(part.parent)
            .ok()
            .and_then(|starfield| assets.get(&starfield.handle))
            .map(|asset| asset.constellations.clone())
            .unwrap_or_default();

        let texture = match images.get(&image) {
            Some(source) => neon_texture(source, settings.texture_size, settings.corner_radius),
            None => {
                if let LoadState::Failed(error) = asset_server.load_state(&image) {
                    warn!("constellation {}: {error}", binding.index);
                    fail_group(&mut binding, &mut meshes, error.to_string());
                }
                continue;
            }
        };

        let texture = match texture {
            Ok(texture) => texture,
            Err(error) => {
                warn!("constellation {}: {error}, skipping", binding.index);
                fail_group(&mut binding, &mut meshes, error.to_string());
                continue;
            }
        };
        let Some(group_meshes) = binding.meshes.clone() else {
            continue;
        };

        let group_materials =
            build_group_materials(&settings, texture, &mut images, &mut materials);
        let near = spawn_layer(
            &mut commands,
            GroupLayer::Near,
            group_meshes.near,
            group_materials.near.clone(),
        );
        let far = spawn_layer(
            &mut commands,
            GroupLayer::Far,
            group_meshes.far,
            group_materials.far.clone(),
        );
        commands
            .entity(group_entity)
            .insert((AttachedGroup, Visibility::Inherited))
            .add_children(&[near, far]);

        debug!(
            "constellation {} attached with {} points",
            binding.index, binding.point_count
        );
        binding.state = GroupLoadState::Loaded(group_materials);
    }
}

fn fail_group(binding: &mut ParticleGroupBinding, meshes: &mut Assets<Mesh>, reason: String) {
    binding.state = GroupLoadState::Failed(GroupError::AssetLoad(reason));
    if let Some(group_meshes) = binding.meshes.take() {
        meshes.remove(&group_meshes.near);
        meshes.remove(&group_meshes.far);
    }
}

fn build_group_materials(
    settings: &ConstellationSettings,
    texture: Image,
    images: &mut Assets<Image>,
    materials: &mut Assets<PointSpriteMaterial>,
) -> GroupMaterials {
    let texture = images.add(texture);
    let near = materials.add(point_sprite_material(
        Some(texture.clone()),
        settings.point_size,
        1.0,
        settings.alpha_cutoff,
        PointMaterialFlags::empty(),
    ));
    let far = materials.add(point_sprite_material(
        Some(texture.clone()),
        settings.point_size,
        1.0,
        settings.alpha_cutoff,
        PointMaterialFlags::ADDITIVE,
    ));
    GroupMaterials {
        texture,
        near,
        far,
    }
}

fn spawn_layer(
    commands: &mut Commands,
    layer: GroupLayer,
    mesh: Handle<Mesh>,
    material: Handle<PointSpriteMaterial>,
) -> Entity {
    commands
        .spawn((
            layer,
            Mesh3d(mesh),
            MeshMaterial3d(material),
            Transform::default(),
            Visibility::default(),
            NotShadowCaster,
        ))
        .id()
}

/// Advances the shader clock, the ripple and every shooting star by one frame.
pub fn advance_animator(time: Res<Time>, mut animator: ResMut<AnimatorState>) {
    animator.advance(time.delta_secs());
}

/// Mirrors the shooting star pool into the scene.
///
/// Retired stars are despawned, new ones get a trail and a head, and every
/// live star's trail mesh is rewritten in place.
pub fn sync_shooting_stars(
    mut commands: Commands,
    mut animator: ResMut<AnimatorState>,
    star_assets: Res<ShootingStarAssets>,
    mut meshes: ResMut<Assets<Mesh>>,
    stars: Query<(Entity, &ShootingStarEntity)>,
    mut heads: Query<&mut Transform, With<ShootingStarHead>>,
    mut spawned: Local<Vec<ShootingStarId>>,
) {
    for id in animator.drain_expired() {
        for (entity, star) in stars.iter() {
            if star.id == id {
                commands.entity(entity).despawn();
            }
        }
    }

    spawned.extend(animator.drain_spawned());
    let head_radius = animator.settings().shooting_star.head_radius;
    for id in spawned.drain(..) {
        let Some(star) = animator.star(id) else {
            continue;
        };

        let trail_mesh = meshes.add(create_trail_mesh(star.trail.iter()));
        let glow = commands
            .spawn((
                Mesh3d(star_assets.head_mesh.clone()),
                MeshMaterial3d(star_assets.glow_material.clone()),
                Transform::from_scale(Vec3::splat(star_assets.glow_scale)),
                NotShadowCaster,
            ))
            .id();
        let head = commands
            .spawn((
                ShootingStarHead,
                Mesh3d(star_assets.head_mesh.clone()),
                MeshMaterial3d(star_assets.head_material.clone()),
                Transform::from_translation(star.head()).with_scale(Vec3::splat(head_radius)),
                NotShadowCaster,
            ))
            .add_child(glow)
            .id();
        commands
            .spawn((
                ShootingStarEntity {
                    id,
                    trail_mesh: trail_mesh.clone(),
                    head,
                },
                Mesh3d(trail_mesh),
                MeshMaterial3d(star_assets.trail_material.clone()),
                Transform::default(),
                Visibility::default(),
                NotShadowCaster,
            ))
            .add_child(head);
    }

    for (_, star_entity) in stars.iter() {
        let Some(star) = animator.star(star_entity.id) else {
            continue;
        };
        if let Some(mesh) = meshes.get_mut(&star_entity.trail_mesh) {
            update_trail_mesh(mesh, star.trail.iter());
        }
        if let Ok(mut transform) = heads.get_mut(star_entity.head) {
            transform.translation = star.head();
        }
    }
}

/// Pushes the animator's uniforms into every galaxy material.
pub fn sync_galaxy_uniforms(
    animator: Res<AnimatorState>,
    galaxies: Query<&MeshMaterial3d<GalaxyMaterial>, With<GalaxyField>>,
    mut materials: ResMut<Assets<GalaxyMaterial>>,
) {
    let uniforms = animator.uniforms();
    for material in galaxies.iter() {
        if let Some(material) = materials.get_mut(&material.0) {
            material.extension.uniforms = uniforms;
        }
    }
}

/// Despawns the parts of starfields whose [`Starfield`] component went away.
pub fn cleanup_starfield_entities(
    mut commands: Commands,
    mut removed: RemovedComponents<Starfield>,
    parts: Query<(Entity, &StarfieldPart)>,
) {
    for removed_starfield in removed.read() {
        for (entity, part) in parts.iter() {
            if part.parent == removed_starfield {
                commands.entity(entity).despawn();
            }
        }
        if let Ok(mut entity) = commands.get_entity(removed_starfield) {
            entity.remove::<StarfieldRuntime>();
        }
    }
}
