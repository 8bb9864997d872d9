use bevy::{
    mesh::MeshVertexBufferLayoutRef,
    pbr::{
        ExtendedMaterial, MaterialExtension, MaterialExtensionKey, MaterialExtensionPipeline,
        MeshPipelineKey,
    },
    prelude::*,
    render::render_resource::{
        AsBindGroup, RenderPipelineDescriptor, ShaderType, SpecializedMeshPipelineError,
    },
    shader::ShaderRef,
};
use bitflags::bitflags;
use bytemuck::{Pod, Zeroable};

const GALAXY_SHADER_PATH: &str = "embedded://bevy_starfield/shaders/galaxy_points.wgsl";
const POINT_SPRITE_SHADER_PATH: &str = "embedded://bevy_starfield/shaders/point_sprite.wgsl";

/// Galaxy point material: additive, screen-space sized, ripple-aware.
pub type GalaxyMaterial = ExtendedMaterial<StandardMaterial, GalaxyMaterialExtension>;

/// Textured or round billboard points in world-space size.
pub type PointSpriteMaterial = ExtendedMaterial<StandardMaterial, PointSpriteExtension>;

/// Uniform block shared with the galaxy shader.
///
/// `ripple_time` is `-1.0` while no ripple is active.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, ShaderType, Reflect)]
#[repr(C)]
pub struct GalaxyUniforms {
    /// Seconds since the scene started.
    pub time: f32,
    /// Point size in pixels at unit view depth.
    pub size: f32,
    /// Time the current ripple started.
    pub ripple_time: f32,
    /// Ripple front speed in world units per second.
    pub ripple_speed: f32,
    /// Half-thickness of the ripple shell.
    pub ripple_width: f32,
}

/// Material extension driving the galaxy point shader.
#[derive(Asset, AsBindGroup, Reflect, Debug, Clone, Default)]
pub struct GalaxyMaterialExtension {
    /// Animated shader inputs, refreshed every frame.
    #[uniform(100)]
    pub uniforms: GalaxyUniforms,
}

impl MaterialExtension for GalaxyMaterialExtension {
    fn vertex_shader() -> ShaderRef {
        GALAXY_SHADER_PATH.into()
    }

    fn fragment_shader() -> ShaderRef {
        GALAXY_SHADER_PATH.into()
    }

    fn specialize(
        _pipeline: &MaterialExtensionPipeline,
        descriptor: &mut RenderPipelineDescriptor,
        _layout: &MeshVertexBufferLayoutRef,
        _key: MaterialExtensionKey<Self>,
    ) -> Result<(), SpecializedMeshPipelineError> {
        if let Some(depth_stencil) = &mut descriptor.depth_stencil {
            depth_stencil.depth_write_enabled = false;
        }
        Ok(())
    }
}

/// Builds the galaxy material.
pub fn galaxy_material(uniforms: GalaxyUniforms) -> GalaxyMaterial {
    ExtendedMaterial {
        base: StandardMaterial {
            unlit: true,
            alpha_mode: AlphaMode::Add,
            ..default()
        },
        extension: GalaxyMaterialExtension { uniforms },
    }
}

bitflags! {
    /// Blending and shape options for [`PointSpriteExtension`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PointMaterialFlags: u32 {
        /// Alpha-blended. Disables depth writes.
        const TRANSPARENT = 1 << 0;
        /// Additively blended. Disables depth writes. Takes precedence over `TRANSPARENT`.
        const ADDITIVE = 1 << 1;
        /// Discards fragments outside the inscribed circle of each sprite.
        const ROUND = 1 << 2;
    }
}

impl PointMaterialFlags {
    /// Alpha mode implied by these flags; opaque sprites are alpha-tested at `alpha_cutoff`.
    pub fn alpha_mode(self, alpha_cutoff: f32) -> AlphaMode {
        if self.contains(Self::ADDITIVE) {
            AlphaMode::Add
        } else if self.contains(Self::TRANSPARENT) {
            AlphaMode::Blend
        } else {
            AlphaMode::Mask(alpha_cutoff)
        }
    }

    /// Whether sprites with these flags write depth.
    pub fn writes_depth(self) -> bool {
        !self.intersects(Self::TRANSPARENT | Self::ADDITIVE)
    }
}

/// Uniform block shared with the point sprite shader.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, ShaderType, Reflect)]
#[repr(C)]
pub struct PointSpriteUniforms {
    /// World-space side of each sprite.
    pub size: f32,
    /// Fragments with lower alpha are discarded, whatever the blend mode.
    pub alpha_cutoff: f32,
    /// Multiplier applied to the final alpha.
    pub opacity: f32,
    /// Bits of [`PointMaterialFlags`].
    pub flags: u32,
}

/// Material extension for billboard point sprites.
#[derive(Asset, AsBindGroup, Reflect, Debug, Clone, Default)]
pub struct PointSpriteExtension {
    /// Size, cutoff, opacity and flags.
    #[uniform(100)]
    pub uniforms: PointSpriteUniforms,
    /// Sprite texture. Untextured sprites sample white.
    #[texture(101)]
    #[sampler(102)]
    pub texture: Option<Handle<Image>>,
}

impl PointSpriteExtension {
    /// Flags stored in the uniform block.
    pub fn flags(&self) -> PointMaterialFlags {
        PointMaterialFlags::from_bits_truncate(self.uniforms.flags)
    }
}

impl MaterialExtension for PointSpriteExtension {
    fn vertex_shader() -> ShaderRef {
        POINT_SPRITE_SHADER_PATH.into()
    }

    fn fragment_shader() -> ShaderRef {
        POINT_SPRITE_SHADER_PATH.into()
    }

    fn specialize(
        _pipeline: &MaterialExtensionPipeline,
        descriptor: &mut RenderPipelineDescriptor,
        _layout: &MeshVertexBufferLayoutRef,
        key: MaterialExtensionKey<Self>,
    ) -> Result<(), SpecializedMeshPipelineError> {
        let blended = key.mesh_key.contains(MeshPipelineKey::BLEND_ALPHA)
            || key
                .mesh_key
                .contains(MeshPipelineKey::BLEND_PREMULTIPLIED_ALPHA);

        if let Some(depth_stencil) = &mut descriptor.depth_stencil {
            depth_stencil.depth_write_enabled = !blended;
        }

        Ok(())
    }
}

/// Builds a point sprite material.
pub fn point_sprite_material(
    texture: Option<Handle<Image>>,
    size: f32,
    opacity: f32,
    alpha_cutoff: f32,
    flags: PointMaterialFlags,
) -> PointSpriteMaterial {
    ExtendedMaterial {
        base: StandardMaterial {
            unlit: true,
            alpha_mode: flags.alpha_mode(alpha_cutoff),
            ..default()
        },
        extension: PointSpriteExtension {
            uniforms: PointSpriteUniforms {
                size,
                alpha_cutoff,
                opacity,
                flags: flags.bits(),
            },
            texture,
        },
    }
}
