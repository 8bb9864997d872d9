use bevy::{
    asset::RenderAssetUsages,
    mesh::{Indices, PrimitiveTopology, VertexAttributeValues},
    prelude::*,
};

use crate::cloud::PointCloud;

const QUAD_CORNERS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

/// Builds one billboard quad per point.
///
/// Every corner stores the point center as its position and the corner in
/// `UV_0`; the point shaders expand the quad toward the camera. Colors are
/// written as `[r, g, b, alpha]`.
pub fn create_point_cloud_mesh(cloud: &PointCloud, alpha: f32) -> Mesh {
    let vertex_count = cloud.len() * 4;
    let mut positions: Vec<[f32; 3]> = Vec::with_capacity(vertex_count);
    let mut uvs: Vec<[f32; 2]> = Vec::with_capacity(vertex_count);
    let mut colors: Vec<[f32; 4]> = Vec::with_capacity(vertex_count);
    let mut indices: Vec<u32> = Vec::with_capacity(cloud.len() * 6);

    for (point_index, (position, [r, g, b])) in cloud.iter().enumerate() {
        let base = point_index as u32 * 4;
        for corner in QUAD_CORNERS {
            positions.push(position.to_array());
            uvs.push(corner);
            colors.push([r, g, b, alpha]);
        }
        indices.extend(QUAD_INDICES.iter().map(|i| base + i));
    }

    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::default(),
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    mesh.insert_attribute(Mesh::ATTRIBUTE_COLOR, colors);
    mesh.insert_indices(Indices::U32(indices));
    mesh
}

/// Builds a line strip through `points`.
pub fn create_trail_mesh(points: impl IntoIterator<Item = Vec3>) -> Mesh {
    let positions: Vec<[f32; 3]> = points.into_iter().map(|p| p.to_array()).collect();
    let mut mesh = Mesh::new(PrimitiveTopology::LineStrip, RenderAssetUsages::default());
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh
}

/// Rewrites the vertices of a trail mesh in place.
///
/// Returns `false` if the mesh has no `Float32x3` positions of the right length,
/// which leaves it untouched.
pub fn update_trail_mesh(mesh: &mut Mesh, points: impl ExactSizeIterator<Item = Vec3>) -> bool {
    let Some(VertexAttributeValues::Float32x3(positions)) =
        mesh.attribute_mut(Mesh::ATTRIBUTE_POSITION)
    else {
        return false;
    };
    if positions.len() != points.len() {
        return false;
    }
    for (slot, point) in positions.iter_mut().zip(points) {
        *slot = point.to_array();
    }
    true
}
