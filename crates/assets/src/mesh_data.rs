//! OBJ mesh loading.
//!
//! Meshes are flattened into an unindexed vertex list ready for a single
//! vertex buffer. The color channel does double duty: texture coordinates
//! when the mesh has them, surface normal otherwise.

use std::path::Path;

use glam::Vec3;
use tracing::{info, warn};

use crate::error::{AssetError, AssetResult};

/// One unindexed vertex as read from disk. The render layer converts this
/// into its GPU vertex format.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VertexData {
    pub position: Vec3,
    pub normal: Vec3,
    pub color: Vec3,
}

/// Flat triangle list loaded from an OBJ file.
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    pub vertices: Vec<VertexData>,
}

impl MeshData {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }
}

/// Loads an OBJ file, triangulated, merging all models into one vertex
/// list. Materials are ignored.
pub fn load_obj(path: &Path) -> AssetResult<MeshData> {
    if !path.exists() {
        return Err(AssetError::FileNotFound(path.to_path_buf()));
    }

    let load_options = tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ..Default::default()
    };

    let (models, _materials) =
        tobj::load_obj(path, &load_options).map_err(|e| AssetError::ObjLoad {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    if models.is_empty() {
        return Err(AssetError::NoMeshes(path.to_path_buf()));
    }

    let mut vertices = Vec::new();
    for model in &models {
        let mesh = &model.mesh;
        if mesh.normals.is_empty() {
            warn!("Mesh '{}' has no normals; using up vector", model.name);
        }
        flatten_mesh(
            &mesh.positions,
            &mesh.normals,
            &mesh.texcoords,
            &mesh.indices,
            &mut vertices,
        );
    }

    info!(
        "Loaded OBJ '{}': {} vertices, {} triangles",
        path.display(),
        vertices.len(),
        vertices.len() / 3
    );

    Ok(MeshData { vertices })
}

/// Expands indexed attribute arrays into an unindexed vertex list.
///
/// The vertex format has no dedicated UV channel, so the color channel is
/// overloaded: meshes with texture coordinates store `(u, 1 - v, 0)` there
/// (V flipped for Vulkan's image origin) and everything else is colored by
/// its normal.
fn flatten_mesh(
    positions: &[f32],
    normals: &[f32],
    texcoords: &[f32],
    indices: &[u32],
    out: &mut Vec<VertexData>,
) {
    out.reserve(indices.len());

    for &index in indices {
        let i = index as usize;
        let position = Vec3::new(positions[3 * i], positions[3 * i + 1], positions[3 * i + 2]);

        let normal = if normals.len() >= 3 * i + 3 {
            Vec3::new(normals[3 * i], normals[3 * i + 1], normals[3 * i + 2])
        } else {
            Vec3::Y
        };

        let color = if texcoords.len() >= 2 * i + 2 {
            Vec3::new(texcoords[2 * i], 1.0 - texcoords[2 * i + 1], 0.0)
        } else {
            normal
        };

        out.push(VertexData {
            position,
            normal,
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flatten_expands_indices() {
        // One quad as two triangles over four shared vertices.
        let positions = [
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            1.0, 1.0, 0.0, //
            0.0, 1.0, 0.0,
        ];
        let normals = [
            0.0, 0.0, 1.0, //
            0.0, 0.0, 1.0, //
            0.0, 0.0, 1.0, //
            0.0, 0.0, 1.0,
        ];
        let indices = [0, 1, 2, 0, 2, 3];

        let mut vertices = Vec::new();
        flatten_mesh(&positions, &normals, &[], &indices, &mut vertices);

        assert_eq!(vertices.len(), 6);
        assert_eq!(vertices[0].position, Vec3::ZERO);
        assert_eq!(vertices[3].position, Vec3::ZERO);
        assert_eq!(vertices[5].position, Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn color_mirrors_normal() {
        let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let normals = [0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0];
        let indices = [0, 1, 2];

        let mut vertices = Vec::new();
        flatten_mesh(&positions, &normals, &[], &indices, &mut vertices);

        for vertex in &vertices {
            assert_eq!(vertex.color, vertex.normal);
        }
    }

    #[test]
    fn texcoords_take_over_the_color_channel() {
        let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let normals = [0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0];
        let texcoords = [0.0, 0.0, 1.0, 0.0, 0.5, 1.0];
        let indices = [0, 1, 2];

        let mut vertices = Vec::new();
        flatten_mesh(&positions, &normals, &texcoords, &indices, &mut vertices);

        assert_eq!(vertices[0].color, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(vertices[1].color, Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(vertices[2].color, Vec3::new(0.5, 0.0, 0.0));
    }

    #[test]
    fn missing_normals_fall_back_to_up() {
        let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let indices = [0, 1, 2];

        let mut vertices = Vec::new();
        flatten_mesh(&positions, &[], &[], &indices, &mut vertices);

        for vertex in &vertices {
            assert_eq!(vertex.normal, Vec3::Y);
        }
    }

    #[test]
    fn missing_file_is_reported() {
        let result = load_obj(Path::new("does_not_exist.obj"));
        assert!(matches!(result, Err(AssetError::FileNotFound(_))));
    }
}
