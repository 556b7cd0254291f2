//! GPU asset storage.
//!
//! Meshes, materials, and textures live in arenas owned by the renderer;
//! render objects refer to them through copyable index handles. Handles are
//! only valid for the store that issued them.

use std::sync::Arc;

use glacier_rhi::pipeline::{Pipeline, PipelineLayout};
use glacier_rhi::vk;

use crate::mesh::Mesh;
use crate::texture::Texture;

/// Index of a mesh in the [`AssetStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub(crate) usize);

/// Index of a material in the [`AssetStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialHandle(pub(crate) usize);

/// Index of a texture in the [`AssetStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub(crate) usize);

/// A pipeline plus its bind state. Materials sharing a pipeline layout
/// share the `Arc`.
pub struct Material {
    pipeline: Pipeline,
    layout: Arc<PipelineLayout>,
    texture_set: Option<vk::DescriptorSet>,
}

impl Material {
    pub fn new(
        pipeline: Pipeline,
        layout: Arc<PipelineLayout>,
        texture_set: Option<vk::DescriptorSet>,
    ) -> Self {
        Self {
            pipeline,
            layout,
            texture_set,
        }
    }

    #[inline]
    pub fn pipeline(&self) -> vk::Pipeline {
        self.pipeline.handle()
    }

    #[inline]
    pub fn pipeline_layout(&self) -> vk::PipelineLayout {
        self.layout.handle()
    }

    /// Descriptor set for set 2 when the material samples a texture.
    #[inline]
    pub fn texture_set(&self) -> Option<vk::DescriptorSet> {
        self.texture_set
    }
}

/// Arena container for GPU assets. Insertion returns a handle; lookups are
/// `Option` so a stale handle surfaces as a skipped draw rather than a
/// panic.
#[derive(Default)]
pub struct AssetStore {
    meshes: Vec<Mesh>,
    materials: Vec<Material>,
    textures: Vec<Texture>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshHandle {
        self.meshes.push(mesh);
        MeshHandle(self.meshes.len() - 1)
    }

    pub fn add_material(&mut self, material: Material) -> MaterialHandle {
        self.materials.push(material);
        MaterialHandle(self.materials.len() - 1)
    }

    pub fn add_texture(&mut self, texture: Texture) -> TextureHandle {
        self.textures.push(texture);
        TextureHandle(self.textures.len() - 1)
    }

    #[inline]
    pub fn mesh(&self, handle: MeshHandle) -> Option<&Mesh> {
        self.meshes.get(handle.0)
    }

    #[inline]
    pub fn material(&self, handle: MaterialHandle) -> Option<&Material> {
        self.materials.get(handle.0)
    }

    #[inline]
    pub fn texture(&self, handle: TextureHandle) -> Option<&Texture> {
        self.textures.get(handle.0)
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    /// Drops every stored asset. Called during renderer teardown while the
    /// device is still alive.
    pub fn clear(&mut self) {
        self.meshes.clear();
        self.materials.clear();
        self.textures.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_index_in_insertion_order() {
        assert_eq!(MeshHandle(0), MeshHandle(0));
        assert_ne!(MaterialHandle(0), MaterialHandle(1));
    }

    #[test]
    fn empty_store_resolves_nothing() {
        let store = AssetStore::new();
        assert!(store.mesh(MeshHandle(0)).is_none());
        assert!(store.material(MaterialHandle(3)).is_none());
        assert_eq!(store.mesh_count(), 0);
    }
}
