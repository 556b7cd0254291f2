//! Rendering pipeline for the Glacier engine.
//!
//! This crate ties the RHI layer into a working frame loop:
//! - Double-buffered frame contexts and pacing
//! - GPU asset storage (meshes, materials, textures)
//! - Draw batching over render objects
//! - The demo scene

pub mod assets;
pub mod error;
pub mod frame;
pub mod gpu_types;
pub mod mesh;
pub mod render_object;
pub mod renderer;
pub mod scene_builder;
pub mod texture;

pub use assets::{AssetStore, Material, MaterialHandle, MeshHandle, TextureHandle};
pub use error::{RenderError, RenderResult};
pub use frame::{frame_slot, FrameContext};
pub use gpu_types::{GpuCameraData, GpuObjectData, GpuSceneData, MAX_OBJECTS};
pub use mesh::Mesh;
pub use render_object::{material_batches, RenderObject};
pub use renderer::Renderer;
pub use scene_builder::build_demo_scene;
pub use texture::Texture;
