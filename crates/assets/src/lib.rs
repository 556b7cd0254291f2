//! Asset loading: OBJ meshes and PNG textures, decoded on the CPU with no
//! GPU dependencies.

mod error;
pub mod mesh_data;
pub mod texture_data;

pub use error::{AssetError, AssetResult};
pub use mesh_data::{MeshData, VertexData, load_obj};
pub use texture_data::{TextureData, load_png};
