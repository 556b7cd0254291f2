//! Demo scene construction.
//!
//! Builds the showcase scene: a monkey head at the origin surrounded by a
//! 41x41 grid of small triangles, plus a textured map when its assets are
//! on disk. Missing optional assets degrade to the procedural parts.

use std::path::Path;

use glam::{Mat4, Vec3};
use tracing::{info, warn};

use glacier_assets::{MeshData, TextureData, load_obj, load_png};

use crate::assets::{MaterialHandle, MeshHandle};
use crate::error::RenderResult;
use crate::mesh::triangle_vertices;
use crate::render_object::RenderObject;
use crate::renderer::Renderer;

const MONKEY_MESH_PATH: &str = "assets/monkey_smooth.obj";
const MAP_MESH_PATH: &str = "assets/lost_empire.obj";
const MAP_TEXTURE_PATH: &str = "assets/lost_empire-RGBA.png";

/// Half-width of the triangle grid; the grid spans `-GRID_EXTENT..=GRID_EXTENT`
/// on both axes.
const GRID_EXTENT: i32 = 20;
const GRID_SCALE: f32 = 0.2;

/// Populates `renderer` with the demo scene.
pub fn build_demo_scene(renderer: &mut Renderer) -> RenderResult<()> {
    let triangle_mesh = renderer.add_mesh(&triangle_vertices())?;
    let default_material = renderer.create_default_material()?;

    let mut objects = Vec::new();

    match load_obj(Path::new(MONKEY_MESH_PATH)) {
        Ok(monkey) => {
            let monkey_mesh = renderer.add_mesh_from_data(&monkey)?;
            objects.push(RenderObject {
                mesh: monkey_mesh,
                material: default_material,
                transform: Mat4::IDENTITY,
            });
        }
        Err(e) => warn!("Monkey mesh unavailable, skipping: {}", e),
    }

    if let Some((map, map_texture)) =
        load_map_assets(Path::new(MAP_MESH_PATH), Path::new(MAP_TEXTURE_PATH))
    {
        let map_mesh = renderer.add_mesh_from_data(&map)?;
        let map_material = renderer.create_textured_material(&map_texture)?;
        objects.push(RenderObject {
            mesh: map_mesh,
            material: map_material,
            transform: Mat4::from_translation(Vec3::new(5.0, -10.0, 0.0)),
        });
    }

    objects.extend(triangle_grid(triangle_mesh, default_material));

    info!("Demo scene built: {} objects", objects.len());
    renderer.set_render_objects(objects);
    Ok(())
}

/// Loads the map mesh and its texture together. Any failure skips the map
/// and leaves the rest of the scene intact.
fn load_map_assets(mesh_path: &Path, texture_path: &Path) -> Option<(MeshData, TextureData)> {
    let map = match load_obj(mesh_path) {
        Ok(map) => map,
        Err(e) => {
            warn!("Map mesh unavailable, skipping: {}", e);
            return None;
        }
    };
    let texture = match load_png(texture_path) {
        Ok(texture) => texture,
        Err(e) => {
            warn!("Map texture unavailable, skipping: {}", e);
            return None;
        }
    };
    Some((map, texture))
}

/// The 41x41 grid of scaled-down triangles on the ground plane.
fn triangle_grid(mesh: MeshHandle, material: MaterialHandle) -> Vec<RenderObject> {
    let mut objects = Vec::new();
    for x in -GRID_EXTENT..=GRID_EXTENT {
        for y in -GRID_EXTENT..=GRID_EXTENT {
            let translation = Mat4::from_translation(Vec3::new(x as f32, 0.0, y as f32));
            let scale = Mat4::from_scale(Vec3::splat(GRID_SCALE));
            objects.push(RenderObject {
                mesh,
                material,
                transform: translation * scale,
            });
        }
    }
    objects
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreadable_map_assets_are_skipped() {
        let missing = Path::new("assets/does_not_exist.obj");
        assert!(load_map_assets(missing, Path::new("assets/does_not_exist.png")).is_none());
    }

    #[test]
    fn grid_covers_forty_one_squared_cells() {
        let objects = triangle_grid(MeshHandle(0), MaterialHandle(0));
        assert_eq!(objects.len(), 1681);
    }

    #[test]
    fn grid_shares_one_mesh_and_material() {
        let objects = triangle_grid(MeshHandle(3), MaterialHandle(7));
        assert!(objects
            .iter()
            .all(|o| o.mesh == MeshHandle(3) && o.material == MaterialHandle(7)));
    }

    #[test]
    fn grid_corner_transform_scales_and_translates() {
        let objects = triangle_grid(MeshHandle(0), MaterialHandle(0));

        let first = objects[0].transform;
        assert_eq!(first.w_axis.truncate(), Vec3::new(-20.0, 0.0, -20.0));
        assert!((first.x_axis.x - GRID_SCALE).abs() < f32::EPSILON);

        let last = objects[objects.len() - 1].transform;
        assert_eq!(last.w_axis.truncate(), Vec3::new(20.0, 0.0, 20.0));
    }

    #[test]
    fn grid_center_cell_sits_at_origin() {
        let objects = triangle_grid(MeshHandle(0), MaterialHandle(0));
        let center = objects[objects.len() / 2].transform;
        assert_eq!(center.w_axis.truncate(), Vec3::ZERO);
    }
}
