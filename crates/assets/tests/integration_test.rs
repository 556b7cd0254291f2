//! Integration tests for asset loading against the bundled demo assets.

use std::path::Path;

use glacier_assets::load_obj;

#[test]
fn load_monkey_obj() {
    let mesh_path = Path::new("../../assets/monkey_smooth.obj");

    // Skip if the demo assets are not checked out
    if !mesh_path.exists() {
        println!("Skipping test: mesh not found at {:?}", mesh_path);
        return;
    }

    let mesh = load_obj(mesh_path).expect("Failed to load OBJ mesh");

    assert!(!mesh.vertices.is_empty(), "Mesh should have vertices");
    assert_eq!(
        mesh.vertex_count() % 3,
        0,
        "Flattened mesh should be whole triangles"
    );

    for vertex in &mesh.vertices {
        assert!(
            vertex.normal.length() > 0.0,
            "Every vertex should carry a normal"
        );
    }

    println!(
        "Loaded mesh: {} vertices, {} triangles",
        mesh.vertex_count(),
        mesh.triangle_count()
    );
}
