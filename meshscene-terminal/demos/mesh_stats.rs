/// Example: Print buffer sizes and model matrices for a scene description
///
/// Usage: cargo run --example mesh_stats -- path/to/scene.txt
use std::env;
use std::fs;
use std::io;

use meshscene_core::{Scene, Transform};
use meshscene_terminal::DEMO_DESCRIPTION;

fn main() -> io::Result<()> {
    let text = match env::args().nth(1) {
        Some(path) => fs::read_to_string(&path)?,
        None => {
            eprintln!("No description file provided, using the demo scene...");
            DEMO_DESCRIPTION.to_string()
        }
    };

    let scene = Scene::from_description(&text)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;

    for object in scene.objects() {
        let Some(mesh) = scene.mesh(&object.name) else {
            continue;
        };
        let Some(model) = scene.model_matrix(&object.name) else {
            continue;
        };
        println!(
            "{:<12} {:<12} vertices={:<5} triangles={:<5} lines={:<5}",
            object.name,
            object.primitive,
            mesh.vertex_count(),
            mesh.triangle_count(),
            mesh.line_indices.len() / 2
        );
        for row in Transform::to_row_major(&model).chunks(4) {
            println!("    {:>8.3} {:>8.3} {:>8.3} {:>8.3}", row[0], row[1], row[2], row[3]);
        }
    }

    Ok(())
}
