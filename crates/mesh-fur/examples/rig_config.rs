//! Example: Fur Rig Configuration
//!
//! Builds a `FurRigConfig` in code, round-trips it through TOML and JSON,
//! then grows fur on a cube and drags it sideways for a second.
//!
//! Run with: `cargo run -p mesh-fur --example rig_config`

use mesh_fur::{Color, FurRig, FurRigConfig, StiffnessCurve};
use mesh_surface::{Surface, TargetMesh, Vertex};
use nalgebra::Point3;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // =========================================================================
    // 1. Create a config programmatically
    // =========================================================================

    let config = FurRigConfig::new(0.5, 12.0)
        .with_stiffness(StiffnessCurve::linear([(0.0, 0.9), (0.6, 0.4), (1.0, 0.1)]))
        .with_colours(Color::rgb(0.1, 0.08, 0.05), Color::rgb(0.9, 0.85, 0.7))
        .with_velocity_reaction_time_factor(4.0)
        .with_material("fur_shell");

    // =========================================================================
    // 2. Serialize to TOML and JSON
    // =========================================================================

    let toml_str = config.to_toml()?;
    println!("=== TOML Output ===\n{}", toml_str);

    let json_str = config.to_json()?;
    println!("=== JSON Output ===\n{}", json_str);

    // =========================================================================
    // 3. Parse a hand-written config
    // =========================================================================

    let toml_input = r#"
        shell_height = 0.5
        shell_count = 12.0
        surface_allow_list = [0]
        velocity_reaction_time_factor = 4.0
        velocity_convention = "trailing"

        [stiffness]
        kind = "constant"
        value = 0.35
    "#;

    let parsed = FurRigConfig::from_toml(toml_input)?;
    println!(
        "\n=== Parsed Config ===\nLayers: {}\nDelta: {:.4}",
        parsed.layer_count(),
        parsed.layer_delta()
    );
    for warning in parsed.validate() {
        println!("  warning: {}", warning);
    }

    // =========================================================================
    // 4. Grow fur on a cube and move it
    // =========================================================================

    let cube = TargetMesh::new("cube", vec![create_test_cube()]);
    let mut rig = FurRig::setup(&cube, parsed, Point3::origin());
    println!(
        "\n=== Rig ===\nTargets: {}\nLayers: {}",
        rig.targets().len(),
        rig.layer_count()
    );

    let dt = 1.0 / 60.0;
    for frame in 1..=60 {
        rig.tick(Point3::new(frame as f64 * 0.05, 0.0, 0.0), dt);
    }

    println!("\nOffsets after one second of motion:");
    for layer in rig.layers() {
        println!(
            "  #{:02} depth={:.3} offset=({:+.4}, {:+.4}, {:+.4})",
            layer.layer_index, layer.normalized_depth, layer.offset.x, layer.offset.y, layer.offset.z
        );
    }

    Ok(())
}

/// Create a simple test cube surface
fn create_test_cube() -> Surface {
    let mut surface = Surface::new();

    surface.vertices = vec![
        Vertex::from_coords(0.0, 0.0, 0.0),
        Vertex::from_coords(10.0, 0.0, 0.0),
        Vertex::from_coords(10.0, 10.0, 0.0),
        Vertex::from_coords(0.0, 10.0, 0.0),
        Vertex::from_coords(0.0, 0.0, 10.0),
        Vertex::from_coords(10.0, 0.0, 10.0),
        Vertex::from_coords(10.0, 10.0, 10.0),
        Vertex::from_coords(0.0, 10.0, 10.0),
    ];

    surface.faces = vec![
        [0, 2, 1],
        [0, 3, 2],
        [4, 5, 6],
        [4, 6, 7],
        [0, 1, 5],
        [0, 5, 4],
        [2, 3, 7],
        [2, 7, 6],
        [0, 4, 7],
        [0, 7, 3],
        [1, 2, 6],
        [1, 6, 5],
    ];

    surface
}
