use sylva_forest::{generate_forest, ForestConfig};
use sylva_scene::{MemoryScene, SceneHost};

fn main() {
    println!("=== Sylva - Forest Generation Demo ===\n");

    for seed in [1, 2, 42, 1587] {
        let mut scene = MemoryScene::new();
        scene
            .create_circle_profile("Leaf1", 0.5, 6)
            .expect("fresh scene accepts the leaf asset");

        let config = ForestConfig {
            seed,
            smooth_iterations: 2,
            ..ForestConfig::default()
        };

        match generate_forest(&mut scene, &config) {
            Ok(report) => {
                println!("--- Seed {seed} ---");
                println!("Terrain vertices: {}", report.terrain_vertices);
                println!(
                    "Trees: {} species, {} branch nodes, {} instances",
                    report.trees_generated, report.branch_nodes, report.trees_placed
                );
                println!(
                    "Grass: {} clumps, {} instances",
                    report.grass_clumps, report.grass_instances
                );
                println!("Scene nodes: {}\n", scene.node_count());
            }
            Err(err) => {
                println!("Seed {seed} failed: {err}\n");
            }
        }
    }
}
