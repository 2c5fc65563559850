use clap::Parser;
use sylva_forest::{generate_forest, ForestConfig};
use sylva_scene::{MemoryScene, SceneHost};

/// Generate a terrain, forest, and grass layout into an in-memory scene and
/// report what was built.
#[derive(Parser, Debug)]
#[command(name = "sylva_studio", version, about)]
struct Args {
    /// Randomness seed; the same seed reproduces the same layout
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Terrain footprint width
    #[arg(long, default_value_t = 150.0)]
    width: f32,

    /// Terrain footprint depth
    #[arg(long, default_value_t = 150.0)]
    depth: f32,

    /// Grid subdivisions per axis
    #[arg(long, default_value_t = 5)]
    subdivisions: u32,

    /// Height difference between the lowest and highest terrain points
    #[arg(long, default_value_t = 5.0)]
    amplitude: f32,

    /// Fraction of terrain vertices that receive a tree
    #[arg(long, default_value_t = 0.4)]
    tolerance: f32,

    /// Number of tree species to generate
    #[arg(long, default_value_t = 4)]
    variants: u32,

    /// Terrain smoothing rounds before grass placement
    #[arg(long, default_value_t = 4)]
    smooth: u32,

    /// Skip tree generation
    #[arg(long)]
    no_trees: bool,

    /// Skip grass generation
    #[arg(long)]
    no_grass: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let mut config = ForestConfig {
        seed: args.seed,
        trees: !args.no_trees,
        grass: !args.no_grass,
        tree_variants: args.variants,
        tolerance: args.tolerance,
        smooth_iterations: args.smooth,
        ..ForestConfig::default()
    };
    config.terrain.width = args.width;
    config.terrain.depth = args.depth;
    config.terrain.sub_x = args.subdivisions;
    config.terrain.sub_y = args.subdivisions;
    config.terrain.amplitude = args.amplitude;

    let mut scene = MemoryScene::new();
    // The working scene normally ships a leaf asset; stand one in here
    if config.trees {
        if let Err(err) = scene.create_circle_profile(&config.recipe.leaf_source, 0.5, 6) {
            log::error!("could not seed leaf asset: {err}");
            std::process::exit(1);
        }
    }

    println!("=== Sylva Studio ===\n");
    println!(
        "[SCENE] Terrain {}x{} ({}x{} grid), amplitude {}, seed {}",
        args.width, args.depth, args.subdivisions, args.subdivisions, args.amplitude, args.seed
    );

    match generate_forest(&mut scene, &config) {
        Ok(report) => {
            println!("\n[REPORT] Terrain vertices: {}", report.terrain_vertices);
            println!(
                "[REPORT] Trees: {} species, {} branch nodes, {} placed instances",
                report.trees_generated, report.branch_nodes, report.trees_placed
            );
            println!(
                "[REPORT] Grass: {} base clumps, {} placed instances",
                report.grass_clumps, report.grass_instances
            );
            println!("[REPORT] Scene nodes: {}", scene.node_count());
        }
        Err(err) => {
            log::error!("generation failed: {err}");
            std::process::exit(1);
        }
    }
}
