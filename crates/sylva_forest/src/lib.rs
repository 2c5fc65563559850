use glam::Vec3;
use sylva_procgen::error::Result;
use sylva_procgen::scatter::{scatter_grass, scatter_trees, GrassReport, CLUMP_SIZE};
use sylva_procgen::terrain::{HeightField, SurfaceSample, TerrainConfig};
use sylva_procgen::tree::{BranchPolicy, GrowthParams, TreeRecipe};
use sylva_procgen::RandomSequence;
use sylva_scene::{NodeId, SceneHost};

// Re-export commonly used items
pub use sylva_procgen::tree::generate_tree;
pub use sylva_procgen::{GenError, GeneratedTree};

/// Full-pipeline parameters, defaults matching the stock front-end sliders.
///
/// When `trees` is set with a leafy recipe, the recipe's leaf source asset
/// must already exist in the host scene.
#[derive(Debug, Clone)]
pub struct ForestConfig {
    pub terrain_name: String,
    pub terrain: TerrainConfig,
    pub trees: bool,
    pub grass: bool,
    pub tree_variants: u32,
    /// Fraction of terrain vertices that receive a tree instance.
    pub tolerance: f32,
    pub smooth_iterations: u32,
    pub seed: u64,
    /// Base recipe for every variant; radius is randomized per variant.
    pub recipe: TreeRecipe,
    pub policy: BranchPolicy,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            terrain_name: "Terrain".to_string(),
            terrain: TerrainConfig::default(),
            trees: true,
            grass: true,
            tree_variants: 4,
            tolerance: 0.4,
            smooth_iterations: 4,
            seed: 1,
            recipe: TreeRecipe::default(),
            policy: BranchPolicy::default(),
        }
    }
}

/// Counts from a full forest pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForestReport {
    pub terrain_vertices: usize,
    pub trees_generated: usize,
    pub trees_placed: usize,
    pub branch_nodes: usize,
    pub grass_clumps: usize,
    pub grass_instances: usize,
}

/// Build a displaced terrain grid under `name`.
pub fn generate_terrain(
    host: &mut dyn SceneHost,
    name: &str,
    config: &TerrainConfig,
    seed: u64,
) -> Result<HeightField> {
    let mut rng = RandomSequence::new(seed);
    HeightField::build(host, &mut rng, name, config)
}

/// Scatter grass clumps over pre-sampled surface points, parented under the
/// given node.
pub fn generate_grass(
    host: &mut dyn SceneHost,
    parent: NodeId,
    samples: &[SurfaceSample],
    seed: u64,
) -> Result<GrassReport> {
    let mut rng = RandomSequence::new(seed);
    scatter_grass(host, &mut rng, samples, parent, CLUMP_SIZE)
}

/// The full pipeline: terrain, tree variants scattered over sampled points,
/// smoothing, then grass over the refined grid.
pub fn generate_forest(host: &mut dyn SceneHost, config: &ForestConfig) -> Result<ForestReport> {
    let mut rng = RandomSequence::new(config.seed);
    let mut terrain = HeightField::build(host, &mut rng, &config.terrain_name, &config.terrain)?;
    let mut report = ForestReport::default();

    if config.trees {
        let points = terrain.sample_by_probability(host, &mut rng, config.tolerance)?;
        log::info!(
            "forest `{}`: {} placement points at tolerance {}",
            config.terrain_name,
            points.len(),
            config.tolerance
        );

        let mut trees = Vec::with_capacity(config.tree_variants as usize);
        for variant in 0..config.tree_variants {
            let name = format!("{}_Tree{}", config.terrain_name, variant);
            let recipe = TreeRecipe {
                radius: rng.uniform(0.5, 1.5),
                ..config.recipe.clone()
            };
            let growth = GrowthParams {
                density: rng.uniform(0.15, 0.25),
                branch_start: 1.0,
                recursion_level: rng.integer(2, 3) as u32,
                height: rng.integer(15, 40) as f32,
            };
            let tree = generate_tree(
                host,
                &mut rng,
                &name,
                &recipe,
                &growth,
                &config.policy,
                config.seed + variant as u64,
                Vec3::ZERO,
                Some(terrain.mesh),
            )?;
            report.branch_nodes += tree.arena.len();
            trees.push(tree);
        }
        report.trees_generated = trees.len();
        report.trees_placed = scatter_trees(host, &mut rng, &points, &mut trees, terrain.mesh)?;

        // Prototypes stay in the scene as hidden masters for their instances
        for tree in &trees {
            host.set_visibility(tree.handle, false)?;
        }
    }

    terrain.smooth(host, config.smooth_iterations)?;

    if config.grass {
        let points = terrain.sample_by_probability(host, &mut rng, 1.0)?;
        let grass = scatter_grass(host, &mut rng, &points, terrain.mesh, CLUMP_SIZE)?;
        report.grass_clumps = grass.clumps;
        report.grass_instances = grass.instances;
    }

    report.terrain_vertices = terrain.vertex_count();
    log::info!(
        "forest `{}` complete: {} trees placed, {} grass instances",
        config.terrain_name,
        report.trees_placed,
        report.grass_instances
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sylva_scene::MemoryScene;

    fn small_config() -> ForestConfig {
        ForestConfig {
            smooth_iterations: 2,
            ..ForestConfig::default()
        }
    }

    fn scene_with_leaf() -> MemoryScene {
        let mut scene = MemoryScene::new();
        scene.create_circle_profile("Leaf1", 0.5, 6).unwrap();
        scene
    }

    #[test]
    fn test_generate_terrain_entry_point() {
        let mut scene = MemoryScene::new();
        let field =
            generate_terrain(&mut scene, "Ground", &TerrainConfig::default(), 7).unwrap();
        assert_eq!(field.vertex_count(), 36);
        assert_eq!(scene.material_of(field.mesh).unwrap(), Some("MudMat"));
    }

    #[test]
    fn test_full_pipeline_counts() {
        let mut scene = scene_with_leaf();
        let report = generate_forest(&mut scene, &small_config()).unwrap();

        assert_eq!(report.trees_generated, 4);
        assert!(report.trees_placed > 0);
        assert!(report.branch_nodes >= 4);

        // Two smoothing rounds refine 5x5 to 20x20 quads
        assert_eq!(report.terrain_vertices, 441);
        assert_eq!(report.grass_clumps, 3); // ceil(441 / 200)
        assert_eq!(report.grass_instances, 441);
    }

    #[test]
    fn test_pipeline_is_deterministic() {
        let run = || {
            let mut scene = scene_with_leaf();
            let report = generate_forest(&mut scene, &small_config()).unwrap();
            let terrain = scene.lookup("Terrain").unwrap();
            let heights: Vec<f32> = (0..report.terrain_vertices)
                .map(|v| scene.vertex_position(terrain, v).unwrap().y)
                .collect();
            (report, heights)
        };
        let (report_a, heights_a) = run();
        let (report_b, heights_b) = run();
        assert_eq!(report_a, report_b);
        assert_eq!(heights_a, heights_b);
    }

    #[test]
    fn test_seed_changes_layout() {
        let run = |seed: u64| {
            let mut scene = scene_with_leaf();
            let config = ForestConfig {
                seed,
                ..small_config()
            };
            let report = generate_forest(&mut scene, &config).unwrap();
            let terrain = scene.lookup("Terrain").unwrap();
            let heights: Vec<f32> = (0..report.terrain_vertices)
                .map(|v| scene.vertex_position(terrain, v).unwrap().y)
                .collect();
            heights
        };
        assert_ne!(run(1), run(2));
    }

    #[test]
    fn test_prototypes_are_hidden_masters() {
        let mut scene = scene_with_leaf();
        generate_forest(&mut scene, &small_config()).unwrap();

        for variant in 0..4 {
            let proto = scene.lookup(&format!("Terrain_Tree{variant}")).unwrap();
            assert!(!scene.is_visible(proto).unwrap());
        }
    }

    #[test]
    fn test_grass_only_pipeline() {
        let mut scene = MemoryScene::new();
        let config = ForestConfig {
            trees: false,
            ..small_config()
        };
        let report = generate_forest(&mut scene, &config).unwrap();
        assert_eq!(report.trees_generated, 0);
        assert_eq!(report.trees_placed, 0);
        assert_eq!(report.grass_instances, 441);
    }

    #[test]
    fn test_trees_only_pipeline() {
        let mut scene = scene_with_leaf();
        let config = ForestConfig {
            grass: false,
            ..small_config()
        };
        let report = generate_forest(&mut scene, &config).unwrap();
        assert_eq!(report.grass_clumps, 0);
        assert!(report.trees_placed > 0);
        assert!(scene.names_with_prefix("ClumpMain").is_empty());
    }

    #[test]
    fn test_generate_grass_entry_point() {
        let mut scene = MemoryScene::new();
        let parent = scene.create_group("Ground").unwrap();
        let samples: Vec<SurfaceSample> = (0..450)
            .map(|n| SurfaceSample {
                position: Vec3::new(n as f32, 0.0, 0.0),
                height_frac: 0.0,
            })
            .collect();
        let report = generate_grass(&mut scene, parent, &samples, 3).unwrap();
        assert_eq!(report.clumps, 3);
        assert_eq!(report.instances, 450);
    }
}
