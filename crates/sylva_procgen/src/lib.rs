pub mod anim;
pub mod curve;
pub mod error;
pub mod rng;
pub mod scatter;
pub mod terrain;
pub mod tree;

// Re-export commonly used items
pub use anim::{apply_schedule, build_schedule, AnimationSchedule};
pub use curve::{grow_curve, point_at};
pub use error::GenError;
pub use rng::RandomSequence;
pub use scatter::{scatter_grass, scatter_trees, GrassReport};
pub use terrain::{HeightField, SurfaceSample, TerrainConfig};
pub use tree::{generate_tree, BranchPolicy, GeneratedTree, GrowthParams, TreeRecipe};
