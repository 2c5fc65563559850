use glam::Vec3;
use sylva_scene::{NodeId, SceneHost};

use crate::error::{GenError, Result};
use crate::rng::RandomSequence;

/// Terrain build parameters, defaults matching the stock front-end sliders.
#[derive(Debug, Clone)]
pub struct TerrainConfig {
    pub width: f32,
    pub depth: f32,
    pub sub_x: u32,
    pub sub_y: u32,
    pub amplitude: f32,
    pub material: String,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            width: 150.0,
            depth: 150.0,
            sub_x: 5,
            sub_y: 5,
            amplitude: 5.0,
            material: "MudMat".to_string(),
        }
    }
}

/// A kept surface vertex plus its normalized height within the grid's
/// vertical span (0 = bottom, 1 = top), used to bias downstream generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSample {
    pub position: Vec3,
    pub height_frac: f32,
}

/// A displaced grid mesh living in the host, with enough bookkeeping to
/// sample its surface after smoothing.
#[derive(Debug)]
pub struct HeightField {
    pub mesh: NodeId,
    pub name: String,
    sub_x: u32,
    sub_y: u32,
    smooth_factor: u32,
}

impl HeightField {
    /// Build the lattice and displace every vertex once, row-major, by a
    /// random offset in [-amplitude, amplitude]. Validation happens before
    /// any host mutation; a prior asset under the same name is replaced.
    pub fn build(
        host: &mut dyn SceneHost,
        rng: &mut RandomSequence,
        name: &str,
        config: &TerrainConfig,
    ) -> Result<Self> {
        if config.sub_x < 1 || config.sub_y < 1 {
            return Err(GenError::InvalidDimension(format!(
                "subdivisions must be at least 1, got {}x{}",
                config.sub_x, config.sub_y
            )));
        }
        if config.width <= 0.0 || config.depth <= 0.0 {
            return Err(GenError::InvalidDimension(format!(
                "footprint must be positive, got {}x{}",
                config.width, config.depth
            )));
        }

        host.delete(name)?;
        let mesh = host.create_mesh_grid(name, config.width, config.depth, config.sub_x, config.sub_y)?;

        // The draw order here (y outer, x inner) is the determinism contract.
        let stride = config.sub_x + 1;
        for y in 0..=config.sub_y {
            for x in 0..=config.sub_x {
                let v = (x + y * stride) as usize;
                let p = host.vertex_position(mesh, v)?;
                let offset = rng.unit() * config.amplitude * 2.0 - config.amplitude;
                host.set_vertex_position(mesh, v, Vec3::new(p.x, p.y + offset, p.z))?;
            }
        }
        host.assign_material(mesh, &config.material)?;

        log::debug!(
            "terrain `{}`: {}x{} grid displaced within +-{}",
            name,
            config.sub_x,
            config.sub_y,
            config.amplitude
        );
        Ok(Self {
            mesh,
            name: name.to_string(),
            sub_x: config.sub_x,
            sub_y: config.sub_y,
            smooth_factor: 1,
        })
    }

    /// Subdivision-smooth the mesh. Each round doubles the per-axis quad
    /// count; the sampling range below scales with this recorded factor
    /// rather than being inferred from the host mesh.
    pub fn smooth(&mut self, host: &mut dyn SceneHost, iterations: u32) -> Result<()> {
        host.smooth_mesh(self.mesh, iterations)?;
        self.smooth_factor <<= iterations;
        Ok(())
    }

    /// Vertices currently in the lattice, tracked through smoothing.
    pub fn vertex_count(&self) -> usize {
        let nx = self.sub_x * self.smooth_factor + 1;
        let ny = self.sub_y * self.smooth_factor + 1;
        (nx * ny) as usize
    }

    fn vertical_span(&self, host: &dyn SceneHost) -> Result<(f32, f32)> {
        let (min, max) = host.bounding_box(self.mesh)?;
        Ok((min.y, max.y))
    }

    fn height_frac(bottom: f32, top: f32, y: f32) -> f32 {
        if top - bottom <= f32::EPSILON {
            1.0
        } else {
            (y - bottom) / (top - bottom)
        }
    }

    /// Independent Bernoulli keep per vertex. A tolerance of 1 keeps every
    /// vertex through an unconditional branch, not probability-1 draws.
    pub fn sample_by_probability(
        &self,
        host: &dyn SceneHost,
        rng: &mut RandomSequence,
        tolerance: f32,
    ) -> Result<Vec<SurfaceSample>> {
        let (bottom, top) = self.vertical_span(host)?;
        let count = self.vertex_count();
        let mut samples = Vec::new();

        if tolerance >= 1.0 {
            for v in 0..count {
                let position = host.vertex_position(self.mesh, v)?;
                samples.push(SurfaceSample {
                    position,
                    height_frac: Self::height_frac(bottom, top, position.y),
                });
            }
        } else {
            for v in 0..count {
                if rng.unit() <= tolerance {
                    let position = host.vertex_position(self.mesh, v)?;
                    samples.push(SurfaceSample {
                        position,
                        height_frac: Self::height_frac(bottom, top, position.y),
                    });
                }
            }
        }
        Ok(samples)
    }

    /// Keep vertices in the uppermost `percentage` fraction of the vertical
    /// span: `y >= top - (top - bottom) * percentage`.
    pub fn sample_by_height_percentile(
        &self,
        host: &dyn SceneHost,
        percentage: f32,
    ) -> Result<Vec<SurfaceSample>> {
        let (bottom, top) = self.vertical_span(host)?;
        let target = top - (top - bottom) * percentage;
        let mut samples = Vec::new();
        for v in 0..self.vertex_count() {
            let position = host.vertex_position(self.mesh, v)?;
            if position.y >= target {
                samples.push(SurfaceSample {
                    position,
                    height_frac: Self::height_frac(bottom, top, position.y),
                });
            }
        }
        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sylva_scene::MemoryScene;

    fn build_default(seed: u64) -> (MemoryScene, HeightField) {
        let mut scene = MemoryScene::new();
        let mut rng = RandomSequence::new(seed);
        let field =
            HeightField::build(&mut scene, &mut rng, "Terrain", &TerrainConfig::default())
                .unwrap();
        (scene, field)
    }

    fn heights(scene: &MemoryScene, field: &HeightField) -> Vec<f32> {
        (0..field.vertex_count())
            .map(|v| scene.vertex_position(field.mesh, v).unwrap().y)
            .collect()
    }

    #[test]
    fn test_rejects_bad_dimensions() {
        let mut scene = MemoryScene::new();
        let mut rng = RandomSequence::new(1);

        let mut config = TerrainConfig::default();
        config.sub_x = 0;
        let err = HeightField::build(&mut scene, &mut rng, "T", &config).unwrap_err();
        assert!(matches!(err, GenError::InvalidDimension(_)));

        let mut config = TerrainConfig::default();
        config.width = 0.0;
        let err = HeightField::build(&mut scene, &mut rng, "T", &config).unwrap_err();
        assert!(matches!(err, GenError::InvalidDimension(_)));

        // Validation precedes host mutation: nothing was created
        assert_eq!(scene.node_count(), 0);
    }

    #[test]
    fn test_default_grid_is_36_vertices_within_amplitude() {
        let (scene, field) = build_default(1);
        assert_eq!(field.vertex_count(), 36);
        for y in heights(&scene, &field) {
            assert!((-5.0..=5.0).contains(&y));
        }
    }

    #[test]
    fn test_same_seed_reproduces_heights() {
        let (scene_a, field_a) = build_default(1);
        let (scene_b, field_b) = build_default(1);
        assert_eq!(heights(&scene_a, &field_a), heights(&scene_b, &field_b));
    }

    #[test]
    fn test_different_seed_changes_heights() {
        let (scene_a, field_a) = build_default(1);
        let (scene_b, field_b) = build_default(2);
        assert_ne!(heights(&scene_a, &field_a), heights(&scene_b, &field_b));
    }

    #[test]
    fn test_rebuild_replaces_prior_asset() {
        let mut scene = MemoryScene::new();
        let mut rng = RandomSequence::new(1);
        let config = TerrainConfig::default();
        HeightField::build(&mut scene, &mut rng, "Terrain", &config).unwrap();
        let nodes_after_first = scene.node_count();

        rng.reseed(1);
        HeightField::build(&mut scene, &mut rng, "Terrain", &config).unwrap();
        assert_eq!(scene.node_count(), nodes_after_first);
    }

    #[test]
    fn test_probability_one_keeps_every_vertex_without_draws() {
        let (scene, field) = build_default(1);
        let mut rng = RandomSequence::new(99);
        let samples = field.sample_by_probability(&scene, &mut rng, 1.0).unwrap();
        assert_eq!(samples.len(), 36);

        // No draws were consumed by the keep-all branch
        let mut fresh = RandomSequence::new(99);
        assert_eq!(rng.unit(), fresh.unit());
    }

    #[test]
    fn test_probability_zero_keeps_nothing() {
        let (scene, field) = build_default(1);
        let mut rng = RandomSequence::new(99);
        let samples = field.sample_by_probability(&scene, &mut rng, 0.0).unwrap();
        assert!(samples.is_empty());
    }

    #[test]
    fn test_percentile_filters_by_span() {
        let (scene, field) = build_default(1);

        let all = field.sample_by_height_percentile(&scene, 1.0).unwrap();
        assert_eq!(all.len(), 36);

        let top_only = field.sample_by_height_percentile(&scene, 0.0).unwrap();
        assert!(!top_only.is_empty());
        assert!(top_only.len() < 36);
        let max_y = heights(&scene, &field)
            .into_iter()
            .fold(f32::NEG_INFINITY, f32::max);
        for s in &top_only {
            assert!((s.position.y - max_y).abs() < 1e-5);
        }
    }

    #[test]
    fn test_height_fraction_is_normalized() {
        let (scene, field) = build_default(1);
        let mut rng = RandomSequence::new(5);
        let samples = field.sample_by_probability(&scene, &mut rng, 1.0).unwrap();
        for s in &samples {
            assert!((0.0..=1.0).contains(&s.height_frac));
        }
        assert!(samples.iter().any(|s| s.height_frac > 0.99));
        assert!(samples.iter().any(|s| s.height_frac < 0.01));
    }

    #[test]
    fn test_sampling_range_scales_with_smoothing() {
        let (mut scene, mut field) = build_default(1);
        field.smooth(&mut scene, 1).unwrap();
        assert_eq!(field.vertex_count(), 11 * 11);

        let mut rng = RandomSequence::new(1);
        let samples = field.sample_by_probability(&scene, &mut rng, 1.0).unwrap();
        assert_eq!(samples.len(), 121);

        field.smooth(&mut scene, 2).unwrap();
        assert_eq!(field.vertex_count(), 41 * 41);
        let samples = field.sample_by_probability(&scene, &mut rng, 1.0).unwrap();
        assert_eq!(samples.len(), 41 * 41);
    }
}
