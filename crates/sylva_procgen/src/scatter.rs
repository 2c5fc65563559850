use glam::Vec3;
use sylva_scene::{NodeId, SceneHost};

use crate::curve::{grow_curve, BLADE_STEPS, SWEEP_TAPER};
use crate::error::{GenError, Result};
use crate::rng::RandomSequence;
use crate::terrain::SurfaceSample;
use crate::tree::GeneratedTree;

/// Samples per grass clump; one base asset is generated per clump and
/// instance-copied across it.
pub const CLUMP_SIZE: usize = 200;

const BLADES_PER_CLUMP: usize = 5;
const BLADE_HEIGHT: f32 = 10.0;
const BLADE_RADIUS: f32 = 0.1;
const BLADE_PROFILE_SEGMENTS: u32 = 4;

/// Scatter tree instances over the sampled surface points: each point gets a
/// uniformly chosen variant, placed with a random yaw and parented under
/// `parent` so regeneration erases them with it. Instances share the
/// prototype's geometry; the per-tree counter names them.
pub fn scatter_trees(
    host: &mut dyn SceneHost,
    rng: &mut RandomSequence,
    samples: &[SurfaceSample],
    trees: &mut [GeneratedTree],
    parent: NodeId,
) -> Result<usize> {
    if trees.is_empty() {
        return Ok(0);
    }
    for sample in samples {
        let pick = rng.integer(0, trees.len() as i64 - 1) as usize;
        let tree = &mut trees[pick];
        let name = format!("{}_Inst{}", tree.name, tree.instances);
        let instance = host.instance(tree.handle, &name)?;
        tree.instances += 1;
        host.reparent(instance, parent)?;
        host.set_translation(instance, sample.position)?;
        host.set_rotation(instance, Vec3::new(0.0, rng.uniform(0.0, 360.0), 0.0))?;
    }
    log::debug!("scattered {} tree instances", samples.len());
    Ok(samples.len())
}

/// Counts from a grass pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrassReport {
    pub clumps: usize,
    pub instances: usize,
}

/// Scatter grass over the sampled surface points in clumps of `clump_size`.
///
/// The first point of each clump generates a fresh base asset (five extruded
/// blades under a group); every point in the clump, the first included,
/// places a cheap instance of the current base at its own position, parented
/// under `parent`.
pub fn scatter_grass(
    host: &mut dyn SceneHost,
    rng: &mut RandomSequence,
    samples: &[SurfaceSample],
    parent: NodeId,
    clump_size: usize,
) -> Result<GrassReport> {
    if clump_size == 0 {
        return Err(GenError::InvalidDimension(
            "grass clump size must be at least 1".to_string(),
        ));
    }

    let mut report = GrassReport {
        clumps: 0,
        instances: 0,
    };
    for (clump_index, clump) in samples.chunks(clump_size).enumerate() {
        let base_name = format!("ClumpMain{}", clump_index + 1);
        let base = grow_clump(host, rng, &base_name)?;
        report.clumps += 1;

        for (n, sample) in clump.iter().enumerate() {
            let name = format!("Clump_{}_{}", clump_index + 1, n);
            let instance = host.instance(base, &name)?;
            host.set_translation(instance, sample.position)?;
            host.reparent(instance, parent)?;
            report.instances += 1;
        }
    }
    log::debug!(
        "scattered {} grass instances in {} clumps",
        report.instances,
        report.clumps
    );
    Ok(report)
}

/// Build one reusable clump: five blades, each a narrow profile swept along
/// its own curve, grouped under `name`. Scaffolding curves and profiles are
/// removed once swept.
fn grow_clump(host: &mut dyn SceneHost, rng: &mut RandomSequence, name: &str) -> Result<NodeId> {
    let group = host.create_group(name)?;
    for blade in 0..BLADES_PER_CLUMP {
        let profile_name = format!("{name}_profile{blade}");
        let curve_name = format!("{name}_curve{blade}");

        let profile =
            host.create_circle_profile(&profile_name, BLADE_RADIUS, BLADE_PROFILE_SEGMENTS)?;
        let points = grow_curve(rng, Vec3::ZERO, BLADE_HEIGHT, 1.0, BLADE_STEPS);
        let curve = host.create_curve(&curve_name, &points)?;
        let mesh = host.sweep_profile(
            &format!("{name}_blade{blade}"),
            profile,
            curve,
            SWEEP_TAPER,
        )?;
        host.reparent(mesh, group)?;
        host.delete(&profile_name)?;
        host.delete(&curve_name)?;
    }
    Ok(group)
}
