use glam::Vec3;
use sylva_scene::{NodeId, SceneHost};

use crate::anim::{apply_schedule, build_schedule};
use crate::curve::{grow_curve, point_at, SWEEP_TAPER};
use crate::error::{GenError, Result};
use crate::rng::RandomSequence;

/// Material assigned to every swept branch surface.
pub const BARK_MATERIAL: &str = "BarkMat";

const PROFILE_SEGMENTS: u32 = 8;

/// Species-level parameters for one tree variant.
#[derive(Debug, Clone)]
pub struct TreeRecipe {
    pub radius: f32,
    pub leaves: bool,
    /// Named scene asset duplicated for foliage. Must exist in the host when
    /// `leaves` is set.
    pub leaf_source: String,
    pub sway_amount: f32,
    pub sway_start: i32,
    pub sway_stop: i32,
    pub sway_step: i32,
    /// Lower bound of the curve-parameter window children sprout from;
    /// 0.7 keeps branches in the upper third of their parent.
    pub crown_start: f32,
    pub max_tilt_deg: f32,
    pub curve_steps: u32,
}

impl Default for TreeRecipe {
    fn default() -> Self {
        Self {
            radius: 1.0,
            leaves: true,
            leaf_source: "Leaf1".to_string(),
            sway_amount: 50.0,
            sway_start: 0,
            sway_stop: 250,
            sway_step: 50,
            crown_start: 0.7,
            max_tilt_deg: 45.0,
            curve_steps: crate::curve::TRUNK_STEPS,
        }
    }
}

/// Per-generation growth parameters.
#[derive(Debug, Clone)]
pub struct GrowthParams {
    /// Branch density at the root; children inherit `den * (1 + den)`.
    pub density: f32,
    /// Initial survival probability for the accept/reject test.
    pub branch_start: f32,
    /// Recursion level; the decay per level is `branch_start / recursion_level`.
    pub recursion_level: u32,
    pub height: f32,
}

impl Default for GrowthParams {
    fn default() -> Self {
        Self {
            density: 0.2,
            branch_start: 1.0,
            recursion_level: 3,
            height: 25.0,
        }
    }
}

impl GrowthParams {
    /// Survival-probability decay per recursion level. Must be positive for
    /// the recursion to terminate; validated, not assumed.
    pub fn decay(&self) -> Result<f32> {
        if self.recursion_level == 0 {
            return Err(GenError::NonTerminatingRecursion(0.0));
        }
        let dec = self.branch_start / self.recursion_level as f32;
        if dec <= 0.0 {
            return Err(GenError::NonTerminatingRecursion(dec));
        }
        Ok(dec)
    }
}

/// Knobs the observed front-end variants disagreed on, exposed as policy
/// instead of silently picking one.
#[derive(Debug, Clone)]
pub struct BranchPolicy {
    /// Accept test is `u <= i` when set (the default), `u < i` otherwise.
    pub accept_inclusive: bool,
    /// Exempt the root from the reject branch. Off by default: a root that
    /// fails the accept test yields an empty tree (the trunk itself always
    /// exists), and callers tolerate it.
    pub root_always_branches: bool,
    /// Hard backstop well above the natural `ceil(start / decay)` bound.
    pub max_depth: u32,
}

impl Default for BranchPolicy {
    fn default() -> Self {
        Self {
            accept_inclusive: true,
            root_always_branches: false,
            max_depth: 64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchKind {
    Trunk,
    Branch,
    Leaf,
}

/// One node of the generated structure. Identity is the arena index; the
/// host-facing name is a projection of tree position.
#[derive(Debug, Clone)]
pub struct BranchNode {
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub kind: BranchKind,
    pub curve: Vec<Vec3>,
    pub radius: f32,
    /// Euler rotation in degrees applied to the host node.
    pub rotation: Vec3,
    pub name: String,
    pub handle: NodeId,
}

/// Arena of branch nodes; the root trunk is index 0 when present.
#[derive(Debug, Default)]
pub struct BranchArena {
    nodes: Vec<BranchNode>,
}

impl BranchArena {
    fn push(&mut self, node: BranchNode) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    pub fn get(&self, index: usize) -> &BranchNode {
        &self.nodes[index]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BranchNode> {
        self.nodes.iter()
    }

    /// Levels between a node and the trunk.
    pub fn depth_of(&self, index: usize) -> u32 {
        let mut depth = 0;
        let mut current = index;
        while let Some(parent) = self.nodes[current].parent {
            depth += 1;
            current = parent;
        }
        depth
    }
}

/// A materialized tree: the host hierarchy plus the arena describing it.
#[derive(Debug)]
pub struct GeneratedTree {
    pub name: String,
    pub handle: NodeId,
    pub root: usize,
    pub arena: BranchArena,
    /// Instance counter consumed by the scatterer for naming.
    pub instances: u32,
}

/// Grow a full tree under `name`: trunk, recursive branches, foliage, and
/// sway animation, all materialized through the host.
///
/// Validation happens before any host mutation; regeneration under the same
/// name replaces the prior asset. The sequence of random draws below is the
/// reproducibility contract -- do not reorder.
#[allow(clippy::too_many_arguments)]
pub fn generate_tree(
    host: &mut dyn SceneHost,
    rng: &mut RandomSequence,
    name: &str,
    recipe: &TreeRecipe,
    growth: &GrowthParams,
    policy: &BranchPolicy,
    seed: u64,
    origin: Vec3,
    parent: Option<NodeId>,
) -> Result<GeneratedTree> {
    let dec = growth.decay()?;
    rng.reseed(seed);
    host.delete(name)?;

    // Trunk: twice the nominal height, curviness from the initial survival
    // probability, full-radius sweep at the base.
    let trunk_curve = grow_curve(
        rng,
        Vec3::ZERO,
        growth.height * 2.0,
        growth.branch_start,
        recipe.curve_steps,
    );
    let handle = host.create_curve(name, &trunk_curve)?;
    sweep_branch(host, name, handle, Vec3::ZERO, recipe.radius)?;

    let mut arena = BranchArena::default();
    let root = arena.push(BranchNode {
        parent: None,
        children: Vec::new(),
        kind: BranchKind::Trunk,
        curve: trunk_curve,
        radius: recipe.radius,
        rotation: Vec3::ZERO,
        name: name.to_string(),
        handle,
    });

    let mut grower = Grower {
        host: &mut *host,
        rng: &mut *rng,
        recipe,
        policy,
        arena,
    };
    grower.grow(root, growth.branch_start, dec, growth.density / 2.0, growth.height, 0)?;
    let arena = grower.arena;

    // Sink the base slightly below the surface, spin the whole tree, and
    // hand it to its parent in the scene.
    host.set_translation(handle, Vec3::new(origin.x, origin.y - 1.0, origin.z))?;
    host.set_rotation(handle, Vec3::new(0.0, rng.uniform(0.0, 360.0), 0.0))?;
    if let Some(parent) = parent {
        host.reparent(handle, parent)?;
    }

    Ok(GeneratedTree {
        name: name.to_string(),
        handle,
        root,
        arena,
        instances: 0,
    })
}

struct Grower<'a> {
    host: &'a mut dyn SceneHost,
    rng: &'a mut RandomSequence,
    recipe: &'a TreeRecipe,
    policy: &'a BranchPolicy,
    arena: BranchArena,
}

impl Grower<'_> {
    /// The per-node state machine: candidates are sampled along the upper
    /// portion of the parent curve, then a single draw decides between
    /// branching and foliage.
    fn grow(
        &mut self,
        node: usize,
        i: f32,
        dec: f32,
        density: f32,
        height: f32,
        depth: u32,
    ) -> Result<()> {
        if depth > self.policy.max_depth {
            return Err(GenError::RecursionLimitExceeded(self.policy.max_depth));
        }
        let height = height * i;

        let count = (density * 100.0).floor() as usize;
        let mut candidates = Vec::with_capacity(count);
        for _ in 0..count {
            let t = self.rng.uniform(self.recipe.crown_start, 1.0);
            let anchor = point_at(&self.arena.nodes[node].curve, t);
            candidates.push((anchor, t));
        }

        let u = self.rng.unit();
        let is_root = self.arena.nodes[node].parent.is_none();
        let accept = if is_root && self.policy.root_always_branches {
            true
        } else if self.policy.accept_inclusive {
            u <= i
        } else {
            u < i
        };

        if accept {
            for (index, (anchor, bias)) in candidates.iter().copied().enumerate() {
                self.sprout(node, index, anchor, bias, i, dec, density, height, depth)?;
            }
        } else if !is_root && self.recipe.leaves {
            self.foliage(node, &candidates)?;
        }
        // A rejected root yields an empty tree; callers tolerate it.
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn sprout(
        &mut self,
        parent: usize,
        index: usize,
        anchor: Vec3,
        bias: f32,
        i: f32,
        dec: f32,
        density: f32,
        height: f32,
        depth: u32,
    ) -> Result<()> {
        let name = format!("{}_Branch{}", self.arena.nodes[parent].name, index);
        log::info!("creating branch `{name}`");

        let length = self.rng.uniform(1.0, height);
        let curve = grow_curve(self.rng, anchor, length, i, self.recipe.curve_steps);
        let handle = self.host.create_curve(&name, &curve)?;
        self.host.reparent(handle, self.arena.nodes[parent].handle)?;

        let radius = self.recipe.radius * 0.5 * bias;
        let child = self.arena.push(BranchNode {
            parent: Some(parent),
            children: Vec::new(),
            kind: BranchKind::Branch,
            curve,
            radius,
            rotation: Vec3::ZERO,
            name: name.clone(),
            handle,
        });
        self.arena.nodes[parent].children.push(child);

        // Grandchildren grow before this branch is tilted and skinned; the
        // draw order is part of the reproducibility contract.
        self.grow(child, i - dec, dec, density * (1.0 + density), height, depth + 1)?;

        let tilt = Vec3::new(
            self.rng.uniform(0.0, self.recipe.max_tilt_deg),
            self.rng.uniform(0.0, 360.0) * index as f32,
            0.0,
        );
        self.host.set_rotation(handle, tilt)?;
        self.arena.nodes[child].rotation = tilt;

        let schedule = build_schedule(
            self.rng,
            tilt,
            self.recipe.sway_amount,
            self.recipe.sway_start,
            self.recipe.sway_stop,
            self.recipe.sway_step,
        )?;
        apply_schedule(self.host, handle, &schedule)?;

        sweep_branch(self.host, &name, handle, anchor, radius)?;
        Ok(())
    }

    /// Terminal state: one duplicated leaf at the first candidate, cheap
    /// instance copies at the rest. A missing leaf source surfaces as a host
    /// failure and aborts the whole generation call.
    fn foliage(&mut self, parent: usize, candidates: &[(Vec3, f32)]) -> Result<()> {
        let Some(((first, _), rest)) = candidates.split_first() else {
            return Ok(());
        };
        let parent_name = self.arena.nodes[parent].name.clone();
        let base_name = format!("{parent_name}_Leaf0");
        let base = self.host.duplicate(&self.recipe.leaf_source, &base_name)?;
        self.host.reparent(base, self.arena.nodes[parent].handle)?;
        self.host.set_translation(base, *first)?;

        let rotation = Vec3::new(
            self.rng.uniform(0.0, 360.0),
            self.rng.uniform(0.0, 360.0),
            self.rng.uniform(0.0, 360.0),
        );
        self.host.set_rotation(base, rotation)?;

        let leaf = self.arena.push(BranchNode {
            parent: Some(parent),
            children: Vec::new(),
            kind: BranchKind::Leaf,
            curve: Vec::new(),
            radius: 0.0,
            rotation,
            name: base_name,
            handle: base,
        });
        self.arena.nodes[parent].children.push(leaf);

        let schedule = build_schedule(
            self.rng,
            rotation,
            self.recipe.sway_amount,
            self.recipe.sway_start,
            self.recipe.sway_stop,
            self.recipe.sway_step,
        )?;
        apply_schedule(self.host, base, &schedule)?;

        for (n, (position, _)) in rest.iter().enumerate() {
            let name = format!("{parent_name}_Leaf{}", n + 1);
            let instance = self.host.instance(base, &name)?;
            self.host.reparent(instance, self.arena.nodes[parent].handle)?;
            self.host.set_translation(instance, *position)?;
            self.host
                .set_rotation(instance, Vec3::new(0.0, self.rng.uniform(0.0, 360.0), 0.0))?;
        }
        log::debug!("foliage on `{parent_name}`: {} leaves", candidates.len());
        Ok(())
    }
}

/// Give a branch curve a solid surface: a circular profile swept along it
/// with the standard taper, bark-shaded, profile scaffolding removed.
fn sweep_branch(
    host: &mut dyn SceneHost,
    name: &str,
    curve: NodeId,
    at: Vec3,
    radius: f32,
) -> Result<NodeId> {
    let profile_name = format!("{name}_profile");
    let profile = host.create_circle_profile(&profile_name, radius, PROFILE_SEGMENTS)?;
    host.set_translation(profile, at)?;
    let mesh = host.sweep_profile(&format!("{name}_mesh"), profile, curve, SWEEP_TAPER)?;
    host.reparent(mesh, curve)?;
    host.delete(&profile_name)?;
    host.assign_material(mesh, BARK_MATERIAL)?;
    Ok(mesh)
}
