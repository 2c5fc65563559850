use std::collections::HashMap;

use glam::Vec3;

use crate::{Channel, NodeId, SceneError, SceneHost};

#[derive(Debug, Clone)]
enum NodeKind {
    Group,
    Grid {
        sub_x: u32,
        sub_y: u32,
        vertices: Vec<Vec3>,
    },
    Curve {
        points: Vec<Vec3>,
    },
    Profile {
        radius: f32,
        segments: u32,
    },
    Mesh {
        vertices: Vec<Vec3>,
        indices: Vec<u32>,
    },
    Instance {
        source: NodeId,
    },
}

#[derive(Debug, Clone)]
struct SceneNode {
    name: String,
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    translation: Vec3,
    rotation: Vec3,
    visible: bool,
    material: Option<String>,
    keyframes: Vec<(Channel, i32, f32)>,
    alive: bool,
}

/// In-memory scene graph implementing the full [`SceneHost`] port.
///
/// Nodes live in an arena; deletion tombstones a subtree and frees its name.
/// Good enough to run every generator end to end without a 3D host.
#[derive(Debug, Default)]
pub struct MemoryScene {
    nodes: Vec<SceneNode>,
    names: HashMap<String, NodeId>,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes in the scene.
    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.alive).count()
    }

    /// Live node names starting with `prefix`, for inspection.
    pub fn names_with_prefix(&self, prefix: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .nodes
            .iter()
            .filter(|n| n.alive && n.name.starts_with(prefix))
            .map(|n| n.name.clone())
            .collect();
        names.sort();
        names
    }

    pub fn name_of(&self, node: NodeId) -> Result<&str, SceneError> {
        Ok(&self.node(node)?.name)
    }

    pub fn translation_of(&self, node: NodeId) -> Result<Vec3, SceneError> {
        Ok(self.node(node)?.translation)
    }

    pub fn rotation_of(&self, node: NodeId) -> Result<Vec3, SceneError> {
        Ok(self.node(node)?.rotation)
    }

    pub fn is_visible(&self, node: NodeId) -> Result<bool, SceneError> {
        Ok(self.node(node)?.visible)
    }

    pub fn parent_of(&self, node: NodeId) -> Result<Option<NodeId>, SceneError> {
        Ok(self.node(node)?.parent)
    }

    pub fn children_of(&self, node: NodeId) -> Result<&[NodeId], SceneError> {
        Ok(&self.node(node)?.children)
    }

    pub fn material_of(&self, node: NodeId) -> Result<Option<&str>, SceneError> {
        Ok(self.node(node)?.material.as_deref())
    }

    pub fn keyframes_of(&self, node: NodeId) -> Result<&[(Channel, i32, f32)], SceneError> {
        Ok(&self.node(node)?.keyframes)
    }

    pub fn triangle_count(&self, node: NodeId) -> Result<usize, SceneError> {
        match &self.node(node)?.kind {
            NodeKind::Mesh { indices, .. } => Ok(indices.len() / 3),
            _ => Err(SceneError::UnsupportedOperation(
                self.node(node)?.name.clone(),
            )),
        }
    }

    fn node(&self, id: NodeId) -> Result<&SceneNode, SceneError> {
        self.nodes
            .get(id.0)
            .filter(|n| n.alive)
            .ok_or_else(|| SceneError::MissingNode(format!("#{}", id.0)))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut SceneNode, SceneError> {
        self.nodes
            .get_mut(id.0)
            .filter(|n| n.alive)
            .ok_or_else(|| SceneError::MissingNode(format!("#{}", id.0)))
    }

    fn register(&mut self, name: &str, kind: NodeKind) -> Result<NodeId, SceneError> {
        if self.names.contains_key(name) {
            return Err(SceneError::DuplicateName(name.to_string()));
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(SceneNode {
            name: name.to_string(),
            kind,
            parent: None,
            children: Vec::new(),
            translation: Vec3::ZERO,
            rotation: Vec3::ZERO,
            visible: true,
            material: None,
            keyframes: Vec::new(),
            alive: true,
        });
        self.names.insert(name.to_string(), id);
        Ok(id)
    }

    fn tombstone(&mut self, id: NodeId) {
        let children = std::mem::take(&mut self.nodes[id.0].children);
        for child in children {
            self.tombstone(child);
        }
        self.names.remove(&self.nodes[id.0].name.clone());
        self.nodes[id.0].alive = false;
    }

    fn own_geometry(&self, node: &SceneNode) -> Vec<Vec3> {
        match &node.kind {
            NodeKind::Group => Vec::new(),
            NodeKind::Grid { vertices, .. } | NodeKind::Mesh { vertices, .. } => vertices.clone(),
            NodeKind::Curve { points } => points.clone(),
            NodeKind::Profile { radius, .. } => {
                vec![
                    Vec3::new(-radius, -radius, -radius),
                    Vec3::new(*radius, *radius, *radius),
                ]
            }
            NodeKind::Instance { source } => self
                .node(*source)
                .map(|src| self.own_geometry(src))
                .unwrap_or_default(),
        }
    }
}

/// Side-surface mesh of a circular profile swept along a polyline, tapering
/// toward the far end. Basis construction follows the usual
/// direction/tangent/bitangent frame per ring.
fn sweep_mesh(
    points: &[Vec3],
    radius: f32,
    segments: u32,
    taper: f32,
) -> (Vec<Vec3>, Vec<u32>) {
    let mut vertices = Vec::new();
    let mut indices = Vec::new();
    if points.len() < 2 || segments < 3 {
        return (points.to_vec(), indices);
    }

    let rings = points.len();
    for (k, point) in points.iter().enumerate() {
        let t = k as f32 / (rings - 1) as f32;
        let ring_radius = radius * (1.0 - (1.0 - taper) * t);

        let direction = if k + 1 < rings {
            points[k + 1] - *point
        } else {
            *point - points[k - 1]
        };
        let direction = if direction.length_squared() > 1e-12 {
            direction.normalize()
        } else {
            Vec3::Y
        };
        let arbitrary = if direction.y.abs() > 0.9 { Vec3::X } else { Vec3::Y };
        let tangent = direction.cross(arbitrary).normalize();
        let bitangent = direction.cross(tangent).normalize();

        for s in 0..segments {
            let angle = (s as f32 / segments as f32) * std::f32::consts::TAU;
            let normal = tangent * angle.cos() + bitangent * angle.sin();
            vertices.push(*point + normal * ring_radius);
        }
    }

    for ring in 0..(rings - 1) as u32 {
        for s in 0..segments {
            let next = (s + 1) % segments;
            let i0 = ring * segments + s;
            let i1 = ring * segments + next;
            let i2 = (ring + 1) * segments + s;
            let i3 = (ring + 1) * segments + next;

            indices.push(i0);
            indices.push(i2);
            indices.push(i1);

            indices.push(i1);
            indices.push(i2);
            indices.push(i3);
        }
    }

    (vertices, indices)
}

/// One round of grid subdivision: per-axis quad count doubles, new vertices
/// are bilinear averages of the coarse lattice.
fn subdivide_grid(sub_x: u32, sub_y: u32, vertices: &[Vec3]) -> (u32, u32, Vec<Vec3>) {
    let stride = (sub_x + 1) as usize;
    let new_sx = sub_x * 2;
    let new_sy = sub_y * 2;
    let mut out = Vec::with_capacity(((new_sx + 1) * (new_sy + 1)) as usize);

    for j in 0..=new_sy {
        for i in 0..=new_sx {
            let x0 = (i / 2).min(sub_x) as usize;
            let y0 = (j / 2).min(sub_y) as usize;
            let x1 = (x0 + 1).min(sub_x as usize);
            let y1 = (y0 + 1).min(sub_y as usize);
            let fx = (i % 2) as f32 * 0.5;
            let fy = (j % 2) as f32 * 0.5;

            let p00 = vertices[x0 + y0 * stride];
            let p10 = vertices[x1 + y0 * stride];
            let p01 = vertices[x0 + y1 * stride];
            let p11 = vertices[x1 + y1 * stride];

            let bottom = p00.lerp(p10, fx);
            let top = p01.lerp(p11, fx);
            out.push(bottom.lerp(top, fy));
        }
    }

    (new_sx, new_sy, out)
}

impl SceneHost for MemoryScene {
    fn create_mesh_grid(
        &mut self,
        name: &str,
        width: f32,
        depth: f32,
        sub_x: u32,
        sub_y: u32,
    ) -> Result<NodeId, SceneError> {
        let mut vertices = Vec::with_capacity(((sub_x + 1) * (sub_y + 1)) as usize);
        for j in 0..=sub_y {
            for i in 0..=sub_x {
                let x = -width / 2.0 + width * (i as f32 / sub_x as f32);
                let z = -depth / 2.0 + depth * (j as f32 / sub_y as f32);
                vertices.push(Vec3::new(x, 0.0, z));
            }
        }
        self.register(
            name,
            NodeKind::Grid {
                sub_x,
                sub_y,
                vertices,
            },
        )
    }

    fn vertex_count(&self, node: NodeId) -> Result<usize, SceneError> {
        match &self.node(node)?.kind {
            NodeKind::Grid { vertices, .. } | NodeKind::Mesh { vertices, .. } => {
                Ok(vertices.len())
            }
            _ => Err(SceneError::UnsupportedOperation(
                self.node(node)?.name.clone(),
            )),
        }
    }

    fn vertex_position(&self, node: NodeId, index: usize) -> Result<Vec3, SceneError> {
        let n = self.node(node)?;
        match &n.kind {
            NodeKind::Grid { vertices, .. } | NodeKind::Mesh { vertices, .. } => vertices
                .get(index)
                .copied()
                .ok_or_else(|| SceneError::VertexOutOfBounds {
                    name: n.name.clone(),
                    index,
                    count: vertices.len(),
                }),
            _ => Err(SceneError::UnsupportedOperation(n.name.clone())),
        }
    }

    fn set_vertex_position(
        &mut self,
        node: NodeId,
        index: usize,
        position: Vec3,
    ) -> Result<(), SceneError> {
        let n = self.node_mut(node)?;
        let name = n.name.clone();
        match &mut n.kind {
            NodeKind::Grid { vertices, .. } | NodeKind::Mesh { vertices, .. } => {
                let count = vertices.len();
                let slot = vertices.get_mut(index).ok_or(SceneError::VertexOutOfBounds {
                    name,
                    index,
                    count,
                })?;
                *slot = position;
                Ok(())
            }
            _ => Err(SceneError::UnsupportedOperation(name)),
        }
    }

    fn create_curve(&mut self, name: &str, points: &[Vec3]) -> Result<NodeId, SceneError> {
        self.register(
            name,
            NodeKind::Curve {
                points: points.to_vec(),
            },
        )
    }

    fn create_circle_profile(
        &mut self,
        name: &str,
        radius: f32,
        segments: u32,
    ) -> Result<NodeId, SceneError> {
        self.register(name, NodeKind::Profile { radius, segments })
    }

    fn sweep_profile(
        &mut self,
        name: &str,
        profile: NodeId,
        curve: NodeId,
        taper: f32,
    ) -> Result<NodeId, SceneError> {
        let (radius, segments) = match &self.node(profile)?.kind {
            NodeKind::Profile { radius, segments } => (*radius, *segments),
            _ => {
                return Err(SceneError::UnsupportedOperation(
                    self.node(profile)?.name.clone(),
                ))
            }
        };
        let points = match &self.node(curve)?.kind {
            NodeKind::Curve { points } => points.clone(),
            _ => {
                return Err(SceneError::UnsupportedOperation(
                    self.node(curve)?.name.clone(),
                ))
            }
        };
        let (vertices, indices) = sweep_mesh(&points, radius, segments, taper);
        self.register(name, NodeKind::Mesh { vertices, indices })
    }

    fn create_group(&mut self, name: &str) -> Result<NodeId, SceneError> {
        self.register(name, NodeKind::Group)
    }

    fn duplicate(&mut self, source: &str, name: &str) -> Result<NodeId, SceneError> {
        let source_id = self
            .lookup(source)
            .ok_or_else(|| SceneError::MissingNode(source.to_string()))?;
        let kind = self.node(source_id)?.kind.clone();
        self.register(name, kind)
    }

    fn instance(&mut self, source: NodeId, name: &str) -> Result<NodeId, SceneError> {
        self.node(source)?;
        self.register(name, NodeKind::Instance { source })
    }

    fn set_translation(&mut self, node: NodeId, translation: Vec3) -> Result<(), SceneError> {
        self.node_mut(node)?.translation = translation;
        Ok(())
    }

    fn set_rotation(&mut self, node: NodeId, degrees: Vec3) -> Result<(), SceneError> {
        self.node_mut(node)?.rotation = degrees;
        Ok(())
    }

    fn set_visibility(&mut self, node: NodeId, visible: bool) -> Result<(), SceneError> {
        self.node_mut(node)?.visible = visible;
        Ok(())
    }

    fn reparent(&mut self, node: NodeId, parent: NodeId) -> Result<(), SceneError> {
        self.node(parent)?;
        if let Some(old) = self.node(node)?.parent {
            let siblings = &mut self.nodes[old.0].children;
            siblings.retain(|c| *c != node);
        }
        self.node_mut(node)?.parent = Some(parent);
        self.nodes[parent.0].children.push(node);
        Ok(())
    }

    fn set_keyframe(
        &mut self,
        node: NodeId,
        channel: Channel,
        frame: i32,
        value: f32,
    ) -> Result<(), SceneError> {
        self.node_mut(node)?.keyframes.push((channel, frame, value));
        Ok(())
    }

    fn delete(&mut self, name: &str) -> Result<(), SceneError> {
        // Absent names are fine: delete is idempotent by contract.
        let Some(id) = self.names.get(name).copied() else {
            return Ok(());
        };
        if let Some(parent) = self.nodes[id.0].parent {
            self.nodes[parent.0].children.retain(|c| *c != id);
        }
        self.tombstone(id);
        Ok(())
    }

    fn bounding_box(&self, node: NodeId) -> Result<(Vec3, Vec3), SceneError> {
        let n = self.node(node)?;
        let geometry = self.own_geometry(n);
        if geometry.is_empty() {
            return Ok((n.translation, n.translation));
        }
        let mut min = geometry[0];
        let mut max = geometry[0];
        for p in &geometry[1..] {
            min = min.min(*p);
            max = max.max(*p);
        }
        Ok((min + n.translation, max + n.translation))
    }

    fn smooth_mesh(&mut self, node: NodeId, iterations: u32) -> Result<(), SceneError> {
        let n = self.node_mut(node)?;
        let name = n.name.clone();
        match &mut n.kind {
            NodeKind::Grid {
                sub_x,
                sub_y,
                vertices,
            } => {
                for _ in 0..iterations {
                    let (sx, sy, refined) = subdivide_grid(*sub_x, *sub_y, vertices);
                    *sub_x = sx;
                    *sub_y = sy;
                    *vertices = refined;
                }
                Ok(())
            }
            _ => Err(SceneError::UnsupportedOperation(name)),
        }
    }

    fn assign_material(&mut self, node: NodeId, material: &str) -> Result<(), SceneError> {
        self.node_mut(node)?.material = Some(material.to_string());
        Ok(())
    }

    fn lookup(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }
}
