pub mod memory;

pub use memory::MemoryScene;

use glam::Vec3;
use thiserror::Error;

/// Handle to a node in the scene graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

/// Animatable rotation channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    RotateX,
    RotateY,
    RotateZ,
}

/// Failures reported by a scene-graph host.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("no node named `{0}` in the scene")]
    MissingNode(String),
    #[error("a node named `{0}` already exists")]
    DuplicateName(String),
    #[error("vertex index {index} out of bounds for `{name}` ({count} vertices)")]
    VertexOutOfBounds {
        name: String,
        index: usize,
        count: usize,
    },
    #[error("node `{0}` does not support this operation")]
    UnsupportedOperation(String),
}

/// Scene-graph host capabilities the generators drive.
///
/// Everything the core produces goes through this port, so a full generation
/// run can execute against [`MemoryScene`] without a 3D host attached.
/// Rotations are Euler angles in degrees, applied X, Y, Z.
pub trait SceneHost {
    /// Create a flat grid mesh of (sub_x+1) x (sub_y+1) vertices spanning
    /// width along X and depth along Z, centered at the origin.
    fn create_mesh_grid(
        &mut self,
        name: &str,
        width: f32,
        depth: f32,
        sub_x: u32,
        sub_y: u32,
    ) -> Result<NodeId, SceneError>;

    fn vertex_count(&self, node: NodeId) -> Result<usize, SceneError>;

    fn vertex_position(&self, node: NodeId, index: usize) -> Result<Vec3, SceneError>;

    fn set_vertex_position(
        &mut self,
        node: NodeId,
        index: usize,
        position: Vec3,
    ) -> Result<(), SceneError>;

    fn create_curve(&mut self, name: &str, points: &[Vec3]) -> Result<NodeId, SceneError>;

    fn create_circle_profile(
        &mut self,
        name: &str,
        radius: f32,
        segments: u32,
    ) -> Result<NodeId, SceneError>;

    /// Sweep a circular profile along a curve, tapering the cross-section to
    /// `taper` times its starting radius at the far end.
    fn sweep_profile(
        &mut self,
        name: &str,
        profile: NodeId,
        curve: NodeId,
        taper: f32,
    ) -> Result<NodeId, SceneError>;

    fn create_group(&mut self, name: &str) -> Result<NodeId, SceneError>;

    /// Deep-copy the named asset under a new name.
    fn duplicate(&mut self, source: &str, name: &str) -> Result<NodeId, SceneError>;

    /// Create a cheap instance sharing the source node's geometry.
    fn instance(&mut self, source: NodeId, name: &str) -> Result<NodeId, SceneError>;

    fn set_translation(&mut self, node: NodeId, translation: Vec3) -> Result<(), SceneError>;

    fn set_rotation(&mut self, node: NodeId, degrees: Vec3) -> Result<(), SceneError>;

    fn set_visibility(&mut self, node: NodeId, visible: bool) -> Result<(), SceneError>;

    fn reparent(&mut self, node: NodeId, parent: NodeId) -> Result<(), SceneError>;

    fn set_keyframe(
        &mut self,
        node: NodeId,
        channel: Channel,
        frame: i32,
        value: f32,
    ) -> Result<(), SceneError>;

    /// Delete the named asset and its subtree. Deleting an absent name is a
    /// no-op, so regeneration under the same name never has to probe first.
    fn delete(&mut self, name: &str) -> Result<(), SceneError>;

    /// Axis-aligned extents of the node's own geometry, offset by its
    /// translation. Children are not included.
    fn bounding_box(&self, node: NodeId) -> Result<(Vec3, Vec3), SceneError>;

    /// Subdivision-smooth a grid mesh in place. Each iteration doubles the
    /// quad count per axis.
    fn smooth_mesh(&mut self, node: NodeId, iterations: u32) -> Result<(), SceneError>;

    fn assign_material(&mut self, node: NodeId, material: &str) -> Result<(), SceneError>;

    fn lookup(&self, name: &str) -> Option<NodeId>;
}
