use glam::Vec3;
use sylva_scene::{Channel, NodeId, SceneHost};

use crate::error::{GenError, Result};
use crate::rng::RandomSequence;

/// One keyframe triple.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Key {
    pub frame: i32,
    pub channel: Channel,
    pub value: f32,
}

/// Periodic idle-sway schedule for a node's rotation channels.
#[derive(Debug, Clone, Default)]
pub struct AnimationSchedule {
    pub keys: Vec<Key>,
}

impl AnimationSchedule {
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }
}

const CHANNELS: [Channel; 3] = [Channel::RotateX, Channel::RotateY, Channel::RotateZ];

/// Build a sway loop over `[start, stop)`: each cycle of `2*step` frames
/// holds the base pose at `f` and a perturbed pose at `f + step`, with an
/// independent `uniform(amplitude/2, amplitude)` offset per axis.
///
/// A zero step would loop forever, so it fails eagerly with `InvalidStep`
/// before any draw; a negative step describes a reversed frame range, which
/// holds no cycles.
pub fn build_schedule(
    rng: &mut RandomSequence,
    base: Vec3,
    amplitude: f32,
    start: i32,
    stop: i32,
    step: i32,
) -> Result<AnimationSchedule> {
    if step == 0 {
        return Err(GenError::InvalidStep);
    }
    let mut keys = Vec::new();
    if step < 0 {
        return Ok(AnimationSchedule { keys });
    }

    let base_values = [base.x, base.y, base.z];
    let mut frame = start;
    while frame < stop {
        for (channel, value) in CHANNELS.into_iter().zip(base_values) {
            keys.push(Key {
                frame,
                channel,
                value,
            });
        }
        for (channel, value) in CHANNELS.into_iter().zip(base_values) {
            keys.push(Key {
                frame: frame + step,
                channel,
                value: value + rng.uniform(amplitude / 2.0, amplitude),
            });
        }
        frame += step * 2;
    }
    Ok(AnimationSchedule { keys })
}

/// Replay a schedule onto a host node as keyframes.
pub fn apply_schedule(
    host: &mut dyn SceneHost,
    node: NodeId,
    schedule: &AnimationSchedule,
) -> Result<()> {
    for key in &schedule.keys {
        host.set_keyframe(node, key.channel, key.frame, key.value)?;
    }
    Ok(())
}
