use crate::{AnimationAsset, AnimationClip, AnimationFrame, AnimationJoint, Matrix};
use lume_core::scene::{NodeId, Pose, SkeletonKind};
use lume_core::{LumeError, LumeResult, Scene};
use std::collections::HashSet;

pub const FRAMES_PER_SECOND: f64 = 30.0;

/// A skeleton node and the index of its parent in the same list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SkeletonJoint {
    pub node: NodeId,
    pub parent_index: i32,
}

/// Whole frames on the timeline, including the bind-pose frame 0.
pub fn timeline_frame_count(duration: f64) -> usize {
    if !(duration > 0.0) || !duration.is_finite() {
        return 0;
    }
    // tolerate durations like 2.3s landing a hair under a frame boundary
    (duration * FRAMES_PER_SECOND + 1e-9).floor() as usize
}

/// Frames written to the clip: everything after the bind pose.
pub fn exported_frame_count(duration: f64) -> usize {
    timeline_frame_count(duration).saturating_sub(1)
}

pub fn find_bind_pose<S: Scene + ?Sized>(scene: &S) -> LumeResult<&Pose> {
    scene
        .poses()
        .iter()
        .find(|pose| pose.is_bind_pose)
        .ok_or_else(|| LumeError::NotFound("bind pose".into()))
}

pub fn find_skeleton_root<S: Scene + ?Sized>(scene: &S, pose: &Pose) -> LumeResult<NodeId> {
    pose.nodes
        .iter()
        .copied()
        .find(|&node| scene.skeleton(node) == Some(SkeletonKind::Root))
        .ok_or_else(|| LumeError::NotFound(format!("skeleton root in pose {:?}", pose.name)))
}

/// Breadth-first walk from `root` over children that are skeleton nodes.
/// Parents always land before their children.
pub fn collect_joints<S: Scene + ?Sized>(scene: &S, root: NodeId) -> Vec<SkeletonJoint> {
    let mut joints = vec![SkeletonJoint { node: root, parent_index: -1 }];
    let mut seen = HashSet::from([root]);

    let mut i = 0;
    while i < joints.len() {
        let node = joints[i].node;
        for &child in scene.children(node) {
            if scene.skeleton(child).is_some() && seen.insert(child) {
                joints.push(SkeletonJoint { node: child, parent_index: i as i32 });
            }
        }
        i += 1;
    }

    joints
}

pub fn extract_animation<S: Scene + ?Sized>(scene: &S) -> LumeResult<AnimationAsset> {
    let pose = find_bind_pose(scene)?;
    let root = find_skeleton_root(scene, pose)?;
    let skeleton = collect_joints(scene, root);

    let joints: Vec<AnimationJoint> = skeleton
        .iter()
        .map(|joint| AnimationJoint {
            transform: Matrix::from(scene.evaluate_global_transform(joint.node, None)),
            parent_index: joint.parent_index,
        })
        .collect();

    let stack = scene
        .current_animation_stack()
        .ok_or_else(|| LumeError::NotFound("animation stack".into()))?;

    let duration = stack.duration();
    if !duration.is_finite() || !stack.start.is_finite() {
        return Err(LumeError::InvalidArgument(format!(
            "animation stack {:?} spans {}..{}",
            stack.name, stack.start, stack.stop
        )));
    }
    let timeline_frames = timeline_frame_count(duration);

    // frame 0 is the bind pose
    let frames: Vec<AnimationFrame> = (1..timeline_frames)
        .map(|i| {
            let time = i as f64 / FRAMES_PER_SECOND;
            let transforms = skeleton
                .iter()
                .map(|joint| Matrix::from(scene.evaluate_global_transform(joint.node, Some(stack.start + time))))
                .collect();
            AnimationFrame { time, transforms }
        })
        .collect();

    log::info!(
        "Animation {:?}: {} joints, {:.3}s, {} frames of {} bytes",
        stack.name,
        joints.len(),
        duration,
        frames.len(),
        crate::codec::animation::frame_byte_len(joints.len())
    );

    Ok(AnimationAsset { joints, clip: AnimationClip { duration, frames } })
}
