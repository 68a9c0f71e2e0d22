//! Owned scene graphs that satisfy `lume_core::Scene`.

pub mod obj;

pub use obj::ObjImporter;

use glam::{Mat4, Quat, Vec3};
use lume_core::scene::{AnimationStack, Geometry, NodeId, Pose, SkeletonKind, SurfaceMaterial};
use lume_core::Scene;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Trs {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Trs {
    fn default() -> Self {
        Self { translation: Vec3::ZERO, rotation: Quat::IDENTITY, scale: Vec3::ONE }
    }
}

impl Trs {
    pub fn from_translation(translation: Vec3) -> Self {
        Self { translation, ..Default::default() }
    }

    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

/// Keyframes in seconds. Empty channels fall back to the node's base TRS.
#[derive(Clone, Debug, Default)]
pub struct NodeTracks {
    pub translation: Vec<(f64, Vec3)>,
    pub rotation: Vec<(f64, Quat)>,
    pub scale: Vec<(f64, Vec3)>,
}

fn sample_keys<T: Copy>(keys: &[(f64, T)], t: f64, default: T, blend: impl Fn(T, T, f32) -> T) -> T {
    let (Some(first), Some(last)) = (keys.first(), keys.last()) else {
        return default;
    };
    if t <= first.0 {
        return first.1;
    }
    if t >= last.0 {
        return last.1;
    }
    let next = keys.partition_point(|(time, _)| *time <= t);
    let (t0, a) = keys[next - 1];
    let (t1, b) = keys[next];
    let f = ((t - t0) / (t1 - t0)) as f32;
    blend(a, b, f)
}

impl NodeTracks {
    fn sample(&self, base: &Trs, t: f64) -> Trs {
        Trs {
            translation: sample_keys(&self.translation, t, base.translation, |a, b, f| a.lerp(b, f)),
            rotation: sample_keys(&self.rotation, t, base.rotation, |a, b, f| a.slerp(b, f)),
            scale: sample_keys(&self.scale, t, base.scale, |a, b, f| a.lerp(b, f)),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct SceneNode {
    pub name: String,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub skeleton: Option<SkeletonKind>,
    pub base: Trs,
    pub tracks: Option<NodeTracks>,
}

#[derive(Clone, Debug, Default)]
pub struct SceneGraph {
    geometries: Vec<Geometry>,
    materials: Vec<SurfaceMaterial>,
    poses: Vec<Pose>,
    nodes: Vec<SceneNode>,
    animation_stack: Option<AnimationStack>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_geometry(&mut self, geometry: Geometry) {
        self.geometries.push(geometry);
    }

    pub fn add_material(&mut self, material: SurfaceMaterial) {
        self.materials.push(material);
    }

    pub fn add_pose(&mut self, pose: Pose) {
        self.poses.push(pose);
    }

    /// Adds a node under `parent` and returns its id. Panics if `parent` is
    /// not a node of this scene.
    pub fn add_node(&mut self, name: &str, parent: Option<NodeId>, skeleton: Option<SkeletonKind>, base: Trs) -> NodeId {
        let id = self.nodes.len();
        if let Some(p) = parent {
            self.nodes[p].children.push(id);
        }
        self.nodes.push(SceneNode {
            name: name.to_string(),
            parent,
            children: Vec::new(),
            skeleton,
            base,
            tracks: None,
        });
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id)
    }

    pub fn set_tracks(&mut self, node: NodeId, tracks: NodeTracks) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.tracks = Some(tracks);
        }
    }

    pub fn set_animation_stack(&mut self, stack: AnimationStack) {
        self.animation_stack = Some(stack);
    }

    pub fn clear_animation_stack(&mut self) {
        self.animation_stack = None;
    }

    fn local_transform(&self, node: &SceneNode, time: Option<f64>) -> Mat4 {
        match (time, &node.tracks) {
            (Some(t), Some(tracks)) => tracks.sample(&node.base, t).to_mat4(),
            _ => node.base.to_mat4(),
        }
    }
}

impl Scene for SceneGraph {
    fn geometries(&self) -> &[Geometry] {
        &self.geometries
    }

    fn materials(&self) -> &[SurfaceMaterial] {
        &self.materials
    }

    fn poses(&self) -> &[Pose] {
        &self.poses
    }

    fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes.get(node).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    fn skeleton(&self, node: NodeId) -> Option<SkeletonKind> {
        self.nodes.get(node).and_then(|n| n.skeleton)
    }

    fn current_animation_stack(&self) -> Option<&AnimationStack> {
        self.animation_stack.as_ref()
    }

    fn evaluate_global_transform(&self, node: NodeId, time: Option<f64>) -> Mat4 {
        let mut world = Mat4::IDENTITY;
        let mut current = self.nodes.get(node);
        // parents are added before children, so the chain is at most this long
        let mut depth = 0;
        while let Some(n) = current {
            if depth > self.nodes.len() {
                break;
            }
            world = self.local_transform(n, time) * world;
            current = n.parent.and_then(|p| self.nodes.get(p));
            depth += 1;
        }
        world
    }
}
