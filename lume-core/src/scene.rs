use std::path::Path;

use glam::Mat4;

use crate::{LumeError, LumeResult};

/// Index of a node inside a scene.
pub type NodeId = usize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MappingMode {
    ByControlPoint,
    ByPolygonVertex,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReferenceMode {
    Direct,
    IndexToDirect,
}

/// A per-vertex attribute layer (normals, colors, UVs) attached to a mesh.
#[derive(Clone, Debug)]
pub struct LayerElement<T> {
    pub mapping: MappingMode,
    pub reference: ReferenceMode,
    pub direct: Vec<T>,
    pub index: Vec<u32>,
}

impl<T> LayerElement<T> {
    pub fn direct(mapping: MappingMode, direct: Vec<T>) -> Self {
        Self { mapping, reference: ReferenceMode::Direct, direct, index: Vec::new() }
    }

    pub fn indexed(mapping: MappingMode, direct: Vec<T>, index: Vec<u32>) -> Self {
        Self { mapping, reference: ReferenceMode::IndexToDirect, direct, index }
    }

    /// Resolves the attribute of one triangle corner.
    ///
    /// `polygon_vertex_index` is the corner's position in the polygon-vertex
    /// array, `control_point` the control point that corner refers to.
    pub fn resolve(&self, polygon_vertex_index: usize, control_point: usize) -> LumeResult<&T> {
        let mut slot = match self.mapping {
            MappingMode::ByPolygonVertex => polygon_vertex_index,
            MappingMode::ByControlPoint => control_point,
        };

        if self.reference == ReferenceMode::IndexToDirect {
            slot = *self.index.get(slot).ok_or_else(|| {
                LumeError::InvalidArgument(format!(
                    "layer index array has {} entries, corner needs slot {}",
                    self.index.len(),
                    slot
                ))
            })? as usize;
        }

        self.direct.get(slot).ok_or_else(|| {
            LumeError::InvalidArgument(format!(
                "layer direct array has {} entries, corner needs slot {}",
                self.direct.len(),
                slot
            ))
        })
    }
}

#[derive(Clone, Debug, Default)]
pub struct MeshGeometry {
    pub name: String,
    pub control_points: Vec<[f32; 3]>,
    /// Triangulated corner list: three control-point indices per polygon.
    pub polygon_vertices: Vec<u32>,
    pub normals: Option<LayerElement<[f32; 3]>>,
    pub colors: Option<LayerElement<[f32; 4]>>,
    pub uvs: Option<LayerElement<[f32; 2]>>,
}

impl MeshGeometry {
    pub fn polygon_count(&self) -> usize {
        self.polygon_vertices.len() / 3
    }
}

#[derive(Clone, Debug)]
pub enum Geometry {
    Mesh(MeshGeometry),
    Other { name: String, kind: String },
}

impl Geometry {
    pub fn name(&self) -> &str {
        match self {
            Geometry::Mesh(mesh) => &mesh.name,
            Geometry::Other { name, .. } => name,
        }
    }

    pub fn as_mesh(&self) -> Option<&MeshGeometry> {
        match self {
            Geometry::Mesh(mesh) => Some(mesh),
            Geometry::Other { .. } => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MaterialChannel {
    pub color: [f32; 3],
    pub factor: f32,
    /// Texture path relative to the scene file.
    pub texture: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LambertSurface {
    pub diffuse: MaterialChannel,
    pub emissive: MaterialChannel,
    pub normal_map: MaterialChannel,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PhongSurface {
    pub specular: MaterialChannel,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ShadingModel {
    Lambert(LambertSurface),
    Phong(LambertSurface, PhongSurface),
    Other(String),
}

impl ShadingModel {
    pub fn lambert(&self) -> Option<&LambertSurface> {
        match self {
            ShadingModel::Lambert(lambert) | ShadingModel::Phong(lambert, _) => Some(lambert),
            ShadingModel::Other(_) => None,
        }
    }

    pub fn phong(&self) -> Option<&PhongSurface> {
        match self {
            ShadingModel::Phong(_, phong) => Some(phong),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceMaterial {
    pub name: String,
    pub shading: ShadingModel,
}

#[derive(Clone, Debug, Default)]
pub struct Pose {
    pub name: String,
    pub is_bind_pose: bool,
    pub nodes: Vec<NodeId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkeletonKind {
    Root,
    Limb,
    LimbNode,
    Effector,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AnimationStack {
    pub name: String,
    pub start: f64,
    pub stop: f64,
}

impl AnimationStack {
    pub fn duration(&self) -> f64 {
        (self.stop - self.start).max(0.0)
    }
}

/// Read access to an imported scene graph.
///
/// Everything handed out borrows from the scene, so nothing extracted from it
/// can outlive the import.
pub trait Scene {
    fn geometries(&self) -> &[Geometry];
    fn materials(&self) -> &[SurfaceMaterial];
    fn poses(&self) -> &[Pose];

    fn children(&self, node: NodeId) -> &[NodeId];
    fn skeleton(&self, node: NodeId) -> Option<SkeletonKind>;

    fn current_animation_stack(&self) -> Option<&AnimationStack>;

    /// World transform of `node`. `None` evaluates the default pose.
    fn evaluate_global_transform(&self, node: NodeId, time: Option<f64>) -> Mat4;
}

pub trait SceneImporter {
    type Scene: Scene;

    /// Opens and parses a scene file.
    fn import(&self, path: &Path) -> LumeResult<Self::Scene>;
}

/// Imports `path`, lends the scene to `f`, and releases it before returning,
/// whether `f` succeeded or not.
pub fn with_scene<I, T, F>(importer: &I, path: &Path, f: F) -> LumeResult<T>
where
    I: SceneImporter,
    F: FnOnce(&I::Scene) -> LumeResult<T>,
{
    let scene = importer.import(path)?;
    log::debug!("Imported scene {:?}", path);
    let result = f(&scene);
    drop(scene);
    log::debug!("Released scene {:?}", path);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn by_polygon_vertex_direct_uses_corner_slot() {
        let layer = LayerElement::direct(MappingMode::ByPolygonVertex, vec![10, 11, 12]);
        assert_eq!(*layer.resolve(2, 0).unwrap(), 12);
    }

    #[test]
    fn by_control_point_direct_uses_control_point() {
        let layer = LayerElement::direct(MappingMode::ByControlPoint, vec![10, 11, 12]);
        assert_eq!(*layer.resolve(0, 1).unwrap(), 11);
    }

    #[test]
    fn index_to_direct_goes_through_index_array() {
        let layer = LayerElement::indexed(MappingMode::ByPolygonVertex, vec![10, 11], vec![1, 1, 0]);
        assert_eq!(*layer.resolve(2, 5).unwrap(), 10);
        assert_eq!(*layer.resolve(0, 5).unwrap(), 11);

        let by_point = LayerElement::indexed(MappingMode::ByControlPoint, vec![10, 11], vec![0, 1]);
        assert_eq!(*by_point.resolve(7, 1).unwrap(), 11);
    }

    #[test]
    fn out_of_range_slot_is_rejected() {
        let layer = LayerElement::indexed(MappingMode::ByPolygonVertex, vec![10], vec![3]);
        assert!(matches!(layer.resolve(0, 0), Err(LumeError::InvalidArgument(_))));
        assert!(matches!(layer.resolve(1, 0), Err(LumeError::InvalidArgument(_))));
    }

    #[test]
    fn phong_is_part_of_the_lambert_family() {
        let phong = ShadingModel::Phong(LambertSurface::default(), PhongSurface::default());
        assert!(phong.lambert().is_some());
        assert!(phong.phong().is_some());
        assert!(ShadingModel::Other("hlsl".into()).lambert().is_none());
    }

    struct FailingImporter;

    impl SceneImporter for FailingImporter {
        type Scene = EmptyScene;

        fn import(&self, path: &Path) -> LumeResult<EmptyScene> {
            Err(LumeError::ResourceFailure(format!("cannot open {:?}", path)))
        }
    }

    struct EmptyScene;

    impl Scene for EmptyScene {
        fn geometries(&self) -> &[Geometry] { &[] }
        fn materials(&self) -> &[SurfaceMaterial] { &[] }
        fn poses(&self) -> &[Pose] { &[] }
        fn children(&self, _node: NodeId) -> &[NodeId] { &[] }
        fn skeleton(&self, _node: NodeId) -> Option<SkeletonKind> { None }
        fn current_animation_stack(&self) -> Option<&AnimationStack> { None }
        fn evaluate_global_transform(&self, _node: NodeId, _time: Option<f64>) -> Mat4 { Mat4::IDENTITY }
    }

    #[test]
    fn import_failure_skips_the_closure() {
        let mut called = false;
        let result = with_scene(&FailingImporter, Path::new("missing.fbx"), |_| {
            called = true;
            Ok(())
        });
        assert!(matches!(result, Err(LumeError::ResourceFailure(_))));
        assert!(!called);
    }
}
