//! Pulls engine assets out of an imported scene and writes them to disk.

mod options;

pub mod animation;
pub mod material;
pub mod mesh;

pub use animation::extract_animation;
pub use material::extract_materials;
pub use mesh::extract_mesh;
pub use options::{ExportKinds, ExportOptions, MaterialElements, MaterialSelection, MeshElements};

use crate::codec::AssetFile;
use lume_core::{LumeResult, Scene, SceneImporter, with_scene};
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SceneSummary {
    pub polygon_count: usize,
    pub material_count: usize,
    pub pose_count: usize,
}

pub fn summarize<S: Scene + ?Sized>(scene: &S) -> SceneSummary {
    SceneSummary {
        polygon_count: scene.geometries().iter().filter_map(|g| g.as_mesh()).map(|m| m.polygon_count()).sum(),
        material_count: scene.materials().len(),
        pose_count: scene.poses().len(),
    }
}

/// Asset kinds in the order they are exported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Animation,
    Material,
    Mesh,
}

impl AssetKind {
    pub const ORDER: [AssetKind; 3] = [AssetKind::Animation, AssetKind::Material, AssetKind::Mesh];

    pub fn extension(self) -> &'static str {
        match self {
            AssetKind::Animation => crate::AnimationAsset::EXTENSION,
            AssetKind::Material => crate::MaterialList::EXTENSION,
            AssetKind::Mesh => crate::Mesh::EXTENSION,
        }
    }

    pub fn flag(self) -> ExportKinds {
        match self {
            AssetKind::Animation => ExportKinds::ANIMATION,
            AssetKind::Material => ExportKinds::MATERIAL,
            AssetKind::Mesh => ExportKinds::MESH,
        }
    }
}

/// `input` with its extension replaced by the one for `kind`.
pub fn output_path(input: &Path, kind: AssetKind) -> PathBuf {
    input.with_extension(kind.extension())
}

/// Result of one requested kind. `result` holds the bytes written.
#[derive(Debug)]
pub struct ExportOutcome {
    pub kind: AssetKind,
    pub path: PathBuf,
    pub result: LumeResult<u64>,
}

impl ExportOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

fn export_kind<S: Scene + ?Sized>(scene: &S, kind: AssetKind, path: &Path, options: &ExportOptions) -> LumeResult<u64> {
    match kind {
        AssetKind::Animation => extract_animation(scene)?.save_to_file(path),
        AssetKind::Material => {
            extract_materials(scene, options.material, options.material_elements)?.save_to_file(path)
        }
        AssetKind::Mesh => {
            extract_mesh(scene, options.mesh_name.as_deref(), options.mesh_elements)?.save_to_file(path)
        }
    }
}

/// Exports every requested kind from an already imported scene. Kinds are
/// independent: one failing does not stop the others.
pub fn export_scene<S: Scene + ?Sized>(scene: &S, input: &Path, options: &ExportOptions) -> Vec<ExportOutcome> {
    AssetKind::ORDER
        .into_iter()
        .filter(|kind| options.kinds.contains(kind.flag()))
        .map(|kind| {
            let path = output_path(input, kind);
            let result = export_kind(scene, kind, &path, options);
            match &result {
                Ok(bytes) => log::info!("Wrote {:?} ({} bytes)", path, bytes),
                Err(e) => log::warn!("{:?} export failed: {}", kind, e),
            }
            ExportOutcome { kind, path, result }
        })
        .collect()
}

/// Imports `input` once, exports the requested kinds next to it and releases
/// the scene. Fails only when the import itself fails.
pub fn export_file<I: SceneImporter>(importer: &I, input: &Path, options: &ExportOptions) -> LumeResult<Vec<ExportOutcome>> {
    with_scene(importer, input, |scene| {
        let summary = summarize(scene);
        log::info!(
            "Scene {:?}: {} polygons, {} materials, {} poses",
            input,
            summary.polygon_count,
            summary.material_count,
            summary.pose_count
        );
        Ok(export_scene(scene, input, options))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneGraph;
    use lume_core::LumeError;
    use lume_core::scene::{Geometry, MeshGeometry};

    #[test]
    fn outputs_replace_the_extension() {
        let input = Path::new("assets/hero.fbx");
        assert_eq!(output_path(input, AssetKind::Mesh), Path::new("assets/hero.mesh"));
        assert_eq!(output_path(input, AssetKind::Material), Path::new("assets/hero.mat"));
        assert_eq!(output_path(Path::new("hero"), AssetKind::Animation), Path::new("hero.anim"));
    }

    #[test]
    fn summary_counts_mesh_polygons() {
        let mut scene = SceneGraph::new();
        scene.add_geometry(Geometry::Mesh(MeshGeometry {
            name: "tri".into(),
            control_points: vec![[0.0; 3]; 3],
            polygon_vertices: vec![0, 1, 2, 2, 1, 0],
            ..Default::default()
        }));
        scene.add_geometry(Geometry::Other { name: "light".into(), kind: "light".into() });
        assert_eq!(summarize(&scene), SceneSummary { polygon_count: 2, material_count: 0, pose_count: 0 });
    }

    #[test]
    fn unrequested_kinds_are_skipped() {
        let options = ExportOptions { kinds: ExportKinds::MESH, ..Default::default() };
        let outcomes = export_scene(&SceneGraph::new(), Path::new("nothing/here.obj"), &options);
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].kind, AssetKind::Mesh);
        assert!(matches!(outcomes[0].result, Err(LumeError::NotFound(_))));
    }

    #[test]
    fn kinds_run_animation_first() {
        let outcomes = export_scene(&SceneGraph::new(), Path::new("x.obj"), &ExportOptions::default());
        let kinds: Vec<AssetKind> = outcomes.iter().map(|o| o.kind).collect();
        assert_eq!(kinds, AssetKind::ORDER.to_vec());
        assert!(outcomes.iter().all(|o| !o.is_ok()));
    }
}
