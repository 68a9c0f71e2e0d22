use super::SceneGraph;
use lume_core::scene::{
    Geometry, LambertSurface, LayerElement, MappingMode, MaterialChannel, MeshGeometry, PhongSurface, ShadingModel,
    SurfaceMaterial,
};
use lume_core::{LumeError, LumeResult, SceneImporter};
use std::path::Path;

/// Wavefront OBJ/MTL importer. OBJ has no skeletons, poses or animation
/// stacks, so only mesh and material data come out of it.
#[derive(Clone, Copy, Debug, Default)]
pub struct ObjImporter;

impl SceneImporter for ObjImporter {
    type Scene = SceneGraph;

    fn import(&self, path: &Path) -> LumeResult<SceneGraph> {
        let load_options = tobj::LoadOptions {
            single_index: false,
            triangulate: true,
            ..Default::default()
        };

        let (models, materials) = tobj::load_obj(path, &load_options)
            .map_err(|e| LumeError::ResourceFailure(format!("Failed to load OBJ file {:?}: {}", path, e)))?;

        let materials = materials.unwrap_or_else(|e| {
            log::warn!("No usable MTL for {:?}: {}", path, e);
            Vec::new()
        });

        Ok(scene_from_obj(models, &materials))
    }
}

pub fn scene_from_obj(models: Vec<tobj::Model>, materials: &[tobj::Material]) -> SceneGraph {
    let mut scene = SceneGraph::new();
    for model in models {
        scene.add_geometry(Geometry::Mesh(mesh_geometry(model)));
    }
    for material in materials {
        scene.add_material(surface_material(material));
    }
    scene
}

fn triples(flat: &[f32]) -> Vec<[f32; 3]> {
    flat.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect()
}

fn mesh_geometry(model: tobj::Model) -> MeshGeometry {
    let mesh = model.mesh;
    let control_points = triples(&mesh.positions);
    let point_count = control_points.len();

    let normals = if mesh.normals.is_empty() {
        None
    } else if !mesh.normal_indices.is_empty() {
        Some(LayerElement::indexed(MappingMode::ByPolygonVertex, triples(&mesh.normals), mesh.normal_indices))
    } else {
        Some(LayerElement::direct(MappingMode::ByControlPoint, triples(&mesh.normals)))
    };

    let uvs = if mesh.texcoords.is_empty() {
        None
    } else {
        let direct = mesh.texcoords.chunks_exact(2).map(|c| [c[0], c[1]]).collect();
        if !mesh.texcoord_indices.is_empty() {
            Some(LayerElement::indexed(MappingMode::ByPolygonVertex, direct, mesh.texcoord_indices))
        } else {
            Some(LayerElement::direct(MappingMode::ByControlPoint, direct))
        }
    };

    // `v x y z r g b` gives one opaque color per position
    let colors = if mesh.vertex_color.len() == point_count * 3 && point_count > 0 {
        let direct = mesh.vertex_color.chunks_exact(3).map(|c| [c[0], c[1], c[2], 1.0]).collect();
        Some(LayerElement::direct(MappingMode::ByControlPoint, direct))
    } else {
        None
    };

    MeshGeometry {
        name: model.name,
        control_points,
        polygon_vertices: mesh.indices,
        normals,
        colors,
        uvs,
    }
}

/// Last whitespace-separated word of a texture statement, dropping options
/// such as `-bm 1.0`.
fn texture_file(value: &str) -> Option<String> {
    value.split_whitespace().last().map(String::from)
}

fn texture_of(statement: Option<&String>) -> Option<String> {
    statement.and_then(|v| texture_file(v))
}

fn surface_material(m: &tobj::Material) -> SurfaceMaterial {
    // tobj leaves `map_Ke` and `norm` unparsed
    let param = |key: &str| m.unknown_param.get(key);

    let lambert = LambertSurface {
        diffuse: MaterialChannel {
            color: m.diffuse.unwrap_or([0.0; 3]),
            factor: 1.0,
            texture: texture_of(m.diffuse_texture.as_ref()),
        },
        emissive: MaterialChannel {
            color: m.emissive.unwrap_or([0.0; 3]),
            factor: if m.emissive.is_some() { 1.0 } else { 0.0 },
            texture: texture_of(param("map_Ke")),
        },
        normal_map: MaterialChannel {
            color: [0.0; 3],
            factor: 1.0,
            texture: texture_of(m.normal_texture.as_ref()).or_else(|| texture_of(param("norm"))),
        },
    };

    let shading = match m.illumination_model {
        None | Some(0) | Some(1) => ShadingModel::Lambert(lambert),
        Some(2) => ShadingModel::Phong(
            lambert,
            PhongSurface {
                specular: MaterialChannel {
                    color: m.specular.unwrap_or([0.0; 3]),
                    factor: 1.0,
                    texture: texture_of(m.specular_texture.as_ref()),
                },
            },
        ),
        Some(other) => ShadingModel::Other(format!("MTL illumination model {}", other)),
    };

    SurfaceMaterial { name: m.name.clone(), shading }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lume_core::Scene;
    use std::fs;
    use tempfile::TempDir;

    const CUBE_FACE_OBJ: &str = "\
mtllib face.mtl
o face
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
usemtl painted
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    const FACE_MTL: &str = "\
newmtl painted
Kd 1 0 0
Ks 0.5 0.5 0.5
Ke 0.1 0.2 0.3
illum 2
map_Kd tex/d.png
map_Ks tex/s.png
newmtl glass
Kd 0 0 1
illum 7
newmtl glowing
Ke 1 0.5 0
map_Ke tex/e.png
map_Kd -clamp on tex/g.png
map_Bump -bm 0.5 tex/n.png
";

    fn write_fixture(dir: &TempDir) -> std::path::PathBuf {
        fs::write(dir.path().join("face.mtl"), FACE_MTL).unwrap();
        let obj = dir.path().join("face.obj");
        fs::write(&obj, CUBE_FACE_OBJ).unwrap();
        obj
    }

    #[test]
    fn quad_is_triangulated_with_indexed_layers() {
        let dir = TempDir::new().unwrap();
        let scene = ObjImporter.import(&write_fixture(&dir)).unwrap();

        let mesh = scene.geometries()[0].as_mesh().unwrap();
        assert_eq!(mesh.name, "face");
        assert_eq!(mesh.control_points.len(), 4);
        assert_eq!(mesh.polygon_count(), 2);

        let normals = mesh.normals.as_ref().unwrap();
        assert_eq!(*normals.resolve(5, 0).unwrap(), [0.0, 0.0, 1.0]);
        let uvs = mesh.uvs.as_ref().unwrap();
        assert_eq!(uvs.mapping, MappingMode::ByPolygonVertex);
        assert!(mesh.colors.is_none());
    }

    #[test]
    fn mtl_illumination_picks_the_shading_model() {
        let dir = TempDir::new().unwrap();
        let scene = ObjImporter.import(&write_fixture(&dir)).unwrap();
        let materials = scene.materials();
        assert_eq!(materials.len(), 3);

        let painted = materials.iter().find(|m| m.name == "painted").unwrap();
        let lambert = painted.shading.lambert().unwrap();
        assert_eq!(lambert.diffuse.color, [1.0, 0.0, 0.0]);
        assert_eq!(lambert.diffuse.texture.as_deref(), Some("tex/d.png"));
        assert_eq!(lambert.emissive.color, [0.1, 0.2, 0.3]);
        assert_eq!(lambert.emissive.factor, 1.0);
        let phong = painted.shading.phong().unwrap();
        assert_eq!(phong.specular.texture.as_deref(), Some("tex/s.png"));

        let glass = materials.iter().find(|m| m.name == "glass").unwrap();
        assert!(matches!(glass.shading, ShadingModel::Other(_)));
    }

    #[test]
    fn emission_and_texture_options_come_through() {
        let dir = TempDir::new().unwrap();
        let scene = ObjImporter.import(&write_fixture(&dir)).unwrap();
        let materials = scene.materials();

        let glowing = materials.iter().find(|m| m.name == "glowing").unwrap();
        let lambert = glowing.shading.lambert().unwrap();
        assert_eq!(lambert.emissive.color, [1.0, 0.5, 0.0]);
        assert_eq!(lambert.emissive.factor, 1.0);
        assert_eq!(lambert.emissive.texture.as_deref(), Some("tex/e.png"));
        assert_eq!(lambert.diffuse.texture.as_deref(), Some("tex/g.png"));
        assert_eq!(lambert.normal_map.texture.as_deref(), Some("tex/n.png"));

        let painted = materials.iter().find(|m| m.name == "painted").unwrap();
        assert_eq!(painted.shading.lambert().unwrap().normal_map.texture, None);

        let plain = surface_material(&tobj::Material { name: "plain".into(), ..Default::default() });
        let emissive = &plain.shading.lambert().unwrap().emissive;
        assert_eq!((emissive.color, emissive.factor), ([0.0; 3], 0.0));
    }

    #[test]
    fn missing_file_is_a_resource_failure() {
        let dir = TempDir::new().unwrap();
        let result = ObjImporter.import(&dir.path().join("nope.obj"));
        assert!(matches!(result, Err(LumeError::ResourceFailure(_))));
    }

    #[test]
    fn texture_options_are_dropped() {
        assert_eq!(texture_file("-bm 0.5 tex/n.png").as_deref(), Some("tex/n.png"));
        assert_eq!(texture_file("tex/d.png").as_deref(), Some("tex/d.png"));
        assert_eq!(texture_file("   "), None);
    }
}
