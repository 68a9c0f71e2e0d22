use super::MeshElements;
use crate::processor::compact;
use crate::{Mesh, Vertex};
use lume_core::scene::MeshGeometry;
use lume_core::{LumeError, LumeResult, Scene};

/// First mesh geometry named `name`, or the first mesh of any name.
pub fn find_mesh<'s, S: Scene + ?Sized>(scene: &'s S, name: Option<&str>) -> LumeResult<&'s MeshGeometry> {
    scene
        .geometries()
        .iter()
        .filter_map(|g| g.as_mesh())
        .find(|mesh| name.is_none_or(|n| mesh.name == n))
        .ok_or_else(|| match name {
            Some(n) => LumeError::NotFound(format!("mesh named {:?}", n)),
            None => LumeError::NotFound("mesh".into()),
        })
}

/// Builds one vertex per triangle corner, copying only the selected groups.
pub fn corner_vertices(mesh: &MeshGeometry, elements: MeshElements) -> LumeResult<Vec<Vertex>> {
    if mesh.polygon_vertices.len() % 3 != 0 {
        return Err(LumeError::InvalidArgument(format!(
            "mesh {:?} has {} polygon vertices, expected triangles",
            mesh.name,
            mesh.polygon_vertices.len()
        )));
    }

    let mut vertices = Vec::with_capacity(mesh.polygon_vertices.len());
    for (corner, &control_point) in mesh.polygon_vertices.iter().enumerate() {
        let control_point = control_point as usize;
        let mut vertex = Vertex::default();

        if elements.contains(MeshElements::POSITION) {
            vertex.position = *mesh.control_points.get(control_point).ok_or_else(|| {
                LumeError::InvalidArgument(format!(
                    "corner {} references control point {} of {}",
                    corner,
                    control_point,
                    mesh.control_points.len()
                ))
            })?;
        }
        if elements.contains(MeshElements::NORMAL) {
            if let Some(layer) = &mesh.normals {
                vertex.normal = *layer.resolve(corner, control_point)?;
            }
        }
        if elements.contains(MeshElements::COLOR) {
            if let Some(layer) = &mesh.colors {
                vertex.color = *layer.resolve(corner, control_point)?;
            }
        }
        if elements.contains(MeshElements::TEXCOORD) {
            if let Some(layer) = &mesh.uvs {
                let [u, v] = *layer.resolve(corner, control_point)?;
                // image rows run top-down in the loader
                vertex.texcoord = [u, 1.0 - v];
            }
        }

        vertices.push(vertex);
    }

    Ok(vertices)
}

pub fn extract_mesh<S: Scene + ?Sized>(scene: &S, name: Option<&str>, elements: MeshElements) -> LumeResult<Mesh> {
    let geometry = find_mesh(scene, name)?;
    let raw = corner_vertices(geometry, elements)?;
    let mesh = compact(&raw)?;

    let reduction = (raw.len() - mesh.vertices.len()) as f32 / raw.len() as f32 * 100.0;
    log::info!(
        "Mesh {:?}: {} raw vertices -> {} unique ({:.1}% reduction), {} indices",
        geometry.name,
        raw.len(),
        mesh.vertices.len(),
        reduction,
        mesh.indices.len()
    );

    Ok(mesh)
}
