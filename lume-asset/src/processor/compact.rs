use crate::{Mesh, Vertex};
use lume_core::{LumeError, LumeResult};
use std::collections::HashMap;

/// Collapses a per-corner vertex stream into unique vertices plus indices.
///
/// Unique vertices keep the order of their first occurrence and every corner
/// keeps its position, so `vertices[indices[i]] == raw[i]` for all `i`.
pub fn compact(raw: &[Vertex]) -> LumeResult<Mesh> {
    if raw.is_empty() {
        return Err(LumeError::InvalidArgument("no vertices to compact".into()));
    }
    if raw.len() % 3 != 0 {
        return Err(LumeError::InvalidArgument(format!(
            "{} corners do not form whole triangles",
            raw.len()
        )));
    }
    if u32::try_from(raw.len()).is_err() {
        return Err(LumeError::InvalidArgument(format!(
            "{} corners exceed 32-bit indexing",
            raw.len()
        )));
    }

    let mut vertices = Vec::new();
    let mut indices = Vec::with_capacity(raw.len());
    let mut lookup: HashMap<Vertex, u32> = HashMap::with_capacity(raw.len());

    for &v in raw {
        let index = *lookup.entry(v).or_insert_with(|| {
            let idx = vertices.len() as u32;
            vertices.push(v);
            idx
        });
        indices.push(index);
    }

    if vertices.is_empty() || indices.is_empty() {
        return Err(LumeError::InvalidArgument("compaction produced an empty mesh".into()));
    }

    Ok(Mesh { vertices, indices })
}

/// Replays the index buffer, undoing `compact`.
pub fn expand(mesh: &Mesh) -> LumeResult<Vec<Vertex>> {
    mesh.validate()?;
    Ok(mesh.indices.iter().map(|&i| mesh.vertices[i as usize]).collect())
}
