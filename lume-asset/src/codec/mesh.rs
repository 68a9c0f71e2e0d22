use super::{AssetFile, ByteReader, count_u32, write_pod, write_pods};
use crate::{Mesh, Vertex};
use lume_core::{LumeError, LumeResult};
use std::io::Write;

/// Writes `u32 vertex_count, Vertex[..], u32 index_count, u32[..]`.
pub fn encode_mesh<W: Write>(mesh: &Mesh, writer: &mut W) -> LumeResult<u64> {
    mesh.validate()?;
    let vertex_count = count_u32(mesh.vertices.len(), "vertices")?;
    let index_count = count_u32(mesh.indices.len(), "indices")?;

    let mut written = write_pod(writer, &vertex_count)?;
    written += write_pods(writer, &mesh.vertices)?;
    written += write_pod(writer, &index_count)?;
    written += write_pods(writer, &mesh.indices)?;
    Ok(written)
}

pub fn decode_mesh(bytes: &[u8]) -> LumeResult<Mesh> {
    let mut reader = ByteReader::new(bytes);
    let vertex_count = reader.read::<u32>("vertex count")? as usize;
    let vertices = reader.read_many::<Vertex>(vertex_count, "vertices")?;
    let index_count = reader.read::<u32>("index count")? as usize;
    let indices = reader.read_many::<u32>(index_count, "indices")?;
    reader.finish()?;

    let mesh = Mesh { vertices, indices };
    mesh.validate().map_err(|e| LumeError::MalformedAsset(e.to_string()))?;
    Ok(mesh)
}

pub fn encoded_mesh_len(mesh: &Mesh) -> usize {
    8 + mesh.vertices.len() * std::mem::size_of::<Vertex>() + mesh.indices.len() * 4
}

impl AssetFile for Mesh {
    const EXTENSION: &'static str = "mesh";

    fn encode<W: Write>(&self, writer: &mut W) -> LumeResult<u64> {
        encode_mesh(self, writer)
    }

    fn decode(bytes: &[u8]) -> LumeResult<Self> {
        decode_mesh(bytes)
    }
}
