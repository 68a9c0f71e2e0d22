use super::{AssetFile, ByteReader, count_u32, write_pod, write_pods};
use crate::{FILEPATH_LEN, FilePath, Material, MaterialList};
use lume_core::{LumeError, LumeResult};
use std::io::Write;

/// Writes `u32 material_count, Material[..], u32 filepath_count, [u8; 260][..]`.
pub fn encode_materials<W: Write>(list: &MaterialList, writer: &mut W) -> LumeResult<u64> {
    list.validate()?;
    let material_count = count_u32(list.materials.len(), "materials")?;
    let filepath_count = count_u32(list.filepaths.len(), "filepaths")?;

    let mut written = write_pod(writer, &material_count)?;
    written += write_pods(writer, &list.materials)?;
    written += write_pod(writer, &filepath_count)?;
    written += write_pods(writer, &list.filepaths)?;
    Ok(written)
}

pub fn decode_materials(bytes: &[u8]) -> LumeResult<MaterialList> {
    let mut reader = ByteReader::new(bytes);
    let material_count = reader.read::<u32>("material count")? as usize;
    let materials = reader.read_many::<Material>(material_count, "materials")?;
    let filepath_count = reader.read::<u32>("filepath count")? as usize;
    let filepaths = reader.read_many::<FilePath>(filepath_count, "filepaths")?;
    reader.finish()?;

    for path in &filepaths {
        path.as_str()?;
    }
    let list = MaterialList { materials, filepaths };
    list.validate().map_err(|e| LumeError::MalformedAsset(e.to_string()))?;
    Ok(list)
}

pub fn encoded_materials_len(list: &MaterialList) -> usize {
    8 + list.materials.len() * std::mem::size_of::<Material>() + list.filepaths.len() * FILEPATH_LEN
}

impl AssetFile for MaterialList {
    const EXTENSION: &'static str = "mat";

    fn encode<W: Write>(&self, writer: &mut W) -> LumeResult<u64> {
        encode_materials(self, writer)
    }

    fn decode(bytes: &[u8]) -> LumeResult<Self> {
        decode_materials(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ComponentType, NO_TEXTURE};

    fn sample_list() -> MaterialList {
        let mut list = MaterialList::default();

        let mut first = Material::default();
        first[ComponentType::Diffuse].value = [1.0, 0.0, 0.0];
        first[ComponentType::Diffuse].factor = 0.8;
        first[ComponentType::Diffuse].input = list.push_filepath("tex/d.png").unwrap();
        first[ComponentType::NormalMap].factor = 1.0;
        first[ComponentType::NormalMap].input = list.push_filepath("tex/n.png").unwrap();

        let mut second = Material::default();
        second[ComponentType::Emissive].value = [0.2, 0.3, 0.4];
        second[ComponentType::Emissive].factor = 2.0;
        // same file again, paths are not shared
        second[ComponentType::Specular].input = list.push_filepath("tex/d.png").unwrap();

        list.materials = vec![first, second];
        list
    }

    #[test]
    fn layout_packs_components_and_fixed_paths() {
        let list = sample_list();
        let mut bytes = Vec::new();
        let written = encode_materials(&list, &mut bytes).unwrap();

        assert_eq!(written as usize, bytes.len());
        assert_eq!(bytes.len(), 4 + 2 * 96 + 4 + 3 * 260);
        assert_eq!(bytes.len(), encoded_materials_len(&list));
        assert_eq!(&bytes[0..4], &2u32.to_le_bytes());

        // diffuse of the first material: value, factor, input
        assert_eq!(&bytes[4..8], &1.0f32.to_le_bytes());
        assert_eq!(&bytes[16..20], &0.8f32.to_le_bytes());
        assert_eq!(&bytes[20..28], &0i64.to_le_bytes());
        // emissive of the first material follows after 24 bytes
        assert_eq!(&bytes[28 + 16..28 + 24], &NO_TEXTURE.to_le_bytes());

        let paths_at = 4 + 2 * 96;
        assert_eq!(&bytes[paths_at..paths_at + 4], &3u32.to_le_bytes());
        let first_path = &bytes[paths_at + 4..paths_at + 4 + 260];
        assert_eq!(&first_path[..9], b"tex/d.png");
        assert!(first_path[9..].iter().all(|&b| b == 0));
    }

    #[test]
    fn decode_reads_back_values_and_paths() {
        let list = sample_list();
        let mut bytes = Vec::new();
        encode_materials(&list, &mut bytes).unwrap();

        let decoded = decode_materials(&bytes).unwrap();
        assert_eq!(decoded, list);
        let normal = &decoded.materials[0][ComponentType::NormalMap];
        assert_eq!(decoded.texture_of(normal).unwrap().as_str().unwrap(), "tex/n.png");
        let specular = &decoded.materials[1][ComponentType::Specular];
        assert_eq!(specular.input, 2);
        assert_eq!(decoded.texture_of(specular).unwrap().as_str().unwrap(), "tex/d.png");
    }

    #[test]
    fn dangling_texture_reference_is_rejected_both_ways() {
        let mut list = sample_list();
        list.filepaths.pop();
        let mut bytes = Vec::new();
        assert!(matches!(encode_materials(&list, &mut bytes), Err(LumeError::InvalidArgument(_))));

        let mut bytes = Vec::new();
        encode_materials(&sample_list(), &mut bytes).unwrap();
        // rewrite the filepath count to 1 and cut the table to match
        let paths_at = 4 + 2 * 96;
        bytes[paths_at..paths_at + 4].copy_from_slice(&1u32.to_le_bytes());
        bytes.truncate(paths_at + 4 + 260);
        assert!(matches!(decode_materials(&bytes), Err(LumeError::MalformedAsset(_))));
    }

    #[test]
    fn empty_list_is_two_zero_counts() {
        let mut bytes = Vec::new();
        encode_materials(&MaterialList::default(), &mut bytes).unwrap();
        assert_eq!(bytes, vec![0u8; 8]);
        assert_eq!(decode_materials(&bytes).unwrap(), MaterialList::default());
    }
}
