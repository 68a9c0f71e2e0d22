//! Packed binary layouts for `.mesh`, `.mat` and `.anim` files.
//!
//! All three are positional: little-endian counts followed by tightly packed
//! `#[repr(C)]` records, with no header, version or padding.

pub mod animation;
pub mod material;
pub mod mesh;

pub use animation::{decode_animation, encode_animation};
pub use material::{decode_materials, encode_materials};
pub use mesh::{decode_mesh, encode_mesh};

use bytemuck::Pod;
use lume_core::{LumeError, LumeResult};
use memmap2::Mmap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

// Records are written straight from memory with cast_slice.
#[cfg(not(target_endian = "little"))]
compile_error!("asset layouts are little-endian and written from native memory");

/// An asset that can be written to and read back from its own file.
pub trait AssetFile: Sized {
    /// Extension of files holding this asset, without the dot.
    const EXTENSION: &'static str;

    fn encode<W: Write>(&self, writer: &mut W) -> LumeResult<u64>;
    fn decode(bytes: &[u8]) -> LumeResult<Self>;

    /// Writes the asset next to `path` and renames it into place, returning
    /// the byte count. A failed write leaves no file at `path`.
    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> LumeResult<u64> {
        write_atomically(path.as_ref(), |writer| self.encode(writer))
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> LumeResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| LumeError::ResourceFailure(format!("Failed to open asset file {:?}: {}", path, e)))?;
        let len = file.metadata()?.len();
        if len == 0 {
            return Self::decode(&[]);
        }
        let mmap = unsafe { Mmap::map(&file)? };
        Self::decode(&mmap)
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_atomically<F>(path: &Path, encode: F) -> LumeResult<u64>
where
    F: FnOnce(&mut BufWriter<File>) -> LumeResult<u64>,
{
    let temp = temp_path_for(path);
    let file = File::create(&temp)
        .map_err(|e| LumeError::ResourceFailure(format!("Failed to create {:?}: {}", temp, e)))?;
    let mut writer = BufWriter::with_capacity(1024 * 1024, file);

    let written = encode(&mut writer).and_then(|n| {
        writer.flush()?;
        Ok(n)
    });

    let result = written.and_then(|n| {
        drop(writer);
        fs::rename(&temp, path)
            .map_err(|e| LumeError::ResourceFailure(format!("Failed to move {:?} into place: {}", temp, e)))?;
        Ok(n)
    });

    if result.is_err() {
        let _ = fs::remove_file(&temp);
    }
    result
}

pub(crate) fn write_pod<W: Write, T: Pod>(writer: &mut W, value: &T) -> LumeResult<u64> {
    let bytes = bytemuck::bytes_of(value);
    writer.write_all(bytes)?;
    Ok(bytes.len() as u64)
}

pub(crate) fn write_pods<W: Write, T: Pod>(writer: &mut W, values: &[T]) -> LumeResult<u64> {
    let bytes: &[u8] = bytemuck::cast_slice(values);
    writer.write_all(bytes)?;
    Ok(bytes.len() as u64)
}

pub(crate) fn count_u32(count: usize, what: &str) -> LumeResult<u32> {
    u32::try_from(count)
        .map_err(|_| LumeError::InvalidArgument(format!("{} {} do not fit a 32-bit count", count, what)))
}

/// Forward-only cursor over an encoded asset.
pub(crate) struct ByteReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn take(&mut self, len: usize, what: &str) -> LumeResult<&'a [u8]> {
        let remaining = self.bytes.len() - self.offset;
        if len > remaining {
            return Err(LumeError::MalformedAsset(format!(
                "{} needs {} bytes at offset {}, only {} left",
                what, len, self.offset, remaining
            )));
        }
        let slice = &self.bytes[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    pub fn read<T: Pod>(&mut self, what: &str) -> LumeResult<T> {
        let slice = self.take(std::mem::size_of::<T>(), what)?;
        Ok(bytemuck::pod_read_unaligned(slice))
    }

    pub fn read_many<T: Pod>(&mut self, count: usize, what: &str) -> LumeResult<Vec<T>> {
        let size = std::mem::size_of::<T>();
        let len = count
            .checked_mul(size)
            .ok_or_else(|| LumeError::MalformedAsset(format!("{} count {} overflows", what, count)))?;
        let slice = self.take(len, what)?;
        Ok(slice.chunks_exact(size).map(bytemuck::pod_read_unaligned).collect())
    }

    pub fn finish(self) -> LumeResult<()> {
        let trailing = self.bytes.len() - self.offset;
        if trailing != 0 {
            return Err(LumeError::MalformedAsset(format!("{} trailing bytes after asset", trailing)));
        }
        Ok(())
    }
}
