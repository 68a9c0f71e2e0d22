use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use lume_core::{LumeError, LumeResult};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Index, IndexMut};

pub mod codec;
pub mod extract;
pub mod processor;
pub mod scene;

pub use codec::{AssetFile, decode_animation, decode_materials, decode_mesh, encode_animation, encode_materials, encode_mesh};
pub use extract::{ExportKinds, ExportOptions, MaterialElements, MaterialSelection, MeshElements, export_file};
pub use processor::compact;

/// One triangle corner. Compared and hashed by its raw bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3], // 12 bytes
    pub normal: [f32; 3],   // 12 bytes
    pub color: [f32; 4],    // 16 bytes
    pub texcoord: [f32; 2], // 8 bytes, 48 total
}

impl PartialEq for Vertex {
    fn eq(&self, other: &Self) -> bool {
        bytemuck::bytes_of(self) == bytemuck::bytes_of(other)
    }
}

impl Eq for Vertex {}

impl Hash for Vertex {
    fn hash<H: Hasher>(&self, state: &mut H) {
        bytemuck::bytes_of(self).hash(state);
    }
}

/// 4x4 transform, row-major in the row-vector convention (translation in
/// elements 12..15). Bit-identical to glam's column-major storage.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Matrix {
    pub values: [f32; 16],
}

impl Matrix {
    pub const IDENTITY: Self = Self {
        values: [
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_cols_array(&self.values)
    }
}

impl From<Mat4> for Matrix {
    fn from(m: Mat4) -> Self {
        Self { values: m.to_cols_array() }
    }
}

/// Deduplicated vertex buffer plus one index per original triangle corner.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn validate(&self) -> LumeResult<()> {
        if self.indices.len() % 3 != 0 {
            return Err(LumeError::InvalidArgument(format!(
                "index count {} is not a multiple of 3",
                self.indices.len()
            )));
        }
        let vertex_count = self.vertices.len();
        if let Some(&bad) = self.indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(LumeError::InvalidArgument(format!(
                "index {} out of range for {} vertices",
                bad, vertex_count
            )));
        }
        Ok(())
    }
}

/// `input` value of a component without a texture.
pub const NO_TEXTURE: i64 = -1;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct MaterialComponent {
    pub value: [f32; 3],
    pub factor: f32,
    /// Index into the owning list's filepaths, or `NO_TEXTURE`.
    pub input: i64,
}

impl Default for MaterialComponent {
    fn default() -> Self {
        Self { value: [0.0; 3], factor: 0.0, input: NO_TEXTURE }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComponentType {
    Diffuse = 0,
    Emissive = 1,
    Specular = 2,
    NormalMap = 3,
}

impl ComponentType {
    pub const ALL: [ComponentType; 4] = [
        ComponentType::Diffuse,
        ComponentType::Emissive,
        ComponentType::Specular,
        ComponentType::NormalMap,
    ];
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Material {
    pub components: [MaterialComponent; 4],
}

impl Default for Material {
    fn default() -> Self {
        Self { components: [MaterialComponent::default(); 4] }
    }
}

impl Index<ComponentType> for Material {
    type Output = MaterialComponent;

    fn index(&self, component: ComponentType) -> &MaterialComponent {
        &self.components[component as usize]
    }
}

impl IndexMut<ComponentType> for Material {
    fn index_mut(&mut self, component: ComponentType) -> &mut MaterialComponent {
        &mut self.components[component as usize]
    }
}

pub const FILEPATH_LEN: usize = 260;

/// Fixed-width, null-padded path field.
#[repr(C)]
#[derive(Copy, Clone, PartialEq, Eq, Pod, Zeroable)]
pub struct FilePath {
    bytes: [u8; FILEPATH_LEN],
}

impl FilePath {
    pub fn new(path: &str) -> LumeResult<Self> {
        let raw = path.as_bytes();
        // leave room for the terminator
        if raw.len() >= FILEPATH_LEN {
            return Err(LumeError::InvalidArgument(format!(
                "texture path is {} bytes, limit is {}: {}",
                raw.len(),
                FILEPATH_LEN - 1,
                path
            )));
        }
        if raw.contains(&0) {
            return Err(LumeError::InvalidArgument(format!("texture path contains a NUL byte: {:?}", path)));
        }
        let mut bytes = [0u8; FILEPATH_LEN];
        bytes[..raw.len()].copy_from_slice(raw);
        Ok(Self { bytes })
    }

    pub fn as_str(&self) -> LumeResult<&str> {
        let end = self.bytes.iter().position(|&b| b == 0).unwrap_or(FILEPATH_LEN);
        std::str::from_utf8(&self.bytes[..end])
            .map_err(|e| LumeError::MalformedAsset(format!("texture path is not UTF-8: {}", e)))
    }
}

impl fmt::Debug for FilePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_str() {
            Ok(s) => write!(f, "FilePath({:?})", s),
            Err(_) => write!(f, "FilePath(<invalid>)"),
        }
    }
}

/// Materials plus the texture path table their components point into.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MaterialList {
    pub materials: Vec<Material>,
    pub filepaths: Vec<FilePath>,
}

impl MaterialList {
    /// Appends a path and returns its index. Paths are not deduplicated.
    pub fn push_filepath(&mut self, path: &str) -> LumeResult<i64> {
        let filepath = FilePath::new(path)?;
        self.filepaths.push(filepath);
        Ok(self.filepaths.len() as i64 - 1)
    }

    pub fn texture_of(&self, component: &MaterialComponent) -> Option<&FilePath> {
        usize::try_from(component.input).ok().and_then(|i| self.filepaths.get(i))
    }

    pub fn validate(&self) -> LumeResult<()> {
        for (m, material) in self.materials.iter().enumerate() {
            for (c, component) in material.components.iter().enumerate() {
                let in_range = component.input == NO_TEXTURE
                    || (component.input >= 0 && (component.input as usize) < self.filepaths.len());
                if !in_range {
                    return Err(LumeError::InvalidArgument(format!(
                        "material {} component {} references filepath {} of {}",
                        m,
                        c,
                        component.input,
                        self.filepaths.len()
                    )));
                }
            }
        }
        Ok(())
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct AnimationJoint {
    pub transform: Matrix,
    /// -1 for a root, otherwise an earlier joint's index.
    pub parent_index: i32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AnimationFrame {
    pub time: f64,
    /// One transform per joint, in joint order.
    pub transforms: Vec<Matrix>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnimationClip {
    pub duration: f64,
    pub frames: Vec<AnimationFrame>,
}

/// A joint hierarchy and the clip sampled over it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnimationAsset {
    pub joints: Vec<AnimationJoint>,
    pub clip: AnimationClip,
}

impl AnimationAsset {
    pub fn validate(&self) -> LumeResult<()> {
        validate_joints(&self.joints)?;
        for (f, frame) in self.clip.frames.iter().enumerate() {
            if frame.transforms.len() != self.joints.len() {
                return Err(LumeError::InvalidArgument(format!(
                    "frame {} has {} transforms for {} joints",
                    f,
                    frame.transforms.len(),
                    self.joints.len()
                )));
            }
        }
        Ok(())
    }
}

pub fn validate_joints(joints: &[AnimationJoint]) -> LumeResult<()> {
    for (i, joint) in joints.iter().enumerate() {
        let parent = joint.parent_index;
        if parent < -1 || (parent >= 0 && parent as usize >= i) {
            return Err(LumeError::InvalidArgument(format!(
                "joint {} has parent {}, parents must precede children",
                i, parent
            )));
        }
    }
    Ok(())
}

const _: () = assert!(std::mem::size_of::<Vertex>() == 48);
const _: () = assert!(std::mem::size_of::<Matrix>() == 64);
const _: () = assert!(std::mem::size_of::<MaterialComponent>() == 24);
const _: () = assert!(std::mem::size_of::<Material>() == 96);
const _: () = assert!(std::mem::size_of::<FilePath>() == FILEPATH_LEN);
const _: () = assert!(std::mem::size_of::<AnimationJoint>() == 68);
