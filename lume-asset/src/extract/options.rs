macro_rules! element_flags {
    ($(#[$meta:meta])* $name:ident { $($flag:ident = $bit:expr),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
        pub struct $name(pub u32);

        impl $name {
            pub const NONE: Self = Self(0);
            $(pub const $flag: Self = Self($bit);)+
            pub const ALL: Self = Self(0 $(| $bit)+);

            pub fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }

            pub fn is_empty(self) -> bool {
                self.0 & Self::ALL.0 == 0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::ALL
            }
        }

        impl std::ops::BitOr for $name {
            type Output = Self;
            fn bitor(self, rhs: Self) -> Self {
                Self(self.0 | rhs.0)
            }
        }
    };
}

element_flags! {
    /// Vertex attribute groups copied out of a mesh. Unselected groups stay zero.
    MeshElements {
        POSITION = 1 << 0,
        NORMAL = 1 << 1,
        COLOR = 1 << 2,
        TEXCOORD = 1 << 3,
    }
}

element_flags! {
    /// Material components copied out of a surface.
    MaterialElements {
        DIFFUSE = 1 << 0,
        EMISSIVE = 1 << 1,
        SPECULAR = 1 << 2,
        NORMAL_MAP = 1 << 3,
    }
}

element_flags! {
    /// Which asset files to produce.
    ExportKinds {
        MESH = 1 << 0,
        MATERIAL = 1 << 1,
        ANIMATION = 1 << 2,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MaterialSelection {
    #[default]
    All,
    Index(usize),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExportOptions {
    pub kinds: ExportKinds,
    pub mesh_elements: MeshElements,
    pub material_elements: MaterialElements,
    /// First mesh with this name; the first mesh of any name when unset.
    pub mesh_name: Option<String>,
    pub material: MaterialSelection,
}
