pub mod error;
pub mod scene;

pub use error::{LumeError, LumeResult};
pub use scene::{Scene, SceneImporter, with_scene};
