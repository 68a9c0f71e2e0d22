pub mod compact;

pub use compact::{compact, expand};
