use std::fmt;

#[derive(Debug)]
pub enum LumeError {
    InvalidArgument(String),
    ResourceFailure(String),
    NotFound(String),
    UnsupportedShadingModel(String),
    MalformedAsset(String),
}

impl fmt::Display for LumeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LumeError::InvalidArgument(msg) => write!(f, "Invalid Argument: {}", msg),
            LumeError::ResourceFailure(msg) => write!(f, "Resource Failure: {}", msg),
            LumeError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            LumeError::UnsupportedShadingModel(msg) => write!(f, "Unsupported Shading Model: {}", msg),
            LumeError::MalformedAsset(msg) => write!(f, "Malformed Asset: {}", msg),
        }
    }
}

impl std::error::Error for LumeError {}

impl From<std::io::Error> for LumeError {
    fn from(err: std::io::Error) -> Self {
        LumeError::ResourceFailure(err.to_string())
    }
}

pub type LumeResult<T> = Result<T, LumeError>;
