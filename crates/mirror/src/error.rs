use engine::EngineError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MirrorError>;

#[derive(Debug, Error)]
pub enum MirrorError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("{0} not found")]
    NotFound(String),
    #[error("invalid import: {0}")]
    InvalidImport(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
