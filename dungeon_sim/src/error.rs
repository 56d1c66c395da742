use dungeon_core::config::ConfigError;
use dungeon_core::EngineError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Failed to load rules: {0}")]
    Config(#[from] ConfigError),
    #[error("Failed to read duel file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid duel JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
}

pub type SimResult<T> = Result<T, SimError>;
