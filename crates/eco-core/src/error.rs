//! Error types for the simulation.

use crate::{EntityId, Layer, Position};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid placement: cell {position} on the {layer} layer is occupied or out of bounds")]
    InvalidPlacement { position: Position, layer: Layer },

    #[error("Unknown entity: {0}")]
    UnknownEntity(EntityId),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
