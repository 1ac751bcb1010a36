use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CplError {
    #[error("Invalid resource {track_file_id}: {message}")]
    InvalidResource { track_file_id: Uuid, message: String },

    #[error("Virtual track {id} has no resources")]
    EmptyTrack { id: Uuid },

    #[error("Invalid sequence type: {0}")]
    InvalidSequenceType(String),

    #[error(transparent)]
    Core(#[from] imf_core::Error),
}

pub type Result<T> = std::result::Result<T, CplError>;
