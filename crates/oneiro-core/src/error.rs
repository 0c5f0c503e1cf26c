use thiserror::Error;

pub type Result<T> = std::result::Result<T, DreamError>;

#[derive(Debug, Error)]
pub enum DreamError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("insufficient credits")]
    InsufficientCredits,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("configuration: {0}")]
    Config(String),

    #[error("interpretation failed: {0}")]
    Interpretation(String),

    #[error("storage: {0}")]
    Storage(#[from] anyhow::Error),
}

impl DreamError {
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidInput(_) => 400,
            Self::InsufficientCredits => 402,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::Config(_) => 500,
            Self::Interpretation(_) => 502,
            Self::Storage(_) => 500,
        }
    }
}
