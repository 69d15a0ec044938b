use thiserror::Error;

#[derive(Error, Debug)]
pub enum FolioError {
    #[error("{0}")]
    NotFound(String),
    #[error("unknown content kind: {0}")]
    UnknownKind(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Invalid(String),
    #[error("store failure: {0}")]
    Store(String),
}

impl FolioError {
    /// Expected-condition errors that callers surface as 4xx rather than server faults.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, FolioError::Store(_))
    }
}

pub type Result<T> = std::result::Result<T, FolioError>;
