use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("data unavailable: {0}")]
    DataUnavailable(String),

    #[error("model not trained")]
    ModelNotReady,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("internal failure: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}
