use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum OttoError {
    #[error("{0} not found: {1}")]
    NotFound(&'static str, Uuid),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("migration error: {0}")]
    Migration(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("llm error: {0}")]
    Llm(String),

    #[error("email delivery error: {0}")]
    Email(String),

    #[error("search error: {0}")]
    Search(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type OttoResult<T> = Result<T, OttoError>;
