//! Error types for the review insight engine.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Rating distribution does not add up, or a review rating is out of range.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// A key phrase points outside the corpus or breaks the frequency invariant.
    #[error("Invalid phrase index: {0}")]
    InvalidPhraseIndex(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True for errors raised while validating a payload.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::MalformedPayload(_) | Error::InvalidPhraseIndex(_) | Error::Json(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
