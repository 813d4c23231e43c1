//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias. Variants cover
//! missing generator inputs, invalid configuration, malformed layers and unsupported
//! tileset metadata. Outcomes such as "no legal position" or "no route" are not errors;
//! they are reported through [`crate::events`] and the generated map instead.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("no element layer data supplied")]
    MissingElements,

    #[error("no element quantities supplied")]
    MissingQuantities,

    #[error("missing tiles for category '{key}'")]
    MissingTiles { key: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid layer '{name}': {reason}")]
    InvalidLayer { name: String, reason: String },

    #[error("unsupported wangset: {0}")]
    UnsupportedWangset(String),

    #[error("{0}")]
    Other(String),
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Other(value)
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::Other(value.to_owned())
    }
}
