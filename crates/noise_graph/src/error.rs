//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias. Variants cover
//! rejected source bindings, incomplete graphs, name-based configuration misses,
//! graph-spec compile failures, and invalid evaluation requests.
use thiserror::Error;

use crate::tier::Tier;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("tier mismatch: node is {expected}, source is {found}")]
    TierMismatch { expected: Tier, found: Tier },

    #[error("source '{slot}' of '{node}' is not bound")]
    UnboundSource { node: &'static str, slot: &'static str },

    #[error("'{node}' has no source slot '{slot}'")]
    UnknownSource { node: &'static str, slot: String },

    #[error("'{node}' has no hybrid slot '{slot}'")]
    UnknownHybrid { node: &'static str, slot: String },

    #[error("'{node}' has no variable '{name}'")]
    UnknownVariable { node: &'static str, name: String },

    #[error("unknown generator '{name}'")]
    UnknownGenerator { name: String },

    #[error("graph compile error: {0}")]
    Compile(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

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
