//! Error types for the bundler.
//!
//! Every build-time failure is fatal: the build stops and nothing is written.

use std::{io, path::PathBuf};
use thiserror::Error;

pub type BuildResult<T> = Result<T, BuildError>;

/// Coarse classification of a [`BuildError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    Parse,
    Transform,
    Circular,
    Emit,
    Config,
}

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("failed to transform {}: {message}", path.display())]
    Transform { path: PathBuf, message: String },

    /// Only raised when every import gets its own module, where a cycle never terminates.
    #[error("circular import: {}", format_chain(chain))]
    Circular { chain: Vec<PathBuf> },

    #[error("emitted bundle is not valid JavaScript: {message}")]
    InvalidBundle { message: String },

    #[error("invalid config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl BuildError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BuildError::Read { .. } | BuildError::Write { .. } => ErrorKind::Io,
            BuildError::Parse { .. } => ErrorKind::Parse,
            BuildError::Transform { .. } => ErrorKind::Transform,
            BuildError::Circular { .. } => ErrorKind::Circular,
            BuildError::InvalidBundle { .. } => ErrorKind::Emit,
            BuildError::Config { .. } => ErrorKind::Config,
        }
    }
}

fn format_chain(chain: &[PathBuf]) -> String {
    chain.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(" -> ")
}
