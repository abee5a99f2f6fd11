//! Error taxonomy
//!
//! Startup errors are fatal: the server never binds with an invalid mount
//! table. Resolution errors are per request and only the front-end turns
//! them into status codes.

use std::path::PathBuf;
use thiserror::Error;

/// Invalid mount table configuration
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("duplicate mount prefix '{prefix}'")]
    DuplicatePrefix { prefix: String },
    #[error("invalid mount prefix '{prefix}': {reason}")]
    InvalidPrefix {
        prefix: String,
        reason: &'static str,
    },
    #[error("mount '{name}': root directory '{}' does not exist", root.display())]
    MissingRoot { name: String, root: PathBuf },
    #[error("mount '{name}': '{}' is not a directory", root.display())]
    NotADirectory { name: String, root: PathBuf },
}

/// A named package could not be located
#[derive(Error, Debug)]
#[error("package '{name}' not found (searched: {searched})")]
pub struct PackageNotFoundError {
    pub name: String,
    pub searched: String,
}

/// Anything that stops the server from starting
#[derive(Error, Debug)]
pub enum StartupError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    PackageNotFound(#[from] PackageNotFoundError),
}

/// Outcome of a failed static resolution
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveError {
    /// The path would leave the mount root
    #[error("forbidden path")]
    Forbidden,
    #[error("not found")]
    NotFound,
    /// Directories are never listed
    #[error("is a directory")]
    IsDirectory,
}

impl ResolveError {
    /// HTTP status this failure maps to
    pub const fn status_code(self) -> u16 {
        match self {
            Self::Forbidden => 403,
            Self::NotFound | Self::IsDirectory => 404,
        }
    }
}
