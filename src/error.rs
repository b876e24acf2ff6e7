//! Error kinds for a gobinupdate run.
//!
//! Probe and enumeration errors halt the run. Every other kind is scoped to a
//! single binary: it is reported and the loop moves on.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpdateError {
    /// `go version` failed or could not be launched.
    #[error("no Go compiler installed")]
    ToolchainMissing,

    /// `go env <name>` returned nothing.
    #[error("env variable '{name}' not set or empty")]
    ConfigMissing { name: String },

    /// The binary install directory is absent.
    #[error("path '{}' does not exist", path.display())]
    PathMissing { path: PathBuf },

    /// Listing the binary install directory failed.
    #[error("could not list '{}': {source}", path.display())]
    EnumerationFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The symbol table carries no `module@version` source path.
    #[error("'{}' was not installed by 'go install' command", binary.display())]
    UnknownProvenance { binary: PathBuf },

    /// `go tool objdump` failed on the binary.
    #[error("could not read symbols of '{}': {message}", binary.display())]
    DisassemblyFailure { binary: PathBuf, message: String },

    /// The source path lies outside the module cache.
    #[error("source path '{path}' is not inside the module cache '{cache}'")]
    NotInModuleCache { path: String, cache: String },

    /// The source path does not have a `module@version/package/file` shape.
    #[error("malformed source path '{path}': {reason}")]
    MalformedSymbolPath { path: String, reason: String },

    /// `go install` failed.
    #[error("installing '{target}' failed: {message}")]
    ReinstallFailure { target: String, message: String },
}

pub type Result<T> = std::result::Result<T, UpdateError>;
