use crate::error::{Result, UpdateError};
use crate::toolchain::{Toolchain, GOPATH};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

pub const BIN_DIR_NAME: &str = "bin";

/// `<GOPATH>/bin`, where `go install` puts executables.
pub fn get_go_bin_dir(toolchain: &dyn Toolchain) -> Result<PathBuf> {
    let gopath = toolchain.env(GOPATH);
    if gopath.is_empty() {
        return Err(UpdateError::ConfigMissing {
            name: GOPATH.to_string(),
        });
    }

    let bin_dir = PathBuf::from(gopath).join(BIN_DIR_NAME);
    tracing::debug!("Go bin directory: {}", bin_dir.display());

    match fs::metadata(&bin_dir) {
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Err(UpdateError::PathMissing { path: bin_dir })
        }
        _ => Ok(bin_dir),
    }
}

/// Every non-directory entry of the Go bin directory, in listing order.
pub fn list_installed_binaries(toolchain: &dyn Toolchain) -> Result<Vec<PathBuf>> {
    let bin_dir = get_go_bin_dir(toolchain)?;
    let enumeration_failure = |source| UpdateError::EnumerationFailure {
        path: bin_dir.clone(),
        source,
    };

    let mut binaries = Vec::new();
    for entry in fs::read_dir(&bin_dir).map_err(enumeration_failure)? {
        let entry = entry.map_err(enumeration_failure)?;
        let file_type = entry.file_type().map_err(enumeration_failure)?;
        if file_type.is_dir() {
            tracing::trace!("Skipping directory {}", entry.path().display());
            continue;
        }
        binaries.push(entry.path());
    }

    tracing::info!(
        "Found {} installed binaries in {}",
        binaries.len(),
        bin_dir.display()
    );
    Ok(binaries)
}
