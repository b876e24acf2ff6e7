//! Subprocess calls into the Go toolchain.
//!
//! Every call blocks until the child exits. Nothing is cached: each
//! [`Toolchain::env`] lookup spawns a fresh `go env`, so the toolchain stays the
//! single source of truth for its own configuration.

use crate::error::{Result, UpdateError};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

/// Workspace root; installed binaries live in its `bin` directory.
pub const GOPATH: &str = "GOPATH";
/// Module download cache root.
pub const GOMODCACHE: &str = "GOMODCACHE";

/// The symbol whose line table points back at the `main` package sources.
pub const MAIN_SYMBOL: &str = "main.main";

pub trait Toolchain {
    /// True when `go version` runs and exits cleanly.
    fn is_installed(&self) -> bool;

    /// Trimmed combined output of `go env <name>`, or an empty string when the
    /// query fails.
    fn env(&self, name: &str) -> String;

    /// Stdout of `go tool objdump -s main.main <binary>`.
    fn objdump_main(&self, binary: &Path) -> Result<String>;

    /// Run `go install <target>` with stdout and stderr passed through.
    fn install(&self, target: &str) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct GoToolchain {
    go: PathBuf,
}

impl GoToolchain {
    pub fn new(go: impl Into<PathBuf>) -> Self {
        Self { go: go.into() }
    }

    fn command(&self) -> Command {
        Command::new(&self.go)
    }
}

impl Toolchain for GoToolchain {
    fn is_installed(&self) -> bool {
        tracing::debug!("Executing: {} version", self.go.display());
        match self
            .command()
            .arg("version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
        {
            Ok(status) => status.success(),
            Err(e) => {
                tracing::debug!("Could not launch {}: {}", self.go.display(), e);
                false
            }
        }
    }

    fn env(&self, name: &str) -> String {
        tracing::debug!("Executing: {} env {}", self.go.display(), name);
        let output = match self.command().args(["env", name]).output() {
            Ok(output) if output.status.success() => output,
            Ok(output) => {
                tracing::debug!("go env {} failed: {}", name, describe_status(output.status));
                return String::new();
            }
            Err(e) => {
                tracing::debug!("go env {} failed: {}", name, e);
                return String::new();
            }
        };

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        let value = combined.trim().to_string();
        tracing::debug!("{}={}", name, value);
        value
    }

    fn objdump_main(&self, binary: &Path) -> Result<String> {
        tracing::debug!(
            "Executing: {} tool objdump -s {} {}",
            self.go.display(),
            MAIN_SYMBOL,
            binary.display()
        );
        let output = self
            .command()
            .args(["tool", "objdump", "-s", MAIN_SYMBOL])
            .arg(binary)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| UpdateError::DisassemblyFailure {
                binary: binary.to_path_buf(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = match stderr.trim() {
                "" => describe_status(output.status),
                text => text.to_string(),
            };
            return Err(UpdateError::DisassemblyFailure {
                binary: binary.to_path_buf(),
                message,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn install(&self, target: &str) -> Result<()> {
        tracing::debug!("Executing: {} install {}", self.go.display(), target);
        let status = self
            .command()
            .args(["install", target])
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| UpdateError::ReinstallFailure {
                target: target.to_string(),
                message: e.to_string(),
            })?;

        if !status.success() {
            return Err(UpdateError::ReinstallFailure {
                target: target.to_string(),
                message: describe_status(status),
            });
        }
        Ok(())
    }
}

fn describe_status(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exit status {}", code),
        None => "terminated by signal".to_string(),
    }
}
