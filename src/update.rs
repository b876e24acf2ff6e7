//! The update run: probe, enumerate, then resolve and reinstall each binary.
//!
//! Items are handled strictly one after another. A failure on one binary is
//! printed and recorded in the [`Summary`]; only a missing toolchain or a bin
//! directory that cannot be listed ends the run early.

use crate::config::Settings;
use crate::error::{Result, UpdateError};
use crate::installed::list_installed_binaries;
use crate::source::{resolve_source, ModuleSource};
use crate::toolchain::Toolchain;
use console::style;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum Outcome {
    /// `go install` succeeded. `new_version` is `None` when the reinstalled
    /// binary could not be resolved again.
    Updated {
        source: ModuleSource,
        new_version: Option<String>,
    },
    /// Dry run: the binary would be reinstalled from `source`.
    Planned { source: ModuleSource },
    /// The source could not be determined, so nothing was installed.
    Skipped { reason: UpdateError },
    /// `go install` failed.
    Failed {
        source: ModuleSource,
        reason: UpdateError,
    },
}

#[derive(Debug)]
pub struct ItemReport {
    pub binary: PathBuf,
    pub outcome: Outcome,
}

#[derive(Debug, Default)]
pub struct Summary {
    pub items: Vec<ItemReport>,
}

impl Summary {
    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.items.iter().filter(|i| pred(&i.outcome)).count()
    }

    pub fn updated(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Updated { .. }))
    }

    pub fn planned(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Planned { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed { .. }))
    }

    pub fn print(&self, dry_run: bool) {
        if dry_run {
            println!("{} to install, {} skipped", self.planned(), self.skipped());
        } else {
            println!(
                "{} updated, {} skipped, {} failed",
                self.updated(),
                self.skipped(),
                self.failed()
            );
        }
    }
}

/// How the reinstalled version relates to the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionChange {
    Upgraded,
    Unchanged,
    Downgraded,
    /// Different, but not comparable as semver.
    Changed,
}

pub fn compare_versions(old: &str, new: &str) -> VersionChange {
    if old == new {
        return VersionChange::Unchanged;
    }

    let old_semver = semver::Version::parse(old.trim_start_matches('v'));
    let new_semver = semver::Version::parse(new.trim_start_matches('v'));
    match (old_semver, new_semver) {
        (Ok(old), Ok(new)) => match new.cmp(&old) {
            Ordering::Greater => VersionChange::Upgraded,
            Ordering::Less => VersionChange::Downgraded,
            Ordering::Equal => VersionChange::Unchanged,
        },
        _ => VersionChange::Changed,
    }
}

/// Run the whole update. `Err` means the run halted before the per-binary
/// loop; per-binary problems are in the returned summary.
pub fn run(toolchain: &dyn Toolchain, settings: &Settings) -> Result<Summary> {
    if !toolchain.is_installed() {
        return Err(UpdateError::ToolchainMissing);
    }

    let binaries = list_installed_binaries(toolchain)?;

    let mut summary = Summary::default();
    for binary in binaries {
        let outcome = update_binary(toolchain, &binary, settings.dry_run);
        let item = ItemReport { binary, outcome };
        print_item(&item);
        summary.items.push(item);
    }

    Ok(summary)
}

pub fn update_binary(toolchain: &dyn Toolchain, binary: &Path, dry_run: bool) -> Outcome {
    let source = match resolve_source(toolchain, binary) {
        Ok(source) => source,
        Err(reason) => {
            tracing::debug!("Skipping {}: {}", binary.display(), reason);
            return Outcome::Skipped { reason };
        }
    };

    if dry_run {
        return Outcome::Planned { source };
    }

    let target = source.install_target();
    tracing::info!("Installing {}...", target);
    if let Err(reason) = toolchain.install(&target) {
        return Outcome::Failed { source, reason };
    }

    let new_version = match resolve_source(toolchain, binary) {
        Ok(reinstalled) => Some(reinstalled.version),
        Err(e) => {
            tracing::warn!(
                "Could not read the new version of {}: {}",
                binary.display(),
                e
            );
            None
        }
    };

    Outcome::Updated {
        source,
        new_version,
    }
}

fn print_item(item: &ItemReport) {
    match &item.outcome {
        Outcome::Updated {
            source,
            new_version: Some(new_version),
        } => match compare_versions(&source.version, new_version) {
            VersionChange::Unchanged => println!(
                "{} {} already at latest ({})",
                style("ok").green(),
                source,
                source.version
            ),
            _ => println!(
                "{} {} {} -> {}",
                style("updated").green(),
                source,
                source.version,
                new_version
            ),
        },
        Outcome::Updated {
            source,
            new_version: None,
        } => println!(
            "{} {} (was {})",
            style("updated").green(),
            source,
            source.version
        ),
        Outcome::Planned { source } => println!(
            "{} {} ({})",
            style("would install").cyan(),
            source.install_target(),
            source.version
        ),
        Outcome::Skipped {
            reason:
                reason @ (UpdateError::UnknownProvenance { .. }
                | UpdateError::DisassemblyFailure { .. }),
        } => println!("{}", reason),
        Outcome::Skipped { reason } => println!("{}: {}", item.binary.display(), reason),
        Outcome::Failed { source, reason } => {
            tracing::debug!("{} stays at {}", source, source.version);
            println!("{}", style(reason).red());
        }
    }
}
