use crate::cli::Cli;
use std::path::PathBuf;

pub const DEFAULT_GO_COMMAND: &str = "go";
pub const GO_COMMAND_ENV: &str = "GOBINUPDATE_GO";
pub const DRY_RUN_ENV: &str = "GOBINUPDATE_DRY_RUN";

/// Runtime settings for one invocation. Nothing here is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// The `go` executable every toolchain call is made with.
    pub go_command: PathBuf,
    pub dry_run: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            go_command: PathBuf::from(DEFAULT_GO_COMMAND),
            dry_run: false,
        }
    }
}

pub fn load_settings(cli: &Cli) -> Settings {
    let settings = Settings {
        dry_run: cli.dry_run,
        ..Settings::default()
    };
    apply_env_overrides(settings, |key| std::env::var(key).ok())
}

/// Apply `GOBINUPDATE_*` overrides on top of the CLI-derived settings.
///
/// `GOPATH` and `GOMODCACHE` are deliberately absent: those are only ever read
/// through `go env`.
pub fn apply_env_overrides<F>(mut settings: Settings, lookup: F) -> Settings
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(go) = lookup(GO_COMMAND_ENV) {
        let go = go.trim();
        if !go.is_empty() {
            settings.go_command = PathBuf::from(go);
        }
    }

    if let Some(dry_run) = lookup(DRY_RUN_ENV) {
        if is_truthy(&dry_run) {
            settings.dry_run = true;
        }
    }

    tracing::debug!("Settings: {:?}", settings);
    settings
}

fn is_truthy(value: &str) -> bool {
    let value = value.trim();
    value == "1" || value.eq_ignore_ascii_case("true")
}
