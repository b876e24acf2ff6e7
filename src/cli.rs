use clap::Parser;

fn get_version() -> &'static str {
    const BASE_VERSION: &str = env!("CARGO_PKG_VERSION");

    if let Some(tag) = option_env!("GOBINUPDATE_GIT_TAG") {
        return tag;
    }

    let commit = option_env!("GOBINUPDATE_GIT_COMMIT").unwrap_or("unknown");
    let branch = option_env!("GOBINUPDATE_GIT_BRANCH").unwrap_or("unknown");

    // Leaked once at startup so clap can hold a &'static str
    let version = format!("v{}-{} ({})", BASE_VERSION, commit, branch);
    Box::leak(version.into_boxed_str())
}

#[derive(Parser, Debug)]
#[command(name = "gobinupdate")]
#[command(about = "Reinstall every binary in GOPATH/bin at its latest version")]
#[command(version = get_version())]
pub struct Cli {
    /// Increase verbosity (use multiple times for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Reduce log output to errors only
    #[arg(short, long)]
    pub quiet: bool,

    /// Resolve install sources without running `go install`
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}
