mod cli;
mod config;
mod error;
mod installed;
mod source;
mod toolchain;
mod update;


use anyhow::Result;
use clap::Parser;
use cli::Cli;
use config::load_settings;
use toolchain::GoToolchain;

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(&cli)?;

    let settings = load_settings(&cli);
    let go = GoToolchain::new(&settings.go_command);

    // Halting early is still a normal exit
    match update::run(&go, &settings) {
        Ok(summary) => summary.print(settings.dry_run),
        Err(e) => println!("{}", e),
    }

    Ok(())
}

fn setup_logging(cli: &Cli) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if cli.quiet {
        "error"
    } else if cli.verbose == 0 {
        "warn"
    } else if cli.verbose == 1 {
        "info"
    } else {
        "debug"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Could not set up logging: {}", e))?;

    Ok(())
}
