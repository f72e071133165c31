use std::env;
use std::process;

use anyhow::{Context, Result, bail};
use repost_worker::app::ComponentRegistry;
use repost_worker::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    parse_args()?;
    let config = Config::from_env().context("failed to load configuration")?;
    let registry =
        ComponentRegistry::build(config).context("failed to build component registry")?;
    registry.scheduler().run_manual().await
}

fn parse_args() -> Result<()> {
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--help" => {
                print_usage();
                process::exit(0);
            }
            _ => {
                bail!("unknown argument: {}", arg);
            }
        }
    }
    Ok(())
}

fn print_usage() {
    eprintln!(
        "Usage: run_repost_once\n\nRuns a single repost pass and exits. Configuration is read from the same environment variables as the daemon."
    );
}
