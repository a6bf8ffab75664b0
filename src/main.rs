//! Swig CLI entry point

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use swig::cli::Cli;
use swig::App;

fn main() -> Result<ExitCode> {
    // Human-facing output is printed directly; RUST_LOG=debug shows engine internals
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    log::info!("swig v{}", swig::app::VERSION);

    let cwd = std::env::current_dir()?;
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;

    let app = App::new(cli, cwd);
    Ok(runtime.block_on(app.run()))
}
