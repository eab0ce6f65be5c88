//! Stepwatch CLI
//!
//! Command-line front end for the step metrics collector.

mod args;
mod cli;
mod renderer;
mod sink;

use anyhow::Result;
use args::{Args, CollectArgs, Commands};
use clap::Parser;
use cli::Cli;
use log::info;
use renderer::TerminalRenderer;
use Commands::*;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        config,
        cache_file,
        no_color,
        command,
    } = Args::parse();

    let cli = Cli::new(TerminalRenderer::new(!no_color), config, cache_file);

    info!("Stepwatch started");

    match command {
        Some(Collect(args)) => cli.collect(args).await,
        Some(Replay(args)) => cli.replay(args).await,
        Some(Cache { command }) => cli.handle_cache_command(command).await,
        None => cli.collect(CollectArgs::default()).await,
    }
}
