//! Entry point for morphfield: a scroll-driven particle morph between two
//! model surfaces.

mod cli;

use anyhow::Result;
use clap::Parser;

use crate::cli::Cli;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.into_run_config()?;
    log::info!(
        "Starting morphfield. Backend: {:?}, show_fps={}, window_size={}x{}, models: {} -> {}",
        config.backends,
        config.show_fps,
        config.window_size.0,
        config.window_size.1,
        config.scene.first.source,
        config.scene.second.source,
    );

    platform::run(config)?;

    log::info!("Graceful shutdown. Bye!");
    Ok(())
}
