mod cli;
mod commands;
mod config;
mod effects;
mod render;
mod session;

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;
use rfp_logging::rfp_info;

use crate::cli::Cli;
use crate::config::AppConfig;
use crate::effects::EffectRunner;
use crate::session::Session;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    let level = if cli.debug {
        LevelFilter::Debug
    } else {
        config.log_level()?
    };
    rfp_logging::initialize(config.log.destination.into(), level, &config.log.path);
    rfp_info!(
        "rfp {} starting against {}",
        env!("CARGO_PKG_VERSION"),
        config.base_url
    );

    let runner = EffectRunner::new(&config.api_settings())
        .with_context(|| format!("connecting to {}", config.base_url))?;
    commands::run(cli.command, Session::new(runner), &config)
}
