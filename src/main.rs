//! docaddr - resolve documentation addresses from the command line.

mod cli;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::Cli;
use docaddr::config::SiteConfig;
use docaddr::logger;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = SiteConfig::load(&cli.config)?;
    cli::run(&cli, &config)
}
