use anyhow::Result;
use charon_fonts_cli::cli::Cli;
use clap::Parser;
use env_logger::Env;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();
    cli.command.run()
}
