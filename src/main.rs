use anyhow::Result;
use clap::Parser;
use log::debug;

mod cli;

use cli::commands::{config_command, lookup_table_command, names_command, predicate_command};
use cli::{Cli, Commands};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_default_env().init();

    let cli = Cli::parse();
    debug!("Starting datavault");

    match cli.command {
        Commands::Names(args) => names_command(args),
        Commands::LookupTable(args) => lookup_table_command(args),
        Commands::Predicate(args) => predicate_command(args),
        Commands::Config(args) => config_command(args),
    }
}
