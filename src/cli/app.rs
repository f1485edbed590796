use super::commands::config::ConfigCommands;
use super::commands::names::{LookupTableArgs, NamesArgs};
use super::commands::predicate::PredicateArgs;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "datavault")]
#[command(about = "Inspect data vault naming conventions, predicates and configuration")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the tables, key columns and procedures derived for an entity type
    Names(NamesArgs),
    /// Show the lookup table derived for a lookup type
    LookupTable(LookupTableArgs),
    /// Render a literal SQL predicate
    Predicate(PredicateArgs),
    /// Configuration management
    Config(ConfigCommands),
}
