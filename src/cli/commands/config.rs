use anyhow::Result;
use clap::{Args, Subcommand};
use datavault::DataVaultConfig;
use log::info;

#[derive(Args)]
pub struct ConfigCommands {
    #[command(subcommand)]
    pub command: ConfigSubcommands,
}

#[derive(Subcommand)]
pub enum ConfigSubcommands {
    /// Show the effective configuration
    Show,
    /// Print the config file path
    Path,
    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

pub fn config_command(args: ConfigCommands) -> Result<()> {
    match args.command {
        ConfigSubcommands::Show => {
            let config = DataVaultConfig::load()?;
            print!("{}", config.to_toml()?);
        }
        ConfigSubcommands::Path => {
            println!("{}", DataVaultConfig::get_config_path()?.display());
        }
        ConfigSubcommands::Init { force } => {
            let path = DataVaultConfig::get_config_path()?;
            if path.exists() && !force {
                anyhow::bail!("Config file already exists: {} (use --force to overwrite)", path.display());
            }
            DataVaultConfig::default().save_to(&path)?;
            info!("Initialized config at {:?}", path);
            println!("Wrote {}", path.display());
        }
    }
    Ok(())
}
