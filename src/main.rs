mod cli;
mod config;
mod engine;
mod error;
mod geometry;
mod hdx;
mod loader;
mod query;
mod reactive;
mod render;
mod resource;
mod selector;

use anyhow::{Error, Result};
use clap::Parser;
use cli::{command, Cli, Commands};
use config::Config;

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(());
        }
    };

    let result = match cli.command {
        Commands::Resources { dataset } => command::resources(&config, &dataset).await,
        Commands::Layers {} => command::layers(&config).await,
        Commands::Dates {} => command::dates(config).await,
        Commands::Map { level, date, adm1 } => command::map(config, level, date, adm1).await,
        Commands::Chart { adm2, range } => command::chart(config, adm2, range).await,
        Commands::Run {} => command::run(config).await,
        Commands::Explore {} => command::explore(config).await,
    };

    match result {
        Ok(output) => println!("{}", output),
        Err(e) => eprintln!("Error: {}", e),
    }

    Ok(())
}
