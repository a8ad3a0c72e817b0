//! List the layers of the boundary archive.

use anyhow::Result;

use super::locate_one;
use crate::{
    cli::create_spinner,
    config::Config,
    engine::Session,
    hdx::Hdx,
    loader::{list_layers, vsi_path},
};

pub async fn layers(config: &Config) -> Result<String> {
    let source = &config.boundaries;
    let hdx = Hdx::connect(&config.hdx)?;
    let archive = locate_one(&hdx, &source.dataset, &source.resource_suffix).await?;

    let session = Session::open_with_extensions()?;
    let bar = create_spinner(format!("Reading layers of {}...", archive.name));
    let layers = list_layers(&session, &vsi_path(&archive))?;
    bar.finish_with_message(format!("{} layers", layers.len()));

    Ok(layers.join("\n"))
}
