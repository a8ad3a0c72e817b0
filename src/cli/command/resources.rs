//! List the resources of an HDX dataset.

use anyhow::Result;

use crate::{cli::create_spinner, config::Config, hdx::Hdx};

pub async fn resources(config: &Config, dataset: &str) -> Result<String> {
    let hdx = Hdx::connect(&config.hdx)?;

    let bar = create_spinner(format!("Locating {}...", dataset));
    let resources = hdx.locate(dataset).await?;
    bar.finish_with_message(format!("{} resources", resources.len()));

    let lines: Vec<String> = resources
        .iter()
        .map(|r| format!("{}\t{}", r.name, r.url))
        .collect();

    Ok(lines.join("\n"))
}
