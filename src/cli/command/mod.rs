pub mod chart;
pub mod dates;
pub mod explore;
pub mod layers;
pub mod map;
pub mod resources;
pub mod run;
pub mod views;

use std::path::PathBuf;

use anyhow::Result;

pub use chart::chart;
pub use dates::dates;
pub use explore::explore;
pub use layers::layers;
pub use map::map;
pub use resources::resources;
pub use run::run;

use crate::{
    cli::create_spinner,
    config::Config,
    engine::{tables, Session},
    hdx::Hdx,
    loader,
    resource::{select, NamePattern, ResourceDescriptor},
};

/// Configuration and the session holding the loaded sources.
pub struct Workspace {
    pub config: Config,
    pub session: Session,
}

impl Workspace {
    /// Locates both datasets and loads the rainfall series and the
    /// admin-1 and admin-2 boundaries.
    pub async fn load(config: Config) -> Result<Self> {
        let hdx = Hdx::connect(&config.hdx)?;
        let session = Session::open_with_extensions()?;

        load_rainfall(&hdx, &session, &config).await?;
        load_boundaries(&hdx, &session, &config).await?;

        Ok(Workspace { config, session })
    }

    /// Loads the rainfall series only.
    pub async fn load_rainfall(config: Config) -> Result<Self> {
        let hdx = Hdx::connect(&config.hdx)?;
        let session = Session::open_with_extensions()?;

        load_rainfall(&hdx, &session, &config).await?;

        Ok(Workspace { config, session })
    }

    /// Output path of an artifact named after `parts`.
    pub fn svg_file_name(&self, parts: &[&str]) -> PathBuf {
        make_svg_file_name(&self.config, parts)
    }
}

async fn load_rainfall(hdx: &Hdx, session: &Session, config: &Config) -> Result<()> {
    let source = &config.rainfall;
    let csv = locate_one(hdx, &source.dataset, &source.resource_suffix).await?;

    let bar = create_spinner(format!("Loading {}...", csv.name));
    let rows = loader::load_csv(session, tables::RAINFALL, csv.url.as_str())?;
    bar.finish_with_message(format!("Rainfall loaded ({} rows)", rows));

    Ok(())
}

async fn load_boundaries(hdx: &Hdx, session: &Session, config: &Config) -> Result<()> {
    let source = &config.boundaries;
    let archive = locate_one(hdx, &source.dataset, &source.resource_suffix).await?;

    for (table, layer) in [
        (tables::ADM_1, &source.adm1_layer),
        (tables::ADM_2, &source.adm2_layer),
    ] {
        let bar = create_spinner(format!("Loading layer {}...", layer));
        let rows =
            loader::load_geo_layer(session, table, &archive, layer, &source.geometry_column)?;
        bar.finish_with_message(format!("Boundaries `{}` loaded ({} features)", table, rows));
    }

    Ok(())
}

/// Locates a dataset and picks the resource whose name ends with `suffix`.
pub async fn locate_one(hdx: &Hdx, dataset: &str, suffix: &str) -> Result<ResourceDescriptor> {
    let bar = create_spinner(format!("Locating {}...", dataset));
    let resources = hdx.locate(dataset).await?;
    let resource = select(&resources, &NamePattern::ends_with(suffix))?.clone();
    bar.finish_with_message(format!("Found {}", resource.name));

    Ok(resource)
}

pub fn make_svg_file_name(config: &Config, parts: &[&str]) -> PathBuf {
    let file_name = format!("rainfall-{}.svg", parts.join("-"));

    config.output_dir().join(file_name)
}

// -- Tests -------------------------------------------------------------------
