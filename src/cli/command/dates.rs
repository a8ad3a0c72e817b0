//! List the dekads of the rainfall series with their data version.

use anyhow::Result;

use super::Workspace;
use crate::{config::Config, query::date_versions};

pub async fn dates(config: Config) -> Result<String> {
    let ws = Workspace::load_rainfall(config).await?;
    let dates = date_versions(&ws.session)?;

    let lines: Vec<String> = dates.iter().map(|d| d.to_string()).collect();

    Ok(lines.join("\n"))
}
