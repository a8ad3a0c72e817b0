//! Render the anomaly map of governorates, or of the districts of one.

use anyhow::Result;

use super::{
    views::{selector_state, Renderer, Selections},
    Workspace,
};
use crate::{config::Config, query::AdminLevel, reactive::View};

pub async fn map(
    config: Config,
    level: u8,
    date: Option<String>,
    adm1: Option<String>,
) -> Result<String> {
    let view = match AdminLevel::from_number(level)? {
        AdminLevel::One => View::Adm1Map,
        AdminLevel::Two => View::Adm2Map,
    };

    let ws = Workspace::load(config).await?;
    let selections = Selections {
        date,
        adm1,
        ..Selections::default()
    };
    let mut state = selector_state(&ws, &selections)?;

    let lines = Renderer::new(&ws).render(&[view], &mut state).into_result()?;

    Ok(lines.join("\n"))
}
