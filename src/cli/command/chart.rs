//! Render the full and zoomed rainfall charts of a district.

use anyhow::{anyhow, Result};

use super::{
    views::{selector_state, Renderer, Selections},
    Workspace,
};
use crate::{config::Config, render::window_label};

pub async fn chart(
    config: Config,
    adm2: Option<String>,
    range: Option<Vec<usize>>,
) -> Result<String> {
    let range = match range.as_deref() {
        None => None,
        Some(&[lo, hi]) => Some([lo, hi]),
        Some(other) => return Err(anyhow!("expected two range bounds, got {:?}", other)),
    };

    let ws = Workspace::load(config).await?;
    let selections = Selections {
        adm2,
        range,
        ..Selections::default()
    };
    let state = selector_state(&ws, &selections)?;
    let district = state.adm2.value();
    let window = state.range.value();

    let mut renderer = Renderer::new(&ws);
    let full = renderer.district_chart(district)?;
    let zoomed = renderer.zoom_chart(district, window)?;

    Ok(format!(
        "Chart of {} saved to `{}`\n{} saved to `{}`",
        district,
        full.path.display(),
        window_label(renderer.series(), window)?,
        zoomed.path.display()
    ))
}
