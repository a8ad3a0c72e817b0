//! Render every view once with the configured selections.

use anyhow::Result;

use super::{
    views::{selector_state, Renderer, Selections},
    Workspace,
};
use crate::{config::Config, reactive::View};

pub async fn run(config: Config) -> Result<String> {
    let ws = Workspace::load(config).await?;
    let mut state = selector_state(&ws, &Selections::default())?;

    let lines = Renderer::new(&ws).render(&View::ALL, &mut state).into_result()?;

    Ok(lines.join("\n"))
}
