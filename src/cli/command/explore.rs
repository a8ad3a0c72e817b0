//! Interactive session: every view is rendered once, then each change typed
//! at the prompt re-renders only the views that depend on it.

use anyhow::Result;
use log::info;
use rustyline::{error::ReadlineError, Config as EditorConfig, DefaultEditor};

use super::{
    views::{selector_state, RenderReport, Renderer, Selections},
    Workspace,
};
use crate::{
    config::Config,
    reactive::{Change, SelectorState, View},
};

const PROMPT: &str = "rainfall ❯ ";
const HELP: &str = "date <YYYY-MM-DD[: version]> | adm1 <PCODE> | adm2 <PCODE> | range <lo> <hi> | quit";

pub async fn explore(config: Config) -> Result<String> {
    let ws = Workspace::load(config).await?;

    tokio::task::block_in_place(|| prompt(&ws))
}

fn prompt(ws: &Workspace) -> Result<String> {
    let state = selector_state(ws, &Selections::default())?;
    let mut explorer = Explorer::new(ws, state);
    print_report(explorer.render_all());
    println!("{}", HELP);

    let config = EditorConfig::builder()
        .history_ignore_space(true)
        .auto_add_history(true)
        .build();
    let mut editor = DefaultEditor::with_config(config)?;

    let mut changes = 0;
    loop {
        let line = match editor.readline(PROMPT) {
            Ok(line) => line,
            Err(ReadlineError::Eof | ReadlineError::Interrupted) => break,
            Err(e) => return Err(e.into()),
        };
        match line.trim() {
            "" => continue,
            "quit" | "exit" => break,
            "help" => println!("{}", HELP),
            input => match explorer.handle(input) {
                Ok(report) => {
                    changes += 1;
                    print_report(report);
                }
                Err(e) => eprintln!("Error: {}", e),
            },
        }
    }

    Ok(format!("{} changes applied", changes))
}

fn print_report(report: RenderReport) {
    for line in &report.lines {
        println!("{}", line);
    }
    for (view, e) in &report.failures {
        eprintln!("Error: {:?}: {}", view, e);
    }
}

/// Selector state plus the views still owed a successful render.
struct Explorer<'a> {
    renderer: Renderer<'a>,
    state: SelectorState,
    stale: Vec<View>,
}

impl<'a> Explorer<'a> {
    fn new(ws: &'a Workspace, state: SelectorState) -> Self {
        Explorer {
            renderer: Renderer::new(ws),
            state,
            stale: View::ALL.to_vec(),
        }
    }

    fn render_all(&mut self) -> RenderReport {
        self.render(View::ALL.to_vec())
    }

    /// Applies one prompt line. A rejected line leaves the state untouched;
    /// views that fail to render are retried with the next line.
    fn handle(&mut self, input: &str) -> Result<RenderReport> {
        let change: Change = input.parse()?;
        let mut views = self.state.apply(&change)?;
        views.extend(self.stale.iter().copied());
        views.sort();
        views.dedup();

        if views.is_empty() {
            info!("`{}` left every view unchanged", input);
        }

        Ok(self.render(views))
    }

    fn render(&mut self, views: Vec<View>) -> RenderReport {
        let report = self.renderer.render(&views, &mut self.state);
        self.stale = report.failed_views();

        report
    }
}

// -- Tests -------------------------------------------------------------------
