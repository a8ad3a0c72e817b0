//! Builds the pickers and renders each view from the current selections.

use anyhow::{anyhow, Result};
use duckdb::arrow::record_batch::RecordBatch;
use log::info;

use super::Workspace;
use crate::{
    geometry::{to_geo, Crs},
    query::{self, AdminLevel, SeriesPoint},
    reactive::{SelectorState, View},
    render::{self, ChartArtifact, DivergingScale},
    selector::{AdminUnit, DateVersion, Dropdown, RangeSlider},
};

/// Explicit selections, falling back to the configured defaults.
#[derive(Debug, Default, Clone)]
pub struct Selections {
    pub date: Option<String>,
    pub adm1: Option<String>,
    pub adm2: Option<String>,
    pub range: Option<[usize; 2]>,
}

/// Renders the pickers from the loaded tables.
pub fn selector_state(ws: &Workspace, selections: &Selections) -> Result<SelectorState> {
    let defaults = &ws.config.defaults;
    let session = &ws.session;

    let date = Dropdown::render(
        "Select date: ",
        query::date_versions(session)?,
        selections.date.as_deref().unwrap_or(&defaults.date),
    )?;
    let adm1 = Dropdown::render(
        "Select Admin 1: ",
        query::admin_units(session, AdminLevel::One, None)?,
        selections.adm1.as_deref().unwrap_or(&defaults.adm1),
    )?;
    let adm2 = Dropdown::render(
        "Select Admin 2: ",
        query::admin_units(session, AdminLevel::Two, None)?,
        selections.adm2.as_deref().unwrap_or(&defaults.adm2),
    )?;
    let series = query::district_series(session, &adm2.value().pcode)?;

    let mut state = SelectorState {
        date,
        adm1,
        adm2,
        range: RangeSlider::render(0, 0, [0, 0])?,
    };
    state.reset_range(series.len(), defaults.range)?;
    if let Some([lo, hi]) = selections.range {
        state.range.select(lo, hi)?;
    }

    Ok(state)
}

/// Outcome of rendering a set of views.
#[derive(Debug, Default)]
pub struct RenderReport {
    /// One status line per rendered view
    pub lines: Vec<String>,
    pub failures: Vec<(View, anyhow::Error)>,
}

impl RenderReport {
    pub fn failed(&self, view: View) -> bool {
        self.failures.iter().any(|(v, _)| *v == view)
    }

    pub fn failed_views(&self) -> Vec<View> {
        self.failures.iter().map(|(v, _)| *v).collect()
    }

    /// The status lines, or an error listing every failed view.
    pub fn into_result(self) -> Result<Vec<String>> {
        if self.failures.is_empty() {
            return Ok(self.lines);
        }
        let reasons: Vec<String> = self
            .failures
            .iter()
            .map(|(view, e)| format!("{:?}: {}", view, e))
            .collect();

        Err(anyhow!("{}", reasons.join("; ")))
    }
}

/// Draws views, keeping the district series both charts read.
pub struct Renderer<'a> {
    ws: &'a Workspace,
    scale: DivergingScale,
    series: Vec<SeriesPoint>,
}

impl<'a> Renderer<'a> {
    pub fn new(ws: &'a Workspace) -> Self {
        Renderer {
            ws,
            scale: ws.config.scale.into(),
            series: Vec::new(),
        }
    }

    /// Series of the district charted last.
    pub fn series(&self) -> &[SeriesPoint] {
        &self.series
    }

    /// Renders each of `views` in order.
    ///
    /// A failing view does not stop its siblings; the zoomed chart is skipped
    /// when the district chart it reads from fails.
    pub fn render(&mut self, views: &[View], state: &mut SelectorState) -> RenderReport {
        let mut report = RenderReport::default();

        for &view in views {
            if view == View::ZoomChart && report.failed(View::DistrictChart) {
                report
                    .failures
                    .push((view, anyhow!("skipped, the district chart failed")));
                continue;
            }
            match self.render_view(view, state) {
                Ok(line) => report.lines.push(line),
                Err(e) => report.failures.push((view, e)),
            }
        }

        report
    }

    fn render_view(&mut self, view: View, state: &mut SelectorState) -> Result<String> {
        let line = match view {
            View::Adm1Map => self.adm1_map(state.date.value())?,
            View::Adm2Map => self.adm2_map(state.date.value(), state.adm1.value())?,
            View::DistrictChart => {
                let artifact = self.district_chart(state.adm2.value())?;
                let preferred = self.ws.config.defaults.range;
                state.reset_range(self.series.len(), preferred)?;
                format!(
                    "Chart with {} dates written to `{}`",
                    artifact.dates.len(),
                    artifact.path.display()
                )
            }
            View::ZoomChart => {
                let range = state.range.value();
                let artifact = self.zoom_chart(state.adm2.value(), range)?;
                format!(
                    "{} written to `{}`",
                    render::window_label(&self.series, range)?,
                    artifact.path.display()
                )
            }
        };

        Ok(line)
    }

    pub fn adm1_map(&self, date: &DateVersion) -> Result<String> {
        let batches = query::joined_view(&self.ws.session, AdminLevel::One, date.date, None)?;

        self.draw_map(
            batches,
            &["admin1Name_en", "r3q"],
            &format!("3-month rainfall anomaly, {}", date),
            &["adm1", &date_key(date)],
        )
    }

    pub fn adm2_map(&self, date: &DateVersion, adm1: &AdminUnit) -> Result<String> {
        let batches = query::joined_view(
            &self.ws.session,
            AdminLevel::Two,
            date.date,
            Some(&adm1.pcode),
        )?;

        self.draw_map(
            batches,
            &["admin2Name_en", "PCODE", "r3q"],
            &format!("3-month rainfall anomaly, {}, {}", adm1.name, date),
            &["adm2", &adm1.pcode, &date_key(date)],
        )
    }

    fn draw_map(
        &self,
        batches: Vec<RecordBatch>,
        tooltip_columns: &[&str],
        title: &str,
        name: &[&str],
    ) -> Result<String> {
        let table = to_geo(batches, "geometry", Crs(self.ws.config.boundaries.crs))?;
        info!("Mapping {} features for `{}`", table.len(), title);

        let artifact = render::render_map(
            &table,
            "r3q",
            &self.scale,
            tooltip_columns,
            title,
            &self.ws.svg_file_name(name),
        )?;

        Ok(format!(
            "Map with {} features written to `{}`\n{}",
            artifact.features.len(),
            artifact.path.display(),
            artifact.tooltip_table()
        ))
    }

    pub fn district_chart(&mut self, adm2: &AdminUnit) -> Result<ChartArtifact> {
        self.series = query::district_series(&self.ws.session, &adm2.pcode)?;

        let artifact = render::render_bars(
            &self.series,
            &format!("Rainfall {}", adm2.name),
            &self.ws.svg_file_name(&[&adm2.pcode]),
        )?;

        Ok(artifact)
    }

    pub fn zoom_chart(&mut self, adm2: &AdminUnit, range: [usize; 2]) -> Result<ChartArtifact> {
        if self.series.is_empty() {
            self.series = query::district_series(&self.ws.session, &adm2.pcode)?;
        }
        let window = render::zoom(&self.series, range)?;

        let artifact = render::render_bars(
            &window,
            &format!("Rainfall {}", adm2.name),
            &self.ws.svg_file_name(&[
                &adm2.pcode,
                &range[0].to_string(),
                &range[1].to_string(),
            ]),
        )?;

        Ok(artifact)
    }
}

fn date_key(date: &DateVersion) -> String {
    date.date.format("%Y-%m-%d").to_string()
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Config, query::fixtures};

    fn workspace(dir: &std::path::Path) -> Workspace {
        let config = Config {
            output_dir: Some(dir.to_path_buf()),
            ..Config::default()
        };

        Workspace {
            config,
            session: fixtures::session(),
        }
    }

    fn selections() -> Selections {
        Selections {
            date: Some("2025-07-11".to_string()),
            adm1: Some("YE18".to_string()),
            adm2: Some("YE1101".to_string()),
            range: None,
        }
    }

    #[test]
    fn should_size_range_to_district_series() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path());
        let state = selector_state(&ws, &selections()).unwrap();

        assert_eq!(state.range.stop, 179);
        assert_eq!(state.range.value(), [145, 164]);
        assert_eq!(state.date.value().to_string(), "2025-07-11: prelim");
    }

    #[test]
    fn should_reject_explicit_range_past_series_end() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path());
        let selections = Selections {
            range: Some([170, 200]),
            ..selections()
        };

        assert!(selector_state(&ws, &selections).is_err());
    }

    #[test]
    fn should_render_every_view() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path());
        let mut state = selector_state(&ws, &selections()).unwrap();
        let mut renderer = Renderer::new(&ws);

        let lines = renderer
            .render(&View::ALL, &mut state)
            .into_result()
            .unwrap();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Map with 22 features"));
        assert!(lines[1].starts_with("Map with 2 features"));
        assert!(lines[2].starts_with("Chart with 180 dates"));
        assert!(lines[3].starts_with("2024-07-21 to 2025-01-27"));
        assert!(dir.path().join("rainfall-adm1-2025-07-11.svg").exists());
        assert!(dir.path().join("rainfall-YE1101-145-164.svg").exists());
    }

    #[test]
    fn should_render_siblings_of_a_failing_map() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path());
        let mut state = selector_state(&ws, &selections()).unwrap();
        ws.session
            .execute("DELETE FROM rainfall WHERE adm_level = 1 AND date = '2025-07-11'")
            .unwrap();

        let report = Renderer::new(&ws).render(&[View::Adm1Map, View::Adm2Map], &mut state);

        assert_eq!(report.failed_views(), vec![View::Adm1Map]);
        assert_eq!(report.lines.len(), 1);
        assert!(report.lines[0].starts_with("Map with 2 features"));
    }

    #[test]
    fn should_skip_zoom_when_district_chart_fails() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path());
        let mut state = selector_state(&ws, &selections()).unwrap();
        ws.session
            .execute("DELETE FROM rainfall WHERE PCODE = 'YE1101'")
            .unwrap();

        let report = Renderer::new(&ws).render(&[View::DistrictChart, View::ZoomChart], &mut state);

        assert!(report.lines.is_empty());
        assert_eq!(
            report.failed_views(),
            vec![View::DistrictChart, View::ZoomChart]
        );
        assert!(report.into_result().is_err());
    }
}
