//! Command line interface.

pub mod command;

use std::{path::PathBuf, time::Duration};

use clap::{Parser, Subcommand};
use indicatif::ProgressBar;

#[derive(Parser)]
#[command(version, about, long_about = None)]
/// Contains the commands
pub struct Cli {
    /// TOML file overriding the default analysis settings
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the resources published for an HDX dataset
    Resources {
        /// HDX dataset identifier, e.g. `yem-rainfall-subnational`
        dataset: String,
    },
    /// List the layers of the boundary archive
    Layers {},
    /// List the dates and data versions of the rainfall series
    Dates {},
    /// Render a map of the 3-month rainfall anomaly
    Map {
        /// Administrative level, 1 (governorates) or 2 (districts)
        #[arg(short, long, default_value_t = 1)]
        level: u8,
        /// Date, as `2025-07-11` or `2025-07-11: prelim`
        #[arg(short, long)]
        date: Option<String>,
        /// Governorate whose districts are mapped at level 2
        #[arg(long)]
        adm1: Option<String>,
    },
    /// Render the rainfall chart of a district
    Chart {
        /// District PCODE, e.g. `YE1604`
        #[arg(long)]
        adm2: Option<String>,
        /// First and last date index of the zoomed chart
        #[arg(long, num_args = 2, value_names = ["LO", "HI"])]
        range: Option<Vec<usize>>,
    },
    /// Render every map and chart with the configured selections
    Run {},
    /// Render every view, then re-render the affected ones as selections change
    Explore {},
}

/// Creates a spinner.
pub fn create_spinner(message: String) -> ProgressBar {
    let bar = ProgressBar::new_spinner().with_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));

    bar
}

// -- Tests -------------------------------------------------------------------
