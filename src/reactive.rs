//! Which views must be recomputed when a selector changes.
//!
//! Views form a fixed dependency graph over the selector inputs. A change
//! that leaves its selector's value untouched dirties nothing.

use std::str::FromStr;

use crate::{
    error::{RainfallError, Result},
    selector::{AdminUnit, DateVersion, Dropdown, RangeSlider},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Date,
    Adm1,
    Adm2,
    Range,
}

/// Rendered outputs, declared in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum View {
    Adm1Map,
    Adm2Map,
    DistrictChart,
    ZoomChart,
}

impl View {
    pub const ALL: [View; 4] = [
        View::Adm1Map,
        View::Adm2Map,
        View::DistrictChart,
        View::ZoomChart,
    ];
}

impl Input {
    /// Views reading this input, directly or through another view.
    pub fn dependents(&self) -> &'static [View] {
        match self {
            Input::Date => &[View::Adm1Map, View::Adm2Map],
            Input::Adm1 => &[View::Adm2Map],
            Input::Adm2 => &[View::DistrictChart, View::ZoomChart],
            Input::Range => &[View::ZoomChart],
        }
    }
}

/// Union of the dependents of `inputs`, in evaluation order.
pub fn dirty_views(inputs: &[Input]) -> Vec<View> {
    let mut views: Vec<View> = inputs
        .iter()
        .flat_map(|i| i.dependents().iter().copied())
        .collect();
    views.sort();
    views.dedup();

    views
}

#[derive(Debug, Clone, PartialEq)]
/// A value typed at the `explore` prompt.
pub enum Change {
    Date(String),
    Adm1(String),
    Adm2(String),
    Range(usize, usize),
}

impl Change {
    pub fn input(&self) -> Input {
        match self {
            Change::Date(_) => Input::Date,
            Change::Adm1(_) => Input::Adm1,
            Change::Adm2(_) => Input::Adm2,
            Change::Range(..) => Input::Range,
        }
    }
}

impl FromStr for Change {
    type Err = RainfallError;

    /// Parses `date <value>`, `adm1 <value>`, `adm2 <value>` or `range <lo> <hi>`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (command, rest) = s.split_once(char::is_whitespace).unwrap_or((s, ""));
        let rest = rest.trim();
        let parse_err = || RainfallError::Parse(s.to_string());

        match command {
            "date" if !rest.is_empty() => Ok(Change::Date(rest.to_string())),
            "adm1" if !rest.is_empty() => Ok(Change::Adm1(rest.to_string())),
            "adm2" if !rest.is_empty() => Ok(Change::Adm2(rest.to_string())),
            "range" => {
                let bounds = rest
                    .split_whitespace()
                    .map(|v| v.parse::<usize>().map_err(|_| parse_err()))
                    .collect::<Result<Vec<_>>>()?;
                match bounds.as_slice() {
                    [lo, hi] => Ok(Change::Range(*lo, *hi)),
                    _ => Err(parse_err()),
                }
            }
            _ => Err(parse_err()),
        }
    }
}

/// Current values of every picker.
#[derive(Debug, Clone)]
pub struct SelectorState {
    pub date: Dropdown<DateVersion>,
    pub adm1: Dropdown<AdminUnit>,
    pub adm2: Dropdown<AdminUnit>,
    pub range: RangeSlider,
}

impl SelectorState {
    /// Applies a change and returns the views it invalidates.
    ///
    /// A rejected change leaves the state as it was.
    pub fn apply(&mut self, change: &Change) -> Result<Vec<View>> {
        let changed = match change {
            Change::Date(value) => self.date.select(value)?,
            Change::Adm1(value) => self.adm1.select(value)?,
            Change::Adm2(value) => self.adm2.select(value)?,
            Change::Range(lo, hi) => self.range.select(*lo, *hi)?,
        };

        Ok(if changed {
            dirty_views(&[change.input()])
        } else {
            vec![]
        })
    }

    /// Rebuilds the range slider for a date axis of `len` entries, keeping
    /// the preferred window where it fits.
    pub fn reset_range(&mut self, len: usize, preferred: [usize; 2]) -> Result<()> {
        let stop = len.saturating_sub(1);
        let [lo, hi] = preferred;
        let window = if hi <= stop { [lo, hi] } else { [0, stop] };
        self.range = RangeSlider::render(0, stop, window)?;

        Ok(())
    }
}

// -- Tests -------------------------------------------------------------------
