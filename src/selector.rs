//! User-facing pickers whose current values parameterize the queries.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;

use crate::error::{RainfallError, Result};

/// Anything offered by a [`Dropdown`].
///
/// Options are shown as `"<key>: <label>"`; a value typed by the user may be
/// either the full text or just the key.
pub trait Choice: fmt::Display + Clone + PartialEq {
    fn key(&self) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Version {
    Final,
    Prelim,
    Forecast,
}

impl FromStr for Version {
    type Err = RainfallError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "final" => Ok(Version::Final),
            "prelim" => Ok(Version::Prelim),
            "forecast" => Ok(Version::Forecast),
            other => Err(RainfallError::Parse(other.to_string())),
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Version::Final => "final",
            Version::Prelim => "prelim",
            Version::Forecast => "forecast",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
/// A dekad of the rainfall series and the maturity of its data.
pub struct DateVersion {
    pub date: NaiveDate,
    pub version: Version,
}

impl FromStr for DateVersion {
    type Err = RainfallError;

    /// Parses `"2025-07-11: prelim"`.
    fn from_str(s: &str) -> Result<Self> {
        let (date, version) = s
            .split_once(':')
            .ok_or_else(|| RainfallError::Parse(s.to_string()))?;
        let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
            .map_err(|_| RainfallError::Parse(s.to_string()))?;

        Ok(DateVersion {
            date,
            version: version.parse()?,
        })
    }
}

impl fmt::Display for DateVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.date.format("%Y-%m-%d"), self.version)
    }
}

impl Choice for DateVersion {
    fn key(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
/// An administrative unit, identified by its PCODE.
pub struct AdminUnit {
    pub pcode: String,
    pub name: String,
}

impl FromStr for AdminUnit {
    type Err = RainfallError;

    /// Parses `"YE18: Al Hodeidah"`.
    fn from_str(s: &str) -> Result<Self> {
        let (pcode, name) = s
            .split_once(':')
            .ok_or_else(|| RainfallError::Parse(s.to_string()))?;

        Ok(AdminUnit {
            pcode: pcode.trim().to_string(),
            name: name.trim().to_string(),
        })
    }
}

impl fmt::Display for AdminUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.pcode, self.name)
    }
}

impl Choice for AdminUnit {
    fn key(&self) -> String {
        self.pcode.clone()
    }
}

#[derive(Debug, Clone)]
/// A single-choice picker.
pub struct Dropdown<T: Choice> {
    pub label: String,
    pub options: Vec<T>,
    value: T,
}

impl<T: Choice> Dropdown<T> {
    /// Renders the picker, returning it with `default` as its current value.
    pub fn render(label: &str, options: Vec<T>, default: &str) -> Result<Self> {
        let value = find_option(label, &options, default)?;

        Ok(Dropdown {
            label: label.to_string(),
            options,
            value,
        })
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    /// Sets the current value; returns whether it changed.
    pub fn select(&mut self, input: &str) -> Result<bool> {
        let value = find_option(&self.label, &self.options, input)?;
        let changed = value != self.value;
        self.value = value;

        Ok(changed)
    }
}

fn find_option<T: Choice>(label: &str, options: &[T], input: &str) -> Result<T> {
    let input = input.trim();
    options
        .iter()
        .find(|o| o.to_string() == input || o.key() == input)
        .cloned()
        .ok_or_else(|| RainfallError::UnknownOption {
            label: label.to_string(),
            value: input.to_string(),
        })
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// An inclusive index range picker over `start..=stop`.
pub struct RangeSlider {
    pub start: usize,
    pub stop: usize,
    lo: usize,
    hi: usize,
}

impl RangeSlider {
    pub fn render(start: usize, stop: usize, default: [usize; 2]) -> Result<Self> {
        let [lo, hi] = default;
        check_range(start, stop, lo, hi)?;

        Ok(RangeSlider { start, stop, lo, hi })
    }

    pub fn value(&self) -> [usize; 2] {
        [self.lo, self.hi]
    }

    /// Sets the current range; returns whether it changed.
    pub fn select(&mut self, lo: usize, hi: usize) -> Result<bool> {
        check_range(self.start, self.stop, lo, hi)?;
        let changed = [lo, hi] != self.value();
        self.lo = lo;
        self.hi = hi;

        Ok(changed)
    }
}

fn check_range(start: usize, stop: usize, lo: usize, hi: usize) -> Result<()> {
    if start <= lo && lo <= hi && hi <= stop {
        Ok(())
    } else {
        Err(RainfallError::InvalidRange { lo, hi, start, stop })
    }
}

// -- Tests -------------------------------------------------------------------
