//! Resources published for a dataset and the rule picking exactly one of them.

use std::fmt;

use reqwest::Url;

use crate::error::{RainfallError, Result};

#[derive(Debug, Clone, PartialEq)]
/// A downloadable file published as part of a dataset.
pub struct ResourceDescriptor {
    pub name: String,
    pub url: Url,
}

impl ResourceDescriptor {
    pub fn new(name: &str, url: &str) -> Result<Self> {
        let url = Url::parse(url)
            .map_err(|e| RainfallError::Transport(format!("invalid resource url `{url}`: {e}")))?;

        Ok(ResourceDescriptor {
            name: name.to_string(),
            url,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Match applied to resource names.
pub enum NamePattern {
    EndsWith(String),
    Contains(String),
}

impl NamePattern {
    pub fn ends_with(suffix: &str) -> Self {
        NamePattern::EndsWith(suffix.to_string())
    }

    pub fn contains(fragment: &str) -> Self {
        NamePattern::Contains(fragment.to_string())
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            NamePattern::EndsWith(suffix) => name.ends_with(suffix.as_str()),
            NamePattern::Contains(fragment) => name.contains(fragment.as_str()),
        }
    }
}

impl fmt::Display for NamePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamePattern::EndsWith(suffix) => write!(f, "*{}", suffix),
            NamePattern::Contains(fragment) => write!(f, "*{}*", fragment),
        }
    }
}

/// Returns the single resource whose name matches `pattern`.
pub fn select<'a>(
    resources: &'a [ResourceDescriptor],
    pattern: &NamePattern,
) -> Result<&'a ResourceDescriptor> {
    let matches: Vec<&ResourceDescriptor> = resources
        .iter()
        .filter(|r| pattern.matches(&r.name))
        .collect();

    match matches.as_slice() {
        [only] => Ok(only),
        _ => Err(RainfallError::AmbiguousSelection {
            pattern: pattern.to_string(),
            matches: matches.iter().map(|r| r.name.clone()).collect(),
        }),
    }
}

// -- Tests -------------------------------------------------------------------
