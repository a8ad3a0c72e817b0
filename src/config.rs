//! Analysis target and presentation settings.
//!
//! Every field has a default describing the Yemen analysis, so an empty (or
//! missing) configuration file is valid. Values can be overridden from a TOML
//! file passed with `--config`.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{RainfallError, Result};

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub hdx: HdxConfig,
    pub rainfall: RainfallSource,
    pub boundaries: BoundarySource,
    pub scale: ScaleConfig,
    pub defaults: SelectorDefaults,
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct HdxConfig {
    pub site: String,
    pub user_agent: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct RainfallSource {
    pub dataset: String,
    pub resource_suffix: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct BoundarySource {
    pub dataset: String,
    pub resource_suffix: String,
    pub adm1_layer: String,
    pub adm2_layer: String,
    pub geometry_column: String,
    pub crs: u32,
}

/// Fixed colour domain of the anomaly maps.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScaleConfig {
    pub min: f64,
    pub center: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SelectorDefaults {
    pub date: String,
    pub adm1: String,
    pub adm2: String,
    pub range: [usize; 2],
}

impl Default for HdxConfig {
    fn default() -> Self {
        HdxConfig {
            site: "https://data.humdata.org".to_string(),
            user_agent: "hdx-rainfall".to_string(),
        }
    }
}

impl Default for RainfallSource {
    fn default() -> Self {
        RainfallSource {
            dataset: "yem-rainfall-subnational".to_string(),
            resource_suffix: "5ytd.csv".to_string(),
        }
    }
}

impl Default for BoundarySource {
    fn default() -> Self {
        BoundarySource {
            dataset: "cod-ab-yem".to_string(),
            resource_suffix: "GPKG.zip".to_string(),
            adm1_layer: "yem_admbnda_adm1_govyem_cso".to_string(),
            adm2_layer: "yem_admbnda_adm2_govyem_cso".to_string(),
            geometry_column: "shape".to_string(),
            crs: 4326,
        }
    }
}

impl Default for ScaleConfig {
    fn default() -> Self {
        ScaleConfig {
            min: 50.0,
            center: 100.0,
            max: 130.0,
        }
    }
}

impl Default for SelectorDefaults {
    fn default() -> Self {
        SelectorDefaults {
            date: "2025-07-11: prelim".to_string(),
            adm1: "YE18".to_string(),
            adm2: "YE1604".to_string(),
            range: [145, 164],
        }
    }
}

impl Config {
    /// Loads the configuration, falling back to the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)?;
                Self::from_toml(&text)?
            }
            None => Config::default(),
        };
        config.validate()?;

        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| RainfallError::Config(e.to_string()))
    }

    fn validate(&self) -> Result<()> {
        let s = &self.scale;
        if !(s.min < s.center && s.center < s.max) {
            return Err(RainfallError::Config(format!(
                "scale must satisfy min < center < max, got {} / {} / {}",
                s.min, s.center, s.max
            )));
        }
        let [lo, hi] = self.defaults.range;
        if lo > hi {
            return Err(RainfallError::Config(format!(
                "default range [{lo}, {hi}] is reversed"
            )));
        }

        Ok(())
    }

    /// Directory the rendered artifacts are written to.
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_default_to_yemen() {
        let config = Config::default();

        assert_eq!(config.rainfall.dataset, "yem-rainfall-subnational");
        assert_eq!(config.boundaries.dataset, "cod-ab-yem");
        assert_eq!(config.scale.center, 100.0);
        assert_eq!(config.defaults.range, [145, 164]);
    }

    #[test]
    fn should_override_single_fields() {
        let config = Config::from_toml(
            r#"
            output_dir = "/tmp/maps"

            [scale]
            max = 150.0

            [rainfall]
            dataset = "som-rainfall-subnational"
            "#,
        )
        .unwrap();

        assert_eq!(config.scale.min, 50.0);
        assert_eq!(config.scale.max, 150.0);
        assert_eq!(config.rainfall.dataset, "som-rainfall-subnational");
        assert_eq!(config.rainfall.resource_suffix, "5ytd.csv");
        assert_eq!(config.output_dir(), PathBuf::from("/tmp/maps"));
    }

    #[test]
    fn should_reject_uncentered_scale() {
        let mut config = Config::default();
        config.scale.center = 140.0;

        assert!(matches!(config.validate(), Err(RainfallError::Config(_))));
    }

    #[test]
    fn should_report_toml_errors() {
        let result = Config::from_toml("scale = 3");
        assert!(matches!(result, Err(RainfallError::Config(_))));
    }
}
