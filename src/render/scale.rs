//! Diverging colour scale for percent-of-normal values.

use plotters::style::RGBColor;

use crate::config::ScaleConfig;

/// ColorBrewer RdYlBu, 11 classes, from dry (red) to wet (blue).
const RD_YL_BU: [RGBColor; 11] = [
    RGBColor(0xa5, 0x00, 0x26),
    RGBColor(0xd7, 0x30, 0x27),
    RGBColor(0xf4, 0x6d, 0x43),
    RGBColor(0xfd, 0xae, 0x61),
    RGBColor(0xfe, 0xe0, 0x90),
    RGBColor(0xff, 0xff, 0xbf),
    RGBColor(0xe0, 0xf3, 0xf8),
    RGBColor(0xab, 0xd9, 0xe9),
    RGBColor(0x74, 0xad, 0xd1),
    RGBColor(0x45, 0x75, 0xb4),
    RGBColor(0x31, 0x36, 0x95),
];

/// Fill for features without a value.
pub const NO_DATA: RGBColor = RGBColor(0xbd, 0xbd, 0xbd);

#[derive(Debug, Clone, Copy, PartialEq)]
/// Maps `[min, center]` onto the dry half of the palette and
/// `[center, max]` onto the wet half. Values outside the domain clip.
pub struct DivergingScale {
    pub min: f64,
    pub center: f64,
    pub max: f64,
}

impl From<ScaleConfig> for DivergingScale {
    fn from(config: ScaleConfig) -> Self {
        DivergingScale {
            min: config.min,
            center: config.center,
            max: config.max,
        }
    }
}

impl Default for DivergingScale {
    fn default() -> Self {
        ScaleConfig::default().into()
    }
}

impl DivergingScale {
    pub fn low(&self) -> RGBColor {
        RD_YL_BU[0]
    }

    pub fn mid(&self) -> RGBColor {
        RD_YL_BU[RD_YL_BU.len() / 2]
    }

    pub fn high(&self) -> RGBColor {
        RD_YL_BU[RD_YL_BU.len() - 1]
    }

    /// Position of `value` on the palette, in `[0, 1]`.
    pub fn normalize(&self, value: f64) -> f64 {
        if value <= self.center {
            0.5 * ((value - self.min) / (self.center - self.min)).clamp(0.0, 1.0)
        } else {
            0.5 + 0.5 * ((value - self.center) / (self.max - self.center)).clamp(0.0, 1.0)
        }
    }

    pub fn color(&self, value: Option<f64>) -> RGBColor {
        match value {
            Some(v) if v.is_finite() => interpolate(self.normalize(v)),
            _ => NO_DATA,
        }
    }
}

fn interpolate(t: f64) -> RGBColor {
    let last = RD_YL_BU.len() - 1;
    let pos = t * last as f64;
    let idx = (pos.floor() as usize).min(last - 1);
    let frac = pos - idx as f64;

    let (a, b) = (RD_YL_BU[idx], RD_YL_BU[idx + 1]);
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * frac).round() as u8;

    RGBColor(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

// -- Tests -------------------------------------------------------------------
