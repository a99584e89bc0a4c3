//! Color scale specifications and their resolution to concrete stops.
//!
//! A scale specification comes from page configuration and is either a
//! preset name or an explicit list of `[position, color]` stops. Resolution
//! never fails: anything unrecognized falls back to the default diverging
//! red-yellow-green scale.

use serde::{Deserialize, Serialize};

/// Name of the reserved reversed-default preset.
pub const REVERSED_DEFAULT: &str = "RdYlGn_r";

/// A color stop, serialized as `[position, "#rrggbb"]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorStop(pub f64, pub String);

impl ColorStop {
    pub fn new(position: f64, color: impl Into<String>) -> Self {
        Self(position, color.into())
    }

    pub fn position(&self) -> f64 {
        self.0
    }

    pub fn color(&self) -> &str {
        &self.1
    }

    /// Convert the color to an RGBA tuple, if it is a hex string.
    pub fn to_rgba(&self) -> Option<(u8, u8, u8, u8)> {
        parse_hex_color(&self.1)
    }
}

/// Abstract description of a color gradient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScaleSpec {
    /// Explicit ordered stops.
    Stops(Vec<ColorStop>),

    /// A preset name, including the reserved reversed-default name.
    Preset(String),
}

impl ScaleSpec {
    pub fn preset(name: impl Into<String>) -> Self {
        ScaleSpec::Preset(name.into())
    }

    /// Check that the specification resolves to a well-formed scale.
    ///
    /// Resolution itself never rejects anything; this is only used to warn
    /// about suspicious configuration.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            ScaleSpec::Preset(name) => {
                if preset_stops(name).is_none() && name != REVERSED_DEFAULT {
                    return Err(format!("Unknown color scale preset '{}'", name));
                }
                Ok(())
            }
            ScaleSpec::Stops(stops) => {
                if stops.len() < 2 {
                    return Err("Color scale must have at least 2 stops".to_string());
                }

                for i in 1..stops.len() {
                    if stops[i].position() < stops[i - 1].position() {
                        return Err("Color stops must be in ascending position order".to_string());
                    }
                }

                let first = stops[0].position();
                let last = stops[stops.len() - 1].position();
                if first != 0.0 || last != 1.0 {
                    return Err(format!(
                        "Color stops must span 0 to 1 (found {} to {})",
                        first, last
                    ));
                }

                if let Some(bad) = stops.iter().find(|s| s.to_rgba().is_none()) {
                    return Err(format!("Unparseable color '{}'", bad.color()));
                }

                Ok(())
            }
        }
    }
}

/// Default diverging scale: deep red, pale yellow, deep green.
pub fn default_scale() -> Vec<ColorStop> {
    vec![
        ColorStop::new(0.0, "#a50026"),
        ColorStop::new(0.5, "#ffffbf"),
        ColorStop::new(1.0, "#006837"),
    ]
}

fn blues() -> Vec<ColorStop> {
    vec![
        ColorStop::new(0.0, "#f7fbff"),
        ColorStop::new(0.125, "#deebf7"),
        ColorStop::new(0.25, "#c6dbef"),
        ColorStop::new(0.375, "#9ecae1"),
        ColorStop::new(0.5, "#6baed6"),
        ColorStop::new(0.625, "#4292c6"),
        ColorStop::new(0.75, "#2171b5"),
        ColorStop::new(0.875, "#08519c"),
        ColorStop::new(1.0, "#08306b"),
    ]
}

fn greens() -> Vec<ColorStop> {
    vec![
        ColorStop::new(0.0, "#f7fcf5"),
        ColorStop::new(0.125, "#e5f5e0"),
        ColorStop::new(0.25, "#c7e9c0"),
        ColorStop::new(0.375, "#a1d99b"),
        ColorStop::new(0.5, "#74c476"),
        ColorStop::new(0.625, "#41ab5d"),
        ColorStop::new(0.75, "#238b45"),
        ColorStop::new(0.875, "#006d2c"),
        ColorStop::new(1.0, "#00441b"),
    ]
}

/// Look up a preset's stop table by name.
pub fn preset_stops(name: &str) -> Option<Vec<ColorStop>> {
    match name {
        "Blues" => Some(blues()),
        "Greens" => Some(greens()),
        "RdYlGn" => Some(default_scale()),
        _ => None,
    }
}

/// Resolve an optional specification to concrete stops.
///
/// Reversal of the default reverses list order only; positions keep their
/// original values.
pub fn resolve_colorscale(spec: Option<&ScaleSpec>) -> Vec<ColorStop> {
    match spec {
        None => default_scale(),
        Some(ScaleSpec::Stops(stops)) => stops.clone(),
        Some(ScaleSpec::Preset(name)) => {
            if let Some(stops) = preset_stops(name) {
                return stops;
            }
            if name == REVERSED_DEFAULT {
                let mut stops = default_scale();
                stops.reverse();
                return stops;
            }
            default_scale()
        }
    }
}

fn parse_hex_color(s: &str) -> Option<(u8, u8, u8, u8)> {
    let s = s.strip_prefix('#')?;
    if !s.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&s[range], 16).ok();

    match s.len() {
        6 => Some((channel(0..2)?, channel(2..4)?, channel(4..6)?, 255)),
        8 => Some((channel(0..2)?, channel(2..4)?, channel(4..6)?, channel(6..8)?)),
        _ => None,
    }
}
