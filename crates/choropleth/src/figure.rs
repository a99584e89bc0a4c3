//! Renderable figure descriptions: a trace list plus a layout.
//!
//! Field names follow the JSON schema of the browser charting library, so
//! figures serialize directly into what the renderer consumes.

use map_common::{ColorStop, MapCenter};
use serde::Serialize;
use serde_json::Value;

use crate::feature::FeatureCollection;

/// Minimum layout height in pixels.
pub const MIN_LAYOUT_HEIGHT: f64 = 420.0;

/// A complete chart description.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub data: FigureData,
    pub layout: FigureLayout,
}

impl Figure {
    /// A figure supplied by the data source, passed through untouched.
    pub fn passthrough(data: Value, layout: Value) -> Self {
        Self {
            data: FigureData::Raw(data),
            layout: FigureLayout::Raw(layout),
        }
    }

    /// Whether this figure was built from a feature collection.
    pub fn is_choropleth(&self) -> bool {
        matches!(self.data, FigureData::Choropleth(_))
    }
}

/// Trace list of a figure.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FigureData {
    Choropleth(Vec<ChoroplethTrace>),
    Raw(Value),
}

/// Layout of a figure.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FigureLayout {
    Map(MapLayout),
    Raw(Value),
}

/// Options handed to the renderer alongside every figure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotConfig {
    pub responsive: bool,
    pub display_mode_bar: bool,
    pub scroll_zoom: bool,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            responsive: true,
            display_mode_bar: true,
            scroll_zoom: false,
        }
    }
}

/// A region-colored map trace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoroplethTrace {
    #[serde(rename = "type")]
    pub type_: &'static str,
    pub geojson: FeatureCollection,
    pub locations: Vec<String>,
    pub z: Vec<Option<f64>>,
    pub colorscale: Vec<ColorStop>,
    pub zmin: f64,
    pub zmax: f64,
    pub reversescale: bool,
    pub zauto: bool,
    pub marker: Marker,
    pub colorbar: ColorBar,
    pub featureidkey: &'static str,
    /// Raw value per feature, for hover display
    pub customdata: Vec<[Value; 1]>,
    pub hovertemplate: &'static str,
}

impl ChoroplethTrace {
    pub fn new(
        geojson: FeatureCollection,
        locations: Vec<String>,
        z: Vec<Option<f64>>,
        colorscale: Vec<ColorStop>,
        customdata: Vec<[Value; 1]>,
    ) -> Self {
        Self {
            type_: "choroplethmapbox",
            geojson,
            locations,
            z,
            colorscale,
            zmin: 0.0,
            zmax: 1.0,
            reversescale: false,
            zauto: false,
            marker: Marker::default(),
            colorbar: ColorBar::default(),
            featureidkey: "properties.id",
            customdata,
            hovertemplate:
                "GEOID: %{location}<br>Value: %{customdata[0]}<br>Percentile: %{z:.2f}<extra></extra>",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub opacity: f64,
    pub line: MarkerLine,
}

impl Default for Marker {
    fn default() -> Self {
        Self {
            opacity: 0.8,
            line: MarkerLine {
                width: 0.5,
                color: "#ffffff".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerLine {
    pub width: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorBar {
    pub title: String,
    pub titleside: String,
    pub tickvals: Vec<f64>,
    pub ticktext: Vec<String>,
}

impl Default for ColorBar {
    fn default() -> Self {
        Self {
            title: "Percentile".to_string(),
            titleside: "right".to_string(),
            tickvals: vec![0.0, 0.5, 1.0],
            ticktext: vec!["0%".to_string(), "50%".to_string(), "100%".to_string()],
        }
    }
}

/// Fixed-style street-map layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapLayout {
    pub mapbox: Mapbox,
    pub margin: Margin,
    pub height: f64,
}

impl MapLayout {
    /// Layout centered on `center`, sized to 70% of the viewport height.
    pub fn new(center: &MapCenter, viewport_height: f64) -> Self {
        Self {
            mapbox: Mapbox {
                style: "open-street-map".to_string(),
                center: LatLon {
                    lat: center.lat,
                    lon: center.lon,
                },
                zoom: center.zoom,
            },
            margin: Margin::default(),
            height: layout_height(viewport_height),
        }
    }
}

/// Height for a map layout given the viewport height.
pub fn layout_height(viewport_height: f64) -> f64 {
    (viewport_height * 0.7).max(MIN_LAYOUT_HEIGHT)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mapbox {
    pub style: String,
    pub center: LatLon,
    pub zoom: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Margin {
    pub r: f64,
    pub t: f64,
    pub l: f64,
    pub b: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_layout_height_floor() {
        assert_eq!(layout_height(300.0), MIN_LAYOUT_HEIGHT);
        assert_eq!(layout_height(1000.0), 700.0);
    }

    #[test]
    fn test_plot_config_serialization() {
        let json = serde_json::to_value(PlotConfig::default()).unwrap();
        assert_eq!(
            json,
            json!({"responsive": true, "displayModeBar": true, "scrollZoom": false})
        );
    }

    #[test]
    fn test_passthrough_serializes_verbatim() {
        let data = json!([{"type": "bar", "x": [1, 2]}]);
        let layout = json!({"title": "t"});
        let figure = Figure::passthrough(data.clone(), layout.clone());
        assert_eq!(
            serde_json::to_value(&figure).unwrap(),
            json!({"data": data, "layout": layout})
        );
        assert!(!figure.is_choropleth());
    }
}
