//! Payload classification and figure assembly.
//!
//! A layer payload is classified once into [`Payload`]; everything after
//! that works on the typed variant.

use map_common::{resolve_colorscale, MapError, MapResult, RegionConfig, ScaleSpec};
use serde_json::{Map, Value};
use tracing::debug;

use crate::coerce::{coerce_number, raw_value};
use crate::feature::{parse_features, FeatureCollection};
use crate::figure::{ChoroplethTrace, Figure, FigureData, FigureLayout, MapLayout};
use crate::geo_filter::{filter_region, DropCounts, ID_FIELD};
use crate::percentile::percentile_ranks;
use crate::stats::{DiagnosticsSink, Summary};

/// Property stamped with the percentile rank.
pub const PERCENTILE_FIELD: &str = "percentile";

/// A classified layer payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Already a chart description; rendered as-is.
    Figure { data: Value, layout: Value },

    /// Geographic features to turn into a choropleth.
    Features {
        features: Vec<Value>,
    },
}

/// Everything the assembler needs besides the payload.
#[derive(Debug, Clone, PartialEq)]
pub struct MapContext {
    pub region: RegionConfig,
    pub scale: Option<ScaleSpec>,
    pub viewport_height: f64,
}

impl Default for MapContext {
    fn default() -> Self {
        Self {
            region: RegionConfig::default(),
            scale: None,
            viewport_height: 0.0,
        }
    }
}

/// Loose truthiness: null, false, zero and "" are falsy.
fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

/// Classify a decoded payload.
///
/// `file` only feeds the error message.
pub fn classify(payload: Value, file: &str) -> MapResult<Payload> {
    match payload {
        Value::Array(items) => {
            let first_typed = items
                .first()
                .and_then(Value::as_object)
                .map(|o| truthy(o.get("type")))
                .unwrap_or(false);
            if first_typed {
                Ok(Payload::Figure {
                    data: Value::Array(items),
                    layout: Value::Object(Map::new()),
                })
            } else {
                Err(MapError::Format {
                    file: file.to_string(),
                })
            }
        }
        Value::Object(mut obj) => {
            if truthy(obj.get("data")) {
                let data = obj.remove("data").unwrap_or(Value::Null);
                let layout = obj
                    .remove("layout")
                    .filter(|l| truthy(Some(l)))
                    .unwrap_or_else(|| Value::Object(Map::new()));
                return Ok(Payload::Figure { data, layout });
            }

            let is_collection = obj.get("type").and_then(Value::as_str) == Some("FeatureCollection");
            if is_collection || truthy(obj.get("features")) {
                return match obj.remove("features") {
                    Some(Value::Array(features)) => Ok(Payload::Features { features }),
                    Some(other) => Err(MapError::MalformedFeatures(format!(
                        "expected an array, found {}",
                        json_kind(&other)
                    ))),
                    None => Err(MapError::MalformedFeatures("missing".to_string())),
                };
            }

            Err(MapError::Format {
                file: file.to_string(),
            })
        }
        _ => Err(MapError::Format {
            file: file.to_string(),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Build a choropleth figure from raw feature entries.
///
/// Pure: the same input and context always give the same figure.
pub fn build_choropleth(raw_features: Vec<Value>, ctx: &MapContext) -> (Figure, Summary) {
    let mut drops = DropCounts::default();
    let (features, malformed) = parse_features(raw_features);
    drops.malformed = malformed;

    let mut features = filter_region(features, &ctx.region, &mut drops);

    let values: Vec<Option<f64>> = features
        .iter()
        .map(|f| coerce_number(raw_value(&f.properties)))
        .collect();

    let summary = Summary::from_values(&values, drops);
    let percentiles = percentile_ranks(&values);

    let mut locations = Vec::with_capacity(features.len());
    let mut customdata = Vec::with_capacity(features.len());
    for (feature, pct) in features.iter_mut().zip(&percentiles) {
        let pct_value = pct
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null);
        feature.set_property(PERCENTILE_FIELD, pct_value);

        locations.push(
            feature
                .property(ID_FIELD)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        );
        customdata.push([raw_value(&feature.properties).cloned().unwrap_or(Value::Null)]);
    }

    debug!(
        kept = features.len(),
        dropped = drops.total(),
        "Filtered features to region"
    );

    let colorscale = resolve_colorscale(ctx.scale.as_ref());
    let trace = ChoroplethTrace::new(
        FeatureCollection::new(features),
        locations,
        percentiles,
        colorscale,
        customdata,
    );

    let figure = Figure {
        data: FigureData::Choropleth(vec![trace]),
        layout: FigureLayout::Map(MapLayout::new(&ctx.region.center, ctx.viewport_height)),
    };

    (figure, summary)
}

/// Classify a payload and turn it into a renderable figure.
///
/// Feature collections report their summary to `sink` before returning.
pub fn assemble(
    payload: Value,
    file: &str,
    ctx: &MapContext,
    sink: &dyn DiagnosticsSink,
) -> MapResult<Figure> {
    match classify(payload, file)? {
        Payload::Figure { data, layout } => Ok(Figure::passthrough(data, layout)),
        Payload::Features { features } => {
            let (figure, summary) = build_choropleth(features, ctx);
            sink.report(&summary);
            Ok(figure)
        }
    }
}
