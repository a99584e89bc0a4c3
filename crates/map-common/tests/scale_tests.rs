//! Tests for color scale resolution.

use map_common::scale::{default_scale, resolve_colorscale, ColorStop, ScaleSpec, REVERSED_DEFAULT};

// ============================================================================
// Default and reversed default
// ============================================================================

#[test]
fn test_unset_spec_yields_default() {
    let stops = resolve_colorscale(None);
    assert_eq!(stops.len(), 3);
    let positions: Vec<f64> = stops.iter().map(|s| s.position()).collect();
    assert_eq!(positions, vec![0.0, 0.5, 1.0]);
    assert_eq!(stops[0].color(), "#a50026");
    assert_eq!(stops[2].color(), "#006837");
}

#[test]
fn test_reversed_default_reverses_colors() {
    let stops = resolve_colorscale(Some(&ScaleSpec::preset(REVERSED_DEFAULT)));
    let colors: Vec<&str> = stops.iter().map(|s| s.color()).collect();
    assert_eq!(colors, vec!["#006837", "#ffffbf", "#a50026"]);
}

#[test]
fn test_reversed_default_keeps_positions_with_colors() {
    // Reversal is by list order only; positions travel with their colors.
    let stops = resolve_colorscale(Some(&ScaleSpec::preset(REVERSED_DEFAULT)));
    let positions: Vec<f64> = stops.iter().map(|s| s.position()).collect();
    assert_eq!(positions, vec![1.0, 0.5, 0.0]);
}

// ============================================================================
// Presets and pass-through
// ============================================================================

#[test]
fn test_named_presets() {
    let blues = resolve_colorscale(Some(&ScaleSpec::preset("Blues")));
    assert_eq!(blues.len(), 9);
    assert_eq!(blues[0], ColorStop::new(0.0, "#f7fbff"));
    assert_eq!(blues[8], ColorStop::new(1.0, "#08306b"));

    let greens = resolve_colorscale(Some(&ScaleSpec::preset("Greens")));
    assert_eq!(greens[4], ColorStop::new(0.5, "#74c476"));

    let rdylgn = resolve_colorscale(Some(&ScaleSpec::preset("RdYlGn")));
    assert_eq!(rdylgn, default_scale());
}

#[test]
fn test_unknown_preset_falls_back_silently() {
    assert_eq!(
        resolve_colorscale(Some(&ScaleSpec::preset("Viridis"))),
        default_scale()
    );
    assert_eq!(
        resolve_colorscale(Some(&ScaleSpec::preset("Blues_r"))),
        default_scale()
    );
}

#[test]
fn test_explicit_stops_pass_through_unchanged() {
    // No validation beyond acceptance, even for odd tables.
    let stops = vec![
        ColorStop::new(0.0, "#000000"),
        ColorStop::new(0.9, "#123456"),
        ColorStop::new(0.3, "not-a-color"),
    ];
    let resolved = resolve_colorscale(Some(&ScaleSpec::Stops(stops.clone())));
    assert_eq!(resolved, stops);
}

// ============================================================================
// Serialization
// ============================================================================

#[test]
fn test_spec_from_yaml() {
    let preset: ScaleSpec = serde_yaml::from_str("Greens").unwrap();
    assert_eq!(preset, ScaleSpec::preset("Greens"));

    let explicit: ScaleSpec = serde_yaml::from_str("[[0, '#ffffff'], [1, '#000000']]").unwrap();
    assert_eq!(
        explicit,
        ScaleSpec::Stops(vec![
            ColorStop::new(0.0, "#ffffff"),
            ColorStop::new(1.0, "#000000")
        ])
    );
}

#[test]
fn test_stops_serialize_as_pairs() {
    let json = serde_json::to_string(&default_scale()).unwrap();
    assert_eq!(
        json,
        r##"[[0.0,"#a50026"],[0.5,"#ffffbf"],[1.0,"#006837"]]"##
    );
}
