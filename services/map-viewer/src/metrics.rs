//! Prometheus metric names and recording helpers.

use metrics::{counter, histogram};
use std::time::Duration;

pub const LAYER_LOADS: &str = "map_layer_loads_total";
pub const LAYER_LOAD_ERRORS: &str = "map_layer_load_errors_total";
pub const STALE_LOADS_DISCARDED: &str = "map_stale_loads_discarded_total";
pub const MANIFEST_FALLBACKS: &str = "map_manifest_fallbacks_total";
pub const LAYER_LOAD_DURATION: &str = "map_layer_load_duration_ms";

/// A layer load finished (successfully or not).
pub fn record_load(elapsed: Duration) {
    counter!(LAYER_LOADS).increment(1);
    histogram!(LAYER_LOAD_DURATION).record(elapsed.as_secs_f64() * 1000.0);
}

pub fn record_load_error(kind: &'static str) {
    counter!(LAYER_LOAD_ERRORS, "kind" => kind).increment(1);
}

pub fn record_stale_discard() {
    counter!(STALE_LOADS_DISCARDED).increment(1);
}

pub fn record_manifest_fallback() {
    counter!(MANIFEST_FALLBACKS).increment(1);
}
