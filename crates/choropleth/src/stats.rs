//! Summary statistics reported after building a choropleth.

use serde::Serialize;
use tracing::info;

use crate::geo_filter::DropCounts;

/// Diagnostics for one assembled layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// Features that survived the region filter
    pub count: usize,
    /// Features with a numeric value
    pub valid_count: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    /// Features removed by the region filter
    pub dropped: DropCounts,
}

impl Summary {
    /// Compute statistics over the coerced values of the surviving features.
    pub fn from_values(values: &[Option<f64>], dropped: DropCounts) -> Self {
        let valid: Vec<f64> = values.iter().flatten().copied().collect();
        let valid_count = valid.len();

        let (min, max, mean) = if valid.is_empty() {
            (None, None, None)
        } else {
            let min = valid.iter().copied().fold(f64::INFINITY, f64::min);
            let max = valid.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            // Running mean; summing first can overflow to inf
            let mean = valid
                .iter()
                .enumerate()
                .fold(0.0, |mean, (i, x)| mean + (x - mean) / (i + 1) as f64);
            (Some(min), Some(max), Some(mean))
        };

        Self {
            count: values.len(),
            valid_count,
            min,
            max,
            mean,
            dropped,
        }
    }

    /// Features that were kept but carry no usable value.
    pub fn invalid_count(&self) -> usize {
        self.count - self.valid_count
    }

    /// Human-readable status line.
    pub fn status_line(&self) -> String {
        format!(
            "Loaded {} features, {} values (min: {}, max: {})",
            self.count,
            self.valid_count,
            fmt_opt(self.min),
            fmt_opt(self.max)
        )
    }
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|v| v.to_string()).unwrap_or_else(|| "n/a".to_string())
}

/// Receiver for structured diagnostics produced by the pipeline.
pub trait DiagnosticsSink {
    fn report(&self, summary: &Summary);
}

/// Diagnostics sink that only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl DiagnosticsSink for TracingDiagnostics {
    fn report(&self, summary: &Summary) {
        info!(
            count = summary.count,
            valid_count = summary.valid_count,
            min = ?summary.min,
            max = ?summary.max,
            mean = ?summary.mean,
            dropped = summary.dropped.total(),
            "Choropleth data"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_values() {
        let summary = Summary::from_values(&[Some(2.0), None, Some(4.0), Some(9.0)], DropCounts::default());
        assert_eq!(summary.count, 4);
        assert_eq!(summary.valid_count, 3);
        assert_eq!(summary.invalid_count(), 1);
        assert_eq!(summary.min, Some(2.0));
        assert_eq!(summary.max, Some(9.0));
        assert_eq!(summary.mean, Some(5.0));
        assert_eq!(
            summary.status_line(),
            "Loaded 4 features, 3 values (min: 2, max: 9)"
        );
    }

    #[test]
    fn test_mean_of_huge_values_stays_finite() {
        let summary = Summary::from_values(&[Some(f64::MAX), Some(f64::MAX), Some(f64::MAX)], DropCounts::default());
        assert_eq!(summary.mean, Some(f64::MAX));
        assert!(serde_json::to_value(&summary).unwrap()["mean"].is_number());
    }

    #[test]
    fn test_summary_without_values() {
        let summary = Summary::from_values(&[None], DropCounts::default());
        assert_eq!(summary.mean, None);
        assert_eq!(
            summary.status_line(),
            "Loaded 1 features, 0 values (min: n/a, max: n/a)"
        );
    }
}
