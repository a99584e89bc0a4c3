//! Test data generators for synthetic feature collections.

use serde_json::{json, Value};

use crate::fixtures::{feature, feature_collection};

/// Creates `n` San Francisco tract features with predictable values.
///
/// Feature `i` has GEOID `06075` followed by `i` zero-padded to six digits
/// and value `value_fn(i)`.
///
/// # Example
///
/// ```
/// use test_utils::create_tract_collection;
///
/// let fc = create_tract_collection(3, |i| serde_json::json!(i * 10));
/// assert_eq!(fc["features"].as_array().unwrap().len(), 3);
/// assert_eq!(fc["features"][2]["properties"]["geoid"], "06075000002");
/// ```
pub fn create_tract_collection<F>(n: usize, value_fn: F) -> Value
where
    F: Fn(usize) -> Value,
{
    let features = (0..n)
        .map(|i| feature(&format!("06075{:06}", i), value_fn(i)))
        .collect();
    feature_collection(features)
}

/// Creates `n` tracts whose values are the strings `"1,000"`, `"2,000"`, ...
pub fn create_thousands_collection(n: usize) -> Value {
    create_tract_collection(n, |i| json!(format!("{},000", i + 1)))
}
