//! Rank-based percentile normalization.

use std::cmp::Ordering;

/// Convert a column of optional values into percentile ranks in (0, 1].
///
/// Present values are stable-sorted ascending and the value at 1-based
/// sorted position `j` of `n` present values gets `j / n`. Tied values take
/// consecutive distinct ranks in input order (no averaging), so the last of
/// a tie group ranks highest. Missing inputs stay missing and do not count
/// toward `n`.
pub fn percentile_ranks(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut present: Vec<(usize, f64)> = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.filter(|x| !x.is_nan()).map(|x| (i, x)))
        .collect();

    let mut ranks = vec![None; values.len()];
    let n = present.len();
    if n == 0 {
        return ranks;
    }

    // slice::sort_by is stable
    present.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));

    for (j, (index, _)) in present.iter().enumerate() {
        ranks[*index] = Some((j + 1) as f64 / n as f64);
    }

    ranks
}
