//! Sort policy for filtered activity sets.
//!
//! Both orderings return a new vector; the caller's slice is never reordered.
//! Rust's `sort_by` is stable, so equal keys keep their input order.

use crate::activity::Activity;

/// Most recent first, for listings. Idempotent.
///
/// Timestamps compare lexicographically, which matches chronological order for
/// the `"YYYY-MM-DD HH:MM:SS"` format.
pub fn sort_by_date_desc(runs: &[Activity]) -> Vec<Activity> {
    let mut sorted = runs.to_vec();
    sorted.sort_by(|a, b| b.start_date_local.cmp(&a.start_date_local));
    sorted
}

/// Longest first, for picking the representative of same-day runs.
///
/// NaN distances sort after every real distance.
pub fn sort_by_distance_desc(runs: &[Activity]) -> Vec<Activity> {
    let mut sorted = runs.to_vec();
    sorted.sort_by(|a, b| distance_key(b).total_cmp(&distance_key(a)));
    sorted
}

fn distance_key(run: &Activity) -> f64 {
    if run.distance.is_nan() {
        f64::NEG_INFINITY
    } else {
        run.distance
    }
}
