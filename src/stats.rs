//! Selector statistics.
//!
//! The year, title and city selectors are populated from the activity
//! collection: which years exist, and how many runs carry each title or city.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::activity::Activity;

/// A selector value and the number of activities it would select.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

/// Distinct activity years, most recent first.
pub fn years(activities: &[Activity]) -> Vec<String> {
    let mut years: Vec<String> = activities.iter().map(|a| a.year().to_string()).collect();
    years.sort_unstable_by(|a, b| b.cmp(a));
    years.dedup();
    years
}

/// The most recent year with an activity; the dashboard's "current year".
pub fn latest_year(activities: &[Activity]) -> Option<String> {
    activities
        .iter()
        .map(Activity::year)
        .max()
        .map(str::to_string)
}

/// Runs per stored title, most frequent first.
///
/// Unnamed runs carry their time-of-day period as title (see
/// [`title_for_run`](crate::title_for_run)); a run with its own name is
/// counted under that name, not under its period. Every entry is a value
/// [`Criterion::Title`](crate::Criterion::Title) selects.
pub fn title_counts(activities: &[Activity]) -> Vec<ValueCount> {
    count_values(activities.iter().map(|a| a.title.as_str()))
}

/// Runs per city, most frequent first. Activities without a city are skipped.
pub fn city_counts(activities: &[Activity]) -> Vec<ValueCount> {
    count_values(activities.iter().filter_map(|a| a.city.as_deref()))
}

/// Count occurrences; ties keep first-seen order.
fn count_values<'a>(values: impl Iterator<Item = &'a str>) -> Vec<ValueCount> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<ValueCount> = Vec::new();

    for value in values {
        match index.get(value) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(value, counts.len());
                counts.push(ValueCount {
                    value: value.to_string(),
                    count: 1,
                });
            }
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}
