//! Activity filters.
//!
//! Pure predicates selecting activities by year, city or title, and the
//! [`Criterion`] that pairs one of them with its match value. Filtering never
//! fails: an empty collection or an unmatched value gives an empty result.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::activity::Activity;
use crate::sorting::sort_by_date_desc;

/// Year value that matches every activity.
pub const TOTAL: &str = "Total";

/// Year match: the start date's year prefix equals `year`, or `year` is [`TOTAL`].
pub fn filter_year_runs(activity: &Activity, year: &str) -> bool {
    year == TOTAL || activity.year() == year
}

/// City match: the activity's city label equals `city`.
pub fn filter_city_runs(activity: &Activity, city: &str) -> bool {
    activity.city.as_deref() == Some(city)
}

/// Title match: the activity's title equals `title`.
pub fn filter_title_runs(activity: &Activity, title: &str) -> bool {
    activity.title == title
}

/// The active selection: one predicate paired with its match value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum Criterion {
    Year(String),
    City(String),
    Title(String),
}

impl Criterion {
    pub fn matches(&self, activity: &Activity) -> bool {
        match self {
            Criterion::Year(year) => filter_year_runs(activity, year),
            Criterion::City(city) => filter_city_runs(activity, city),
            Criterion::Title(title) => filter_title_runs(activity, title),
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Criterion::Year(v) | Criterion::City(v) | Criterion::Title(v) => v,
        }
    }

    /// `"Year"`, `"City"` or `"Title"`.
    pub fn kind(&self) -> &'static str {
        match self {
            Criterion::Year(_) => "Year",
            Criterion::City(_) => "City",
            Criterion::Title(_) => "Title",
        }
    }

    /// Map label for this selection, e.g. `"2023 Year Running Heatmap"`.
    pub fn label(&self) -> String {
        format!("{} {} Running Heatmap", self.value(), self.kind())
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.kind().to_lowercase(), self.value())
    }
}

/// Activities matching `criterion`, in input order.
pub fn filter_runs(activities: &[Activity], criterion: &Criterion) -> Vec<Activity> {
    activities
        .iter()
        .filter(|a| criterion.matches(a))
        .cloned()
        .collect()
}

/// Activities matching `criterion`, most recent first.
pub fn filter_and_sort_runs(activities: &[Activity], criterion: &Criterion) -> Vec<Activity> {
    sort_by_date_desc(&filter_runs(activities, criterion))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_runs() -> Vec<Activity> {
        vec![
            Activity::new("1", "2022-03-01 07:00:00", 5000.0)
                .with_city("Rome")
                .with_title("Morning Run"),
            Activity::new("2", "2023-05-01 18:00:00", 8000.0)
                .with_city("Oslo")
                .with_title("Afternoon Run"),
            Activity::new("3", "2023-01-15 07:00:00", 12000.0)
                .with_city("Rome")
                .with_title("Morning Run"),
            Activity::new("4", "2021-12-31 22:00:00", 3000.0),
        ]
    }

    fn ids(runs: &[Activity]) -> Vec<&str> {
        runs.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_year_filter_keeps_input_order() {
        let runs = sample_runs();
        let filtered = filter_runs(&runs, &Criterion::Year("2023".to_string()));
        assert_eq!(ids(&filtered), vec!["2", "3"]);
        assert!(filtered.iter().all(|r| r.year() == "2023"));
    }

    #[test]
    fn test_total_matches_everything() {
        let runs = sample_runs();
        let filtered = filter_runs(&runs, &Criterion::Year(TOTAL.to_string()));
        assert_eq!(filtered.len(), runs.len());
    }

    #[test]
    fn test_city_filter() {
        let runs = sample_runs();
        let filtered = filter_runs(&runs, &Criterion::City("Rome".to_string()));
        assert_eq!(ids(&filtered), vec!["1", "3"]);

        // Activities without a city never match
        assert!(!filter_city_runs(&runs[3], ""));
    }

    #[test]
    fn test_title_filter() {
        let runs = sample_runs();
        let filtered = filter_runs(&runs, &Criterion::Title("Afternoon Run".to_string()));
        assert_eq!(ids(&filtered), vec!["2"]);
    }

    #[test]
    fn test_unmatched_and_empty() {
        let runs = sample_runs();
        assert!(filter_runs(&runs, &Criterion::Year("1999".to_string())).is_empty());
        assert!(filter_runs(&runs, &Criterion::City("Paris".to_string())).is_empty());
        assert!(filter_and_sort_runs(&[], &Criterion::Year(TOTAL.to_string())).is_empty());
    }

    #[test]
    fn test_filter_and_sort_most_recent_first() {
        let runs = sample_runs();
        let sorted = filter_and_sort_runs(&runs, &Criterion::Year(TOTAL.to_string()));
        assert_eq!(ids(&sorted), vec!["2", "3", "1", "4"]);
        // Input untouched
        assert_eq!(ids(&runs), vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn test_labels() {
        assert_eq!(
            Criterion::Year("2023".to_string()).label(),
            "2023 Year Running Heatmap"
        );
        assert_eq!(
            Criterion::City("Rome".to_string()).label(),
            "Rome City Running Heatmap"
        );
        assert_eq!(
            Criterion::Title("Night Run".to_string()).label(),
            "Night Run Title Running Heatmap"
        );
        assert_eq!(Criterion::City("Rome".to_string()).to_string(), "city=Rome");
    }
}
