//! # Activities
//!
//! The immutable activity record the rest of the crate works on, and the
//! loader for the dashboard's `activities.json` collection.
//!
//! An activity's `start_date_local` is a local timestamp of the form
//! `"YYYY-MM-DD HH:MM:SS"`. Its date prefix sorts lexicographically, which is
//! what the year filter and the date-descending sort rely on.

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, OptionExt, Result};
use crate::{geo_utils, GpsPoint};

/// Precision used by encoded summary polylines.
const POLYLINE_PRECISION: u32 = 5;

/// One recorded run (or ride) with its metadata and optional GPS track.
///
/// Cloning is cheap: the track is shared.
#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    pub id: String,
    pub title: String,
    pub activity_type: String,
    /// Local start timestamp, `"YYYY-MM-DD HH:MM:SS"`
    pub start_date_local: String,
    /// Distance in meters
    pub distance: f64,
    pub city: Option<String>,
    pub track: Arc<[GpsPoint]>,
}

impl Activity {
    /// Create a run without a track. The title is derived with [`title_for_run`].
    pub fn new(id: impl Into<String>, start_date_local: impl Into<String>, distance: f64) -> Self {
        let start_date_local = start_date_local.into();
        let title = title_for_run(distance, start_hour(&start_date_local)).to_string();
        Self {
            id: id.into(),
            title,
            activity_type: "Run".to_string(),
            start_date_local,
            distance,
            city: None,
            track: Arc::from(Vec::new()),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn with_track(mut self, track: Vec<GpsPoint>) -> Self {
        self.track = Arc::from(track);
        self
    }

    /// Date prefix `"YYYY-MM-DD"` of the start timestamp.
    pub fn date(&self) -> &str {
        self.start_date_local
            .get(..10)
            .unwrap_or(&self.start_date_local)
    }

    /// Year prefix `"YYYY"` of the start timestamp.
    pub fn year(&self) -> &str {
        self.start_date_local
            .get(..4)
            .unwrap_or(&self.start_date_local)
    }

    /// Local start hour, if the timestamp carries one.
    pub fn start_hour(&self) -> Option<u32> {
        start_hour(&self.start_date_local)
    }

    pub fn has_track(&self) -> bool {
        !self.track.is_empty()
    }
}

fn start_hour(start_date_local: &str) -> Option<u32> {
    start_date_local.get(11..13)?.parse().ok()
}

/// Title for a run without a name, from its distance and start hour.
pub fn title_for_run(distance_m: f64, hour: Option<u32>) -> &'static str {
    let km = distance_m / 1000.0;
    if km > 20.0 && km < 40.0 {
        return "Half Marathon";
    }
    if km >= 40.0 {
        return "Full Marathon";
    }
    match hour {
        Some(0..=10) => "Morning Run",
        Some(11..=14) => "Midday Run",
        Some(15..=18) => "Afternoon Run",
        Some(19..=21) => "Evening Run",
        Some(_) => "Night Run",
        None => "Run",
    }
}

/// Label shown on the map when a single activity is located.
///
/// `"{title} {date} {km} KM"`, flagged when the run has no track to draw.
pub fn title_for_show(activity: &Activity) -> String {
    let title = if activity.title.is_empty() {
        "Run"
    } else {
        activity.title.as_str()
    };
    let no_map = if activity.has_track() {
        ""
    } else {
        " (No map data for this run)"
    };
    format!(
        "{} {} {:.2} KM{}",
        title,
        activity.date(),
        activity.distance / 1000.0,
        no_map
    )
}

// ============================================================================
// Loading
// ============================================================================

/// Activity identifier as it appears in `activities.json` (number or string).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RunId {
    Number(u64),
    Text(String),
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunId::Number(n) => write!(f, "{}", n),
            RunId::Text(s) => write!(f, "{}", s),
        }
    }
}

/// One entry of `activities.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub run_id: RunId,
    pub name: Option<String>,
    /// Distance in meters
    pub distance: Option<f64>,
    #[serde(rename = "type")]
    pub activity_type: Option<String>,
    pub start_date_local: String,
    pub city: Option<String>,
    /// Encoded polyline (precision 5)
    pub summary_polyline: Option<String>,
    /// Raw `[lng, lat]` pairs, preferred over the polyline when present
    pub coordinates: Option<Vec<[f64; 2]>>,
}

impl ActivityRecord {
    /// Validate the record and build an [`Activity`].
    pub fn into_activity(self) -> Result<Activity> {
        let id = self.run_id.to_string();

        let date = self
            .start_date_local
            .get(..10)
            .ok_or_invalid_activity(&id, "start_date_local is shorter than YYYY-MM-DD")?;
        NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|e| {
            DashboardError::InvalidActivity {
                activity_id: id.clone(),
                message: format!("start_date_local '{}': {}", self.start_date_local, e),
            }
        })?;

        let track = match (self.coordinates, self.summary_polyline.as_deref()) {
            (Some(coords), _) => coords
                .iter()
                .map(|[lng, lat]| GpsPoint::new(*lat, *lng))
                .filter(|p| p.is_valid())
                .collect(),
            (None, Some(encoded)) if !encoded.is_empty() => decode_track(&id, encoded),
            _ => Vec::new(),
        };

        let distance = self
            .distance
            .unwrap_or_else(|| geo_utils::polyline_length(&track));

        let title = match self.name {
            Some(name) if !name.trim().is_empty() => name,
            _ => title_for_run(distance, start_hour(&self.start_date_local)).to_string(),
        };

        Ok(Activity {
            id,
            title,
            activity_type: self.activity_type.unwrap_or_else(|| "Run".to_string()),
            start_date_local: self.start_date_local,
            distance,
            city: self.city.filter(|c| !c.is_empty()),
            track: Arc::from(track),
        })
    }
}

fn decode_track(id: &str, encoded: &str) -> Vec<GpsPoint> {
    match polyline::decode_polyline(encoded, POLYLINE_PRECISION) {
        Ok(line) => line
            .coords()
            .map(|c| GpsPoint::new(c.y, c.x))
            .filter(|p| p.is_valid())
            .collect(),
        Err(e) => {
            warn!("[Activities] Skipping track of '{}': {}", id, e);
            Vec::new()
        }
    }
}

/// Parse the `activities.json` array into activities.
///
/// A record with an unusable start date fails the whole load; a record with
/// an unusable track is kept without one.
pub fn parse_activities(json: &str) -> Result<Vec<Activity>> {
    let records: Vec<ActivityRecord> = serde_json::from_str(json)?;
    let activities = records
        .into_iter()
        .map(ActivityRecord::into_activity)
        .collect::<Result<Vec<_>>>()?;

    info!(
        "[Activities] Loaded {} activities ({} with tracks)",
        activities.len(),
        activities.iter().filter(|a| a.has_track()).count()
    );
    Ok(activities)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_and_year_prefix() {
        let run = Activity::new("1", "2023-05-01 07:12:00", 5000.0);
        assert_eq!(run.date(), "2023-05-01");
        assert_eq!(run.year(), "2023");
        assert_eq!(run.start_hour(), Some(7));
        assert!(!run.has_track());
    }

    #[test]
    fn test_short_timestamp_does_not_panic() {
        let run = Activity::new("1", "2023", 0.0);
        assert_eq!(run.date(), "2023");
        assert_eq!(run.start_hour(), None);
        assert_eq!(run.title, "Run");
    }

    #[test]
    fn test_title_for_run() {
        assert_eq!(title_for_run(5000.0, Some(7)), "Morning Run");
        assert_eq!(title_for_run(5000.0, Some(12)), "Midday Run");
        assert_eq!(title_for_run(5000.0, Some(17)), "Afternoon Run");
        assert_eq!(title_for_run(5000.0, Some(20)), "Evening Run");
        assert_eq!(title_for_run(5000.0, Some(23)), "Night Run");
        assert_eq!(title_for_run(21_097.0, Some(7)), "Half Marathon");
        assert_eq!(title_for_run(42_195.0, Some(7)), "Full Marathon");
    }

    #[test]
    fn test_title_for_show() {
        let run = Activity::new("1", "2023-05-01 07:12:00", 10_500.0)
            .with_title("Tempo")
            .with_track(vec![GpsPoint::new(41.9, 12.5)]);
        assert_eq!(title_for_show(&run), "Tempo 2023-05-01 10.50 KM");

        let no_track = Activity::new("2", "2023-05-02 07:12:00", 3000.0).with_title("Easy");
        assert_eq!(
            title_for_show(&no_track),
            "Easy 2023-05-02 3.00 KM (No map data for this run)"
        );
    }

    #[test]
    fn test_parse_activities() {
        let json = r#"[
            {"run_id": 101, "name": "Lunch Run", "distance": 5012.3, "type": "Run",
             "start_date_local": "2023-05-01 12:30:00", "city": "Rome",
             "coordinates": [[12.49, 41.90], [12.50, 41.91]]},
            {"run_id": "abc", "start_date_local": "2023-06-01 06:00:00",
             "summary_polyline": "_p~iF~ps|U_ulLnnqC_mqNvxq`@"}
        ]"#;

        let runs = parse_activities(json).unwrap();
        assert_eq!(runs.len(), 2);

        assert_eq!(runs[0].id, "101");
        assert_eq!(runs[0].city.as_deref(), Some("Rome"));
        assert_eq!(runs[0].track.len(), 2);
        assert_eq!(runs[0].track[0], GpsPoint::new(41.90, 12.49));

        assert_eq!(runs[1].id, "abc");
        assert_eq!(runs[1].track.len(), 3);
        assert!((runs[1].track[0].latitude - 38.5).abs() < 1e-6);
        assert!((runs[1].track[0].longitude + 120.2).abs() < 1e-6);
        // Distance falls back to the track length, title to the run period
        assert!(runs[1].distance > 0.0);
        assert_eq!(runs[1].activity_type, "Run");
        assert_eq!(runs[1].title, "Full Marathon");
    }

    #[test]
    fn test_parse_bad_polyline_keeps_activity() {
        let json = r#"[{"run_id": 1, "distance": 1000, "start_date_local": "2023-05-01 08:00:00",
                        "summary_polyline": "!!!!"}]"#;
        let runs = parse_activities(json).unwrap();
        assert_eq!(runs.len(), 1);
        assert!(!runs[0].has_track());
        assert_eq!(runs[0].title, "Morning Run");
    }

    #[test]
    fn test_parse_bad_date_rejected() {
        let json = r#"[{"run_id": 7, "start_date_local": "05/01/2023 08:00"}]"#;
        assert!(matches!(
            parse_activities(json),
            Err(DashboardError::InvalidActivity { ref activity_id, .. }) if activity_id == "7"
        ));
    }

    #[test]
    fn test_parse_not_an_array() {
        assert!(matches!(
            parse_activities(r#"{"run_id": 1}"#),
            Err(DashboardError::Parse { .. })
        ));
    }
}
