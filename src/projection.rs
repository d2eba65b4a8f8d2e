//! # Geo Projection
//!
//! Turns a sequence of activities into a renderer-agnostic geometry collection
//! and fits a viewport around it.
//!
//! Each activity with a track becomes one feature that remembers the
//! activity's id and date, so a click on a rendered feature can be traced back
//! to the run it belongs to. Activities without a track are skipped.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::activity::Activity;
use crate::config::ViewportConfig;
use crate::{geo_utils, Bounds, GpsPoint};

/// Inputs at least this large are projected in parallel.
#[cfg(feature = "parallel")]
const PARALLEL_THRESHOLD: usize = 256;

/// Geometry of one rendered activity.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureGeometry {
    /// Track with a single fix
    Point(GpsPoint),
    /// Track with two or more fixes
    LineString(Arc<[GpsPoint]>),
}

/// One activity's track on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct RunFeature {
    pub activity_id: String,
    /// `"YYYY-MM-DD"`, the key used to locate the run again
    pub date: String,
    pub geometry: FeatureGeometry,
}

impl RunFeature {
    /// Feature for an activity, or `None` if it has no track.
    pub fn from_activity(activity: &Activity) -> Option<Self> {
        let geometry = match activity.track.len() {
            0 => return None,
            1 => FeatureGeometry::Point(activity.track[0]),
            _ => FeatureGeometry::LineString(Arc::clone(&activity.track)),
        };
        Some(Self {
            activity_id: activity.id.clone(),
            date: activity.date().to_string(),
            geometry,
        })
    }

    /// All coordinates of the feature.
    pub fn points(&self) -> &[GpsPoint] {
        match &self.geometry {
            FeatureGeometry::Point(p) => std::slice::from_ref(p),
            FeatureGeometry::LineString(points) => &points[..],
        }
    }

    fn to_geojson(&self) -> Value {
        let geometry = match &self.geometry {
            FeatureGeometry::Point(p) => json!({
                "type": "Point",
                "coordinates": [p.longitude, p.latitude],
            }),
            FeatureGeometry::LineString(points) => json!({
                "type": "LineString",
                "coordinates": points
                    .iter()
                    .map(|p| [p.longitude, p.latitude])
                    .collect::<Vec<_>>(),
            }),
        };
        json!({
            "type": "Feature",
            "properties": { "id": self.activity_id, "date": self.date },
            "geometry": geometry,
        })
    }
}

/// The features handed to the map renderer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryCollection {
    features: Vec<RunFeature>,
}

impl GeometryCollection {
    pub fn new(features: Vec<RunFeature>) -> Self {
        Self { features }
    }

    pub fn features(&self) -> &[RunFeature] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Date of the feature at `index`, for click-to-locate.
    pub fn date_of(&self, index: usize) -> Option<&str> {
        self.features.get(index).map(|f| f.date.as_str())
    }

    /// Bounding box of every coordinate, `None` when empty.
    pub fn bounds(&self) -> Option<Bounds> {
        geo_utils::tracks_bounds(self.features.iter().map(RunFeature::points))
    }

    /// GeoJSON `FeatureCollection`; coordinates are `[lng, lat]`.
    pub fn to_geojson(&self) -> Value {
        json!({
            "type": "FeatureCollection",
            "features": self.features.iter().map(RunFeature::to_geojson).collect::<Vec<_>>(),
        })
    }

    pub fn to_geojson_string(&self) -> String {
        serde_json::to_string(&self.to_geojson()).unwrap_or_else(|_| "{}".to_string())
    }
}

/// What part of the map is visible.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: f64,
    pub bounds: Bounds,
}

/// Project activities into a geometry collection, one feature per tracked run.
pub fn project(activities: &[Activity]) -> GeometryCollection {
    GeometryCollection::new(project_features(activities))
}

#[cfg(feature = "parallel")]
fn project_features(activities: &[Activity]) -> Vec<RunFeature> {
    if activities.len() >= PARALLEL_THRESHOLD {
        activities
            .par_iter()
            .filter_map(RunFeature::from_activity)
            .collect()
    } else {
        activities
            .iter()
            .filter_map(RunFeature::from_activity)
            .collect()
    }
}

#[cfg(not(feature = "parallel"))]
fn project_features(activities: &[Activity]) -> Vec<RunFeature> {
    activities
        .iter()
        .filter_map(RunFeature::from_activity)
        .collect()
}

/// Viewport fitted around the whole collection.
///
/// `None` for an empty collection: there is nothing to fit, and callers keep
/// whatever viewport they had.
pub fn bounds_for(collection: &GeometryCollection, config: &ViewportConfig) -> Option<Viewport> {
    let bounds = collection.bounds()?;
    let center = geo_utils::mercator_center(&bounds);
    Some(Viewport {
        latitude: center.latitude,
        longitude: center.longitude,
        zoom: geo_utils::fit_zoom(&bounds, config),
        bounds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rome_run(id: &str, date: &str) -> Activity {
        Activity::new(id, date, 5000.0).with_track(vec![
            GpsPoint::new(41.90, 12.49),
            GpsPoint::new(41.91, 12.50),
        ])
    }

    #[test]
    fn test_project_empty() {
        let collection = project(&[]);
        assert!(collection.is_empty());
        assert!(collection.bounds().is_none());
        assert!(bounds_for(&collection, &ViewportConfig::default()).is_none());
    }

    #[test]
    fn test_project_skips_runs_without_track() {
        let runs = vec![
            rome_run("1", "2023-05-01 07:00:00"),
            Activity::new("2", "2023-05-02 07:00:00", 3000.0),
            rome_run("3", "2023-05-03 07:00:00"),
        ];
        let collection = project(&runs);
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.features()[0].activity_id, "1");
        assert_eq!(collection.features()[1].activity_id, "3");
        assert_eq!(collection.date_of(1), Some("2023-05-03"));
        assert_eq!(collection.date_of(2), None);
    }

    #[test]
    fn test_single_fix_becomes_point() {
        let run = Activity::new("1", "2023-05-01 07:00:00", 0.0)
            .with_track(vec![GpsPoint::new(41.9, 12.5)]);
        let collection = project(&[run]);
        assert_eq!(
            collection.features()[0].geometry,
            FeatureGeometry::Point(GpsPoint::new(41.9, 12.5))
        );
        let viewport = bounds_for(&collection, &ViewportConfig::default()).unwrap();
        assert_eq!(viewport.zoom, 9.0);
        assert!((viewport.latitude - 41.9).abs() < 1e-9);
    }

    #[test]
    fn test_bounds_for_covers_all_features() {
        let oslo = Activity::new("2", "2023-06-01 07:00:00", 8000.0)
            .with_track(vec![GpsPoint::new(59.91, 10.75), GpsPoint::new(59.92, 10.76)]);
        let collection = project(&[rome_run("1", "2023-05-01 07:00:00"), oslo]);

        let viewport = bounds_for(&collection, &ViewportConfig::default()).unwrap();
        assert_eq!(viewport.bounds.min_lat, 41.90);
        assert_eq!(viewport.bounds.max_lat, 59.92);
        assert_eq!(viewport.bounds.min_lng, 10.75);
        assert_eq!(viewport.bounds.max_lng, 12.50);
        assert!(viewport.bounds.contains(&GpsPoint::new(viewport.latitude, viewport.longitude)));
    }

    #[test]
    fn test_geojson_output() {
        let collection = project(&[rome_run("1", "2023-05-01 07:00:00")]);
        let geojson = collection.to_geojson();

        assert_eq!(geojson["type"], "FeatureCollection");
        let feature = &geojson["features"][0];
        assert_eq!(feature["properties"]["date"], "2023-05-01");
        assert_eq!(feature["properties"]["id"], "1");
        assert_eq!(feature["geometry"]["type"], "LineString");
        assert_eq!(feature["geometry"]["coordinates"][0][0], 12.49);
        assert_eq!(feature["geometry"]["coordinates"][0][1], 41.90);

        let parsed: Value = serde_json::from_str(&collection.to_geojson_string()).unwrap();
        assert_eq!(parsed, geojson);
    }

    #[test]
    fn test_project_prefix_shares_tracks() {
        let run = rome_run("1", "2023-05-01 07:00:00");
        let collection = project(std::slice::from_ref(&run));
        match &collection.features()[0].geometry {
            FeatureGeometry::LineString(points) => assert!(Arc::ptr_eq(points, &run.track)),
            other => panic!("expected a line, got {:?}", other),
        }
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_projection_preserves_order() {
        let runs: Vec<Activity> = (0..PARALLEL_THRESHOLD * 2)
            .map(|i| rome_run(&i.to_string(), "2023-05-01 07:00:00"))
            .collect();
        let collection = project(&runs);
        assert_eq!(collection.len(), runs.len());
        for (feature, run) in collection.features().iter().zip(&runs) {
            assert_eq!(feature.activity_id, run.id);
        }
    }
}
