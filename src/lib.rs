//! # Run Heatmap
//!
//! Activity selection and progressive map reveal for a personal running heatmap.
//!
//! This library provides:
//! - Year / city / title filtering of a recorded activity collection
//! - Projection of activity tracks into a renderer-agnostic geometry collection
//! - Viewport fitting (Web-Mercator fit-bounds) for the selected tracks
//! - A selection controller that drives an incremental, cancellable reveal
//!
//! ## Features
//!
//! - **`parallel`** - Project large activity sets in parallel with rayon
//! - **`runtime`** - tokio event loop driver with an interval-backed ticker
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use run_heatmap::{
//!     Activity, DashboardConfig, GpsPoint, ManualTicker, NullView, SelectionController,
//! };
//!
//! let activities = vec![
//!     Activity::new("1", "2023-05-01 07:00:00", 5000.0)
//!         .with_city("Rome")
//!         .with_track(vec![GpsPoint::new(41.90, 12.49), GpsPoint::new(41.91, 12.50)]),
//!     Activity::new("2", "2023-06-01 07:00:00", 8000.0).with_city("Oslo"),
//! ];
//!
//! let mut controller = SelectionController::new(
//!     activities,
//!     "2023",
//!     DashboardConfig::default(),
//!     ManualTicker::default(),
//!     NullView,
//! )
//! .unwrap();
//!
//! controller.select_city("Rome");
//! assert_eq!(controller.runs().len(), 1);
//! assert_eq!(controller.label(), "Rome City Running Heatmap");
//!
//! // Drive the reveal until it completes
//! while let Some(task) = controller.ticker().running() {
//!     controller.tick(task);
//! }
//! assert_eq!(controller.geometry().len(), 1);
//! ```

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{DashboardError, OptionExt, Result};

// Configuration (reveal cadence, viewport fitting)
pub mod config;
pub use config::{DashboardConfig, RevealConfig, ViewportConfig};

// Activity records and loading
pub mod activity;
pub use activity::{parse_activities, title_for_run, title_for_show, Activity, ActivityRecord};

// Geographic utilities (bounds, mercator fitting, track length)
pub mod geo_utils;

// Selection predicates
pub mod filters;
pub use filters::{
    filter_and_sort_runs, filter_city_runs, filter_runs, filter_title_runs, filter_year_runs,
    Criterion, TOTAL,
};

// Ordering policies
pub mod sorting;
pub use sorting::{sort_by_date_desc, sort_by_distance_desc};

// Geometry projection for map rendering
pub mod projection;
pub use projection::{bounds_for, project, FeatureGeometry, GeometryCollection, RunFeature, Viewport};

// Incremental reveal scheduling
pub mod reveal;
pub use reveal::{step_size, ManualTicker, RevealStep, RevealTask, TaskId, Ticker, TickerEvent};

// Selection state machine
pub mod controller;
pub use controller::{
    Command, MapFrame, NullView, SelectionController, SelectionState, TickOutcome, View,
};

// Selector statistics (years, title and city counts)
pub mod stats;

// tokio event loop driver
#[cfg(feature = "runtime")]
pub mod driver;
#[cfg(feature = "runtime")]
pub use driver::{run, IntervalTicker};

// ============================================================================
// Core Types
// ============================================================================

/// A GPS coordinate with latitude and longitude.
///
/// # Example
/// ```
/// use run_heatmap::GpsPoint;
/// let point = GpsPoint::new(41.9028, 12.4964); // Rome
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsPoint {
    /// Create a new GPS point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// Bounding box of one or more tracks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Whether the point lies inside (or on the edge of) the bounds.
    pub fn contains(&self, point: &GpsPoint) -> bool {
        point.latitude >= self.min_lat
            && point.latitude <= self.max_lat
            && point.longitude >= self.min_lng
            && point.longitude <= self.max_lng
    }
}

// ============================================================================
// Tests
// ============================================================================
