//! # Selection Controller
//!
//! Owns everything the dashboard displays (filtered set, geometry, viewport,
//! label) together with the one reveal task that may be animating it. All
//! mutation goes through the named transitions below.
//!
//! ## States
//!
//! - `Idle`: nothing selected yet
//! - `Filtering(criterion)`: a filtered set is displayed (and possibly still
//!   being revealed)
//! - `Located { activity_id }`: a single run is displayed
//!
//! ## Transitions
//!
//! | Operation | Effect |
//! |-----------|--------|
//! | [`start`](SelectionController::start) | filter by the current year |
//! | [`select_year`](SelectionController::select_year) | filter by year; resets a zoomed-in viewport first |
//! | [`select_city`](SelectionController::select_city) | filter by city |
//! | [`select_title`](SelectionController::select_title) | filter by title |
//! | [`locate_by_date`](SelectionController::locate_by_date) | show the longest run on a date |
//! | [`select_row`](SelectionController::select_row) | table row clicked |
//! | [`locate_feature`](SelectionController::locate_feature) | map feature clicked |
//! | [`replace_activities`](SelectionController::replace_activities) | source collection changed |
//!
//! [`set_viewport`](SelectionController::set_viewport) records a pan or zoom
//! made on the rendered map. It is not a transition: the reveal keeps running.
//!
//! Every transition cancels the running reveal task (stopping its timer)
//! before it touches the display. Ticks are delivered back through
//! [`tick`](SelectionController::tick); a tick for any task other than the
//! running one is rejected and writes nothing.
//!
//! The viewport is not refitted on reveal ticks. A filtered set's viewport
//! is applied when its reveal completes, except on the year path where a
//! zoomed-in map is reset before animating.

use log::{debug, info, warn};

use crate::activity::{title_for_show, Activity};
use crate::config::DashboardConfig;
use crate::error::Result;
use crate::filters::{filter_and_sort_runs, Criterion};
use crate::projection::{bounds_for, project, GeometryCollection, Viewport};
use crate::reveal::{RevealTask, TaskId, Ticker};
use crate::sorting::sort_by_distance_desc;

// ============================================================================
// Output collaborator
// ============================================================================

/// What the map renderer draws.
#[derive(Debug, Clone, Copy)]
pub struct MapFrame<'a> {
    pub viewport: Option<Viewport>,
    pub geometry: &'a GeometryCollection,
    pub label: &'a str,
    /// Reveal task that wrote this frame; `None` for transitions
    pub producer: Option<TaskId>,
}

/// Rendering collaborators: the map, the run listing, the page scroller.
pub trait View {
    fn render_map(&mut self, frame: &MapFrame<'_>);

    /// The filtered set changed (or the selected row did).
    fn render_runs(&mut self, _runs: &[Activity], _selected_row: Option<usize>) {}

    /// Bring the map into view. Called on every transition.
    fn scroll_to_map(&mut self) {}
}

/// A view that draws nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullView;

impl View for NullView {
    fn render_map(&mut self, _frame: &MapFrame<'_>) {}
}

// ============================================================================
// State
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum SelectionState {
    Idle,
    Filtering(Criterion),
    Located { activity_id: String },
}

/// Result of delivering a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not the running task; nothing was written
    Stale,
    /// A longer prefix is displayed
    Advanced { shown: usize },
    /// The whole set is displayed and the task's timer is stopped
    Completed { shown: usize },
}

/// User (or collaborator) events, for hosts that queue them.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SelectYear(String),
    SelectCity(String),
    SelectTitle(String),
    LocateByDate(String),
    SelectRow(usize),
    LocateFeature(usize),
    MoveViewport(Viewport),
    ReplaceActivities {
        activities: Vec<Activity>,
        this_year: String,
    },
}

// ============================================================================
// Selection Controller
// ============================================================================

pub struct SelectionController<T: Ticker, V: View> {
    // Source data
    activities: Vec<Activity>,
    this_year: String,

    // Selection
    state: SelectionState,
    year: String,
    runs: Vec<Activity>,
    selected_row: Option<usize>,

    // Display
    label: String,
    geometry: GeometryCollection,
    viewport: Option<Viewport>,
    /// Viewport of the whole filtered set, applied once its reveal completes
    final_viewport: Option<Viewport>,

    // Reveal
    reveal: Option<RevealTask>,
    last_task: u64,

    config: DashboardConfig,
    ticker: T,
    view: V,
}

impl<T: Ticker, V: View> SelectionController<T, V> {
    /// Create an idle controller. Nothing is displayed until a transition runs.
    pub fn new(
        activities: Vec<Activity>,
        this_year: impl Into<String>,
        config: DashboardConfig,
        ticker: T,
        view: V,
    ) -> Result<Self> {
        config.validate()?;
        let this_year = this_year.into();
        info!(
            "[Selection] Initialized with {} activities, current year {}",
            activities.len(),
            this_year
        );

        Ok(Self {
            activities,
            year: this_year.clone(),
            this_year,
            state: SelectionState::Idle,
            runs: Vec::new(),
            selected_row: None,
            label: String::new(),
            geometry: GeometryCollection::default(),
            viewport: None,
            final_viewport: None,
            reveal: None,
            last_task: 0,
            config,
            ticker,
            view,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    /// The filtered set, most recent first.
    pub fn runs(&self) -> &[Activity] {
        &self.runs
    }

    /// Year selected last (the current year until one is picked).
    pub fn year(&self) -> &str {
        &self.year
    }

    pub fn this_year(&self) -> &str {
        &self.this_year
    }

    pub fn selected_row(&self) -> Option<usize> {
        self.selected_row
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Geometry currently displayed.
    pub fn geometry(&self) -> &GeometryCollection {
        &self.geometry
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    /// The reveal task currently animating, if any.
    pub fn active_task(&self) -> Option<TaskId> {
        self.reveal.as_ref().map(RevealTask::id)
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn ticker(&self) -> &T {
        &self.ticker
    }

    pub fn ticker_mut(&mut self) -> &mut T {
        &mut self.ticker
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Initial load: reveal the current year's runs. The label stays empty.
    pub fn start(&mut self) {
        self.year = self.this_year.clone();
        let criterion = Criterion::Year(self.this_year.clone());
        self.apply_filter(criterion, false, false);
    }

    pub fn select_year(&mut self, year: &str) {
        self.year = year.to_string();
        self.apply_filter(Criterion::Year(year.to_string()), true, true);
    }

    pub fn select_city(&mut self, city: &str) {
        self.apply_filter(Criterion::City(city.to_string()), true, false);
    }

    pub fn select_title(&mut self, title: &str) {
        self.apply_filter(Criterion::Title(title.to_string()), true, false);
    }

    /// Show the longest filtered run on `date` (`"YYYY-MM-DD"`).
    ///
    /// Returns `false` and changes nothing when no filtered run has that date.
    pub fn locate_by_date(&mut self, date: &str) -> bool {
        let same_day: Vec<Activity> = self
            .runs
            .iter()
            .filter(|r| r.date() == date)
            .cloned()
            .collect();
        let Some(run) = sort_by_distance_desc(&same_day).into_iter().next() else {
            debug!("[Selection] No run on {}", date);
            return false;
        };

        self.cancel_reveal();
        self.view.scroll_to_map();

        self.geometry = project(std::slice::from_ref(&run));
        if let Some(viewport) = bounds_for(&self.geometry, &self.config.viewport) {
            self.viewport = Some(viewport);
        }
        self.label = title_for_show(&run);
        info!("[Selection] Located run {} on {}", run.id, date);
        self.state = SelectionState::Located {
            activity_id: run.id,
        };

        self.publish(None);
        true
    }

    /// The renderer's view moved (user pan or zoom).
    ///
    /// Only recorded: the reveal, the label and the selection are untouched,
    /// and no frame is published back.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        debug!("[Selection] Viewport moved to zoom {:.2}", viewport.zoom);
        self.viewport = Some(viewport);
    }

    /// A row of the run listing was selected.
    ///
    /// Out-of-range indices are ignored.
    pub fn select_row(&mut self, index: usize) -> bool {
        let Some(date) = self.runs.get(index).map(|r| r.date().to_string()) else {
            debug!("[Selection] Row {} out of range", index);
            return false;
        };

        self.selected_row = Some(index);
        let located = self.locate_by_date(&date);
        self.view.render_runs(&self.runs, self.selected_row);
        located
    }

    /// A displayed feature was clicked.
    pub fn locate_feature(&mut self, index: usize) -> bool {
        match self.geometry.date_of(index).map(str::to_string) {
            Some(date) => self.locate_by_date(&date),
            None => false,
        }
    }

    /// The source collection changed: filter it again and restart the reveal.
    ///
    /// An idle controller filters by the new current year; a located run
    /// falls back to the selected year.
    pub fn replace_activities(&mut self, activities: Vec<Activity>, this_year: impl Into<String>) {
        self.activities = activities;
        self.this_year = this_year.into();

        let criterion = match &self.state {
            SelectionState::Filtering(criterion) => criterion.clone(),
            SelectionState::Idle => {
                self.year = self.this_year.clone();
                Criterion::Year(self.year.clone())
            }
            SelectionState::Located { .. } => Criterion::Year(self.year.clone()),
        };
        self.apply_filter(criterion, false, false);
    }

    /// Dispatch a queued event. Returns whether it changed the selection.
    pub fn apply(&mut self, command: Command) -> bool {
        match command {
            Command::SelectYear(year) => self.select_year(&year),
            Command::SelectCity(city) => self.select_city(&city),
            Command::SelectTitle(title) => self.select_title(&title),
            Command::LocateByDate(date) => return self.locate_by_date(&date),
            Command::SelectRow(index) => return self.select_row(index),
            Command::LocateFeature(index) => return self.locate_feature(index),
            Command::MoveViewport(viewport) => {
                self.set_viewport(viewport);
                return false;
            }
            Command::ReplaceActivities {
                activities,
                this_year,
            } => self.replace_activities(activities, this_year),
        }
        true
    }

    /// Deliver a reveal tick for `task`.
    pub fn tick(&mut self, task: TaskId) -> TickOutcome {
        let Some(reveal) = self.reveal.as_mut().filter(|r| r.id() == task) else {
            warn!("[Reveal] Ignoring tick for stale task {}", task);
            return TickOutcome::Stale;
        };
        let Some(step) = reveal.advance() else {
            return TickOutcome::Stale;
        };

        self.geometry = project(&self.runs[..step.shown]);

        if step.done {
            self.reveal = None;
            self.ticker.stop(task);
            if let Some(viewport) = self.final_viewport {
                self.viewport = Some(viewport);
            }
            debug!("[Reveal] Task {} completed with {} runs", task, step.shown);
        }

        self.publish(Some(task));

        if step.done {
            TickOutcome::Completed { shown: step.shown }
        } else {
            TickOutcome::Advanced { shown: step.shown }
        }
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn apply_filter(&mut self, criterion: Criterion, relabel: bool, reset_if_zoomed: bool) {
        self.cancel_reveal();
        self.view.scroll_to_map();

        let runs = filter_and_sort_runs(&self.activities, &criterion);
        let final_viewport = bounds_for(&project(&runs), &self.config.viewport);

        if reset_if_zoomed && self.is_zoomed_in() {
            if let Some(viewport) = final_viewport {
                debug!("[Selection] Resetting zoomed-in viewport");
                self.viewport = Some(viewport);
            }
        }

        info!("[Selection] {} -> {} runs", criterion, runs.len());
        if relabel {
            self.label = criterion.label();
        }
        self.runs = runs;
        self.selected_row = None;
        self.final_viewport = final_viewport;
        self.state = SelectionState::Filtering(criterion);

        self.view.render_runs(&self.runs, self.selected_row);
        self.publish(None);
        self.start_reveal();
    }

    fn is_zoomed_in(&self) -> bool {
        self.viewport.map_or(0.0, |v| v.zoom) > self.config.viewport.zoom_reset_threshold
    }

    fn start_reveal(&mut self) {
        self.last_task += 1;
        let task = RevealTask::new(
            TaskId(self.last_task),
            self.runs.len(),
            self.config.reveal.steps,
        );
        debug!(
            "[Reveal] Task {} started: {} runs, {} per tick",
            task.id(),
            task.total(),
            task.step()
        );
        self.ticker.start(task.id(), self.config.reveal.interval());
        self.reveal = Some(task);
    }

    fn cancel_reveal(&mut self) {
        if let Some(mut task) = self.reveal.take() {
            task.cancel();
            self.ticker.stop(task.id());
            debug!("[Reveal] Task {} cancelled", task.id());
        }
    }

    fn publish(&mut self, producer: Option<TaskId>) {
        let frame = MapFrame {
            viewport: self.viewport,
            geometry: &self.geometry,
            label: &self.label,
            producer,
        };
        self.view.render_map(&frame);
    }
}

// ============================================================================
// Tests
// ============================================================================
