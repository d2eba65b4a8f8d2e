//! # Incremental Reveal
//!
//! A filtered set is not drawn all at once: it is revealed over roughly
//! `steps` ticks, each tick drawing a longer prefix of the set.
//!
//! The pieces:
//! - [`RevealTask`]: the counter for one filtered set (start / advance /
//!   cancel / is-active). Pure state, no clock.
//! - [`Ticker`]: the timer collaborator that fires ticks for a task id at a
//!   fixed cadence. The controller owns one ticker and always stops the old
//!   task's timer before starting the next, so two tasks never write to the
//!   display concurrently.
//! - [`ManualTicker`]: a ticker driven by hand, for synchronous hosts and tests.
//!
//! ## Example
//!
//! ```rust
//! use run_heatmap::{RevealTask, TaskId};
//!
//! let mut task = RevealTask::new(TaskId(1), 47, 20);
//! assert_eq!(task.step(), 3);
//!
//! let mut shown = Vec::new();
//! while let Some(step) = task.advance() {
//!     shown.push(step.shown);
//! }
//! assert_eq!(shown.first(), Some(&3));
//! assert_eq!(shown.last(), Some(&47));
//! assert!(!task.is_active());
//! ```

use std::fmt;
use std::time::Duration;

/// Identifier of one reveal task. Increases with every task a controller starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Number of activities added per tick: `max(1, ceil(total / steps))`.
pub fn step_size(total: usize, steps: u32) -> usize {
    let steps = steps.max(1) as usize;
    total.div_ceil(steps).max(1)
}

/// Result of one [`RevealTask::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealStep {
    /// Length of the prefix to display
    pub shown: usize,
    /// The whole set is now displayed; no further ticks are needed
    pub done: bool,
}

/// Progress of revealing one filtered set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealTask {
    id: TaskId,
    total: usize,
    step: usize,
    cursor: usize,
    active: bool,
}

impl RevealTask {
    /// Start revealing `total` activities over about `steps` ticks.
    pub fn new(id: TaskId, total: usize, steps: u32) -> Self {
        let step = step_size(total, steps);
        Self {
            id,
            total,
            step,
            cursor: step,
            active: true,
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Stop the task. Later calls to [`advance`](Self::advance) return `None`.
    pub fn cancel(&mut self) {
        self.active = false;
    }

    /// Advance by one tick.
    ///
    /// Shows `min(cursor, total)` activities; the task completes on the tick
    /// where the cursor reaches `total`. An empty set completes on its first
    /// tick with nothing shown.
    pub fn advance(&mut self) -> Option<RevealStep> {
        if !self.active {
            return None;
        }

        let shown = self.cursor.min(self.total);
        let done = self.cursor >= self.total;
        if done {
            self.active = false;
        } else {
            self.cursor += self.step;
        }

        Some(RevealStep { shown, done })
    }
}

// ============================================================================
// Timer collaborator
// ============================================================================

/// Repeating timer that fires reveal ticks.
///
/// The host delivers each tick back with
/// [`SelectionController::tick`](crate::SelectionController::tick).
pub trait Ticker {
    /// Start firing ticks for `task` every `period`.
    fn start(&mut self, task: TaskId, period: Duration);

    /// Stop firing ticks for `task`. Stopping an unknown task is a no-op.
    fn stop(&mut self, task: TaskId);
}

/// What a [`ManualTicker`] was asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickerEvent {
    Started(TaskId),
    Stopped(TaskId),
}

/// A ticker with no clock: the host asks which task is running and fires it.
///
/// Starting a second timer while one is still running panics. That is the
/// two-producers bug the controller must never cause, and tests should fail
/// loudly if it does.
#[derive(Debug, Clone, Default)]
pub struct ManualTicker {
    running: Option<(TaskId, Duration)>,
    events: Vec<TickerEvent>,
}

impl ManualTicker {
    /// Task whose timer is running, if any.
    pub fn running(&self) -> Option<TaskId> {
        self.running.map(|(task, _)| task)
    }

    /// Period of the running timer.
    pub fn period(&self) -> Option<Duration> {
        self.running.map(|(_, period)| period)
    }

    pub fn is_idle(&self) -> bool {
        self.running.is_none()
    }

    /// Every start and stop, in order.
    pub fn events(&self) -> &[TickerEvent] {
        &self.events
    }
}

impl Ticker for ManualTicker {
    fn start(&mut self, task: TaskId, period: Duration) {
        if let Some((running, _)) = self.running {
            panic!(
                "reveal task {} started while task {} is still ticking",
                task, running
            );
        }
        self.running = Some((task, period));
        self.events.push(TickerEvent::Started(task));
    }

    fn stop(&mut self, task: TaskId) {
        if self.running() == Some(task) {
            self.running = None;
            self.events.push(TickerEvent::Stopped(task));
        }
    }
}
