//! tokio event loop for the selection controller.
//!
//! [`IntervalTicker`] backs reveal ticks with a `tokio::time::Interval`, and
//! [`run`] multiplexes queued [`Command`]s with those ticks on one task, so
//! transitions and ticks are never processed concurrently.
//!
//! ```rust,ignore
//! let (tx, rx) = tokio::sync::mpsc::channel(16);
//! let controller = SelectionController::new(
//!     activities, "2023", DashboardConfig::default(), IntervalTicker::default(), view,
//! )?;
//! let handle = tokio::spawn(run(controller, rx));
//! tx.send(Command::SelectCity("Rome".into())).await?;
//! ```

use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::mpsc;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

use crate::controller::{Command, SelectionController, SelectionState, View};
use crate::reveal::{TaskId, Ticker};

/// Ticker backed by a tokio interval. The first tick fires one period after
/// `start`.
///
/// `start` must be called from within a tokio runtime.
#[derive(Debug, Default)]
pub struct IntervalTicker {
    current: Option<(TaskId, Interval)>,
}

impl IntervalTicker {
    pub fn running(&self) -> Option<TaskId> {
        self.current.as_ref().map(|(task, _)| *task)
    }

    pub fn is_idle(&self) -> bool {
        self.current.is_none()
    }

    /// Wait for the running task's next tick. Pending forever while idle.
    pub async fn next_tick(&mut self) -> TaskId {
        match self.current.as_mut() {
            Some((task, interval)) => {
                interval.tick().await;
                *task
            }
            None => std::future::pending().await,
        }
    }
}

impl Ticker for IntervalTicker {
    fn start(&mut self, task: TaskId, period: Duration) {
        if let Some(running) = self.running() {
            warn!("[Ticker] Task {} replaces running task {}", task, running);
        }
        let mut interval = time::interval_at(Instant::now() + period, period);
        // A late tick pushes the following ones back instead of bursting
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.current = Some((task, interval));
    }

    fn stop(&mut self, task: TaskId) {
        if self.running() == Some(task) {
            self.current = None;
        }
    }
}

/// Drive `controller` until `commands` is closed and the last reveal has
/// completed, then hand it back.
///
/// An idle controller is started first.
pub async fn run<V: View>(
    mut controller: SelectionController<IntervalTicker, V>,
    mut commands: mpsc::Receiver<Command>,
) -> SelectionController<IntervalTicker, V> {
    if controller.state() == &SelectionState::Idle {
        controller.start();
    }
    info!("[Driver] Event loop started");

    let mut open = true;
    loop {
        if !open && controller.ticker().is_idle() {
            break;
        }

        tokio::select! {
            command = commands.recv(), if open => match command {
                Some(command) => {
                    debug!("[Driver] Command {:?}", command);
                    controller.apply(command);
                }
                None => {
                    debug!("[Driver] Command channel closed");
                    open = false;
                }
            },
            task = controller.ticker_mut().next_tick() => {
                controller.tick(task);
            }
        }
    }

    info!("[Driver] Event loop finished");
    controller
}
