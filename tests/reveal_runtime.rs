//! Event loop integration tests on a paused tokio clock.
//!
//! Run with: `cargo test --features runtime --test reveal_runtime`

use std::time::Duration;

use run_heatmap::{
    run, Activity, Command, DashboardConfig, GpsPoint, IntervalTicker, MapFrame,
    SelectionController, TaskId, View,
};
use tokio::sync::mpsc;
use tokio::time::{self, Instant};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Debug, Default)]
struct TimedView {
    /// (elapsed, producer, feature count)
    frames: Vec<(Duration, Option<TaskId>, usize)>,
    started: Option<Instant>,
}

impl View for TimedView {
    fn render_map(&mut self, frame: &MapFrame<'_>) {
        let started = *self.started.get_or_insert_with(Instant::now);
        self.frames
            .push((started.elapsed(), frame.producer, frame.geometry.len()));
    }
}

/// 47 runs in 2023, 5 in 2022.
fn activities() -> Vec<Activity> {
    let track = |lat: f64| vec![GpsPoint::new(lat, 12.45), GpsPoint::new(lat + 0.01, 12.46)];
    let mut runs: Vec<Activity> = (0..47)
        .map(|i| {
            Activity::new(
                format!("a{}", i),
                format!("2023-{:02}-{:02} 07:00:00", i % 12 + 1, i % 28 + 1),
                5000.0,
            )
            .with_track(track(41.8 + i as f64 * 0.001))
        })
        .collect();
    runs.extend((0..5).map(|i| {
        Activity::new(format!("b{}", i), format!("2022-03-{:02} 07:00:00", i + 1), 5000.0)
            .with_track(track(41.9))
    }));
    runs
}

fn controller() -> SelectionController<IntervalTicker, TimedView> {
    SelectionController::new(
        activities(),
        "2023",
        DashboardConfig::default(),
        IntervalTicker::default(),
        TimedView::default(),
    )
    .expect("default config is valid")
}

#[tokio::test(start_paused = true)]
async fn test_reveal_runs_at_configured_cadence() {
    init_logging();
    let (tx, rx) = mpsc::channel(4);
    drop(tx);

    let controller = run(controller(), rx).await;

    assert_eq!(controller.geometry().len(), 47);
    let ticks: Vec<_> = controller
        .view()
        .frames
        .iter()
        .filter(|(_, producer, _)| producer.is_some())
        .collect();
    assert_eq!(ticks.len(), 16);
    // First tick one period after start, then every period
    for (i, (elapsed, _, _)) in ticks.iter().enumerate() {
        assert_eq!(*elapsed, Duration::from_millis(100 * (i as u64 + 1)));
    }
}

#[tokio::test(start_paused = true)]
async fn test_selection_mid_animation_cancels_old_reveal() {
    init_logging();
    let (tx, rx) = mpsc::channel(4);

    let sender = tokio::spawn(async move {
        time::sleep(Duration::from_millis(350)).await;
        tx.send(Command::SelectYear("2022".to_string()))
            .await
            .expect("event loop is running");
    });

    let controller = run(controller(), rx).await;
    sender.await.expect("sender finished");

    assert_eq!(controller.geometry().len(), 5);

    let produced: Vec<(TaskId, usize)> = controller
        .view()
        .frames
        .iter()
        .filter_map(|(_, producer, count)| producer.map(|p| (p, *count)))
        .collect();

    let first = produced[0].0;
    let old: Vec<usize> = produced
        .iter()
        .filter(|(p, _)| *p == first)
        .map(|(_, c)| *c)
        .collect();
    // Three ticks fired before the selection at 350ms
    assert_eq!(old, vec![3, 6, 9]);

    // Once the new task writes, the old one never does again
    let switch = produced
        .iter()
        .position(|(p, _)| *p != first)
        .expect("second task produced frames");
    assert!(produced[switch..].iter().all(|(p, _)| *p != first));
    assert!(produced[switch..].windows(2).all(|w| w[0].1 <= w[1].1));
    assert_eq!(produced.last().map(|(_, c)| *c), Some(5));
}
