use std::{
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use crossbeam_channel::unbounded;
use shared::domain::{TimepointIndex, ViewerTransform};
use sync_core::{DispatcherState, Notifier, NotifierOptions, UpdateHandlers, UpdateKind};
use viewer_integration::{InMemoryModel, InMemoryViewer, ViewerWindow};

const QUIESCENCE: Duration = Duration::from_millis(30);

#[test]
fn timepoint_scrubbing_then_pause_then_one_more_step_dispatches_twice() {
    let viewer = Arc::new(InMemoryViewer::new());
    let model = Arc::new(InMemoryModel::new());
    let (tx, rx) = unbounded();

    let content_tx = tx.clone();
    let content_viewer = Arc::clone(&viewer);
    let handlers = UpdateHandlers::new(
        move || {
            let timepoint = content_viewer.current_timepoint();
            let _ = content_tx.send((UpdateKind::Content, timepoint, Instant::now()));
            Ok(())
        },
        move || {
            let _ = tx.send((UpdateKind::View, TimepointIndex(-1), Instant::now()));
            Ok(())
        },
    );
    let notifier = Notifier::with_options(
        handlers,
        model.clone(),
        viewer.clone(),
        NotifierOptions {
            quiescence: QUIESCENCE,
            thread_name: "acceptance-dispatcher".to_string(),
        },
    )
    .expect("notifier");

    viewer.set_timepoint(TimepointIndex(1));
    thread::sleep(Duration::from_millis(3));
    viewer.set_timepoint(TimepointIndex(2));
    thread::sleep(Duration::from_millis(3));
    let before_last_event = Instant::now();
    viewer.set_timepoint(TimepointIndex(3));

    let (kind, timepoint, dispatched_at) = rx
        .recv_timeout(Duration::from_secs(1))
        .expect("first dispatch");
    assert_eq!(kind, UpdateKind::Content);
    assert_eq!(timepoint, TimepointIndex(3), "handler sees the final state");
    assert!(dispatched_at.duration_since(before_last_event) > QUIESCENCE);
    assert!(!notifier.watcher().is_content_dirty());

    viewer.set_timepoint(TimepointIndex(4));
    let (kind, timepoint, _) = rx
        .recv_timeout(Duration::from_secs(1))
        .expect("second dispatch");
    assert_eq!(kind, UpdateKind::Content);
    assert_eq!(timepoint, TimepointIndex(4));

    assert!(rx.recv_timeout(QUIESCENCE * 4).is_err());
    assert_eq!(notifier.stats().content_dispatches, 2);
}

#[test]
fn rapid_camera_drag_collapses_and_close_stops_the_worker() {
    let viewer = Arc::new(InMemoryViewer::new());
    let model = Arc::new(InMemoryModel::new());
    let (tx, rx) = unbounded();
    let view_tx = tx.clone();
    let handlers = UpdateHandlers::new(
        move || {
            let _ = tx.send(UpdateKind::Content);
            Ok(())
        },
        move || {
            let _ = view_tx.send(UpdateKind::View);
            Ok(())
        },
    );
    let notifier = Notifier::with_options(
        handlers,
        model.clone(),
        viewer.clone(),
        NotifierOptions {
            quiescence: QUIESCENCE,
            ..NotifierOptions::default()
        },
    )
    .expect("notifier");

    let producer = {
        let viewer = Arc::clone(&viewer);
        thread::spawn(move || {
            for step in 0..50 {
                viewer.set_transform(ViewerTransform::translation(f64::from(step), 0.0, 0.0));
            }
        })
    };
    producer.join().expect("producer");

    assert_eq!(
        rx.recv_timeout(Duration::from_secs(1)),
        Ok(UpdateKind::View)
    );
    assert!(rx.recv_timeout(QUIESCENCE * 4).is_err());

    viewer.close_window();
    assert!(notifier.is_closed());
    assert_eq!(notifier.dispatcher_state(), DispatcherState::Stopped);

    notifier.watcher().on_view_event();
    assert!(rx.recv_timeout(QUIESCENCE * 4).is_err());
}
