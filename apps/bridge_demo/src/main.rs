use std::{
    path::PathBuf,
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

mod config;
mod scene;

use anyhow::{Context, Result};
use clap::Parser;
use parking_lot::Mutex;
use serde::Serialize;
use shared::domain::{PropertyChange, SpotId, TimepointIndex, ViewerTransform};
use sync_core::{Notifier, NotifierOptions, StatsSnapshot, UpdateHandlers};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use viewer_integration::{InMemoryModel, InMemoryViewer, ViewerWindow};

use crate::{config::load_settings, scene::SceneMirror};

/// Replays bursts of viewer and model events through the notifier and
/// reports how many handler runs they collapsed into.
#[derive(Parser, Debug)]
struct Args {
    #[arg(long, default_value = "bridge.toml")]
    config: PathBuf,
    #[arg(long)]
    quiescence_ms: Option<u64>,
    #[arg(long, default_value_t = 3)]
    bursts: u32,
    #[arg(long, default_value_t = 20)]
    events_per_burst: u32,
    #[arg(long, default_value_t = 1)]
    event_gap_ms: u64,
    #[arg(long, default_value_t = 100)]
    pause_ms: u64,
    #[arg(long)]
    route_vertex_moves: bool,
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct Report {
    events: u64,
    elapsed_ms: u128,
    stats: StatsSnapshot,
    scene: SceneMirror,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = load_settings(&args.config)?;
    if let Some(quiescence_ms) = args.quiescence_ms {
        settings.quiescence_ms = quiescence_ms;
    }
    if args.route_vertex_moves {
        settings.route_vertex_moves = true;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(settings.log_filter.clone())),
        )
        .init();
    info!(?settings, "bridge demo starting");

    let viewer = Arc::new(InMemoryViewer::new());
    let model = Arc::new(InMemoryModel::new());
    let scene = Arc::new(Mutex::new(SceneMirror::default()));

    for _ in 0..4 {
        model.add_spot();
    }

    let handlers = scene_handlers(&scene, &viewer, &model, settings.route_vertex_moves);
    let notifier = Notifier::with_options(
        handlers,
        model.clone(),
        viewer.clone(),
        NotifierOptions {
            quiescence: settings.quiescence(),
            ..NotifierOptions::default()
        },
    )
    .context("failed to attach notifier")?;

    let started = Instant::now();
    let producer = {
        let viewer = Arc::clone(&viewer);
        let model = Arc::clone(&model);
        let gap = Duration::from_millis(args.event_gap_ms);
        let pause = Duration::from_millis(args.pause_ms);
        let (bursts, per_burst) = (args.bursts, args.events_per_burst);
        thread::Builder::new()
            .name("bridge-producer".into())
            .spawn(move || replay(&viewer, &model, bursts, per_burst, gap, pause))
            .context("failed to spawn producer thread")?
    };
    let events = producer
        .join()
        .map_err(|_| anyhow::anyhow!("producer thread panicked"))?;

    thread::sleep(settings.quiescence() * 4);
    viewer.close_window();
    debug!(closed = notifier.is_closed(), "viewer window closed");

    let report = Report {
        events,
        elapsed_ms: started.elapsed().as_millis(),
        stats: notifier.stats(),
        scene: scene.lock().clone(),
    };
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "{} events in {} ms -> {} content, {} view, {} vertex dispatches ({} failed)",
            report.events,
            report.elapsed_ms,
            report.stats.content_dispatches,
            report.stats.view_dispatches,
            report.stats.vertex_dispatches,
            report.stats.handler_failures,
        );
        println!(
            "scene: timepoint {:?}, {} spots, {} rebuilds, {} camera moves",
            report.scene.timepoint,
            report.scene.spot_count,
            report.scene.rebuilds,
            report.scene.camera_moves,
        );
    }
    Ok(())
}

fn scene_handlers(
    scene: &Arc<Mutex<SceneMirror>>,
    viewer: &Arc<InMemoryViewer>,
    model: &Arc<InMemoryModel>,
    route_vertex_moves: bool,
) -> UpdateHandlers {
    let content = {
        let scene = Arc::clone(scene);
        let viewer = Arc::clone(viewer);
        let model = Arc::clone(model);
        move || {
            let timepoint = viewer.current_timepoint();
            scene
                .lock()
                .rebuild(timepoint, model.spot_count(), model.focused());
            debug!(timepoint = timepoint.0, "scene rebuilt");
            Ok(())
        }
    };
    let view = {
        let scene = Arc::clone(scene);
        let viewer = Arc::clone(viewer);
        move || {
            scene.lock().move_camera(viewer.viewer_transform());
            Ok(())
        }
    };
    let handlers = UpdateHandlers::new(content, view);
    if !route_vertex_moves {
        return handlers;
    }

    let scene = Arc::clone(scene);
    handlers.with_vertex_handler(move |spot: Option<SpotId>| {
        if !scene.lock().reposition(spot) {
            anyhow::bail!("vertex move dispatched without a spot");
        }
        Ok(())
    })
}

/// Each burst mixes timepoint scrubbing, camera drags, recoloring and spot
/// moves, then pauses long enough for the notifier to settle.
fn replay(
    viewer: &InMemoryViewer,
    model: &InMemoryModel,
    bursts: u32,
    per_burst: u32,
    gap: Duration,
    pause: Duration,
) -> u64 {
    let mut events = 0u64;
    let mut timepoint = 0i64;
    for burst in 0..bursts {
        for step in 0..per_burst {
            match step % 4 {
                0 => {
                    timepoint += 1;
                    viewer.set_timepoint(TimepointIndex(timepoint));
                }
                1 => viewer.set_transform(ViewerTransform::translation(
                    f64::from(burst),
                    f64::from(step),
                    0.0,
                )),
                2 => model.move_spot(SpotId(i64::from(step % 3))),
                _ if step % 8 == 3 => viewer.change_coloring(),
                _ => viewer.set_property(PropertyChange::new("display_mode")),
            }
            events += 1;
            thread::sleep(gap);
        }
        debug!(burst, events, "burst replayed");
        thread::sleep(pause);
    }
    events
}
