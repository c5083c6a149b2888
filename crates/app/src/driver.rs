//! Headless run loop: a blocking loop that calls `app.update()` once per
//! cycle, sleeping the configured delay in between.
//!
//! The app stops when the junction systems request `AppExit` (cycle limit,
//! exhausted feed, lost connection) or when Ctrl-C is pressed. Either way the
//! final statistics are logged and the feed session is closed before the
//! process exits.

use std::process::ExitCode;
use std::time::Duration;

use bevy::app::TerminalCtrlCHandlerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;

use junction::config::ControllerConfig;
use junction::feed::{FeedSession, MeasurementTrace, OfflineFeed, TraceFeed};
use junction::lane::LaneRegistry;
use junction::stats::{CycleHistory, FinalStatistics, StopReason};
use junction::JunctionPlugin;

pub fn run(config: ControllerConfig) -> ExitCode {
    let lanes = match LaneRegistry::from_specs(&config.lanes) {
        Ok(lanes) => lanes,
        Err(e) => {
            eprintln!("Config error: {e}");
            return ExitCode::FAILURE;
        }
    };

    // -- Build a minimal Bevy App: no window, no renderer --------------------
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(LogPlugin::default());
    app.add_plugins(TerminalCtrlCHandlerPlugin);

    // -- Acquire the feed before the plugin so it is not replaced ------------
    let session = match &config.trace {
        Some(path) => match MeasurementTrace::load(path) {
            Ok(trace) => {
                info!(
                    "Replaying {} frame(s) from {} ({}s per step)",
                    trace.frames.len(),
                    path.display(),
                    trace.header.step_length_secs
                );
                FeedSession::new(Box::new(TraceFeed::new(trace)))
            }
            Err(e) => {
                error!("Cannot load trace {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => {
            warn!("No measurement trace configured, running offline on synthetic readings");
            FeedSession::new(Box::new(OfflineFeed::default()))
        }
    };

    let delay = Duration::try_from_secs_f64(config.cycle_delay_secs).unwrap_or_default();
    match config.cycles {
        Some(n) => info!("Controlling '{}' for {n} cycle(s)", config.tls_id),
        None => info!("Controlling '{}' until the feed is exhausted", config.tls_id),
    }

    app.insert_resource(lanes);
    app.insert_resource(session);
    app.insert_resource(config);
    app.add_plugins(JunctionPlugin);

    // -- Cycle loop ------------------------------------------------------------
    let exit = loop {
        app.update();
        if let Some(exit) = app.should_exit() {
            break exit;
        }
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    };

    // -- Shutdown ----------------------------------------------------------------
    let world = app.world_mut();
    let stats = FinalStatistics::compute(
        world.resource::<LaneRegistry>(),
        world.resource::<CycleHistory>(),
        StopReason::Interrupted,
    );
    info!("Final statistics:");
    for line in stats.to_string().lines() {
        info!("  {line}");
    }
    if let Some(mut session) = world.get_resource_mut::<FeedSession>() {
        session.close();
    }

    match exit {
        AppExit::Success => ExitCode::SUCCESS,
        AppExit::Error(code) => ExitCode::from(code.get()),
    }
}
