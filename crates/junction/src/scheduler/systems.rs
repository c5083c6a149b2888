use bevy::prelude::*;

use crate::actuator::ActuatorSlot;
use crate::config::ControllerConfig;
use crate::feed::{FeedError, FeedSession, FeedStatus};
use crate::lane::LaneRegistry;
use crate::rng::CycleRng;
use crate::stats::{CycleHistory, StopReason};

use super::{CycleReport, CycleScheduler};

/// Ordered phases for the junction systems in `Update`.
///
/// Configured as a chain: `Cycle` → `Report`.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum JunctionSet {
    /// Advance the feed and run one scheduler cycle.
    Cycle,
    /// Log what the cycle decided.
    Report,
}

/// Sent once per completed cycle.
#[derive(Event, Debug, Clone)]
pub struct CycleCompleted(pub CycleReport);

/// One frame = one cycle. Requests `AppExit` when the configured cycle count
/// is reached, the feed is finished, or the feed connection is lost.
#[allow(clippy::too_many_arguments)]
pub fn run_signal_cycle(
    config: Res<ControllerConfig>,
    mut scheduler: ResMut<CycleScheduler>,
    mut lanes: ResMut<LaneRegistry>,
    mut session: ResMut<FeedSession>,
    mut actuator: ResMut<ActuatorSlot>,
    mut rng: ResMut<CycleRng>,
    mut history: ResMut<CycleHistory>,
    mut completed: EventWriter<CycleCompleted>,
    mut exit: EventWriter<AppExit>,
) {
    if history.stop_reason().is_some() {
        return;
    }

    match session.advance(config.steps_per_cycle) {
        Ok(FeedStatus::Running) => {}
        Ok(FeedStatus::Finished) => {
            info!("Feed {} has no more vehicles, stopping", session.name());
            history.stop(StopReason::FeedExhausted);
            exit.send(AppExit::Success);
            return;
        }
        Err(FeedError::Disconnected(msg)) => {
            error!("Lost feed connection: {msg}");
            history.stop(StopReason::ConnectionLost(msg));
            exit.send(AppExit::error());
            return;
        }
        Err(e) => warn!("Feed {} did not advance: {e}", session.name()),
    }

    let result = scheduler.run_cycle(
        &mut lanes,
        session.feed(),
        actuator.0.as_mut(),
        &mut rng.0,
    );
    match result {
        Ok(report) => {
            history.record(&report);
            completed.send(CycleCompleted(report));
        }
        Err(e) => {
            error!("Cycle failed: {e}");
            history.stop(StopReason::Aborted(e.to_string()));
            exit.send(AppExit::error());
            return;
        }
    }

    if let Some(limit) = config.cycles {
        if scheduler.cycle_count() >= limit {
            info!("Completed {limit} cycle(s)");
            history.stop(StopReason::CyclesCompleted);
            exit.send(AppExit::Success);
        }
    }
}

/// Status lines for every cycle completed this frame.
pub fn report_cycle(mut completed: EventReader<CycleCompleted>, config: Res<ControllerConfig>) {
    for CycleCompleted(report) in completed.read() {
        info!(
            "Cycle #{} ({}): green -> {} (score {:.2})",
            report.cycle, config.tls_id, report.green_name, report.green_score
        );
        for lane in &report.ranking {
            let light = if lane.id == report.green { "GREEN" } else { "red  " };
            let emergency = if lane.has_emergency { " [emergency]" } else { "" };
            let bus = if lane.has_bus { " [bus]" } else { "" };
            info!(
                "  {light} {} ({}){emergency}{bus}: vehicles {:3} | wait {:5.1}s | congestion {}/10 | score {:.2}",
                lane.name,
                lane.edge,
                lane.num_vehicles,
                lane.wait_time,
                lane.congestion_level,
                lane.score
            );
        }
        match &report.signal {
            Ok(command) => debug!("Signal: {command}"),
            Err(e) => warn!("Green for {} was not applied: {e}", report.green_name),
        }
        if !report.fallbacks.is_empty() {
            debug!(
                "{} of {} lane(s) used synthetic readings",
                report.fallbacks.len(),
                report.ranking.len()
            );
        }
    }
}
