//! One decision cycle: measure every lane, rebuild the priority tree, grant
//! green to the maximum and reset the winner.
//!
//! The scheduler owns the tree and the cycle counter; lanes belong to the
//! [`LaneRegistry`]. A cycle runs to completion once started: a failed
//! measurement is replaced by a synthetic reading for that lane only, and a
//! rejected signal is reported without undoing the selection or the reset.

pub mod systems;
pub mod types;

use bevy::prelude::*;
use rand::Rng;

use crate::actuator::{LaneIdentity, SignalActuator};
use crate::config::ControllerConfig;
use crate::feed::TrafficFeed;
use crate::lane::{perturbed_reading, LaneId, LaneReading, LaneRegistry, PerturbationConfig};
use crate::measurement::VehicleMarkers;
use crate::priority_tree::PriorityTree;

pub use systems::{report_cycle, run_signal_cycle, CycleCompleted, JunctionSet};
pub use types::{CycleError, CyclePhase, CycleReport, MeasurementFallback, RankedLane};

#[derive(Resource, Debug, Clone, Default)]
pub struct CycleScheduler {
    tree: PriorityTree<LaneId>,
    phase: CyclePhase,
    cycle_count: u64,
    current_green: Option<LaneId>,
    markers: VehicleMarkers,
    perturbation: PerturbationConfig,
}

impl CycleScheduler {
    pub fn new(markers: VehicleMarkers, perturbation: PerturbationConfig) -> Self {
        Self {
            markers,
            perturbation,
            ..Default::default()
        }
    }

    pub fn from_config(config: &ControllerConfig) -> Self {
        Self::new(config.markers.clone(), config.perturbation.clone())
    }

    pub fn phase(&self) -> CyclePhase {
        self.phase
    }

    /// Number of completed cycles.
    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    pub fn current_green(&self) -> Option<LaneId> {
        self.current_green
    }

    pub fn tree(&self) -> &PriorityTree<LaneId> {
        &self.tree
    }

    /// Clear the tree and insert every lane under its stored score, in
    /// registry order.
    pub fn rebuild(&mut self, lanes: &LaneRegistry) {
        self.tree.clear();
        for lane in lanes.iter() {
            self.tree.insert(lane.priority_score(), lane.id);
        }
    }

    /// The lane the current tree would grant green to.
    pub fn select(&self) -> Option<LaneId> {
        self.tree.find_maximum().copied()
    }

    pub fn run_cycle<R: Rng + ?Sized>(
        &mut self,
        lanes: &mut LaneRegistry,
        feed: &dyn TrafficFeed,
        actuator: &mut dyn SignalActuator,
        rng: &mut R,
    ) -> Result<CycleReport, CycleError> {
        if lanes.is_empty() {
            return Err(CycleError::EmptyLaneSet);
        }

        // -- Measuring: read every lane first, then apply --------------------
        self.phase = CyclePhase::Measuring;
        let mut fallbacks = Vec::new();
        let readings: Vec<(LaneId, LaneReading)> = lanes
            .iter()
            .map(|lane| {
                let reading = match feed.measure(&lane.edge) {
                    Ok(m) => m.to_reading(&self.markers),
                    Err(error) => {
                        warn!(
                            "Lane {} ({}): {error}, using synthetic reading",
                            lane.name, lane.edge
                        );
                        fallbacks.push(MeasurementFallback {
                            lane: lane.id,
                            error,
                        });
                        perturbed_reading(lane, &self.perturbation, rng)
                    }
                };
                (lane.id, reading)
            })
            .collect();
        for (id, reading) in readings {
            lanes.refresh(id, reading);
        }

        // -- Ranking ---------------------------------------------------------
        self.phase = CyclePhase::Ranking;
        self.rebuild(lanes);

        // -- Selecting -------------------------------------------------------
        self.phase = CyclePhase::Selecting;
        let green = self.select().ok_or(CycleError::EmptyLaneSet)?;
        let winner = lanes.get(green).ok_or(CycleError::UnknownLane(green))?;
        let ranking: Vec<RankedLane> = self
            .tree
            .iter_desc()
            .filter_map(|(score, id)| lanes.get(*id).map(|l| RankedLane::snapshot(l, score)))
            .collect();
        let green_name = winner.name.clone();
        let green_score = winner.priority_score();
        let served_bus = winner.has_bus;
        let served_emergency = winner.has_emergency;

        // -- Applying --------------------------------------------------------
        self.phase = CyclePhase::Applying;
        self.current_green = Some(green);
        // Rejections travel in the report; `report_cycle` logs them.
        let signal = actuator.apply_green(LaneIdentity::from(winner));
        lanes.reset_after_green(green);

        // -- CycleComplete ---------------------------------------------------
        self.phase = CyclePhase::CycleComplete;
        self.cycle_count += 1;

        Ok(CycleReport {
            cycle: self.cycle_count,
            green,
            green_name,
            green_score,
            served_bus,
            served_emergency,
            ranking,
            fallbacks,
            signal,
        })
    }
}
