//! Run history and the end-of-run summary.

use std::collections::BTreeMap;
use std::fmt;

use bevy::prelude::*;

use crate::lane::{LaneId, LaneRegistry};
use crate::scheduler::CycleReport;

/// Why the run loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    CyclesCompleted,
    /// The feed reported that no more vehicles are expected.
    FeedExhausted,
    Interrupted,
    ConnectionLost(String),
    Aborted(String),
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::CyclesCompleted => write!(f, "configured cycles completed"),
            StopReason::FeedExhausted => write!(f, "feed exhausted"),
            StopReason::Interrupted => write!(f, "interrupted"),
            StopReason::ConnectionLost(msg) => write!(f, "feed connection lost: {msg}"),
            StopReason::Aborted(msg) => write!(f, "aborted: {msg}"),
        }
    }
}

/// Running totals over every completed cycle.
#[derive(Resource, Debug, Clone, Default)]
pub struct CycleHistory {
    last: Option<CycleReport>,
    cycles: u64,
    greens: BTreeMap<LaneId, u64>,
    bus_greens: u64,
    emergency_greens: u64,
    fallbacks: u64,
    actuator_failures: u64,
    stop: Option<StopReason>,
}

impl CycleHistory {
    pub fn record(&mut self, report: &CycleReport) {
        self.cycles += 1;
        *self.greens.entry(report.green).or_default() += 1;
        if report.served_bus {
            self.bus_greens += 1;
        }
        if report.served_emergency {
            self.emergency_greens += 1;
        }
        self.fallbacks += report.fallbacks.len() as u64;
        if report.signal.is_err() {
            self.actuator_failures += 1;
        }
        self.last = Some(report.clone());
    }

    pub fn last(&self) -> Option<&CycleReport> {
        self.last.as_ref()
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn greens_for(&self, lane: LaneId) -> u64 {
        self.greens.get(&lane).copied().unwrap_or(0)
    }

    pub fn stop_reason(&self) -> Option<&StopReason> {
        self.stop.as_ref()
    }

    /// The first reason sticks.
    pub fn stop(&mut self, reason: StopReason) {
        if self.stop.is_none() {
            self.stop = Some(reason);
        }
    }
}

// =============================================================================
// FinalStatistics
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct LaneGreens {
    pub name: String,
    pub greens: u64,
}

/// Summary computed from the lane state as it stands when the run stops.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalStatistics {
    pub cycles_completed: u64,
    pub average_wait: f64,
    pub average_congestion: f64,
    /// Registry order, lanes never served included.
    pub greens: Vec<LaneGreens>,
    pub bus_greens: u64,
    pub emergency_greens: u64,
    pub fallback_measurements: u64,
    pub actuator_failures: u64,
    pub stop: StopReason,
}

impl FinalStatistics {
    /// `stop` is used when the history has no reason recorded (the loop was
    /// left from outside, e.g. by an interrupt).
    pub fn compute(lanes: &LaneRegistry, history: &CycleHistory, stop: StopReason) -> Self {
        Self {
            cycles_completed: history.cycles,
            average_wait: lanes.average_wait(),
            average_congestion: lanes.average_congestion(),
            greens: lanes
                .iter()
                .map(|l| LaneGreens {
                    name: l.name.clone(),
                    greens: history.greens_for(l.id),
                })
                .collect(),
            bus_greens: history.bus_greens,
            emergency_greens: history.emergency_greens,
            fallback_measurements: history.fallbacks,
            actuator_failures: history.actuator_failures,
            stop: history.stop.clone().unwrap_or(stop),
        }
    }
}

impl fmt::Display for FinalStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Stopped: {}", self.stop)?;
        writeln!(f, "Cycles completed: {}", self.cycles_completed)?;
        writeln!(f, "Average wait: {:.2}s", self.average_wait)?;
        writeln!(f, "Average congestion: {:.2}/10", self.average_congestion)?;
        for lane in &self.greens {
            writeln!(f, "  {}: {} green(s)", lane.name, lane.greens)?;
        }
        writeln!(
            f,
            "Special greens: {} emergency, {} bus",
            self.emergency_greens, self.bus_greens
        )?;
        write!(
            f,
            "Synthetic readings: {}, actuator failures: {}",
            self.fallback_measurements, self.actuator_failures
        )
    }
}
