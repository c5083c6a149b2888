use std::fmt;

use serde::{Deserialize, Serialize};

use crate::actuator::{ActuationError, SignalCommand};
use crate::feed::FeedError;
use crate::lane::{Lane, LaneId};

/// Where the scheduler is inside a cycle. Transitions are linear and loop
/// from `CycleComplete` back to `Measuring`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CyclePhase {
    #[default]
    Idle,
    Measuring,
    Ranking,
    Selecting,
    Applying,
    CycleComplete,
}

/// A lane as it was ranked, before the winner's reset.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedLane {
    pub id: LaneId,
    pub name: String,
    pub edge: String,
    pub score: f64,
    pub num_vehicles: u32,
    pub wait_time: f64,
    pub congestion_level: u8,
    pub has_bus: bool,
    pub has_emergency: bool,
}

impl RankedLane {
    pub(crate) fn snapshot(lane: &Lane, score: f64) -> Self {
        Self {
            id: lane.id,
            name: lane.name.clone(),
            edge: lane.edge.clone(),
            score,
            num_vehicles: lane.num_vehicles,
            wait_time: lane.wait_time,
            congestion_level: lane.congestion_level,
            has_bus: lane.has_bus,
            has_emergency: lane.has_emergency,
        }
    }
}

/// A lane whose live measurement failed and was synthesized instead.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementFallback {
    pub lane: LaneId,
    pub error: FeedError,
}

/// Outcome of one completed cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// 1-based.
    pub cycle: u64,
    pub green: LaneId,
    pub green_name: String,
    pub green_score: f64,
    pub served_bus: bool,
    pub served_emergency: bool,
    /// Every lane in descending score order; ties list the later lane first.
    pub ranking: Vec<RankedLane>,
    pub fallbacks: Vec<MeasurementFallback>,
    pub signal: Result<SignalCommand, ActuationError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleError {
    EmptyLaneSet,
    /// The tree named a lane the registry does not hold.
    UnknownLane(LaneId),
}

impl fmt::Display for CycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleError::EmptyLaneSet => write!(f, "cannot run a cycle without lanes"),
            CycleError::UnknownLane(id) => write!(f, "ranked lane {} is not registered", id.0),
        }
    }
}

impl std::error::Error for CycleError {}
