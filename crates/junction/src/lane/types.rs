//! Lane data types and the score function.

use serde::{Deserialize, Serialize};

use crate::config::{
    BUS_BONUS, CONGESTION_WEIGHT, EMERGENCY_BONUS, MAX_CONGESTION, VEHICLE_WEIGHT, WAIT_WEIGHT,
};

/// Stable index of a lane inside its [`LaneRegistry`](super::LaneRegistry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LaneId(pub u32);

/// One approach to the intersection.
///
/// `priority_score` is private: it only changes through
/// [`Lane::recompute_score`], so it always equals the score function applied
/// to the fields as they were at the last recompute.
#[derive(Debug, Clone, PartialEq)]
pub struct Lane {
    pub id: LaneId,
    pub name: String,
    /// Edge id the feed reports this lane under.
    pub edge: String,
    pub num_vehicles: u32,
    /// Average accumulated wait, seconds.
    pub wait_time: f64,
    /// 0..=10
    pub congestion_level: u8,
    pub has_bus: bool,
    pub has_emergency: bool,
    priority_score: f64,
}

impl Lane {
    pub fn new(id: LaneId, spec: &LaneSpec) -> Self {
        let mut lane = Self {
            id,
            name: spec.name.clone(),
            edge: spec.edge.clone().unwrap_or_else(|| spec.name.clone()),
            num_vehicles: spec.num_vehicles,
            wait_time: clamp_wait(spec.wait_time),
            congestion_level: spec.congestion_level.min(MAX_CONGESTION),
            has_bus: spec.has_bus,
            has_emergency: spec.has_emergency,
            priority_score: 0.0,
        };
        lane.recompute_score();
        lane
    }

    #[inline]
    pub fn priority_score(&self) -> f64 {
        self.priority_score
    }

    /// Recompute the score from the current fields and store it.
    pub fn recompute_score(&mut self) -> f64 {
        self.priority_score = priority_score(
            self.num_vehicles,
            self.wait_time,
            self.congestion_level,
            self.has_bus,
            self.has_emergency,
        );
        self.priority_score
    }

    /// `(vehicles, wait, congestion, bus, emergency)`.
    pub fn state(&self) -> (u32, f64, u8, bool, bool) {
        (
            self.num_vehicles,
            self.wait_time,
            self.congestion_level,
            self.has_bus,
            self.has_emergency,
        )
    }
}

/// `vehicles * 1.0 + wait * 0.5 + congestion * 2.0`, plus 20 for a bus and
/// 100 for an emergency vehicle.
pub fn priority_score(
    num_vehicles: u32,
    wait_time: f64,
    congestion_level: u8,
    has_bus: bool,
    has_emergency: bool,
) -> f64 {
    let mut score = num_vehicles as f64 * VEHICLE_WEIGHT
        + wait_time * WAIT_WEIGHT
        + congestion_level as f64 * CONGESTION_WEIGHT;
    if has_bus {
        score += BUS_BONUS;
    }
    if has_emergency {
        score += EMERGENCY_BONUS;
    }
    score
}

/// Non-negative and finite; anything else becomes 0.
#[inline]
pub(crate) fn clamp_wait(wait: f64) -> f64 {
    if wait.is_finite() {
        wait.max(0.0)
    } else {
        0.0
    }
}

/// One refresh worth of lane state, from the feed or from perturbation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneReading {
    pub num_vehicles: u32,
    pub wait_time: f64,
    /// Clamped to `0..=10` when applied.
    pub congestion_level: u8,
    pub has_bus: bool,
    pub has_emergency: bool,
}

/// Start-up description of a lane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneSpec {
    pub name: String,
    /// Feed edge id; the name is used when absent.
    #[serde(default)]
    pub edge: Option<String>,
    #[serde(default)]
    pub num_vehicles: u32,
    #[serde(default)]
    pub wait_time: f64,
    #[serde(default)]
    pub congestion_level: u8,
    #[serde(default)]
    pub has_bus: bool,
    #[serde(default)]
    pub has_emergency: bool,
}

impl LaneSpec {
    /// A lane that starts with every measurement at zero.
    pub fn empty(name: &str, edge: &str) -> Self {
        Self {
            name: name.to_string(),
            edge: Some(edge.to_string()),
            num_vehicles: 0,
            wait_time: 0.0,
            congestion_level: 0,
            has_bus: false,
            has_emergency: false,
        }
    }

    pub fn seeded(
        name: &str,
        edge: &str,
        num_vehicles: u32,
        wait_time: f64,
        congestion_level: u8,
        has_bus: bool,
        has_emergency: bool,
    ) -> Self {
        Self {
            name: name.to_string(),
            edge: Some(edge.to_string()),
            num_vehicles,
            wait_time,
            congestion_level,
            has_bus,
            has_emergency,
        }
    }
}

/// Four-approach intersection with the reference seed values.
pub fn default_lane_specs() -> Vec<LaneSpec> {
    vec![
        LaneSpec::seeded("North", "NtoC", 12, 30.0, 5, false, false),
        LaneSpec::seeded("East", "EtoC", 15, 25.0, 6, true, false),
        LaneSpec::seeded("South", "StoC", 8, 40.0, 4, false, true),
        LaneSpec::seeded("West", "WtoC", 6, 15.0, 3, false, false),
    ]
}
