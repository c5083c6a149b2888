//! Synthetic lane readings used when the feed has nothing for a lane.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::MAX_CONGESTION;

use super::types::{Lane, LaneReading};

/// Bounds of the random walk applied to a lane without live data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerturbationConfig {
    pub vehicle_delta_min: i32,
    pub vehicle_delta_max: i32,
    /// Seconds added to the wait time each cycle.
    pub wait_increase_min: f64,
    pub wait_increase_max: f64,
    /// Congestion moves by at most this many levels per cycle.
    pub congestion_step: u8,
    pub bus_probability: f64,
    pub emergency_probability: f64,
}

impl Default for PerturbationConfig {
    fn default() -> Self {
        Self {
            vehicle_delta_min: -2,
            vehicle_delta_max: 3,
            wait_increase_min: 1.0,
            wait_increase_max: 3.0,
            congestion_step: 1,
            bus_probability: 0.05,
            emergency_probability: 0.02,
        }
    }
}

impl PerturbationConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.vehicle_delta_min > self.vehicle_delta_max {
            return Err(format!(
                "vehicle delta range is inverted: {}..={}",
                self.vehicle_delta_min, self.vehicle_delta_max
            ));
        }
        let wait_ok = self.wait_increase_min.is_finite()
            && self.wait_increase_max.is_finite()
            && self.wait_increase_min >= 0.0
            && self.wait_increase_min <= self.wait_increase_max;
        if !wait_ok {
            return Err(format!(
                "wait increase range must be non-negative and ordered: {}..={}",
                self.wait_increase_min, self.wait_increase_max
            ));
        }
        for (name, p) in [
            ("bus_probability", self.bus_probability),
            ("emergency_probability", self.emergency_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(format!("{name} must be within [0, 1], got {p}"));
            }
        }
        Ok(())
    }
}

#[inline]
fn probability(p: f64) -> f64 {
    if (0.0..=1.0).contains(&p) {
        p
    } else {
        0.0
    }
}

/// Next reading for `lane`: vehicles drift by a small signed delta (never
/// below zero), wait grows, congestion random-walks inside `0..=10`, and a
/// bus or emergency vehicle may show up. Special-vehicle flags already set
/// are kept until the lane is served.
///
/// Invalid bounds are clamped rather than rejected.
pub fn perturbed_reading<R: Rng + ?Sized>(
    lane: &Lane,
    config: &PerturbationConfig,
    rng: &mut R,
) -> LaneReading {
    let (dmin, dmax) = if config.vehicle_delta_min <= config.vehicle_delta_max {
        (config.vehicle_delta_min, config.vehicle_delta_max)
    } else {
        (config.vehicle_delta_max, config.vehicle_delta_min)
    };
    let delta = rng.gen_range(dmin..=dmax);
    let num_vehicles = lane.num_vehicles.saturating_add_signed(delta);

    let wmin = if config.wait_increase_min.is_finite() {
        config.wait_increase_min.max(0.0)
    } else {
        0.0
    };
    let wmax = if config.wait_increase_max.is_finite() {
        config.wait_increase_max.max(wmin)
    } else {
        wmin
    };
    let wait_time = lane.wait_time + rng.gen_range(wmin..=wmax);

    let step = config.congestion_step as i32;
    let walk = rng.gen_range(-step..=step);
    let congestion_level =
        (lane.congestion_level as i32 + walk).clamp(0, MAX_CONGESTION as i32) as u8;

    let has_bus = lane.has_bus || rng.gen_bool(probability(config.bus_probability));
    let has_emergency =
        lane.has_emergency || rng.gen_bool(probability(config.emergency_probability));

    LaneReading {
        num_vehicles,
        wait_time,
        congestion_level,
        has_bus,
        has_emergency,
    }
}
