//! The authoritative lane list.

use std::fmt;

use bevy::prelude::*;

use crate::config::MAX_CONGESTION;

use super::types::{clamp_wait, default_lane_specs, Lane, LaneId, LaneReading, LaneSpec};

/// Owns every lane for the lifetime of the controller. Lanes are never
/// removed; their ids are their indices.
#[derive(Resource, Debug, Clone)]
pub struct LaneRegistry {
    lanes: Vec<Lane>,
}

impl Default for LaneRegistry {
    fn default() -> Self {
        let lanes = default_lane_specs()
            .iter()
            .enumerate()
            .map(|(i, spec)| Lane::new(LaneId(i as u32), spec))
            .collect();
        Self { lanes }
    }
}

impl LaneRegistry {
    /// Build a registry and compute every lane's initial score.
    pub fn from_specs(specs: &[LaneSpec]) -> Result<Self, RegistryError> {
        if specs.is_empty() {
            return Err(RegistryError::Empty);
        }
        let mut lanes: Vec<Lane> = Vec::with_capacity(specs.len());
        for (i, spec) in specs.iter().enumerate() {
            if lanes.iter().any(|l| l.name == spec.name) {
                return Err(RegistryError::DuplicateName(spec.name.clone()));
            }
            lanes.push(Lane::new(LaneId(i as u32), spec));
        }
        Ok(Self { lanes })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Lane> {
        self.lanes.iter()
    }

    pub fn get(&self, id: LaneId) -> Option<&Lane> {
        self.lanes.get(id.0 as usize)
    }

    pub fn by_name(&self, name: &str) -> Option<&Lane> {
        self.lanes.iter().find(|l| l.name == name)
    }

    pub fn by_edge(&self, edge: &str) -> Option<&Lane> {
        self.lanes.iter().find(|l| l.edge == edge)
    }

    /// Overwrite a lane's measurements and recompute its score. Out-of-range
    /// values are clamped. Returns `false` for an unknown id.
    pub fn refresh(&mut self, id: LaneId, reading: LaneReading) -> bool {
        let Some(lane) = self.lanes.get_mut(id.0 as usize) else {
            return false;
        };
        lane.num_vehicles = reading.num_vehicles;
        lane.wait_time = clamp_wait(reading.wait_time);
        lane.congestion_level = reading.congestion_level.min(MAX_CONGESTION);
        lane.has_bus = reading.has_bus;
        lane.has_emergency = reading.has_emergency;
        lane.recompute_score();
        true
    }

    /// The lane was just served: its queue wait drains and the special
    /// vehicles have passed. Vehicle count and congestion are untouched, and
    /// the stored score is left as ranked until the next refresh.
    pub fn reset_after_green(&mut self, id: LaneId) -> bool {
        let Some(lane) = self.lanes.get_mut(id.0 as usize) else {
            return false;
        };
        lane.wait_time = 0.0;
        lane.has_bus = false;
        lane.has_emergency = false;
        true
    }

    pub fn average_wait(&self) -> f64 {
        if self.lanes.is_empty() {
            return 0.0;
        }
        self.lanes.iter().map(|l| l.wait_time).sum::<f64>() / self.lanes.len() as f64
    }

    pub fn average_congestion(&self) -> f64 {
        if self.lanes.is_empty() {
            return 0.0;
        }
        self.lanes
            .iter()
            .map(|l| l.congestion_level as f64)
            .sum::<f64>()
            / self.lanes.len() as f64
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    Empty,
    DuplicateName(String),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::Empty => write!(f, "lane registry needs at least one lane"),
            RegistryError::DuplicateName(name) => write!(f, "duplicate lane name '{name}'"),
        }
    }
}

impl std::error::Error for RegistryError {}
