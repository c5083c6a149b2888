//! Scoring constants and the controller configuration resource.

use std::fmt;
use std::path::{Path, PathBuf};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::actuator::ControlledLink;
use crate::lane::{default_lane_specs, LaneSpec, PerturbationConfig};
use crate::measurement::VehicleMarkers;

// =============================================================================
// Scoring contract
// =============================================================================

pub const VEHICLE_WEIGHT: f64 = 1.0;
pub const WAIT_WEIGHT: f64 = 0.5;
pub const CONGESTION_WEIGHT: f64 = 2.0;

/// Added when a bus is queued on the lane.
pub const BUS_BONUS: f64 = 20.0;
/// Added when an emergency vehicle is queued on the lane. Must exceed the
/// score of any non-emergency lane at realistic maxima.
pub const EMERGENCY_BONUS: f64 = 100.0;

/// Congestion levels are clamped to `0..=MAX_CONGESTION`.
pub const MAX_CONGESTION: u8 = 10;

// =============================================================================
// Driver defaults
// =============================================================================

pub const DEFAULT_CYCLES: u64 = 10;
pub const DEFAULT_CYCLE_DELAY_SECS: f64 = 1.0;
pub const DEFAULT_STEPS_PER_CYCLE: u32 = 10;
pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_TLS_ID: &str = "center";

// =============================================================================
// ControllerConfig
// =============================================================================

/// Everything the driver needs to run an intersection. Loaded from JSON;
/// absent fields take their defaults.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Number of cycles to run. `None` runs until the feed is exhausted or
    /// the process is interrupted.
    pub cycles: Option<u64>,
    pub cycle_delay_secs: f64,
    /// Simulator steps advanced before each cycle.
    pub steps_per_cycle: u32,
    pub seed: u64,
    /// Id of the controlled traffic light.
    pub tls_id: String,
    pub lanes: Vec<LaneSpec>,
    pub markers: VehicleMarkers,
    pub perturbation: PerturbationConfig,
    pub controlled_links: Vec<ControlledLink>,
    /// Phase index requested when no controlled link leaves the green lane.
    pub fallback_phase: u32,
    /// Recorded measurement trace replayed as the feed.
    pub trace: Option<PathBuf>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            cycles: Some(DEFAULT_CYCLES),
            cycle_delay_secs: DEFAULT_CYCLE_DELAY_SECS,
            steps_per_cycle: DEFAULT_STEPS_PER_CYCLE,
            seed: DEFAULT_SEED,
            tls_id: DEFAULT_TLS_ID.to_string(),
            lanes: default_lane_specs(),
            markers: VehicleMarkers::default(),
            perturbation: PerturbationConfig::default(),
            controlled_links: Vec::new(),
            fallback_phase: 0,
            trace: None,
        }
    }
}

impl ControllerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lanes.is_empty() {
            return Err(ConfigError::Invalid("at least one lane is required".into()));
        }
        for (i, lane) in self.lanes.iter().enumerate() {
            if lane.name.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("lane {i} has an empty name")));
            }
            if self.lanes[..i].iter().any(|other| other.name == lane.name) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate lane name '{}'",
                    lane.name
                )));
            }
        }
        if !self.cycle_delay_secs.is_finite() || self.cycle_delay_secs < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "cycle_delay_secs must be a non-negative number, got {}",
                self.cycle_delay_secs
            )));
        }
        if self.cycles == Some(0) {
            return Err(ConfigError::Invalid("cycles must be at least 1".into()));
        }
        self.perturbation.validate().map_err(ConfigError::Invalid)?;
        Ok(())
    }
}

// =============================================================================
// ConfigError
// =============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(String),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "I/O error reading config: {e}"),
            ConfigError::Parse(msg) => write!(f, "Config parse error: {msg}"),
            ConfigError::Invalid(msg) => write!(f, "Invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e.to_string())
    }
}
