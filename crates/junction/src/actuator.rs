//! The signal collaborator: turns the lane chosen for green into a command
//! for the controlled traffic light.

use std::fmt;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::ControllerConfig;
use crate::lane::{Lane, LaneId};

/// All the actuator is told about the winning lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaneIdentity<'a> {
    pub id: LaneId,
    pub name: &'a str,
    pub edge: &'a str,
}

impl<'a> From<&'a Lane> for LaneIdentity<'a> {
    fn from(lane: &'a Lane) -> Self {
        Self {
            id: lane.id,
            name: &lane.name,
            edge: &lane.edge,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalCommand {
    /// Full per-link state, one `G`/`r` character per controlled link.
    State { tls_id: String, state: String },
    Phase { tls_id: String, phase: u32 },
}

impl fmt::Display for SignalCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalCommand::State { tls_id, state } => write!(f, "{tls_id} <- state {state}"),
            SignalCommand::Phase { tls_id, phase } => write!(f, "{tls_id} <- phase {phase}"),
        }
    }
}

pub trait SignalActuator: Send + Sync {
    /// Grant green to `lane`. A rejection never undoes the selection.
    fn apply_green(&mut self, lane: LaneIdentity<'_>) -> Result<SignalCommand, ActuationError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActuationError {
    Rejected(String),
    UnknownLane(String),
}

impl fmt::Display for ActuationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActuationError::Rejected(msg) => write!(f, "signal rejected: {msg}"),
            ActuationError::UnknownLane(name) => {
                write!(f, "lane '{name}' is not known to the signal")
            }
        }
    }
}

impl std::error::Error for ActuationError {}

// =============================================================================
// Link-state actuator
// =============================================================================

/// One signal position of the controlled light: traffic from `from_edge`
/// to `to_edge` through lane `via_lane`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlledLink {
    pub from_edge: String,
    pub to_edge: String,
    #[serde(default)]
    pub via_lane: u32,
}

/// Builds a `G`/`r` state string from the controlled-link table: green for
/// every link leaving the winning lane's edge, red for the rest. Falls back
/// to a fixed phase when no link leaves that edge.
#[derive(Debug, Clone, Default)]
pub struct LinkStateActuator {
    tls_id: String,
    links: Vec<ControlledLink>,
    fallback_phase: u32,
    last_command: Option<SignalCommand>,
}

impl LinkStateActuator {
    pub fn new(tls_id: impl Into<String>, links: Vec<ControlledLink>, fallback_phase: u32) -> Self {
        Self {
            tls_id: tls_id.into(),
            links,
            fallback_phase,
            last_command: None,
        }
    }

    pub fn from_config(config: &ControllerConfig) -> Self {
        Self::new(
            config.tls_id.clone(),
            config.controlled_links.clone(),
            config.fallback_phase,
        )
    }

    /// `None` when no controlled link starts at `edge`.
    pub fn link_state(&self, edge: &str) -> Option<String> {
        if !self.links.iter().any(|l| l.from_edge == edge) {
            return None;
        }
        Some(
            self.links
                .iter()
                .map(|l| if l.from_edge == edge { 'G' } else { 'r' })
                .collect(),
        )
    }

    pub fn last_command(&self) -> Option<&SignalCommand> {
        self.last_command.as_ref()
    }
}

impl SignalActuator for LinkStateActuator {
    fn apply_green(&mut self, lane: LaneIdentity<'_>) -> Result<SignalCommand, ActuationError> {
        if self.tls_id.is_empty() {
            return Err(ActuationError::Rejected("no traffic light configured".into()));
        }
        if lane.edge.is_empty() {
            return Err(ActuationError::UnknownLane(lane.name.to_string()));
        }
        let command = match self.link_state(lane.edge) {
            Some(state) => SignalCommand::State {
                tls_id: self.tls_id.clone(),
                state,
            },
            None => {
                debug!(
                    "No controlled link leaves {}, requesting phase {}",
                    lane.edge, self.fallback_phase
                );
                SignalCommand::Phase {
                    tls_id: self.tls_id.clone(),
                    phase: self.fallback_phase,
                }
            }
        };
        self.last_command = Some(command.clone());
        Ok(command)
    }
}

// =============================================================================
// Resource
// =============================================================================

/// The actuator the run system drives.
#[derive(Resource)]
pub struct ActuatorSlot(pub Box<dyn SignalActuator>);

impl ActuatorSlot {
    /// A [`LinkStateActuator`] for the configured light.
    pub fn from_config(config: &ControllerConfig) -> Self {
        Self(Box::new(LinkStateActuator::from_config(config)))
    }
}
