//! # TestJunction: headless harness for the junction controller
//!
//! Wraps a `bevy::app::App` with `MinimalPlugins` + [`JunctionPlugin`] so
//! tests can tick cycles and inspect resources without the driver binary.
//! Also provides a scripted feed and a recording actuator.

use std::collections::BTreeMap;

use bevy::app::App;
use bevy::prelude::*;

use crate::actuator::{ActuationError, ActuatorSlot, LaneIdentity, SignalActuator, SignalCommand};
use crate::config::ControllerConfig;
use crate::feed::{FeedError, FeedSession, FeedStatus, TrafficFeed};
use crate::lane::{LaneId, LaneRegistry};
use crate::measurement::LaneMeasurement;
use crate::scheduler::CycleScheduler;
use crate::stats::CycleHistory;
use crate::JunctionPlugin;

// -----------------------------------------------------------------------
// StaticFeed
// -----------------------------------------------------------------------

/// Feed that answers every advance with the same per-edge measurements.
#[derive(Debug, Clone, Default)]
pub struct StaticFeed {
    edges: BTreeMap<String, LaneMeasurement>,
    advances: u64,
    finish_after: Option<u64>,
    disconnect_after: Option<u64>,
}

impl StaticFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_edge(mut self, edge: &str, measurement: LaneMeasurement) -> Self {
        self.edges.insert(edge.to_string(), measurement);
        self
    }

    /// Report `Finished` on the advance after the first `n`.
    pub fn finishing_after(mut self, n: u64) -> Self {
        self.finish_after = Some(n);
        self
    }

    /// Fail with `Disconnected` on the advance after the first `n`.
    pub fn disconnecting_after(mut self, n: u64) -> Self {
        self.disconnect_after = Some(n);
        self
    }

    /// Measurements that reproduce the four-lane reference seed values.
    pub fn reference_crossing() -> Self {
        Self::new()
            .with_edge("NtoC", measurement(12, 360.0, 6, &["car_1"]))
            .with_edge("EtoC", measurement(15, 375.0, 9, &["car_2", "bus_1"]))
            .with_edge("StoC", measurement(8, 320.0, 3, &["ambulance_1"]))
            .with_edge("WtoC", measurement(6, 90.0, 2, &[]))
    }
}

pub fn measurement(count: u32, wait_total: f64, halting: u32, ids: &[&str]) -> LaneMeasurement {
    LaneMeasurement {
        vehicle_count: count,
        waiting_time_total: wait_total,
        halting_count: halting,
        vehicle_ids: ids.iter().map(|s| s.to_string()).collect(),
    }
}

impl TrafficFeed for StaticFeed {
    fn name(&self) -> &str {
        "static"
    }

    fn advance(&mut self, _steps: u32) -> Result<FeedStatus, FeedError> {
        if self.disconnect_after.is_some_and(|n| self.advances >= n) {
            return Err(FeedError::Disconnected("scripted disconnect".into()));
        }
        if self.finish_after.is_some_and(|n| self.advances >= n) {
            return Ok(FeedStatus::Finished);
        }
        self.advances += 1;
        Ok(FeedStatus::Running)
    }

    fn measure(&self, edge: &str) -> Result<LaneMeasurement, FeedError> {
        self.edges
            .get(edge)
            .cloned()
            .ok_or_else(|| FeedError::UnknownEdge(edge.to_string()))
    }
}

// -----------------------------------------------------------------------
// RecordingActuator
// -----------------------------------------------------------------------

/// Remembers every lane it was asked to turn green; optionally rejects.
#[derive(Debug, Clone, Default)]
pub struct RecordingActuator {
    pub applied: Vec<LaneId>,
    pub reject: bool,
}

impl RecordingActuator {
    pub fn rejecting() -> Self {
        Self {
            applied: Vec::new(),
            reject: true,
        }
    }
}

impl SignalActuator for RecordingActuator {
    fn apply_green(&mut self, lane: LaneIdentity<'_>) -> Result<SignalCommand, ActuationError> {
        self.applied.push(lane.id);
        if self.reject {
            return Err(ActuationError::Rejected(format!("refusing {}", lane.name)));
        }
        Ok(SignalCommand::Phase {
            tls_id: "test".into(),
            phase: lane.id.0,
        })
    }
}

// -----------------------------------------------------------------------
// TestJunction
// -----------------------------------------------------------------------

/// A headless Bevy App running the junction plugin. Each `tick` is one
/// `app.update()`, which runs one cycle.
pub struct TestJunction {
    app: App,
}

impl Default for TestJunction {
    fn default() -> Self {
        Self::new()
    }
}

impl TestJunction {
    /// Reference four-lane crossing, offline feed, no cycle limit.
    pub fn new() -> Self {
        Self::with_config(ControllerConfig {
            cycles: None,
            cycle_delay_secs: 0.0,
            ..Default::default()
        })
    }

    pub fn with_config(config: ControllerConfig) -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(config);
        app.add_plugins(JunctionPlugin);
        Self { app }
    }

    pub fn with_feed(mut self, feed: impl TrafficFeed + 'static) -> Self {
        self.app.insert_resource(FeedSession::new(Box::new(feed)));
        self
    }

    pub fn with_actuator(mut self, actuator: impl SignalActuator + 'static) -> Self {
        self.app.insert_resource(ActuatorSlot(Box::new(actuator)));
        self
    }

    pub fn tick(&mut self, n: u32) {
        for _ in 0..n {
            self.app.update();
        }
    }

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    pub fn resource<T: Resource>(&self) -> &T {
        self.app.world().resource::<T>()
    }

    pub fn lanes(&self) -> &LaneRegistry {
        self.resource::<LaneRegistry>()
    }

    pub fn scheduler(&self) -> &CycleScheduler {
        self.resource::<CycleScheduler>()
    }

    pub fn history(&self) -> &CycleHistory {
        self.resource::<CycleHistory>()
    }

    pub fn exit_requested(&self) -> Option<AppExit> {
        self.app.should_exit()
    }

    pub fn assert_resource_exists<T: Resource>(&self) {
        assert!(
            self.app.world().get_resource::<T>().is_some(),
            "Expected resource {} to exist",
            std::any::type_name::<T>()
        );
    }
}
