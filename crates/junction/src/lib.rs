use bevy::prelude::*;

pub mod actuator;
pub mod config;
pub mod feed;
pub mod lane;
pub mod measurement;
pub mod priority_tree;
pub mod rng;
pub mod scheduler;
pub mod stats;

#[cfg(test)]
mod integration_tests;
#[cfg(any(test, feature = "bench"))]
pub mod test_harness;

use actuator::ActuatorSlot;
use config::ControllerConfig;
use feed::FeedSession;
use lane::LaneRegistry;
use rng::CycleRng;
use scheduler::{report_cycle, run_signal_cycle, CycleCompleted, CycleScheduler, JunctionSet};
use stats::CycleHistory;

// ---------------------------------------------------------------------------
// JunctionPlugin
// ---------------------------------------------------------------------------

/// Registers the controller resources and the per-frame cycle systems.
///
/// Resources already present in the world are kept, so a driver can insert
/// its own configuration, registry, feed session or actuator before adding
/// the plugin. Missing ones are derived from the [`ControllerConfig`].
pub struct JunctionPlugin;

impl Plugin for JunctionPlugin {
    fn build(&self, app: &mut App) {
        let config = match app.world().get_resource::<ControllerConfig>() {
            Some(config) => config.clone(),
            None => {
                let config = ControllerConfig::default();
                app.insert_resource(config.clone());
                config
            }
        };

        if !app.world().contains_resource::<LaneRegistry>() {
            let registry = LaneRegistry::from_specs(&config.lanes).unwrap_or_else(|e| {
                error!("Invalid lane configuration ({e}), using the reference crossing");
                LaneRegistry::default()
            });
            app.insert_resource(registry);
        }
        if !app.world().contains_resource::<CycleScheduler>() {
            app.insert_resource(CycleScheduler::from_config(&config));
        }
        if !app.world().contains_resource::<CycleRng>() {
            app.insert_resource(CycleRng::from_seed_u64(config.seed));
        }
        if !app.world().contains_resource::<ActuatorSlot>() {
            app.insert_resource(ActuatorSlot::from_config(&config));
        }
        app.init_resource::<FeedSession>()
            .init_resource::<CycleHistory>()
            .add_event::<CycleCompleted>()
            .configure_sets(Update, (JunctionSet::Cycle, JunctionSet::Report).chain())
            .add_systems(Update, run_signal_cycle.in_set(JunctionSet::Cycle))
            .add_systems(Update, report_cycle.in_set(JunctionSet::Report));
    }
}
