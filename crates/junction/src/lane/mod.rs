//! Lane registry: per-lane measurement state and the priority score.
//!
//! ## Score
//! `vehicles * 1.0 + wait * 0.5 + congestion * 2.0`, `+20` with a bus queued,
//! `+100` with an emergency vehicle queued. Both bonuses stack.
//!
//! ## Lifecycle
//! Lanes are created once at start-up, refreshed every cycle (from the feed
//! or, failing that, from a bounded random walk), and the cycle winner is
//! reset: wait drains to zero and the special-vehicle flags clear.

pub mod perturb;
pub mod registry;
pub mod types;

pub use perturb::{perturbed_reading, PerturbationConfig};
pub use registry::{LaneRegistry, RegistryError};
pub use types::{default_lane_specs, priority_score, Lane, LaneId, LaneReading, LaneSpec};
