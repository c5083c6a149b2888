use crate::measurement::LaneMeasurement;

use super::{FeedError, FeedStatus, TrafficFeed};

/// Feed with no simulator behind it. Steps are counted but no measurement is
/// ever available, so every lane runs on synthetic readings.
#[derive(Debug, Default)]
pub struct OfflineFeed {
    steps: u64,
}

impl OfflineFeed {
    pub fn steps(&self) -> u64 {
        self.steps
    }
}

impl TrafficFeed for OfflineFeed {
    fn name(&self) -> &str {
        "offline"
    }

    fn advance(&mut self, steps: u32) -> Result<FeedStatus, FeedError> {
        self.steps += u64::from(steps);
        Ok(FeedStatus::Running)
    }

    fn measure(&self, _edge: &str) -> Result<LaneMeasurement, FeedError> {
        Err(FeedError::NotReady("no simulator connected".into()))
    }
}
