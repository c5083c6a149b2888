//! The traffic-data collaborator.
//!
//! A [`TrafficFeed`] advances an external simulation between cycles and
//! answers per-edge measurement queries. The scheduler only reads from it;
//! the run system owns the single [`FeedSession`] that holds the connection.

pub mod offline;
pub mod trace;

use std::fmt;

use bevy::prelude::*;

use crate::measurement::LaneMeasurement;

pub use offline::OfflineFeed;
pub use trace::{
    MeasurementTrace, TraceError, TraceFeed, TraceFrame, TraceHeader, TRACE_FORMAT_VERSION,
};

// =============================================================================
// Feed contract
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    Running,
    /// No more vehicles are expected; the run should stop.
    Finished,
}

pub trait TrafficFeed: Send + Sync {
    fn name(&self) -> &str;

    /// Block until the simulation has moved `steps` steps forward.
    fn advance(&mut self, steps: u32) -> Result<FeedStatus, FeedError>;

    /// Measurements for `edge` at the current step.
    fn measure(&self, edge: &str) -> Result<LaneMeasurement, FeedError>;

    /// Release the connection. Called at most once, by [`FeedSession`].
    fn close(&mut self) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    /// The simulator has no data yet.
    NotReady(String),
    UnknownEdge(String),
    /// The connection is gone.
    Disconnected(String),
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedError::NotReady(msg) => write!(f, "feed not ready: {msg}"),
            FeedError::UnknownEdge(edge) => write!(f, "no measurement for edge '{edge}'"),
            FeedError::Disconnected(msg) => write!(f, "feed disconnected: {msg}"),
        }
    }
}

impl std::error::Error for FeedError {}

// =============================================================================
// FeedSession
// =============================================================================

/// Owns the feed for the lifetime of a run. The feed is closed exactly once:
/// explicitly through [`FeedSession::close`] or when the session drops.
#[derive(Resource)]
pub struct FeedSession {
    feed: Box<dyn TrafficFeed>,
    closed: bool,
}

impl Default for FeedSession {
    fn default() -> Self {
        Self::new(Box::new(OfflineFeed::default()))
    }
}

impl FeedSession {
    pub fn new(feed: Box<dyn TrafficFeed>) -> Self {
        info!("Feed session opened: {}", feed.name());
        Self {
            feed,
            closed: false,
        }
    }

    pub fn name(&self) -> &str {
        self.feed.name()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn feed(&self) -> &dyn TrafficFeed {
        self.feed.as_ref()
    }

    pub fn advance(&mut self, steps: u32) -> Result<FeedStatus, FeedError> {
        if self.closed {
            return Err(FeedError::Disconnected("session already closed".into()));
        }
        self.feed.advance(steps)
    }

    /// Idempotent.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.feed.close();
        info!("Feed session closed: {}", self.feed.name());
    }
}

impl Drop for FeedSession {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    struct CountingFeed {
        closes: Arc<AtomicU32>,
    }

    impl TrafficFeed for CountingFeed {
        fn name(&self) -> &str {
            "counting"
        }

        fn advance(&mut self, _steps: u32) -> Result<FeedStatus, FeedError> {
            Ok(FeedStatus::Running)
        }

        fn measure(&self, edge: &str) -> Result<LaneMeasurement, FeedError> {
            Err(FeedError::UnknownEdge(edge.to_string()))
        }

        fn close(&mut self) {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn counting_session() -> (FeedSession, Arc<AtomicU32>) {
        let closes = Arc::new(AtomicU32::new(0));
        let session = FeedSession::new(Box::new(CountingFeed {
            closes: Arc::clone(&closes),
        }));
        (session, closes)
    }

    #[test]
    fn test_drop_closes_feed() {
        let (session, closes) = counting_session();
        drop(session);
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_close_is_idempotent() {
        let (mut session, closes) = counting_session();
        session.close();
        session.close();
        assert!(session.is_closed());
        drop(session);
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_advance_after_close_is_disconnected() {
        let (mut session, _closes) = counting_session();
        assert_eq!(session.advance(1), Ok(FeedStatus::Running));
        session.close();
        assert!(matches!(session.advance(1), Err(FeedError::Disconnected(_))));
    }

    #[test]
    fn test_default_session_is_offline() {
        let session = FeedSession::default();
        assert_eq!(session.name(), "offline");
        assert!(matches!(
            session.feed().measure("NtoC"),
            Err(FeedError::NotReady(_))
        ));
    }

    #[test]
    fn test_error_display() {
        let msg = format!("{}", FeedError::UnknownEdge("EtoC".into()));
        assert!(msg.contains("EtoC"), "got: {msg}");
    }
}
