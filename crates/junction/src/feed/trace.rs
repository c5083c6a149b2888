//! Recorded measurement traces replayed as a feed.
//!
//! A trace is a JSON document: a header followed by frames, each frame
//! holding the per-edge measurements observed at one simulator step.
//! [`TraceFeed`] keeps a step clock; the frame in effect is the last one
//! whose step is not after the clock.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::measurement::LaneMeasurement;

use super::{FeedError, FeedStatus, TrafficFeed};

/// Bump on breaking changes to the trace layout.
pub const TRACE_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceHeader {
    pub format_version: u32,
    /// Free-form origin of the recording (scenario name, simulator build).
    #[serde(default)]
    pub source: String,
    /// Simulated seconds per step.
    #[serde(default = "default_step_length")]
    pub step_length_secs: f64,
}

fn default_step_length() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceFrame {
    pub step: u64,
    #[serde(default)]
    pub edges: BTreeMap<String, LaneMeasurement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementTrace {
    pub header: TraceHeader,
    pub frames: Vec<TraceFrame>,
}

impl MeasurementTrace {
    pub fn from_json(json: &str) -> Result<Self, TraceError> {
        let trace: Self = serde_json::from_str(json)?;
        trace.validate()?;
        Ok(trace)
    }

    pub fn load(path: &Path) -> Result<Self, TraceError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }

    /// Validate internal consistency:
    /// - the format version is supported
    /// - the step length is positive
    /// - there is at least one frame
    /// - frame steps are strictly increasing
    pub fn validate(&self) -> Result<(), TraceError> {
        if self.header.format_version != TRACE_FORMAT_VERSION {
            return Err(TraceError::Invalid(format!(
                "unsupported trace format version {} (expected {})",
                self.header.format_version, TRACE_FORMAT_VERSION
            )));
        }
        let step = self.header.step_length_secs;
        if !step.is_finite() || step <= 0.0 {
            return Err(TraceError::Invalid(format!(
                "step length must be a positive number of seconds, got {step}"
            )));
        }
        if self.frames.is_empty() {
            return Err(TraceError::Invalid("trace has no frames".into()));
        }
        for window in self.frames.windows(2) {
            if window[1].step <= window[0].step {
                return Err(TraceError::Invalid(format!(
                    "frame steps not strictly increasing: step {} followed by {}",
                    window[0].step, window[1].step
                )));
            }
        }
        Ok(())
    }

    pub fn last_step(&self) -> u64 {
        self.frames.last().map_or(0, |f| f.step)
    }
}

// =============================================================================
// TraceError
// =============================================================================

#[derive(Debug)]
pub enum TraceError {
    Io(std::io::Error),
    Parse(String),
    Invalid(String),
}

impl fmt::Display for TraceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceError::Io(e) => write!(f, "I/O error reading trace: {e}"),
            TraceError::Parse(msg) => write!(f, "Trace parse error: {msg}"),
            TraceError::Invalid(msg) => write!(f, "Invalid trace: {msg}"),
        }
    }
}

impl std::error::Error for TraceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TraceError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for TraceError {
    fn from(e: std::io::Error) -> Self {
        TraceError::Io(e)
    }
}

impl From<serde_json::Error> for TraceError {
    fn from(e: serde_json::Error) -> Self {
        TraceError::Parse(e.to_string())
    }
}

// =============================================================================
// TraceFeed
// =============================================================================

pub struct TraceFeed {
    name: String,
    trace: MeasurementTrace,
    clock: u64,
    /// Index of the frame in effect, `None` before the first frame.
    current: Option<usize>,
}

impl TraceFeed {
    pub fn new(trace: MeasurementTrace) -> Self {
        let name = if trace.header.source.is_empty() {
            "trace".to_string()
        } else {
            format!("trace:{}", trace.header.source)
        };
        Self {
            name,
            trace,
            clock: 0,
            current: None,
        }
    }

    pub fn clock(&self) -> u64 {
        self.clock
    }

    /// Simulated time consumed so far.
    pub fn elapsed_secs(&self) -> f64 {
        self.clock as f64 * self.trace.header.step_length_secs
    }

    pub fn current_frame(&self) -> Option<&TraceFrame> {
        self.current.map(|i| &self.trace.frames[i])
    }
}

impl TrafficFeed for TraceFeed {
    fn name(&self) -> &str {
        &self.name
    }

    fn advance(&mut self, steps: u32) -> Result<FeedStatus, FeedError> {
        self.clock = self.clock.saturating_add(u64::from(steps));
        let start = self.current.map_or(0, |i| i + 1);
        for (i, frame) in self.trace.frames.iter().enumerate().skip(start) {
            if frame.step > self.clock {
                break;
            }
            self.current = Some(i);
        }
        if self.clock > self.trace.last_step() {
            Ok(FeedStatus::Finished)
        } else {
            Ok(FeedStatus::Running)
        }
    }

    fn measure(&self, edge: &str) -> Result<LaneMeasurement, FeedError> {
        let Some(frame) = self.current_frame() else {
            return Err(FeedError::NotReady(format!(
                "step {} is before the first recorded frame",
                self.clock
            )));
        };
        frame
            .edges
            .get(edge)
            .cloned()
            .ok_or_else(|| FeedError::UnknownEdge(edge.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(step: u64, edges: &[(&str, u32)]) -> TraceFrame {
        TraceFrame {
            step,
            edges: edges
                .iter()
                .map(|(edge, count)| {
                    (
                        edge.to_string(),
                        LaneMeasurement {
                            vehicle_count: *count,
                            ..Default::default()
                        },
                    )
                })
                .collect(),
        }
    }

    fn sample_trace() -> MeasurementTrace {
        MeasurementTrace {
            header: TraceHeader {
                format_version: TRACE_FORMAT_VERSION,
                source: "crossing".to_string(),
                step_length_secs: 1.0,
            },
            frames: vec![
                frame(10, &[("NtoC", 3), ("EtoC", 1)]),
                frame(20, &[("NtoC", 5)]),
                frame(30, &[("NtoC", 2), ("EtoC", 4)]),
            ],
        }
    }

    #[test]
    fn test_validate_correct_trace() {
        assert!(sample_trace().validate().is_ok());
    }

    #[test]
    fn test_validate_catches_unsorted_steps() {
        let mut trace = sample_trace();
        trace.frames.swap(0, 1);
        let err = trace.validate().unwrap_err();
        assert!(format!("{err}").contains("strictly increasing"), "got: {err}");
    }

    #[test]
    fn test_validate_catches_duplicate_steps() {
        let mut trace = sample_trace();
        trace.frames[1].step = 10;
        assert!(trace.validate().is_err());
    }

    #[test]
    fn test_validate_catches_empty_and_version() {
        let mut trace = sample_trace();
        trace.frames.clear();
        assert!(trace.validate().is_err());

        let mut trace = sample_trace();
        trace.header.format_version = 99;
        let err = trace.validate().unwrap_err();
        assert!(format!("{err}").contains("version"), "got: {err}");
    }

    #[test]
    fn test_validate_catches_bad_step_length() {
        let mut trace = sample_trace();
        trace.header.step_length_secs = 0.0;
        assert!(trace.validate().is_err());
        trace.header.step_length_secs = f64::NAN;
        assert!(trace.validate().is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let trace = sample_trace();
        let restored = MeasurementTrace::from_json(&trace.to_json()).expect("parse");
        assert_eq!(restored, trace);
    }

    #[test]
    fn test_parse_error() {
        let err = MeasurementTrace::from_json("[1, 2").unwrap_err();
        assert!(matches!(err, TraceError::Parse(_)));
    }

    #[test]
    fn test_measure_before_first_frame_is_not_ready() {
        let mut feed = TraceFeed::new(sample_trace());
        assert!(matches!(feed.measure("NtoC"), Err(FeedError::NotReady(_))));
        assert_eq!(feed.advance(5), Ok(FeedStatus::Running));
        assert!(matches!(feed.measure("NtoC"), Err(FeedError::NotReady(_))));
    }

    #[test]
    fn test_advance_selects_latest_frame() {
        let mut feed = TraceFeed::new(sample_trace());
        feed.advance(10).expect("advance");
        assert_eq!(feed.measure("NtoC").map(|m| m.vehicle_count), Ok(3));
        feed.advance(15).expect("advance");
        assert_eq!(feed.clock(), 25);
        assert_eq!(feed.current_frame().map(|f| f.step), Some(20));
        assert_eq!(feed.measure("NtoC").map(|m| m.vehicle_count), Ok(5));
    }

    #[test]
    fn test_elapsed_time_follows_step_length() {
        let mut trace = sample_trace();
        trace.header.step_length_secs = 0.5;
        let mut feed = TraceFeed::new(trace);
        assert_eq!(feed.elapsed_secs(), 0.0);
        feed.advance(10).expect("advance");
        feed.advance(4).expect("advance");
        assert_eq!(feed.elapsed_secs(), 7.0);
    }

    #[test]
    fn test_step_length_defaults_to_one_second() {
        let json = r#"{ "header": { "format_version": 1 }, "frames": [ { "step": 1 } ] }"#;
        let trace = MeasurementTrace::from_json(json).expect("parse");
        assert_eq!(trace.header.step_length_secs, 1.0);
    }

    #[test]
    fn test_missing_edge_is_unknown() {
        let mut feed = TraceFeed::new(sample_trace());
        feed.advance(20).expect("advance");
        assert_eq!(
            feed.measure("EtoC"),
            Err(FeedError::UnknownEdge("EtoC".to_string()))
        );
    }

    #[test]
    fn test_large_jump_skips_frames() {
        let mut feed = TraceFeed::new(sample_trace());
        assert_eq!(feed.advance(30), Ok(FeedStatus::Running));
        assert_eq!(feed.measure("EtoC").map(|m| m.vehicle_count), Ok(4));
    }

    #[test]
    fn test_finished_after_last_frame() {
        let mut feed = TraceFeed::new(sample_trace());
        for _ in 0..3 {
            assert_eq!(feed.advance(10), Ok(FeedStatus::Running));
        }
        assert_eq!(feed.advance(10), Ok(FeedStatus::Finished));
        // The last frame stays readable.
        assert_eq!(feed.measure("NtoC").map(|m| m.vehicle_count), Ok(2));
    }

    #[test]
    fn test_feed_name_includes_source() {
        assert_eq!(TraceFeed::new(sample_trace()).name(), "trace:crossing");
    }
}
