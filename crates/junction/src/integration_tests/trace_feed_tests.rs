use std::collections::BTreeMap;

use crate::config::ControllerConfig;
use crate::feed::{MeasurementTrace, TraceFeed, TraceFrame, TraceHeader, TRACE_FORMAT_VERSION};
use crate::stats::StopReason;
use crate::test_harness::{measurement, TestJunction};

fn frame(step: u64, south_ids: &[&str]) -> TraceFrame {
    let mut edges = BTreeMap::new();
    edges.insert("NtoC".to_string(), measurement(12, 360.0, 6, &[]));
    edges.insert("EtoC".to_string(), measurement(15, 375.0, 9, &["bus_3"]));
    edges.insert("StoC".to_string(), measurement(8, 320.0, 3, south_ids));
    edges.insert("WtoC".to_string(), measurement(6, 90.0, 2, &[]));
    TraceFrame { step, edges }
}

fn two_frame_trace() -> MeasurementTrace {
    MeasurementTrace {
        header: TraceHeader {
            format_version: TRACE_FORMAT_VERSION,
            source: "crossing".into(),
            step_length_secs: 1.0,
        },
        frames: vec![frame(10, &["ambulance_7"]), frame(20, &["car_9"])],
    }
}

fn trace_junction() -> TestJunction {
    let config = ControllerConfig {
        cycles: None,
        steps_per_cycle: 10,
        ..Default::default()
    };
    TestJunction::with_config(config).with_feed(TraceFeed::new(two_frame_trace()))
}

#[test]
fn test_trace_drives_selection() {
    let mut junction = trace_junction();

    junction.tick(1);
    let first = junction.history().last().cloned().expect("first");
    assert_eq!(first.green_name, "South");
    assert!(first.fallbacks.is_empty());

    // The ambulance has left in the second frame; the bus lane wins.
    junction.tick(1);
    let second = junction.history().last().cloned().expect("second");
    assert_eq!(second.green_name, "East");
    assert!(second.served_bus);
}

#[test]
fn test_trace_end_stops_run() {
    let mut junction = trace_junction();
    junction.tick(4);
    assert_eq!(junction.history().cycles(), 2);
    assert_eq!(
        junction.history().stop_reason(),
        Some(&StopReason::FeedExhausted)
    );
}

#[test]
fn test_trace_before_first_frame_uses_fallback() {
    let config = ControllerConfig {
        cycles: None,
        steps_per_cycle: 5,
        ..Default::default()
    };
    let mut junction =
        TestJunction::with_config(config).with_feed(TraceFeed::new(two_frame_trace()));
    junction.tick(1);
    let report = junction.history().last().cloned().expect("report");
    assert_eq!(report.fallbacks.len(), 4);
}
