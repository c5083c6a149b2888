//! Raw per-edge measurements and their mapping onto lane readings.

use serde::{Deserialize, Serialize};

use crate::config::MAX_CONGESTION;
use crate::lane::LaneReading;

/// What the simulator reports for one edge at the last step.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneMeasurement {
    pub vehicle_count: u32,
    /// Sum of the waiting times of every vehicle on the edge, seconds.
    pub waiting_time_total: f64,
    pub halting_count: u32,
    pub vehicle_ids: Vec<String>,
}

impl LaneMeasurement {
    /// `wait = total / max(1, count)`,
    /// `congestion = clamp(round(halting / max(1, count) * 10), 0, 10)`.
    pub fn to_reading(&self, markers: &VehicleMarkers) -> LaneReading {
        let denom = self.vehicle_count.max(1) as f64;
        let wait_time = if self.waiting_time_total.is_finite() {
            (self.waiting_time_total / denom).max(0.0)
        } else {
            0.0
        };
        let halting_ratio = self.halting_count as f64 / denom;
        let congestion_level =
            (halting_ratio * MAX_CONGESTION as f64).round().clamp(0.0, MAX_CONGESTION as f64) as u8;

        let mut has_bus = false;
        let mut has_emergency = false;
        for id in &self.vehicle_ids {
            let id = id.to_lowercase();
            has_bus |= markers.is_bus(&id);
            has_emergency |= markers.is_emergency(&id);
        }

        LaneReading {
            num_vehicles: self.vehicle_count,
            wait_time,
            congestion_level,
            has_bus,
            has_emergency,
        }
    }
}

/// Vehicle-id patterns that mark buses and emergency vehicles. Matching is
/// case-insensitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleMarkers {
    pub bus_prefixes: Vec<String>,
    pub bus_substrings: Vec<String>,
    pub emergency_prefixes: Vec<String>,
    pub emergency_substrings: Vec<String>,
}

impl Default for VehicleMarkers {
    fn default() -> Self {
        Self {
            bus_prefixes: vec!["bus".into(), "b_".into()],
            bus_substrings: Vec::new(),
            emergency_prefixes: vec!["ambulance".into(), "emg".into()],
            emergency_substrings: vec!["ambul".into()],
        }
    }
}

impl VehicleMarkers {
    /// `id` must already be lowercase.
    fn is_bus(&self, id: &str) -> bool {
        id_matches(id, &self.bus_prefixes, &self.bus_substrings)
    }

    fn is_emergency(&self, id: &str) -> bool {
        id_matches(id, &self.emergency_prefixes, &self.emergency_substrings)
    }
}

fn id_matches(id: &str, prefixes: &[String], substrings: &[String]) -> bool {
    prefixes
        .iter()
        .filter(|p| !p.is_empty())
        .any(|p| id.starts_with(&p.to_lowercase()))
        || substrings
            .iter()
            .filter(|s| !s.is_empty())
            .any(|s| id.contains(&s.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measurement(count: u32, wait: f64, halting: u32, ids: &[&str]) -> LaneMeasurement {
        LaneMeasurement {
            vehicle_count: count,
            waiting_time_total: wait,
            halting_count: halting,
            vehicle_ids: ids.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_average_wait() {
        let r = measurement(4, 100.0, 0, &[]).to_reading(&VehicleMarkers::default());
        assert_eq!(r.num_vehicles, 4);
        assert_eq!(r.wait_time, 25.0);
    }

    #[test]
    fn test_empty_edge_divides_by_one() {
        let r = measurement(0, 12.0, 3, &[]).to_reading(&VehicleMarkers::default());
        assert_eq!(r.wait_time, 12.0);
        assert_eq!(r.congestion_level, 10);
    }

    #[test]
    fn test_congestion_rounds_to_nearest() {
        let markers = VehicleMarkers::default();
        // 1/3 * 10 = 3.33
        assert_eq!(measurement(3, 0.0, 1, &[]).to_reading(&markers).congestion_level, 3);
        // 2/3 * 10 = 6.67
        assert_eq!(measurement(3, 0.0, 2, &[]).to_reading(&markers).congestion_level, 7);
        assert_eq!(measurement(8, 0.0, 8, &[]).to_reading(&markers).congestion_level, 10);
    }

    #[test]
    fn test_congestion_is_clamped() {
        let r = measurement(2, 0.0, 9, &[]).to_reading(&VehicleMarkers::default());
        assert_eq!(r.congestion_level, 10);
    }

    #[test]
    fn test_non_finite_wait_becomes_zero() {
        let r = measurement(2, f64::INFINITY, 0, &[]).to_reading(&VehicleMarkers::default());
        assert_eq!(r.wait_time, 0.0);
    }

    #[test]
    fn test_default_markers() {
        let markers = VehicleMarkers::default();
        let r = measurement(3, 0.0, 0, &["car_1", "BUS_12", "flow.3"]).to_reading(&markers);
        assert!(r.has_bus);
        assert!(!r.has_emergency);

        let r = measurement(1, 0.0, 0, &["b_7"]).to_reading(&markers);
        assert!(r.has_bus);

        let r = measurement(1, 0.0, 0, &["Ambulance_1"]).to_reading(&markers);
        assert!(r.has_emergency);

        let r = measurement(1, 0.0, 0, &["emg.2"]).to_reading(&markers);
        assert!(r.has_emergency);

        let r = measurement(1, 0.0, 0, &["city_ambul_4"]).to_reading(&markers);
        assert!(r.has_emergency && !r.has_bus);
    }

    #[test]
    fn test_prefix_only_matches_at_start() {
        let r = measurement(1, 0.0, 0, &["minibus_1"]).to_reading(&VehicleMarkers::default());
        assert!(!r.has_bus);
    }

    #[test]
    fn test_custom_markers() {
        let markers = VehicleMarkers {
            bus_prefixes: Vec::new(),
            bus_substrings: vec!["Coach".into()],
            emergency_prefixes: vec!["FIRE".into()],
            emergency_substrings: Vec::new(),
        };
        let r = measurement(2, 0.0, 0, &["x_coach_2", "fire.1"]).to_reading(&markers);
        assert!(r.has_bus && r.has_emergency);
        let r = measurement(1, 0.0, 0, &["bus_1"]).to_reading(&markers);
        assert!(!r.has_bus);
    }

    #[test]
    fn test_empty_markers_never_match() {
        let markers = VehicleMarkers {
            bus_prefixes: vec![String::new()],
            bus_substrings: vec![String::new()],
            emergency_prefixes: Vec::new(),
            emergency_substrings: Vec::new(),
        };
        let r = measurement(1, 0.0, 0, &["anything"]).to_reading(&markers);
        assert!(!r.has_bus);
    }

    #[test]
    fn test_measurement_json_defaults() {
        let m: LaneMeasurement = serde_json::from_str(r#"{ "vehicle_count": 2 }"#).expect("parse");
        assert_eq!(m.vehicle_count, 2);
        assert!(m.vehicle_ids.is_empty());
    }
}
