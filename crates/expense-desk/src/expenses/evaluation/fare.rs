use std::collections::BTreeMap;

use super::super::domain::{TravelDetails, TripType};

/// Default reimbursement rate in currency units per kilometer.
pub const DEFAULT_RATE_PER_KM: f64 = 2.8;

/// Symmetric city-to-city distance lookup. Pairs are stored under a
/// normalized key so `(a, b)` and `(b, a)` resolve identically.
#[derive(Debug, Clone, Default)]
pub struct DistanceTable {
    distances: BTreeMap<(String, String), f64>,
}

impl DistanceTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(a: &str, b: &str) -> (String, String) {
        let a = a.trim().to_ascii_uppercase();
        let b = b.trim().to_ascii_uppercase();
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }

    pub fn insert(&mut self, a: &str, b: &str, kilometers: f64) {
        self.distances.insert(Self::key(a, b), kilometers);
    }

    /// Distance between two cities; unknown pairs default to 0.
    pub fn distance_km(&self, a: &str, b: &str) -> f64 {
        self.distances.get(&Self::key(a, b)).copied().unwrap_or(0.0)
    }
}

/// Travel-fare calculator: distance times rate, doubled for round trips.
#[derive(Debug, Clone)]
pub struct FareSchedule {
    rate_per_km: f64,
    distances: DistanceTable,
}

impl FareSchedule {
    pub fn new(rate_per_km: f64, distances: DistanceTable) -> Self {
        Self {
            rate_per_km,
            distances,
        }
    }

    pub fn rate_per_km(&self) -> f64 {
        self.rate_per_km
    }

    /// `round(distance * rate * trip_multiplier, 2)`.
    pub fn fare(&self, travel: &TravelDetails) -> f64 {
        let distance = self
            .distances
            .distance_km(&travel.from_city, &travel.to_city);
        let multiplier = match travel.trip_type {
            TripType::OneWay => 1.0,
            TripType::TwoWay => 2.0,
        };
        round2(distance * self.rate_per_km * multiplier)
    }
}

impl Default for FareSchedule {
    fn default() -> Self {
        let mut distances = DistanceTable::new();
        distances.insert("BLR", "CHN", 350.0);
        distances.insert("BLR", "MUM", 984.0);
        distances.insert("BLR", "DEL", 2150.0);
        distances.insert("CHN", "MUM", 1330.0);
        distances.insert("CHN", "DEL", 2200.0);
        distances.insert("MUM", "DEL", 1400.0);
        Self::new(DEFAULT_RATE_PER_KM, distances)
    }
}

/// Round to exactly two decimal places. Re-applying to its own output is a
/// no-op, so repeated evaluation never drifts.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
