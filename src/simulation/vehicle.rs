//! Vehicles waiting at an intersection

use super::types::{elapsed_secs, Direction, Timestamp, VehicleId, VehicleKind};

/// A vehicle in the signal simulation
///
/// Identity, kind, direction and arrival time are fixed at creation. The wait
/// time stays at zero until the vehicle is released.
#[derive(Debug, Clone, PartialEq)]
pub struct SimVehicle {
    pub id: VehicleId,
    pub kind: VehicleKind,
    pub direction: Direction,
    pub arrival_time: Timestamp,
    pub wait_time: f64,
}

impl SimVehicle {
    pub fn new(id: VehicleId, kind: VehicleKind, direction: Direction, arrival_time: Timestamp) -> Self {
        Self {
            id,
            kind,
            direction,
            arrival_time,
            wait_time: 0.0,
        }
    }

    pub fn is_emergency(&self) -> bool {
        self.kind == VehicleKind::Emergency
    }

    /// Seconds spent waiting so far
    pub fn waited_secs(&self, now: Timestamp) -> f64 {
        elapsed_secs(self.arrival_time, now)
    }

    /// Record the final wait time when the vehicle leaves its queue
    pub fn stamp_departure(&mut self, now: Timestamp) {
        self.wait_time = self.waited_secs(now);
    }
}
