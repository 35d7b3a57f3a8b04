//! Per-direction FIFO queue of waiting vehicles

use std::collections::VecDeque;

use super::types::{Timestamp, VehicleKind};
use super::vehicle::SimVehicle;

/// Vehicles waiting on one approach of an intersection, in arrival order
#[derive(Debug, Clone, Default)]
pub struct DirectionalQueue {
    vehicles: VecDeque<SimVehicle>,
}

impl DirectionalQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, vehicle: SimVehicle) {
        self.vehicles.push_back(vehicle);
    }

    /// Remove the front vehicle, or `None` when the queue is empty
    pub fn dequeue(&mut self) -> Option<SimVehicle> {
        self.vehicles.pop_front()
    }

    pub fn peek(&self) -> Option<&SimVehicle> {
        self.vehicles.front()
    }

    pub fn size(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    pub fn count_by_kind(&self, kind: VehicleKind) -> usize {
        self.vehicles.iter().filter(|v| v.kind == kind).count()
    }

    pub fn has_emergency(&self) -> bool {
        self.vehicles.iter().any(SimVehicle::is_emergency)
    }

    /// Sum of the live wait of every queued vehicle, in seconds
    pub fn total_wait_secs(&self, now: Timestamp) -> f64 {
        self.vehicles.iter().map(|v| v.waited_secs(now)).sum()
    }

    /// Mean live wait, zero for an empty queue
    pub fn average_wait_secs(&self, now: Timestamp) -> f64 {
        if self.vehicles.is_empty() {
            0.0
        } else {
            self.total_wait_secs(now) / self.vehicles.len() as f64
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &SimVehicle> {
        self.vehicles.iter()
    }
}
