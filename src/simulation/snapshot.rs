//! Read-only projections of simulation state
//!
//! These are plain values; changing them has no effect on the engine.

use super::config::CongestionBand;
use super::intersection::EmergencyInfo;
use super::types::{Direction, IntersectionId, Position, VehicleId, VehicleKind};

/// Queue metrics for one approach
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionSnapshot {
    pub direction: Direction,
    pub count: usize,
    pub regular: usize,
    pub public_transport: usize,
    pub emergency: usize,
    pub avg_wait_secs: f64,
}

impl DirectionSnapshot {
    pub fn count_of(&self, kind: VehicleKind) -> usize {
        match kind {
            VehicleKind::Regular => self.regular,
            VehicleKind::PublicTransport => self.public_transport,
            VehicleKind::Emergency => self.emergency,
        }
    }
}

/// State of one intersection at a point in simulated time
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionSnapshot {
    pub id: IntersectionId,
    pub position: Position,
    pub congestion_level: f64,
    pub congestion_band: CongestionBand,
    pub active_direction: Direction,
    /// Green seconds allocated to `active_direction`
    pub active_duration: u32,
    /// One entry per approach, in `Direction::ORDER`
    pub per_direction: [DirectionSnapshot; 4],
    pub has_emergency: bool,
    pub emergency_info: Option<EmergencyInfo>,
    pub processed_count: u64,
    pub total_vehicles: usize,
}

impl IntersectionSnapshot {
    pub fn direction(&self, direction: Direction) -> &DirectionSnapshot {
        &self.per_direction[direction.index()]
    }
}

/// Network-wide overview
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkSummary {
    pub intersections: usize,
    pub roads: usize,
    pub queued_vehicles: usize,
    pub emergency_intersections: usize,
    pub average_congestion: f64,
    pub processed_vehicles: u64,
    pub most_congested: Option<IntersectionId>,
}

/// What happened during one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    /// Randomly generated arrival, if the network has any intersection
    pub arrival: Option<(VehicleId, IntersectionId)>,
    /// Intersection that received emergency-mode allocation
    pub dispatched: Option<IntersectionId>,
    pub departures: usize,
    /// Intersections skipped in the normal pass because they still hold an emergency
    pub deferred: Vec<IntersectionId>,
}
