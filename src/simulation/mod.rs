//! Standalone signal simulation module
//!
//! This module contains the whole engine: queues, intersection controllers,
//! the dispatch heap, the road network and the tick orchestrator. It has no
//! presentation dependencies and can be driven from tests or the console.

mod config;
mod dispatch;
mod intersection;
mod queue;
mod road_network;
mod snapshot;
mod types;
mod vehicle;
mod world;

pub use config::{
    ArrivalMix, CongestionBand, CongestionModel, SignalTiming, SimConfig, BASE_CYCLE_SECS,
    CONGESTION_PER_VEHICLE, CONGESTION_PER_WAIT_SEC, DISCHARGE_RATE, EMERGENCY_GREEN_SECS,
    EMERGENCY_PRIORITY_OFFSET, HIGH_CONGESTION_THRESHOLD, LOW_CONGESTION_THRESHOLD,
    MAX_GREEN_SECS, MIN_GREEN_SECS, ROUTE_AVOID_THRESHOLD, TICK_INTERVAL_MS,
};
pub use dispatch::DispatchHeap;
pub use intersection::{EmergencyInfo, SimIntersection};
pub use queue::DirectionalQueue;
pub use road_network::{RoadEdge, SimRoadNetwork};
pub use snapshot::{DirectionSnapshot, IntersectionSnapshot, NetworkSummary, TickReport};
pub use types::{elapsed_secs, Direction, IntersectionId, Position, Timestamp, VehicleId, VehicleKind};
pub use vehicle::SimVehicle;
pub use world::{demo_intersections, demo_roads, IntersectionSpec, RoadSpec, SimWorld};
