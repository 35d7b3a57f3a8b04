//! Tunable parameters for the signal simulation
//!
//! The defaults reproduce the reference timing plan. Every value can be
//! overridden by building a `SimConfig` by hand or through the CLI.

/// Interval between ticks of the external driver
pub const TICK_INTERVAL_MS: u64 = 500;

/// Signal timing defaults (seconds)
pub const MIN_GREEN_SECS: u32 = 5;
pub const MAX_GREEN_SECS: u32 = 30;
pub const EMERGENCY_GREEN_SECS: u32 = 25;
pub const BASE_CYCLE_SECS: u32 = 45;

/// Vehicles released per second of allocated green
pub const DISCHARGE_RATE: f64 = 2.0;

/// Congestion score weights
pub const CONGESTION_PER_VEHICLE: f64 = 5.0;
pub const CONGESTION_PER_WAIT_SEC: f64 = 2.0;

/// Congestion thresholds (0-100 scale)
pub const ROUTE_AVOID_THRESHOLD: f64 = 60.0;
pub const HIGH_CONGESTION_THRESHOLD: f64 = 70.0;
pub const LOW_CONGESTION_THRESHOLD: f64 = 30.0;

/// Added to the vehicle count of an intersection holding an emergency vehicle
pub const EMERGENCY_PRIORITY_OFFSET: u64 = 1000;

/// Relative arrival weights per vehicle kind
pub const ARRIVAL_WEIGHT_REGULAR: u32 = 4;
pub const ARRIVAL_WEIGHT_PUBLIC_TRANSPORT: u32 = 1;
pub const ARRIVAL_WEIGHT_EMERGENCY: u32 = 1;

/// Green-time allocation parameters of one intersection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalTiming {
    pub min_green: u32,
    pub max_green: u32,
    pub emergency_green: u32,
    pub base_cycle: u32,
    pub discharge_rate: f64,
}

impl Default for SignalTiming {
    fn default() -> Self {
        Self {
            min_green: MIN_GREEN_SECS,
            max_green: MAX_GREEN_SECS,
            emergency_green: EMERGENCY_GREEN_SECS,
            base_cycle: BASE_CYCLE_SECS,
            discharge_rate: DISCHARGE_RATE,
        }
    }
}

/// How queue state is turned into a congestion score, and how that score is read
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CongestionModel {
    pub vehicle_weight: f64,
    pub wait_weight: f64,
    /// Routing skips intersections strictly above this level
    pub avoid_threshold: f64,
    pub high_threshold: f64,
    pub low_threshold: f64,
}

impl Default for CongestionModel {
    fn default() -> Self {
        Self {
            vehicle_weight: CONGESTION_PER_VEHICLE,
            wait_weight: CONGESTION_PER_WAIT_SEC,
            avoid_threshold: ROUTE_AVOID_THRESHOLD,
            high_threshold: HIGH_CONGESTION_THRESHOLD,
            low_threshold: LOW_CONGESTION_THRESHOLD,
        }
    }
}

impl CongestionModel {
    /// Score for `waiting` vehicles with the given average wait
    pub fn score(&self, waiting: usize, avg_wait_secs: f64) -> f64 {
        (waiting as f64 * self.vehicle_weight + avg_wait_secs * self.wait_weight).clamp(0.0, 100.0)
    }

    pub fn band(&self, level: f64) -> CongestionBand {
        if level > self.high_threshold {
            CongestionBand::High
        } else if level < self.low_threshold {
            CongestionBand::Low
        } else {
            CongestionBand::Moderate
        }
    }
}

/// Coarse congestion classification used by displays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CongestionBand {
    Low,
    Moderate,
    High,
}

/// Weights for the kind of randomly generated arrivals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrivalMix {
    pub regular: u32,
    pub public_transport: u32,
    pub emergency: u32,
}

impl Default for ArrivalMix {
    fn default() -> Self {
        Self {
            regular: ARRIVAL_WEIGHT_REGULAR,
            public_transport: ARRIVAL_WEIGHT_PUBLIC_TRANSPORT,
            emergency: ARRIVAL_WEIGHT_EMERGENCY,
        }
    }
}

/// Complete configuration of one simulation run
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    pub tick_interval_ms: u64,
    pub timing: SignalTiming,
    pub congestion: CongestionModel,
    pub emergency_priority_offset: u64,
    pub arrivals: ArrivalMix,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: TICK_INTERVAL_MS,
            timing: SignalTiming::default(),
            congestion: CongestionModel::default(),
            emergency_priority_offset: EMERGENCY_PRIORITY_OFFSET,
            arrivals: ArrivalMix::default(),
        }
    }
}
