//! Signalised intersection controller
//!
//! Each intersection owns one queue per approach, decides which approach is
//! green and for how long, and releases vehicles at a fixed discharge rate
//! while green.

use super::config::{CongestionModel, SignalTiming};
use super::queue::DirectionalQueue;
use super::snapshot::{DirectionSnapshot, IntersectionSnapshot};
use super::types::{Direction, IntersectionId, Position, Timestamp, VehicleKind};
use super::vehicle::SimVehicle;

/// Details recorded when an emergency vehicle arrives
#[derive(Debug, Clone, PartialEq)]
pub struct EmergencyInfo {
    pub kind: VehicleKind,
    pub location: IntersectionId,
    pub time: Timestamp,
    pub intended_direction: Direction,
}

/// An intersection in the signal simulation
#[derive(Debug, Clone)]
pub struct SimIntersection {
    pub id: IntersectionId,
    pub position: Position,
    queues: [DirectionalQueue; 4],
    current_green: Direction,
    /// Allocated green seconds, indexed by `Direction::index`
    green_duration: [u32; 4],
    timing: SignalTiming,
    congestion_model: CongestionModel,
    congestion_level: f64,
    has_emergency: bool,
    emergency_info: Option<EmergencyInfo>,
    processed_count: u64,
}

impl SimIntersection {
    pub fn new(id: IntersectionId, position: Position) -> Self {
        Self::with_config(id, position, SignalTiming::default(), CongestionModel::default())
    }

    pub fn with_config(
        id: IntersectionId,
        position: Position,
        timing: SignalTiming,
        congestion_model: CongestionModel,
    ) -> Self {
        Self {
            id,
            position,
            queues: Default::default(),
            current_green: Direction::North,
            green_duration: [0; 4],
            timing,
            congestion_model,
            congestion_level: 0.0,
            has_emergency: false,
            emergency_info: None,
            processed_count: 0,
        }
    }

    pub fn queue(&self, direction: Direction) -> &DirectionalQueue {
        &self.queues[direction.index()]
    }

    fn queue_mut(&mut self, direction: Direction) -> &mut DirectionalQueue {
        &mut self.queues[direction.index()]
    }

    pub fn current_green(&self) -> Direction {
        self.current_green
    }

    pub fn green_duration(&self, direction: Direction) -> u32 {
        self.green_duration[direction.index()]
    }

    /// Green seconds for every approach in `Direction::ORDER`
    pub fn green_durations(&self) -> [u32; 4] {
        self.green_duration
    }

    pub fn congestion_level(&self) -> f64 {
        self.congestion_level
    }

    pub fn has_emergency(&self) -> bool {
        self.has_emergency
    }

    pub fn emergency_info(&self) -> Option<&EmergencyInfo> {
        self.emergency_info.as_ref()
    }

    pub fn processed_count(&self) -> u64 {
        self.processed_count
    }

    pub fn timing(&self) -> &SignalTiming {
        &self.timing
    }

    pub fn total_vehicles(&self) -> usize {
        self.queues.iter().map(DirectionalQueue::size).sum()
    }

    /// Dispatch priority: emergency presence dominates the raw vehicle count
    pub fn priority_score(&self, emergency_offset: u64) -> u64 {
        let vehicles = self.total_vehicles() as u64;
        if self.has_emergency {
            emergency_offset + vehicles
        } else {
            vehicles
        }
    }

    /// Queue an arriving vehicle on its approach
    pub fn add_vehicle(&mut self, vehicle: SimVehicle, now: Timestamp) {
        if vehicle.is_emergency() {
            self.has_emergency = true;
            self.emergency_info = Some(EmergencyInfo {
                kind: vehicle.kind,
                location: self.id.clone(),
                time: now,
                intended_direction: vehicle.direction,
            });
        }
        self.queue_mut(vehicle.direction).enqueue(vehicle);
        self.update_congestion(now);
    }

    /// Release vehicles from the green approach for one tick
    ///
    /// At most `green seconds * tick seconds * discharge rate` vehicles leave,
    /// front first. Returns the departed vehicles with their wait stamped.
    pub fn process_vehicles(&mut self, tick_interval_ms: u64, now: Timestamp) -> Vec<SimVehicle> {
        let green = self.current_green;
        if self.queue(green).is_empty() {
            return Vec::new();
        }

        let capacity = (self.green_duration(green) as f64
            * (tick_interval_ms as f64 / 1000.0)
            * self.timing.discharge_rate)
            .floor() as usize;
        let to_move = self.queue(green).size().min(capacity);

        let mut departed = Vec::with_capacity(to_move);
        for _ in 0..to_move {
            let Some(mut vehicle) = self.queue_mut(green).dequeue() else {
                break;
            };
            vehicle.stamp_departure(now);
            self.processed_count += 1;
            departed.push(vehicle);
        }

        // Only the green approach is rescanned here; the next allocation pass
        // rescans all four.
        if self.has_emergency && !self.queue(green).has_emergency() {
            self.has_emergency = false;
            self.emergency_info = None;
        }

        self.update_congestion(now);
        departed
    }

    /// Recompute green allocation for this tick
    ///
    /// With `emergency_override` set and an emergency vehicle queued, the first
    /// approach (N, E, S, W) holding one gets the full emergency green and all
    /// others get nothing. Otherwise the base cycle is split in proportion to
    /// queue length.
    pub fn update_green_allocation(&mut self, emergency_override: bool) {
        self.has_emergency = self.queues.iter().any(DirectionalQueue::has_emergency);
        if !self.has_emergency {
            self.emergency_info = None;
        }

        if emergency_override && self.has_emergency {
            if let Some(direction) = Direction::ORDER
                .into_iter()
                .find(|d| self.queue(*d).has_emergency())
            {
                self.current_green = direction;
                self.green_duration = [0; 4];
                self.green_duration[direction.index()] = self.timing.emergency_green;
                return;
            }
        }

        let mut total_queue_length = 0;
        let mut longest_queue_direction = self.current_green;
        let mut max_queue_length = 0;
        for direction in Direction::ORDER {
            let size = self.queue(direction).size();
            total_queue_length += size;
            if size > max_queue_length {
                max_queue_length = size;
                longest_queue_direction = direction;
            }
        }

        if total_queue_length == 0 {
            self.green_duration = [0; 4];
            self.current_green = self.current_green.next();
            self.green_duration[self.current_green.index()] = self.timing.min_green;
            return;
        }

        let cycle = self.timing.base_cycle;
        let mut allocated = 0;
        for direction in Direction::ORDER {
            let size = self.queue(direction).size();
            let duration = if size > 0 {
                let share =
                    ((size as f64 / total_queue_length as f64) * cycle as f64).floor() as u32;
                share.min(self.timing.max_green).max(self.timing.min_green)
            } else {
                0
            };
            self.green_duration[direction.index()] = duration;
            allocated += duration;
        }

        // The shortfall top-up is not re-clamped and may exceed max_green.
        let longest = longest_queue_direction.index();
        if allocated == 0 {
            self.green_duration[longest] = self.timing.min_green;
        } else if allocated < cycle {
            self.green_duration[longest] += cycle - allocated;
        }

        let current = self.current_green;
        if self.green_duration(current) == 0 || self.queue(current).is_empty() {
            let mut next = longest_queue_direction;
            if next == current && total_queue_length > max_queue_length {
                next = current.next();
            }
            self.current_green = next;
        }
    }

    /// Rebuild the congestion score from the queues as they are at `now`
    pub fn update_congestion(&mut self, now: Timestamp) {
        let waiting = self.total_vehicles();
        let total_wait: f64 = self.queues.iter().map(|q| q.total_wait_secs(now)).sum();
        let avg_wait = if waiting > 0 {
            total_wait / waiting as f64
        } else {
            0.0
        };
        self.congestion_level = self.congestion_model.score(waiting, avg_wait);
    }

    /// Read-only view of this intersection for displays
    pub fn snapshot(&self, now: Timestamp) -> IntersectionSnapshot {
        let per_direction = Direction::ORDER.map(|direction| {
            let queue = self.queue(direction);
            DirectionSnapshot {
                direction,
                count: queue.size(),
                regular: queue.count_by_kind(VehicleKind::Regular),
                public_transport: queue.count_by_kind(VehicleKind::PublicTransport),
                emergency: queue.count_by_kind(VehicleKind::Emergency),
                avg_wait_secs: queue.average_wait_secs(now),
            }
        });

        IntersectionSnapshot {
            id: self.id.clone(),
            position: self.position,
            congestion_level: self.congestion_level,
            congestion_band: self.congestion_model.band(self.congestion_level),
            active_direction: self.current_green,
            active_duration: self.green_duration(self.current_green),
            per_direction,
            has_emergency: self.has_emergency,
            emergency_info: self.emergency_info.clone(),
            processed_count: self.processed_count,
            total_vehicles: self.total_vehicles(),
        }
    }
}
