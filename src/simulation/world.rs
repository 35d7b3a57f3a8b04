//! Main simulation world that ties everything together
//!
//! `SimWorld` is the single owned context of a run. An external driver calls
//! `tick` at a fixed interval; displays read `snapshot` between ticks.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use ordered_float::OrderedFloat;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::config::SimConfig;
use super::dispatch::DispatchHeap;
use super::intersection::SimIntersection;
use super::road_network::SimRoadNetwork;
use super::snapshot::{IntersectionSnapshot, NetworkSummary, TickReport};
use super::types::{Direction, IntersectionId, Position, Timestamp, VehicleId, VehicleKind};

/// An intersection to create at setup
#[derive(Debug, Clone)]
pub struct IntersectionSpec {
    pub id: IntersectionId,
    pub position: Position,
}

impl IntersectionSpec {
    pub fn new(id: impl Into<String>, x: f32, y: f32) -> Self {
        Self {
            id: IntersectionId::new(id),
            position: Position::new(x, y),
        }
    }
}

/// A road to create at setup
#[derive(Debug, Clone)]
pub struct RoadSpec {
    pub a: IntersectionId,
    pub b: IntersectionId,
    pub weight: u32,
}

impl RoadSpec {
    pub fn new(a: &str, b: &str, weight: u32) -> Self {
        Self {
            a: a.into(),
            b: b.into(),
            weight,
        }
    }
}

/// The main simulation world
pub struct SimWorld {
    /// Intersections and roads
    network: SimRoadNetwork,

    /// Intersections competing for emergency-mode service
    dispatch: DispatchHeap<IntersectionId>,

    config: SimConfig,

    /// Simulated clock
    time: Timestamp,

    ticks: u64,

    /// Optional seeded RNG for reproducible simulations
    rng: Option<StdRng>,
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl SimWorld {
    fn new_internal(config: SimConfig, rng: Option<StdRng>) -> Self {
        Self {
            network: SimRoadNetwork::new(),
            dispatch: DispatchHeap::new(),
            config,
            time: 0,
            ticks: 0,
            rng,
        }
    }

    pub fn new() -> Self {
        Self::new_internal(SimConfig::default(), None)
    }

    pub fn with_config(config: SimConfig) -> Self {
        Self::new_internal(config, None)
    }

    /// Create a new SimWorld with a seeded RNG for reproducible simulations
    pub fn with_seed(config: SimConfig, seed: u64) -> Self {
        Self::new_internal(config, Some(StdRng::seed_from_u64(seed)))
    }

    /// Build the network in one go
    pub fn initialize(
        mut self,
        intersections: &[IntersectionSpec],
        roads: &[RoadSpec],
    ) -> Result<Self> {
        for spec in intersections {
            self.add_intersection(spec.id.clone(), spec.position)?;
        }
        for road in roads {
            self.add_road(&road.a, &road.b, road.weight)
                .with_context(|| format!("Failed to add road {}-{}", road.a, road.b))?;
        }
        Ok(self)
    }

    /// Add an intersection configured from this world's timing plan
    pub fn add_intersection(&mut self, id: IntersectionId, position: Position) -> Result<()> {
        let intersection = SimIntersection::with_config(
            id,
            position,
            self.config.timing,
            self.config.congestion,
        );
        self.network.add_intersection(intersection)
    }

    pub fn add_road(&mut self, a: &IntersectionId, b: &IntersectionId, weight: u32) -> Result<()> {
        self.network.add_road(a, b, weight)
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn network(&self) -> &SimRoadNetwork {
        &self.network
    }

    pub fn dispatch(&self) -> &DispatchHeap<IntersectionId> {
        &self.dispatch
    }

    /// Current simulated time in milliseconds
    pub fn time(&self) -> Timestamp {
        self.time
    }

    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// Dispatch priority of an intersection as currently stored in the network
    pub fn priority_score(&self, id: &IntersectionId) -> u64 {
        priority_of(&self.network, self.config.emergency_priority_offset, id)
    }

    /// Inject one vehicle at a random intersection; `kind` forces its type
    pub fn add_vehicle(&mut self, kind: Option<VehicleKind>) -> Option<(VehicleId, IntersectionId)> {
        let now = self.time;
        let mix = self.config.arrivals;
        match &mut self.rng {
            Some(rng) => self.network.generate_vehicle(rng, kind, &mix, now),
            None => self.network.generate_vehicle(&mut rand::rng(), kind, &mix, now),
        }
    }

    pub fn add_emergency_vehicle(&mut self) -> Option<(VehicleId, IntersectionId)> {
        self.add_vehicle(Some(VehicleKind::Emergency))
    }

    /// Inject a vehicle at a known intersection and approach
    ///
    /// An unknown intersection is logged and nothing is queued.
    pub fn add_vehicle_at(
        &mut self,
        target: &IntersectionId,
        kind: VehicleKind,
        direction: Direction,
    ) -> Option<VehicleId> {
        match self.network.add_vehicle_at(target, kind, direction, self.time) {
            Ok(id) => Some(id),
            Err(e) => {
                warn!("{:#}", e);
                None
            }
        }
    }

    /// Shortest route by hop count, optionally avoiding congested intersections
    pub fn find_path(
        &self,
        start: &IntersectionId,
        end: &IntersectionId,
        avoid_congested: bool,
    ) -> Vec<IntersectionId> {
        let threshold = avoid_congested.then_some(self.config.congestion.avoid_threshold);
        self.network.find_path(start, end, threshold)
    }

    /// Bring every intersection's dispatch membership up to date
    fn refresh_dispatch(&mut self) {
        let offset = self.config.emergency_priority_offset;
        let network = &self.network;
        let score = |id: &IntersectionId| priority_of(network, offset, id);

        for intersection in network.intersections() {
            if intersection.has_emergency() || intersection.total_vehicles() > 0 {
                self.dispatch.update(intersection.id.clone(), score);
            } else {
                self.dispatch.remove(&intersection.id, score);
            }
        }
    }

    /// Serve the top-priority intersection in emergency mode
    fn dispatch_top(&mut self, now: Timestamp, report: &mut TickReport) {
        let offset = self.config.emergency_priority_offset;
        let interval = self.config.tick_interval_ms;

        let top = {
            let network = &self.network;
            self.dispatch
                .extract_max(|id: &IntersectionId| priority_of(network, offset, id))
        };
        let Some(id) = top else {
            return;
        };

        let Some(intersection) = self.network.intersection_mut(&id) else {
            warn!("Dispatched intersection {} is not in the network", id);
            return;
        };
        intersection.update_green_allocation(true);
        let departed = intersection.process_vehicles(interval, now);
        let still_active = intersection.has_emergency() || intersection.total_vehicles() > 0;
        debug!(
            "Dispatched {} in emergency mode: green {} for {}s, {} departed",
            id,
            intersection.current_green(),
            intersection.green_duration(intersection.current_green()),
            departed.len()
        );
        report.departures += departed.len();

        if still_active {
            let network = &self.network;
            self.dispatch
                .insert(id.clone(), |key: &IntersectionId| priority_of(network, offset, key));
        }
        report.dispatched = Some(id);
    }

    /// Normal-mode allocation and departures for every other intersection
    fn serve_normal(&mut self, now: Timestamp, report: &mut TickReport) {
        let interval = self.config.tick_interval_ms;
        let preempted = report.dispatched.is_some();

        for id in self.network.intersection_ids() {
            if report.dispatched.as_ref() == Some(&id) {
                continue;
            }
            let Some(intersection) = self.network.intersection_mut(&id) else {
                continue;
            };
            // Held back until it surfaces at the top of the dispatch heap.
            if preempted && intersection.has_emergency() {
                report.deferred.push(id);
                continue;
            }
            intersection.update_green_allocation(false);
            report.departures += intersection.process_vehicles(interval, now).len();
        }
    }

    /// Main simulation tick
    pub fn tick(&mut self) -> TickReport {
        self.time += self.config.tick_interval_ms;
        self.ticks += 1;
        let now = self.time;

        let mut report = TickReport {
            tick: self.ticks,
            arrival: self.add_vehicle(None),
            ..TickReport::default()
        };

        self.refresh_dispatch();
        self.dispatch_top(now, &mut report);
        self.serve_normal(now, &mut report);

        report
    }

    /// Read-only view of one intersection, `None` for an unknown ID
    pub fn snapshot(&self, id: &IntersectionId) -> Option<IntersectionSnapshot> {
        self.network
            .intersection(id)
            .map(|intersection| intersection.snapshot(self.time))
    }

    /// Views of every intersection in network order
    pub fn snapshots(&self) -> Vec<IntersectionSnapshot> {
        self.network
            .intersections()
            .map(|intersection| intersection.snapshot(self.time))
            .collect()
    }

    /// Calculate network-wide metrics
    pub fn summary(&self) -> NetworkSummary {
        let count = self.network.intersection_count();
        let mut queued_vehicles = 0;
        let mut emergency_intersections = 0;
        let mut congestion_sum = 0.0;
        let mut processed_vehicles = 0;

        for intersection in self.network.intersections() {
            queued_vehicles += intersection.total_vehicles();
            if intersection.has_emergency() {
                emergency_intersections += 1;
            }
            congestion_sum += intersection.congestion_level();
            processed_vehicles += intersection.processed_count();
        }

        let most_congested = self
            .network
            .intersections()
            .filter(|i| i.congestion_level() > 0.0)
            .max_by_key(|i| OrderedFloat(i.congestion_level()))
            .map(|i| i.id.clone());

        NetworkSummary {
            intersections: count,
            roads: self.network.road_count(),
            queued_vehicles,
            emergency_intersections,
            average_congestion: if count > 0 {
                congestion_sum / count as f64
            } else {
                0.0
            },
            processed_vehicles,
            most_congested,
        }
    }

    /// Log a summary of the world state
    pub fn log_summary(&self) {
        let summary = self.summary();
        info!(
            "Tick {} ({:.1}s): queued={}, emergencies={}, avg congestion={:.1}%, processed={}",
            self.ticks,
            self.time as f64 / 1000.0,
            summary.queued_vehicles,
            summary.emergency_intersections,
            summary.average_congestion,
            summary.processed_vehicles
        );
        for snapshot in self.snapshots() {
            let queues: Vec<String> = snapshot
                .per_direction
                .iter()
                .map(|d| format!("{}:{}(E:{})", d.direction, d.count, d.emergency))
                .collect();
            info!(
                "  {} {} green={} ({}s) congestion={:.1}% [{}] processed={}",
                snapshot.id,
                if snapshot.has_emergency { "EMERGENCY" } else { "normal" },
                snapshot.active_direction,
                snapshot.active_duration,
                snapshot.congestion_level,
                queues.join(" "),
                snapshot.processed_count
            );
        }
    }

    /// Create the five-intersection demo network
    pub fn create_demo_world(config: SimConfig, seed: Option<u64>) -> Result<Self> {
        let world = match seed {
            Some(seed) => Self::with_seed(config, seed),
            None => Self::with_config(config),
        };
        world.initialize(&demo_intersections(), &demo_roads())
    }
}

/// Demo intersections A..E
pub fn demo_intersections() -> Vec<IntersectionSpec> {
    vec![
        IntersectionSpec::new("A", 100.0, 100.0),
        IntersectionSpec::new("B", 300.0, 100.0),
        IntersectionSpec::new("C", 100.0, 300.0),
        IntersectionSpec::new("D", 300.0, 300.0),
        IntersectionSpec::new("E", 500.0, 200.0),
    ]
}

/// Demo roads; A-E is the only weight 2 road
pub fn demo_roads() -> Vec<RoadSpec> {
    vec![
        RoadSpec::new("A", "B", 1),
        RoadSpec::new("A", "C", 1),
        RoadSpec::new("B", "D", 1),
        RoadSpec::new("C", "D", 1),
        RoadSpec::new("B", "E", 1),
        RoadSpec::new("D", "E", 1),
        RoadSpec::new("A", "E", 2),
    ]
}

fn priority_of(network: &SimRoadNetwork, offset: u64, id: &IntersectionId) -> u64 {
    network
        .intersection(id)
        .map(|intersection| intersection.priority_score(offset))
        .unwrap_or(0)
}
