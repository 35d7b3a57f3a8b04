//! Road network graph: intersections, roads and routing
//!
//! Roads are undirected. Routing counts hops; road weights are recorded for
//! display but never compared.

use anyhow::{bail, Context, Result};
use log::{debug, error, warn};
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use rand::seq::IndexedRandom;
use rand::Rng;
use std::collections::{HashMap, VecDeque};

use super::config::ArrivalMix;
use super::intersection::SimIntersection;
use super::types::{Direction, IntersectionId, Timestamp, VehicleId, VehicleKind};
use super::vehicle::SimVehicle;

/// Edge data for the road network graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoadEdge {
    pub weight: u32,
}

impl RoadEdge {
    pub fn new(weight: u32) -> Self {
        // Ensure minimum weight of 1
        Self {
            weight: weight.max(1),
        }
    }
}

/// Owns every intersection and the roads between them
#[derive(Default)]
pub struct SimRoadNetwork {
    /// Node weights are intersection IDs; node order is insertion order
    graph: UnGraph<IntersectionId, RoadEdge>,

    /// Maps intersection IDs to their node indices in the graph
    intersection_to_node: HashMap<IntersectionId, NodeIndex>,

    intersections: HashMap<IntersectionId, SimIntersection>,

    next_vehicle_id: u64,
}

impl SimRoadNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an intersection to the network graph
    pub fn add_intersection(&mut self, intersection: SimIntersection) -> Result<()> {
        let id = intersection.id.clone();
        if self.intersection_to_node.contains_key(&id) {
            bail!("Intersection {} already exists", id);
        }

        let node_index = self.graph.add_node(id.clone());
        self.intersection_to_node.insert(id.clone(), node_index);
        self.intersections.insert(id, intersection);
        Ok(())
    }

    /// Adds an undirected road between two existing intersections
    pub fn add_road(&mut self, a: &IntersectionId, b: &IntersectionId, weight: u32) -> Result<()> {
        let (Some(&a_node), Some(&b_node)) =
            (self.intersection_to_node.get(a), self.intersection_to_node.get(b))
        else {
            bail!(
                "Attempted to add road with non-existent intersections: {}, {}",
                a,
                b
            );
        };

        self.graph.add_edge(a_node, b_node, RoadEdge::new(weight));
        Ok(())
    }

    pub fn intersection(&self, id: &IntersectionId) -> Option<&SimIntersection> {
        self.intersections.get(id)
    }

    pub fn intersection_mut(&mut self, id: &IntersectionId) -> Option<&mut SimIntersection> {
        self.intersections.get_mut(id)
    }

    /// All intersection IDs in the order they were added
    pub fn intersection_ids(&self) -> Vec<IntersectionId> {
        self.graph
            .node_indices()
            .map(|node| self.graph[node].clone())
            .collect()
    }

    /// Intersections in the order they were added
    pub fn intersections(&self) -> impl Iterator<Item = &SimIntersection> {
        self.graph
            .node_indices()
            .filter_map(|node| self.intersections.get(&self.graph[node]))
    }

    /// Get number of intersections
    pub fn intersection_count(&self) -> usize {
        self.intersection_to_node.len()
    }

    /// Get number of roads
    pub fn road_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Every road as (endpoint, endpoint, weight), in the order added
    pub fn roads(&self) -> Vec<(IntersectionId, IntersectionId, u32)> {
        self.graph
            .edge_references()
            .map(|edge| {
                (
                    self.graph[edge.source()].clone(),
                    self.graph[edge.target()].clone(),
                    edge.weight().weight,
                )
            })
            .collect()
    }

    /// Neighbors of an intersection with road weights, in road insertion order
    pub fn neighbors(&self, id: &IntersectionId) -> Vec<(IntersectionId, u32)> {
        let Some(&node) = self.intersection_to_node.get(id) else {
            return Vec::new();
        };

        let mut edges: Vec<_> = self
            .graph
            .edges(node)
            .map(|edge| {
                let other = if edge.source() == node {
                    edge.target()
                } else {
                    edge.source()
                };
                (edge.id(), other, edge.weight().weight)
            })
            .collect();
        edges.sort_by_key(|(edge_id, _, _)| edge_id.index());

        edges
            .into_iter()
            .map(|(_, other, weight)| (self.graph[other].clone(), weight))
            .collect()
    }

    /// Finds a route between two intersections by breadth-first search
    ///
    /// The route includes both endpoints. With `avoid_threshold` set, any
    /// neighbor whose congestion is above it is never entered. An empty route
    /// means an endpoint is unknown or no route exists.
    pub fn find_path(
        &self,
        start: &IntersectionId,
        end: &IntersectionId,
        avoid_threshold: Option<f64>,
    ) -> Vec<IntersectionId> {
        if !self.intersections.contains_key(start) || !self.intersections.contains_key(end) {
            error!("Start or end intersection not found for pathfinding.");
            return Vec::new();
        }

        let mut predecessors: HashMap<IntersectionId, IntersectionId> = HashMap::new();
        let mut visited: HashMap<IntersectionId, u32> = HashMap::new();
        let mut queue = VecDeque::new();

        visited.insert(start.clone(), 0);
        queue.push_back(start.clone());

        while let Some(current) = queue.pop_front() {
            if &current == end {
                break;
            }
            let hops = visited.get(&current).copied().unwrap_or_default();
            for (neighbor, _weight) in self.neighbors(&current) {
                let congested = match (avoid_threshold, self.intersections.get(&neighbor)) {
                    (Some(threshold), Some(intersection)) => {
                        intersection.congestion_level() > threshold
                    }
                    _ => false,
                };
                if congested || visited.contains_key(&neighbor) {
                    continue;
                }
                visited.insert(neighbor.clone(), hops + 1);
                predecessors.insert(neighbor.clone(), current.clone());
                queue.push_back(neighbor);
            }
        }

        let mut path = VecDeque::new();
        let mut current = Some(end.clone());
        while let Some(id) = current {
            current = predecessors.get(&id).cloned();
            path.push_front(id);
            if path.len() > self.intersection_count() + 1 {
                return Vec::new();
            }
        }

        if path.front() == Some(start) {
            path.into()
        } else {
            Vec::new()
        }
    }

    /// Sum of recorded road weights along a route, `None` if a hop has no road
    pub fn path_weight(&self, path: &[IntersectionId]) -> Option<u32> {
        path.windows(2).try_fold(0, |total, pair| {
            self.neighbors(&pair[0])
                .into_iter()
                .filter(|(other, _)| other == &pair[1])
                .map(|(_, weight)| weight)
                .min()
                .map(|weight| total + weight)
        })
    }

    fn next_vehicle_id(&mut self) -> VehicleId {
        let id = VehicleId(self.next_vehicle_id);
        self.next_vehicle_id += 1;
        id
    }

    /// Queue a new vehicle at a specific intersection
    pub fn add_vehicle_at(
        &mut self,
        target: &IntersectionId,
        kind: VehicleKind,
        direction: Direction,
        now: Timestamp,
    ) -> Result<VehicleId> {
        if !self.intersections.contains_key(target) {
            bail!("Intersection {} not found", target);
        }
        let id = self.next_vehicle_id();
        self.intersections
            .get_mut(target)
            .context("Intersection disappeared while adding vehicle")?
            .add_vehicle(SimVehicle::new(id, kind, direction, now), now);
        Ok(id)
    }

    /// Generate one vehicle at a uniformly random intersection and approach
    ///
    /// The kind is drawn from `mix` unless `forced` is given. Returns `None`
    /// when the network has no intersections.
    pub fn generate_vehicle<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        forced: Option<VehicleKind>,
        mix: &ArrivalMix,
        now: Timestamp,
    ) -> Option<(VehicleId, IntersectionId)> {
        let ids = self.intersection_ids();
        let target = ids.choose(rng)?.clone();

        let kind = match forced {
            Some(kind) => kind,
            None => {
                let weighted = [
                    (VehicleKind::Regular, mix.regular),
                    (VehicleKind::PublicTransport, mix.public_transport),
                    (VehicleKind::Emergency, mix.emergency),
                ];
                match weighted.choose_weighted(rng, |(_, weight)| *weight) {
                    Ok((kind, _)) => *kind,
                    Err(e) => {
                        warn!("Invalid arrival mix ({}), generating a regular vehicle", e);
                        VehicleKind::Regular
                    }
                }
            }
        };
        let direction = *Direction::ORDER.choose(rng)?;

        match self.add_vehicle_at(&target, kind, direction, now) {
            Ok(id) => {
                debug!("Generated {} vehicle {} at {} going {}", kind, id, target, direction);
                Some((id, target))
            }
            Err(e) => {
                warn!("Failed to generate vehicle: {:#}", e);
                None
            }
        }
    }
}
