//! Core types for the signal simulation
//!
//! Identifiers, compass directions and vehicle kinds shared by every module.

use std::fmt;

/// Simulated time in milliseconds since the start of a run
pub type Timestamp = u64;

/// Convert the span between two timestamps into seconds
pub fn elapsed_secs(since: Timestamp, now: Timestamp) -> f64 {
    now.saturating_sub(since) as f64 / 1000.0
}

/// A wrapper type for intersection IDs
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IntersectionId(pub String);

impl IntersectionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for IntersectionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for IntersectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A wrapper type for vehicle IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VehicleId(pub u64);

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of vehicle waiting at an intersection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VehicleKind {
    Regular,
    PublicTransport,
    /// Triggers signal preemption
    Emergency,
}

impl VehicleKind {
    pub const ALL: [VehicleKind; 3] = [
        VehicleKind::Regular,
        VehicleKind::PublicTransport,
        VehicleKind::Emergency,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            VehicleKind::Regular => "regular",
            VehicleKind::PublicTransport => "public-transport",
            VehicleKind::Emergency => "emergency",
        }
    }
}

impl fmt::Display for VehicleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Approach direction of a queue at an intersection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// Fixed scan order used for tie-breaks, round-robin and emergency selection
    pub const ORDER: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Slot of this direction within `ORDER`
    pub fn index(self) -> usize {
        match self {
            Direction::North => 0,
            Direction::East => 1,
            Direction::South => 2,
            Direction::West => 3,
        }
    }

    /// Next direction in round-robin order (N -> E -> S -> W -> N)
    pub fn next(self) -> Direction {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    pub fn short(&self) -> char {
        match self {
            Direction::North => 'N',
            Direction::East => 'E',
            Direction::South => 'S',
            Direction::West => 'W',
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short())
    }
}

/// A 2D position of an intersection on the map
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}
