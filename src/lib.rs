//! Traffic Signal Simulation Library
//!
//! Adaptive signal control over a small road network, with emergency
//! preemption and congestion-aware routing.

pub mod simulation;
