//! Tick protocol, emergency preemption and snapshots

use traffic_signal_sim::simulation::{
    ArrivalMix, CongestionBand, Direction, IntersectionId, IntersectionSpec, RoadSpec, SimConfig,
    SimWorld, VehicleKind,
};

fn id(name: &str) -> IntersectionId {
    IntersectionId::new(name)
}

/// Config whose random arrivals are always regular vehicles
fn regular_only() -> SimConfig {
    SimConfig {
        arrivals: ArrivalMix {
            regular: 1,
            public_transport: 0,
            emergency: 0,
        },
        ..SimConfig::default()
    }
}

fn demo(config: SimConfig, seed: u64) -> SimWorld {
    SimWorld::create_demo_world(config, Some(seed)).expect("demo world builds")
}

fn queued_plus_processed(world: &SimWorld) -> u64 {
    world
        .snapshots()
        .iter()
        .map(|s| s.total_vehicles as u64 + s.processed_count)
        .sum()
}

#[test]
fn test_initialize_builds_network() {
    let world = demo(SimConfig::default(), 1);
    assert_eq!(world.network().intersection_count(), 5);
    assert_eq!(world.network().road_count(), 7);
    assert_eq!(world.time(), 0);
    assert!(world.dispatch().is_empty());
}

#[test]
fn test_initialize_rejects_bad_road() {
    let result = SimWorld::new().initialize(
        &[IntersectionSpec::new("A", 0.0, 0.0)],
        &[RoadSpec::new("A", "B", 1)],
    );
    assert!(result.is_err());
}

#[test]
fn test_each_tick_generates_one_arrival() {
    let mut world = demo(SimConfig::default(), 7);
    for tick in 1..=50u64 {
        let report = world.tick();
        assert_eq!(report.tick, tick);
        assert!(report.arrival.is_some());
        // Vehicles are neither lost nor duplicated
        assert_eq!(queued_plus_processed(&world), tick);
    }
    assert_eq!(world.time(), 50 * 500);
}

#[test]
fn test_dispatch_heap_tracks_busy_intersections() {
    let mut world = demo(SimConfig::default(), 11);
    for _ in 0..100 {
        world.tick();
        let heap = world.dispatch();
        assert!(heap.len() <= world.network().intersection_count());
        let mut seen = std::collections::HashSet::new();
        for key in heap.iter() {
            assert!(seen.insert(key.clone()), "{} appears twice", key);
            assert!(world.snapshot(key).is_some());
        }
    }
}

#[test]
fn test_emergency_intersection_is_dispatched() {
    let mut world = demo(regular_only(), 3);
    world.add_vehicle_at(&id("A"), VehicleKind::Emergency, Direction::North);
    world.add_vehicle_at(&id("B"), VehicleKind::Regular, Direction::East);
    world.add_vehicle_at(&id("B"), VehicleKind::Regular, Direction::East);

    let report = world.tick();

    assert_eq!(report.dispatched, Some(id("A")));
    let a = world.snapshot(&id("A")).unwrap();
    assert!(!a.has_emergency);
    assert!(a.emergency_info.is_none());
    assert!(a.processed_count >= 1);
    assert_eq!(a.direction(Direction::North).emergency, 0);
}

#[test]
fn test_other_emergencies_are_deferred() {
    let mut world = demo(regular_only(), 5);
    world.add_vehicle_at(&id("A"), VehicleKind::Emergency, Direction::North);
    world.add_vehicle_at(&id("A"), VehicleKind::Regular, Direction::East);
    world.add_vehicle_at(&id("C"), VehicleKind::Emergency, Direction::West);

    let first = world.tick();
    assert_eq!(first.dispatched, Some(id("A")));
    assert_eq!(first.deferred, vec![id("C")]);

    let c = world.snapshot(&id("C")).unwrap();
    assert!(c.has_emergency);
    assert_eq!(c.processed_count, 0);

    let second = world.tick();
    assert_eq!(second.dispatched, Some(id("C")));
    let c = world.snapshot(&id("C")).unwrap();
    assert!(!c.has_emergency);
    assert!(c.processed_count >= 1);
}

#[test]
fn test_busiest_intersection_dispatched_without_emergencies() {
    let mut world = demo(regular_only(), 8);
    for _ in 0..6 {
        world.add_vehicle_at(&id("D"), VehicleKind::Regular, Direction::South);
    }

    let report = world.tick();
    assert_eq!(report.dispatched, Some(id("D")));
    assert!(report.deferred.is_empty());
}

#[test]
fn test_unknown_vehicle_target_is_noop() {
    let mut world = demo(SimConfig::default(), 2);
    assert!(world
        .add_vehicle_at(&id("Z"), VehicleKind::Regular, Direction::North)
        .is_none());
    assert_eq!(world.summary().queued_vehicles, 0);
}

#[test]
fn test_add_emergency_vehicle() {
    let mut world = demo(SimConfig::default(), 4);
    let (_, at) = world.add_emergency_vehicle().unwrap();
    let snapshot = world.snapshot(&at).unwrap();
    assert!(snapshot.has_emergency);
    assert_eq!(world.summary().emergency_intersections, 1);
    assert_eq!(world.priority_score(&at), 1001);
}

#[test]
fn test_snapshot_is_idempotent() {
    let mut world = demo(SimConfig::default(), 13);
    for _ in 0..10 {
        world.tick();
    }
    for intersection in world.network().intersection_ids() {
        assert_eq!(world.snapshot(&intersection), world.snapshot(&intersection));
    }
    assert_eq!(world.snapshots(), world.snapshots());
    assert_eq!(world.summary(), world.summary());
}

#[test]
fn test_unknown_snapshot() {
    let world = demo(SimConfig::default(), 1);
    assert!(world.snapshot(&id("Q")).is_none());
}

#[test]
fn test_world_find_path_uses_avoid_threshold() {
    let mut world = demo(regular_only(), 6);
    for _ in 0..13 {
        world.add_vehicle_at(&id("B"), VehicleKind::Regular, Direction::West);
    }
    assert_eq!(world.snapshot(&id("B")).unwrap().congestion_band, CongestionBand::Moderate);

    let plain = world.find_path(&id("A"), &id("D"), false);
    let avoiding = world.find_path(&id("A"), &id("D"), true);
    assert_eq!(plain, vec![id("A"), id("B"), id("D")]);
    assert_eq!(avoiding, vec![id("A"), id("C"), id("D")]);
}

#[test]
fn test_summary_counts() {
    let mut world = demo(regular_only(), 21);
    for _ in 0..20 {
        world.add_vehicle_at(&id("E"), VehicleKind::Regular, Direction::North);
    }

    let summary = world.summary();
    assert_eq!(summary.intersections, 5);
    assert_eq!(summary.roads, 7);
    assert_eq!(summary.queued_vehicles, 20);
    assert_eq!(summary.most_congested, Some(id("E")));
    assert_eq!(summary.average_congestion, 20.0);
    assert_eq!(world.snapshot(&id("E")).unwrap().congestion_band, CongestionBand::High);
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let mut first = demo(SimConfig::default(), 99);
    let mut second = demo(SimConfig::default(), 99);
    for _ in 0..40 {
        assert_eq!(first.tick(), second.tick());
    }
    assert_eq!(first.snapshots(), second.snapshots());
}
