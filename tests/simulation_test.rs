use std::process::Command;

fn run_headless(args: &[&str]) -> (bool, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_traffic_signal_sim"))
        .args(args)
        .env("RUST_LOG", "warn,traffic_signal_sim=info")
        .output()
        .expect("Failed to execute simulation");

    (
        output.status.success(),
        String::from_utf8_lossy(&output.stderr).into_owned(),
    )
}

/// Test that the simulation runs in headless mode without crashing
#[test]
fn test_headless_simulation_runs() {
    let (success, stderr) = run_headless(&["--ticks", "20", "--seed", "3"]);

    assert!(
        success,
        "Simulation failed to run in headless mode. stderr: {}",
        stderr
    );
    assert!(
        stderr.contains("SIMULATION COMPLETE"),
        "Simulation did not complete properly. stderr: {}",
        stderr
    );
}

/// Test that simulation statistics are logged
#[test]
fn test_simulation_statistics_logged() {
    let (success, stderr) = run_headless(&["--ticks", "10", "--seed", "5"]);
    assert!(success, "Simulation failed to run");

    for label in [
        "Total ticks: 10",
        "Total intersections: 5",
        "Total roads: 7",
        "Vehicles processed:",
        "Vehicles queued:",
        "Priority dispatches:",
        "Average congestion:",
    ] {
        assert!(stderr.contains(label), "Missing '{}' statistic", label);
    }
}

/// Test that the requested route is reported
#[test]
fn test_route_reported() {
    let (success, stderr) = run_headless(&["--ticks", "1", "--seed", "1", "--route", "A", "E"]);
    assert!(success, "Simulation failed to run");
    assert!(
        stderr.contains("Shortest path: A -> E (road weight 2)"),
        "Route missing. stderr: {}",
        stderr
    );
}

/// Test that an unknown route endpoint does not abort the run
#[test]
fn test_unknown_route_endpoint() {
    let (success, stderr) = run_headless(&["--ticks", "1", "--route", "A", "Z"]);
    assert!(success, "Simulation failed to run");
    assert!(stderr.contains("No path found between A and Z"));
}
