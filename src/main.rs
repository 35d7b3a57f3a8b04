use anyhow::Result;
use clap::Parser;
use log::{error, info};

use traffic_signal_sim::simulation::{IntersectionId, SimConfig, SimWorld};

#[derive(Parser)]
#[command(name = "traffic_signal_sim")]
#[command(about = "Adaptive traffic signal simulation (headless)")]
struct Cli {
    /// Number of simulation ticks to run
    #[arg(long, default_value = "60")]
    ticks: u64,

    /// Simulated milliseconds per tick
    #[arg(long, default_value = "500")]
    tick_ms: u64,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Minimum green time in seconds
    #[arg(long, default_value = "5")]
    min_green: u32,

    /// Maximum proportional green time in seconds
    #[arg(long, default_value = "30")]
    max_green: u32,

    /// Green time granted to an emergency approach in seconds
    #[arg(long, default_value = "25")]
    emergency_green: u32,

    /// Inject an extra emergency vehicle every N ticks (0 disables)
    #[arg(long, default_value = "0")]
    emergency_every: u64,

    /// Find a route between two intersections after the run
    #[arg(long, num_args = 2, value_names = ["FROM", "TO"])]
    route: Option<Vec<String>>,

    /// Skip congested intersections when routing
    #[arg(long)]
    avoid_congested: bool,

    /// Sleep one tick interval between ticks
    #[arg(long)]
    realtime: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run_headless(&cli) {
        error!("Simulation failed: {:#}", e);
        std::process::exit(1);
    }
}

fn build_config(cli: &Cli) -> SimConfig {
    let mut config = SimConfig {
        tick_interval_ms: cli.tick_ms,
        ..SimConfig::default()
    };
    config.timing.min_green = cli.min_green;
    config.timing.max_green = cli.max_green;
    config.timing.emergency_green = cli.emergency_green;
    config
}

/// Run the simulation in headless mode (no graphics)
fn run_headless(cli: &Cli) -> Result<()> {
    let config = build_config(cli);
    let ticks_per_second = (1000 / config.tick_interval_ms.max(1)).max(1);

    info!("Running traffic signal simulation in headless mode...");
    info!("Ticks: {}, Tick interval: {}ms", cli.ticks, config.tick_interval_ms);

    let mut world = SimWorld::create_demo_world(config, cli.seed)?;
    world.log_summary();

    let mut emergency_dispatches = 0;
    let mut departures = 0;
    for tick in 1..=cli.ticks {
        if cli.emergency_every > 0 && tick % cli.emergency_every == 0 {
            world.add_emergency_vehicle();
        }

        let report = world.tick();
        departures += report.departures;
        if report.dispatched.is_some() {
            emergency_dispatches += 1;
        }

        // Print summary after running 1 second worth of ticks
        if tick % ticks_per_second == 0 {
            world.log_summary();
        }

        if cli.realtime {
            std::thread::sleep(std::time::Duration::from_millis(world.config().tick_interval_ms));
        }
    }

    let summary = world.summary();
    info!("=== SIMULATION COMPLETE ===");
    info!("Simulated time: {:.1}s", world.time() as f64 / 1000.0);
    info!("Total ticks: {}", world.tick_count());
    info!("Total intersections: {}", summary.intersections);
    info!("Total roads: {}", summary.roads);
    info!("Vehicles processed: {}", summary.processed_vehicles);
    info!("Vehicles queued: {}", summary.queued_vehicles);
    info!("Departures this run: {}", departures);
    info!("Priority dispatches: {}", emergency_dispatches);
    info!("Average congestion: {:.1}%", summary.average_congestion);
    if let Some(id) = &summary.most_congested {
        info!("Most congested: {}", id);
    }

    if let Some(route) = &cli.route {
        if let [from, to] = route.as_slice() {
            let from = IntersectionId::new(from.as_str());
            let to = IntersectionId::new(to.as_str());
            let path = world.find_path(&from, &to, cli.avoid_congested);
            if path.is_empty() {
                info!(
                    "No path found between {} and {}.{}",
                    from,
                    to,
                    if cli.avoid_congested {
                        " Try without avoiding congested roads."
                    } else {
                        ""
                    }
                );
            } else {
                let hops: Vec<&str> = path.iter().map(IntersectionId::as_str).collect();
                info!(
                    "Shortest path: {} (road weight {})",
                    hops.join(" -> "),
                    world.network().path_weight(&path).unwrap_or_default()
                );
            }
        }
    }

    Ok(())
}
