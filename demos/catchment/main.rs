//! Runs a catchment over a small street block and prints the result.
//!
//! `RUST_LOG=interface_catchment=debug cargo run --example catchment`

use geo::{LineString, Point, Polygon};
use interface_catchment::{CatchmentParams, CatchmentTask, ObstacleInput, TaskOutcome};

fn block(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon<f64> {
    Polygon::new(
        LineString::from(vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1), (x0, y0)]),
        Vec::new(),
    )
}

fn main() {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("interface_catchment=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let blocks = vec![
        block(0.0, 0.0, 40.0, 30.0),
        block(50.0, 0.0, 90.0, 30.0),
        block(0.0, 40.0, 40.0, 70.0),
        block(50.0, 40.0, 90.0, 70.0),
    ];
    let params = CatchmentParams::new(ObstacleInput::Polygons(blocks), Point::new(45.0, 35.0), 60.0)
        .with_dead_end_removal(2.0);

    match CatchmentTask::new("street block", params).start().wait() {
        TaskOutcome::Completed(result) => {
            println!("{}", result.label());
            for feature in &result.network {
                println!("  boundary {:>3}: {:8.2}", feature.boundary_id, feature.length);
            }
            println!(
                "  {} iterations, {} frontier vertices, {:.3} s",
                result.stats.iterations,
                result.frontier.len(),
                result.stats.elapsed.as_secs_f64()
            );
        }
        TaskOutcome::Canceled => println!("canceled"),
        TaskOutcome::Faulted(err) => eprintln!("failed: {err}"),
    }
}
