//! End-to-end runs over small hand-built obstacle sets.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use geo::{AffineTransform, LineString, Point, Polygon};
use tracing_subscriber::EnvFilter;

use crate::geometry::{AffineReprojector, BoundaryId, Crs};
use crate::{CancelToken, CatchmentParams, CatchmentResult, CatchmentTask, ObstacleInput, TaskOutcome};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn block(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon<f64> {
    Polygon::new(
        LineString::from(vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1), (x0, y0)]),
        Vec::new(),
    )
}

/// A 100 x 100 block with a 20 x 20 open courtyard in the middle.
fn courtyard() -> Polygon<f64> {
    Polygon::new(
        block(0.0, 0.0, 100.0, 100.0).exterior().clone(),
        vec![block(40.0, 40.0, 60.0, 60.0).exterior().clone()],
    )
}

/// A 20 x 10 block with a 1-wide, 5-deep notch cut down from the top.
fn notched_block() -> Polygon<f64> {
    Polygon::new(
        LineString::from(vec![
            (0.0, 0.0),
            (20.0, 0.0),
            (20.0, 10.0),
            (10.0, 10.0),
            (10.0, 5.0),
            (9.0, 5.0),
            (9.0, 10.0),
            (0.0, 10.0),
            (0.0, 0.0),
        ]),
        Vec::new(),
    )
}

fn run(params: CatchmentParams) -> CatchmentResult {
    init_logging();
    CatchmentTask::new("scenario", params)
        .run(&CancelToken::new())
        .unwrap()
}

fn touches_notch(result: &CatchmentResult) -> bool {
    result.network.iter().any(|f| {
        f.geometry
            .0
            .iter()
            .flat_map(|l| l.0.iter())
            .any(|c| (8.99..=10.01).contains(&c.x) && c.y < 9.5)
    })
}

#[test]
fn zero_budget_gives_empty_catchment() {
    let result = run(CatchmentParams::new(
        ObstacleInput::Polygons(vec![block(0.0, 0.0, 10.0, 10.0)]),
        Point::new(5.0, 12.0),
        0.0,
    ));
    assert!(result.network.is_empty());
    assert_eq!(result.ic, 0);
    assert_eq!(result.label(), "IC_0");
    assert!(result.frontier.is_empty());
}

#[test]
fn open_courtyard_is_walkable_all_round() {
    let result = run(CatchmentParams::new(
        ObstacleInput::Polygons(vec![courtyard()]),
        Point::new(50.0, 50.0),
        20.0,
    ));
    assert_eq!(result.ic, 80);
    assert_eq!(result.network.len(), 1);
    assert!((result.total_length() - 80.0).abs() < 0.05);
    // All four courtyard corners are seen straight from the origin.
    let seeds = result.frontier.iter().filter(|(_, v)| v.iteration == 1).count();
    assert_eq!(seeds, 4);
}

#[test]
fn origin_inside_a_wall_sees_nothing() {
    let result = run(CatchmentParams::new(
        ObstacleInput::Polygons(vec![block(-100.0, -10.0, 100.0, 0.0)]),
        Point::new(0.0, -1.0),
        5.0,
    ));
    assert!(result.network.is_empty());
    assert_eq!(result.ic, 0);
}

#[test]
fn far_side_of_a_wide_wall_stays_unreached() {
    // The wall is wider than the walking buffer, so only the stretch of
    // its near face inside the buffer can be walked.
    let result = run(CatchmentParams::new(
        ObstacleInput::Polygons(vec![block(-100.0, 0.0, 100.0, 10.0)]),
        Point::new(0.0, -1.0),
        5.0,
    ));
    assert_eq!(result.network.len(), 1);
    assert!(result
        .network
        .iter()
        .flat_map(|f| f.geometry.0.iter())
        .flat_map(|l| l.0.iter())
        .all(|c| c.y.abs() < 1e-3));
    assert_eq!(result.ic, 10);
}

#[test]
fn twisted_obstacle_still_blocks_and_is_walked() {
    // A bow-tie ring: its two lobes cancel out in signed area.
    let bow_tie = Polygon::new(
        LineString::from(vec![(0.0, 0.0), (10.0, 10.0), (10.0, 0.0), (0.0, 10.0), (0.0, 0.0)]),
        Vec::new(),
    );
    let result = run(CatchmentParams::new(
        ObstacleInput::Polygons(vec![bow_tie]),
        Point::new(15.0, 5.0),
        8.0,
    ));
    assert!(!result.network.is_empty());
    assert!(result.ic >= 10);
}

#[test]
fn dead_end_removal_drops_the_notch() {
    let base = CatchmentParams::new(
        ObstacleInput::Polygons(vec![notched_block()]),
        Point::new(9.5, 15.0),
        12.0,
    );
    let open = run(base.clone());
    let closed = run(base.with_dead_end_removal(2.0));

    assert!(touches_notch(&open));
    assert!(!touches_notch(&closed));
    assert!(open.ic > closed.ic);
}

#[test]
fn identical_inputs_give_identical_results() {
    let params = CatchmentParams::new(
        ObstacleInput::Polygons(vec![block(0.0, 0.0, 10.0, 10.0), block(14.0, 0.0, 24.0, 10.0)]),
        Point::new(12.0, 13.0),
        25.0,
    );
    let a = run(params.clone());
    let b = run(params);
    assert_eq!(a.ic, b.ic);
    assert_eq!(a.network, b.network);
    assert_eq!(a.stats.iterations, b.stats.iterations);
}

#[test]
fn separate_blocks_report_separate_boundaries() {
    let result = run(CatchmentParams::new(
        ObstacleInput::Polygons(vec![block(0.0, 0.0, 10.0, 10.0), block(14.0, 0.0, 24.0, 10.0)]),
        Point::new(12.0, 13.0),
        25.0,
    ));
    let ids: Vec<BoundaryId> = result.network.iter().map(|f| f.boundary_id).collect();
    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);
    for feature in &result.network {
        assert!(feature.length > 0.0);
    }
}

#[test]
fn origin_in_foreign_reference_is_moved_once() {
    let reprojector = AffineReprojector::new().with(
        Crs::new("GPS"),
        Crs::new("GRID"),
        AffineTransform::translate(50.0, 50.0),
    );
    let params = CatchmentParams::new(
        ObstacleInput::Polygons(vec![courtyard()]),
        Point::new(0.0, 0.0),
        20.0,
    )
    .with_references(Crs::new("GRID"), Crs::new("GPS"), Crs::new("GRID"));
    let result = CatchmentTask::new("reprojected", params)
        .with_reprojector(Arc::new(reprojector))
        .run(&CancelToken::new())
        .unwrap();
    assert_eq!(result.origin, Point::new(50.0, 50.0));
    assert_eq!(result.crs, Crs::new("GRID"));
    assert_eq!(result.ic, 80);
}

#[test]
fn background_run_matches_foreground_run() {
    let params = CatchmentParams::new(
        ObstacleInput::Polygons(vec![courtyard()]),
        Point::new(50.0, 50.0),
        20.0,
    );
    let foreground = run(params.clone());
    match CatchmentTask::new("background", params).start().wait() {
        TaskOutcome::Completed(background) => assert_eq!(background.ic, foreground.ic),
        other => panic!("unexpected outcome: {other:?}"),
    }
}
