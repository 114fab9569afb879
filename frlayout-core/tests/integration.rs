//! Integration Tests for the Layout Engine
//!
//! These tests drive full runs through the public API and check the
//! properties a layout must hold regardless of graph shape or thread count.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use frlayout_core::simulation::Phase;
use frlayout_core::{
    cooling_speed, layout, FruchtermanReingold, Graph, LayoutConfig, LayoutError, Point,
    ProgressCounter, ProgressListener, ProgressSilent, RunState,
};

/// A `width` x `height` grid graph.
fn grid(width: usize, height: usize) -> Graph<(usize, usize)> {
    let mut graph = Graph::new();
    for y in 0..height {
        for x in 0..width {
            graph.add_node((x, y));
            if x > 0 {
                graph.add_edge((x - 1, y), (x, y));
            }
            if y > 0 {
                graph.add_edge((x, y - 1), (x, y));
            }
        }
    }
    graph
}

/// Ideal edge length for `n` nodes.
fn ideal_length(area: f32, n: usize) -> f32 {
    (10000.0 * area / (1.0 + n as f32)).sqrt()
}

fn bits(point: &Point) -> (u32, u32) {
    (point.x.to_bits(), point.y.to_bits())
}

/// Cancels once a given number of iterations has completed.
struct CancelAfter {
    limit: u64,
    progress: AtomicU64,
    cancelled: AtomicBool,
}

impl CancelAfter {
    fn new(limit: u64) -> Self {
        Self {
            limit,
            progress: AtomicU64::new(0),
            cancelled: AtomicBool::new(false),
        }
    }
}

impl ProgressListener for CancelAfter {
    fn set_maximum(&self, _maximum: u64) {}

    fn set_progress(&self, progress: u64) {
        self.progress.store(progress, Ordering::SeqCst);
    }

    fn increment_progress(&self) {
        let done = self.progress.fetch_add(1, Ordering::SeqCst) + 1;
        if done >= self.limit {
            self.cancelled.store(true, Ordering::SeqCst);
        }
    }

    fn progress(&self) -> u64 {
        self.progress.load(Ordering::SeqCst)
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Panics the first time it is polled for cancellation.
///
/// The first poll of a run happens on a worker inside the repulsion phase.
struct PanicOnPoll {
    armed: AtomicBool,
}

impl ProgressListener for PanicOnPoll {
    fn set_maximum(&self, _maximum: u64) {}

    fn set_progress(&self, _progress: u64) {}

    fn increment_progress(&self) {}

    fn progress(&self) -> u64 {
        0
    }

    fn is_cancelled(&self) -> bool {
        if self.armed.swap(false, Ordering::SeqCst) {
            panic!("progress sink exploded");
        }
        false
    }
}

/// Test that every input node gets exactly one position.
#[test]
fn every_node_gets_one_position() {
    let graph = grid(4, 3);
    for threads in [1, 2, 5] {
        let mut layout = FruchtermanReingold::new(&graph);
        let positions = layout.apply(30, &ProgressSilent, threads).unwrap();

        assert_eq!(positions.len(), 12);
        for y in 0..3 {
            for x in 0..4 {
                let p = positions[&(x, y)];
                assert!(p.x.is_finite() && p.y.is_finite());
            }
        }
    }
}

/// Test that an empty graph completes immediately with no positions.
#[test]
fn empty_graph_completes_with_empty_result() {
    let graph: Graph<u32> = Graph::new();
    let mut layout = FruchtermanReingold::new(&graph);
    let positions = layout.apply(100, &ProgressSilent, 4).unwrap();

    assert!(positions.is_empty());
    assert_eq!(layout.state(), RunState::Completed);
}

/// Test that a lone node never moves.
#[test]
fn single_node_never_moves() {
    let mut graph = Graph::new();
    graph.add_node("only");

    for iterations in [0, 1, 250] {
        let mut layout = FruchtermanReingold::new(&graph);
        let positions = layout.apply(iterations, &ProgressSilent, 2).unwrap();
        assert_eq!(positions[&"only"], Point::new(0.0, 100.0));
    }
}

/// Test that two connected nodes settle at the ideal edge length when
/// nothing else pulls on them.
#[test]
fn two_nodes_converge_to_ideal_length_without_gravity() {
    let graph = Graph::from_edges([("a", "b")]);
    let k = ideal_length(600.0, 2);

    let mut layout = FruchtermanReingold::builder(&graph)
        .gravity(0.0)
        .build()
        .unwrap();
    let positions = layout.apply(500, &ProgressSilent, 1).unwrap();

    let dist = positions[&"a"].distance(&positions[&"b"]);
    assert!(
        (dist - k).abs() < 0.02 * k,
        "distance {dist} should be close to {k}"
    );
}

/// Test that with default gravity the pair neither collapses nor drifts
/// apart.
#[test]
fn two_nodes_stay_in_a_band_with_gravity() {
    let graph = Graph::from_edges([("a", "b")]);
    let k = ideal_length(600.0, 2);

    for iterations in [200, 500, 1000] {
        let mut layout = FruchtermanReingold::new(&graph);
        let positions = layout.apply(iterations, &ProgressSilent, 2).unwrap();

        let dist = positions[&"a"].distance(&positions[&"b"]);
        assert!(
            dist > 0.05 * k && dist < 0.5 * k,
            "distance {dist} left the band after {iterations} iterations"
        );
    }
}

/// Test that fixed nodes keep their initial coordinates bit for bit.
#[test]
fn all_fixed_nodes_keep_initial_positions() {
    let graph = grid(3, 3);
    let fixed: HashSet<(usize, usize)> = graph_nodes(&graph).into_iter().collect();

    let mut layout = FruchtermanReingold::builder(&graph)
        .fixed(&fixed)
        .build()
        .unwrap();
    let initial: Vec<Point> = layout.snapshot().initial_positions().to_vec();
    let positions = layout.apply(40, &ProgressSilent, 3).unwrap();

    for (v, point) in positions.values().enumerate() {
        assert_eq!(bits(point), bits(&initial[v]));
    }
}

fn graph_nodes(graph: &Graph<(usize, usize)>) -> Vec<(usize, usize)> {
    use frlayout_core::Topology;
    graph.nodes().collect()
}

/// Test that a single-threaded run is exactly reproducible.
#[test]
fn single_threaded_runs_are_reproducible() {
    let graph = grid(5, 4);

    let first = FruchtermanReingold::new(&graph)
        .apply(60, &ProgressSilent, 1)
        .unwrap();
    let second = FruchtermanReingold::new(&graph)
        .apply(60, &ProgressSilent, 1)
        .unwrap();

    for (node, point) in &first {
        assert_eq!(bits(point), bits(&second[node]));
    }
}

/// Test that thread count does not change the result when no two edges
/// share an endpoint.
#[test]
fn thread_count_is_exact_for_disjoint_edges() {
    let mut graph = Graph::from_edges([(0, 1), (2, 3), (4, 5), (6, 7)]);
    graph.add_node(8);

    let reference = FruchtermanReingold::new(&graph)
        .apply(80, &ProgressSilent, 1)
        .unwrap();

    for threads in [2, 3, 8] {
        let positions = FruchtermanReingold::new(&graph)
            .apply(80, &ProgressSilent, threads)
            .unwrap();
        for (node, point) in &reference {
            assert_eq!(
                bits(point),
                bits(&positions[node]),
                "node {node} differs with {threads} threads"
            );
        }
    }
}

/// Test that cancelling after an iteration stops the run there.
#[test]
fn cancellation_stops_after_current_iteration() {
    let graph = grid(3, 3);
    let mut layout = FruchtermanReingold::new(&graph);
    let progress = CancelAfter::new(3);

    let err = layout.apply(10, &progress, 2).unwrap_err();

    assert!(err.is_cancelled());
    assert_eq!(progress.progress(), 3);
    assert_eq!(layout.state(), RunState::Cancelled);
    // The fourth iteration (index 3) never set its speed.
    assert_eq!(layout.speed(), cooling_speed(2, 10));

    let again = layout.apply(10, &ProgressSilent, 2).unwrap_err();
    assert!(matches!(
        again,
        LayoutError::RunFinished {
            state: RunState::Cancelled
        }
    ));
}

/// Test that a cancellation requested from another thread is honored.
#[test]
fn cancellation_from_another_thread() {
    let graph = grid(3, 2);
    let progress = Arc::new(ProgressCounter::new());

    let handle = Arc::clone(&progress);
    thread::spawn(move || handle.cancel()).join().unwrap();

    let mut layout = FruchtermanReingold::new(&graph);
    let err = layout.apply(50, progress.as_ref(), 4).unwrap_err();

    assert!(matches!(err, LayoutError::Cancelled));
    assert_eq!(progress.progress(), 0);
    assert_eq!(progress.maximum(), 50);
}

/// Test that a panic inside a worker surfaces as a failure, not a
/// cancellation.
#[test]
fn worker_panic_fails_the_run() {
    let graph = grid(4, 4);

    for threads in [1, 4] {
        let mut layout = FruchtermanReingold::new(&graph);
        let progress = PanicOnPoll {
            armed: AtomicBool::new(true),
        };

        let err = layout.apply(20, &progress, threads).unwrap_err();

        match err {
            LayoutError::WorkerFailed { phase, message, .. } => {
                assert_eq!(phase, Phase::Repulsion);
                assert_eq!(message, "progress sink exploded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(layout.state(), RunState::Failed);
    }
}

/// Test that supplied starting coordinates are scaled by ten.
#[test]
fn start_positions_seed_the_layout() {
    let graph = Graph::from_edges([("a", "b")]);
    let mut start = HashMap::new();
    start.insert("a", Point::new(1.0, 2.0));
    start.insert("b", Point::new(-3.0, 0.5));

    let mut layout = FruchtermanReingold::builder(&graph)
        .start_positions(&start)
        .build()
        .unwrap();
    let positions = layout.apply(0, &ProgressSilent, 1).unwrap();

    assert_eq!(positions[&"a"], Point::new(10.0, 20.0));
    assert_eq!(positions[&"b"], Point::new(-30.0, 5.0));
}

/// Test the one-call entry point with a parsed configuration.
#[test]
fn layout_function_uses_config() {
    let graph = grid(3, 3);
    let config = LayoutConfig::from_json(r#"{ "iterations": 25, "threads": 2 }"#).unwrap();

    let positions = layout(&graph, config).unwrap();
    assert_eq!(positions.len(), 9);

    let bad = LayoutConfig {
        area: -5.0,
        ..LayoutConfig::default()
    };
    assert!(matches!(
        layout(&graph, bad),
        Err(LayoutError::InvalidConfig(_))
    ));
}

/// Test that the layout spreads a connected graph out from its seed
/// circle.
#[test]
fn layout_spreads_nodes_apart() {
    let graph = grid(4, 4);
    let mut layout = FruchtermanReingold::new(&graph);
    let initial = mean_pairwise_distance(layout.snapshot().initial_positions());

    let positions = layout.apply(300, &ProgressSilent, 4).unwrap();
    let points: Vec<Point> = positions.values().copied().collect();
    let spread = mean_pairwise_distance(&points);

    assert!(
        spread > initial,
        "mean distance shrank from {initial} to {spread}"
    );
}

fn mean_pairwise_distance(points: &[Point]) -> f32 {
    let mut total = 0.0;
    let mut pairs = 0;
    for (i, a) in points.iter().enumerate() {
        for b in &points[i + 1..] {
            total += a.distance(b);
            pairs += 1;
        }
    }
    total / pairs as f32
}
