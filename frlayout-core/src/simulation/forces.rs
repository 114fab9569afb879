//! Force Kernels
//!
//! One function per simulation phase. Each kernel processes only the items
//! of the [`Partition`] it is handed, so the coordinator can run the same
//! kernel on several workers at once.
//!
//! Zero distances are skipped rather than divided by: two coincident nodes
//! exert no repulsion or attraction on each other, and a node sitting on the
//! origin feels no gravity.

use super::pool::Partition;
use crate::store::CoordinateStore;

/// Scale applied to the area before deriving step limits.
pub const AREA_MULTIPLICATOR: f32 = 10000.0;

/// Divisor turning the cooling-schedule speed into a force scale.
pub const SPEED_DIVISOR: f32 = 800.0;

/// Constants for one iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepParams {
    /// Ideal edge length.
    pub k: f32,
    /// Largest displacement at full speed.
    pub max_displace: f32,
    /// Pull-to-center strength.
    pub gravity: f64,
    /// Current cooling-schedule speed.
    pub speed: f64,
}

impl StepParams {
    pub fn new(area: f32, gravity: f64, speed: f64, node_count: usize) -> Self {
        let scaled_area = AREA_MULTIPLICATOR * area;
        Self {
            k: ((scaled_area / (1.0 + node_count as f32)) as f64).sqrt() as f32,
            max_displace: ((scaled_area as f64).sqrt() / 10.0) as f32,
            gravity,
            speed,
        }
    }

    /// Cap on the distance any node may move in this iteration.
    pub fn displacement_limit(&self) -> f32 {
        self.max_displace * (self.speed as f32 / SPEED_DIVISOR)
    }
}

/// Push every node of the partition away from every other node.
///
/// Polls `cancelled` after each node and returns early when it reports true.
/// Only force accumulators are written, so stopping early leaves positions
/// untouched.
pub fn repulsion<C>(store: &CoordinateStore, partition: &Partition, k: f32, cancelled: C)
where
    C: Fn() -> bool,
{
    let n = store.len();
    let k_squared = k * k;

    for v1 in partition.indices() {
        let x1 = store.x[v1].load();
        let y1 = store.y[v1].load();
        let mut fx = store.fx[v1].load();
        let mut fy = store.fy[v1].load();

        for v2 in 0..n {
            if v1 == v2 {
                continue;
            }
            let dx = x1 - store.x[v2].load();
            let dy = y1 - store.y[v2].load();
            let dist = (dx * dx + dy * dy).sqrt();
            if dist > 0.0 {
                let repulsive = k_squared / dist;
                fx += dx / dist * repulsive;
                fy += dy / dist * repulsive;
            }
        }

        store.fx[v1].store(fx);
        store.fy[v1].store(fy);

        if cancelled() {
            return;
        }
    }
}

/// Pull the endpoints of every edge of the partition toward each other.
///
/// Edges sharing an endpoint may be handled by different workers, so both
/// endpoint updates go through atomic accumulation.
pub fn attraction(
    store: &CoordinateStore,
    sources: &[usize],
    targets: &[usize],
    partition: &Partition,
    k: f32,
) {
    for e in partition.indices() {
        let v1 = sources[e];
        let v2 = targets[e];
        let dx = store.x[v1].load() - store.x[v2].load();
        let dy = store.y[v1].load() - store.y[v2].load();
        let dist = (dx * dx + dy * dy).sqrt();
        if dist > 0.0 {
            let attractive = dist * dist / k;
            let ax = dx / dist * attractive;
            let ay = dy / dist * attractive;
            store.fx[v1].fetch_add(-ax);
            store.fy[v1].fetch_add(-ay);
            store.fx[v2].fetch_add(ax);
            store.fy[v2].fetch_add(ay);
        }
    }
}

/// Pull every node of the partition toward the origin.
///
/// The distance from the origin is used as-is (not squared) in the force
/// magnitude.
pub fn gravity(store: &CoordinateStore, partition: &Partition, k: f32, gravity: f64) {
    let strength = 0.01 * k * gravity as f32;

    for v in partition.indices() {
        let x = store.x[v].load();
        let y = store.y[v].load();
        let dist = (x * x + y * y).sqrt();
        if dist > 0.0 {
            let force = strength * dist;
            store.fx[v].store(store.fx[v].load() - force * x / dist);
            store.fy[v].store(store.fy[v].load() - force * y / dist);
        }
    }
}

/// Scale every accumulated force of the partition by `speed / 800`.
pub fn speed(store: &CoordinateStore, partition: &Partition, speed: f64) {
    let scale = speed / SPEED_DIVISOR as f64;

    for v in partition.indices() {
        store.fx[v].store((store.fx[v].load() as f64 * scale) as f32);
        store.fy[v].store((store.fy[v].load() as f64 * scale) as f32);
    }
}

/// Move every non-fixed node of the partition along its net force, by at
/// most `limit`.
pub fn displacement(store: &CoordinateStore, fixed: &[bool], partition: &Partition, limit: f32) {
    for v in partition.indices() {
        if fixed[v] {
            continue;
        }
        let fx = store.fx[v].load();
        let fy = store.fy[v].load();
        let dist = (fx * fx + fy * fy).sqrt();
        if dist > 0.0 {
            let step = limit.min(dist);
            store.x[v].store(store.x[v].load() + fx / dist * step);
            store.y[v].store(store.y[v].load() + fy / dist * step);
        }
    }
}
