//! Chunk selection for idle workers.

use tessel_geom::{Aabb, Frustum};
use tessel_map::CHUNK_SIZE;

/// Lowest score wins; anything at or above this is "nothing to do".
pub const NO_CANDIDATE: i32 = 0x0fff_ffff;
/// World height used when culling chunks that have no mesh yet.
pub const WORLD_HEIGHT: i32 = 256;

/// Worker responsible for chunk `(a,b)`. Each chunk maps to exactly one worker.
#[inline]
pub fn worker_index(a: i32, b: i32, workers: usize) -> usize {
    (a.unsigned_abs() ^ b.unsigned_abs()) as usize % workers.max(1)
}

/// Orders candidates: visible before invisible, fresh before re-mesh, near before far.
#[inline]
pub fn chunk_score(invisible: bool, remesh: bool, distance: i32) -> i32 {
    (i32::from(invisible) << 24) | (i32::from(remesh) << 16) | distance
}

pub fn chunk_visible(frustum: &Frustum, p: i32, q: i32, miny: i32, maxy: i32) -> bool {
    frustum.intersects_aabb(&Aabb::chunk_column(p, q, CHUNK_SIZE, miny, maxy), 6)
}

/// What the scheduler needs to know about a resident chunk.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Residency {
    pub dirty: bool,
    pub meshed: bool,
}

/// Best chunk around `center` within `radius` for worker `worker` of `workers`.
///
/// Resident clean chunks are skipped. `lookup` reports residency.
pub fn pick_chunk(
    center: (i32, i32),
    radius: i32,
    worker: usize,
    workers: usize,
    frustum: &Frustum,
    lookup: impl Fn(i32, i32) -> Option<Residency>,
) -> Option<(i32, i32)> {
    let (p, q) = center;
    let mut best = None;
    let mut best_score = NO_CANDIDATE;
    for dp in -radius..=radius {
        for dq in -radius..=radius {
            let (a, b) = (p + dp, q + dq);
            if worker_index(a, b, workers) != worker {
                continue;
            }
            let resident = lookup(a, b);
            if resident.is_some_and(|r| !r.dirty) {
                continue;
            }
            let distance = dp.abs().max(dq.abs());
            let invisible = !chunk_visible(frustum, a, b, 0, WORLD_HEIGHT);
            let remesh = resident.is_some_and(|r| r.meshed && r.dirty);
            let score = chunk_score(invisible, remesh, distance);
            if score < best_score {
                best_score = score;
                best = Some((a, b));
            }
        }
    }
    best
}
