//! Parallel token enumeration.
//!
//! Enumeration is independent per position, so the source is split into
//! contiguous position ranges, one per worker. Each worker fills a private
//! block of adjacency rows; the blocks are adopted into the shared edge map
//! after the join, so no lock is ever taken. Every downstream stage runs
//! single-threaded on the merged map.

use super::edges::{EdgeList, EdgeMap};
use super::enumerate::crunch_at;
use super::prefix::PrefixIndex;
use crate::error::{Error, Result};

/// Resolve a configured thread count: 0 means one per core, and anything is
/// clamped to a sane range.
pub fn effective_threads(num_threads: usize) -> usize {
    match num_threads {
        0 => num_cpus::get().clamp(1, 32),
        n => n.clamp(1, 32),
    }
}

/// Sources below this size are enumerated inline; spawning costs more than
/// the search.
const PARALLEL_THRESHOLD: usize = 4096;

/// Enumerate candidate edges for every position of `src`.
pub fn enumerate(
    src: &[u8],
    optimal_run: usize,
    index: &PrefixIndex,
    num_threads: usize,
) -> Result<EdgeMap> {
    let n = src.len();
    let mut edges = EdgeMap::new(n + 1);
    let threads = effective_threads(num_threads);

    if threads == 1 || n < PARALLEL_THRESHOLD {
        for i in 0..n {
            crunch_at(src, i, optimal_run, index, edges.row_mut(i));
        }
        return Ok(edges);
    }

    let chunk = n.div_ceil(threads);
    let blocks = crossbeam::scope(|scope| {
        let mut handles = Vec::with_capacity(threads);
        for t in 0..threads {
            let lo = t * chunk;
            let hi = (lo + chunk).min(n);
            if lo >= hi {
                break;
            }
            handles.push(scope.spawn(move |_| {
                let mut rows: Vec<EdgeList> = vec![Vec::new(); hi - lo];
                for i in lo..hi {
                    crunch_at(src, i, optimal_run, index, &mut rows[i - lo]);
                }
                (lo, rows)
            }));
        }
        handles
            .into_iter()
            .map(|h| h.join().map_err(|_| Error::Internal("worker thread panicked".to_string())))
            .collect::<Result<Vec<_>>>()
    })
    .map_err(|_| Error::Internal("worker scope panicked".to_string()))??;

    for (lo, rows) in blocks {
        edges.adopt(lo, rows);
    }
    Ok(edges)
}
