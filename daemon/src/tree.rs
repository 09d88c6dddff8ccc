//! Process tree memory totals

use crate::collector::ProcessCollector;
use std::collections::HashSet;
use tracing::trace;

/// Sums the proportional memory of `root` and every descendant reachable
/// through the children lists.
///
/// Nodes that cannot be sampled contribute zero. Each pid is counted at
/// most once, so a malformed children report that loops back on itself
/// terminates.
pub fn aggregate_tree<C: ProcessCollector + ?Sized>(collector: &C, root: u32) -> u64 {
    let mut total = 0u64;
    let mut visited = HashSet::new();
    let mut pending = vec![root];

    while let Some(pid) = pending.pop() {
        if !visited.insert(pid) {
            continue;
        }
        match collector.sample_memory(pid) {
            Ok(kb) => total = total.saturating_add(kb),
            Err(e) => trace!("tree node skipped: {}", e),
        }
        pending.extend(
            collector
                .children(pid)
                .into_iter()
                .filter(|child| !visited.contains(child)),
        );
    }

    total
}
