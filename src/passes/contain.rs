//! `placeContainsUsingBestOverlaps` (`spec.md` §4.3.1).

use log::{info, warn};

use crate::best_overlap_graph::BestOverlapGraph;
use crate::read_info::ReadInfo;
use crate::tig::TigVector;

/// Repeatedly places contained reads whose container has already been
/// placed, until a pass makes no progress. Returns the total number of
/// reads placed. A nonzero stall count (reads still waiting on a
/// container that is itself unplaced, typically a circular containment)
/// is logged as a warning and left for `placeZombies`.
pub fn place_contains_using_best_overlaps(
    tigs: &mut TigVector,
    reads: &ReadInfo,
    og: &BestOverlapGraph,
    verbose: bool,
) -> usize {
    let mut total_placed = 0;

    loop {
        let mut placed_this_round = 0;

        for read in reads.live_ids().collect::<Vec<_>>() {
            if tigs.in_unitig(read) != 0 {
                continue;
            }
            let bc = og.best_containment(read);
            if !bc.is_contained {
                continue;
            }
            let container_tig = tigs.in_unitig(bc.container);
            if container_tig == 0 {
                continue;
            }
            let placed = tigs
                .get_mut(container_tig)
                .map(|t| t.place_contained(reads, read, bc, verbose))
                .unwrap_or(false);
            if placed {
                tigs.register_read(container_tig);
                placed_this_round += 1;
            }
        }

        total_placed += placed_this_round;
        if placed_this_round == 0 {
            break;
        }
    }

    let stalled = reads
        .live_ids()
        .filter(|&r| tigs.in_unitig(r) == 0 && og.best_containment(r).is_contained)
        .count();
    if stalled > 0 {
        warn!(
            "placeContainsUsingBestOverlaps: stalled with {} contained read(s) still unplaced \
             (likely circular containments; left for placeZombies)",
            stalled
        );
    } else {
        info!("placeContainsUsingBestOverlaps: placed {} contained read(s)", total_placed);
    }

    for tig in tigs.iter_mut() {
        tig.sort();
    }

    total_placed
}
