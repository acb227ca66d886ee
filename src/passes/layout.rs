//! Initial layout: chains reads into unitigs by walking mutual best
//! dovetail edges before the post-processing passes run. `spec.md` §1
//! treats best-overlap-graph construction as external; this module is
//! the driver that actually consumes that graph through
//! `Unitig::add_and_place_frag` (`spec.md` §4.2.4), since something has
//! to call it before `placeContainsUsingBestOverlaps` has containers to
//! place onto.
//!
//! Only mutual edges are followed: a candidate read is added to a chain
//! only when its own best edge back to the current read agrees with the
//! current read's best edge forward to it. A one-sided "best edge"
//! disagreement is left unresolved here and picked up later by
//! `breakUnitigs` once both reads have settled into some unitig.

use log::info;

use crate::best_overlap_graph::{BestEdge, BestOverlapGraph};
use crate::read_info::{ReadId, ReadInfo};
use crate::tig::node::{Position, UfNode};
use crate::tig::TigVector;

fn mutual_edge_back(og: &BestOverlapGraph, candidate: ReadId, back_to: ReadId) -> Option<(BestEdge, bool)> {
    let edge5 = og.best_edge(candidate, false);
    if !edge5.is_none() && edge5.frag_id == back_to {
        return Some((edge5, false));
    }
    let edge3 = og.best_edge(candidate, true);
    if !edge3.is_none() && edge3.frag_id == back_to {
        return Some((edge3, true));
    }
    None
}

pub fn build_initial_layout(tigs: &mut TigVector, reads: &ReadInfo, og: &BestOverlapGraph, verbose: bool) -> usize {
    let mut placed = 0;

    for start in reads.live_ids().collect::<Vec<_>>() {
        if tigs.in_unitig(start) != 0 || og.best_containment(start).is_contained {
            continue;
        }

        let tig_id = tigs.new_unitig();
        let length = reads.length(start) as i64;
        tigs.get_mut(tig_id)
            .expect("just allocated")
            .add_read(UfNode::new(start, Position::new(0, length)), 0, verbose);
        tigs.register_read(tig_id);
        placed += 1;

        let mut frontier = vec![start];
        while let Some(current) = frontier.pop() {
            for end_3p in [false, true] {
                let forward = og.best_edge(current, end_3p);
                if forward.is_none() {
                    continue;
                }
                let candidate = forward.frag_id;
                if tigs.in_unitig(candidate) != 0 || og.best_containment(candidate).is_contained {
                    continue;
                }
                let (back_edge, attaches_3p) = match mutual_edge_back(og, candidate, current) {
                    Some(pair) => pair,
                    None => continue,
                };

                let tig = tigs.get_mut(tig_id).expect("unitig exists for the duration of this chain");
                let peer_idx = match tig.path_position(current) {
                    Some(idx) => idx,
                    None => continue,
                };
                let (edge5, edge3) =
                    if attaches_3p { (None, Some((peer_idx, back_edge))) } else { (Some((peer_idx, back_edge)), None) };

                if tig.add_and_place_frag(reads, candidate, edge5, edge3, verbose) {
                    tigs.register_read(tig_id);
                    placed += 1;
                    frontier.push(candidate);
                }
            }
        }
    }

    if placed > 0 {
        info!("buildInitialLayout: placed {} read(s) via mutual best-edge chaining", placed);
    }
    placed
}
