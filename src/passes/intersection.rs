//! Intersection split (`breakUnitigs` / `intersectionList`, `spec.md`
//! §4.3.4). Best-edges that point from a read in one unitig into
//! another unitig are "invading" evidence; a unitig is cut at the read
//! the invading edge targets unless the invading tig is a spur, too
//! short, or too small.

use std::collections::HashMap;

use log::{debug, info};

use crate::best_overlap_graph::BestOverlapGraph;
use crate::config::Config;
use crate::passes::break_unitig_at;
use crate::read_info::{ReadId, ReadInfo};
use crate::tig::TigVector;

struct Invasion {
    tig_id: u32,
    at_read: ReadId,
    invading_tig: u32,
}

fn is_spur(tigs: &TigVector, og: &BestOverlapGraph, tig_id: u32) -> bool {
    match tigs.get(tig_id) {
        Some(t) => t.ufpath.len() == 1 && !og.has_any_edge(t.ufpath[0].ident),
        None => true,
    }
}

fn find_invasions(tigs: &TigVector, og: &BestOverlapGraph) -> Vec<Invasion> {
    let mut out = Vec::new();
    for tig in tigs.iter() {
        for node in &tig.ufpath {
            if node.is_contained() {
                continue;
            }
            for end_3p in [false, true] {
                let edge = og.best_edge(node.ident, end_3p);
                if edge.is_none() {
                    continue;
                }
                let peer_tig = tigs.in_unitig(edge.frag_id);
                if peer_tig == 0 || peer_tig == tig.id {
                    continue;
                }
                out.push(Invasion { tig_id: tig.id, at_read: node.ident, invading_tig: peer_tig });
            }
        }
    }
    out
}

/// Returns the number of new unitigs created.
pub fn break_unitigs(
    tigs: &mut TigVector,
    _reads: &ReadInfo,
    og: &BestOverlapGraph,
    config: &Config,
    verbose: bool,
) -> usize {
    let invasions = find_invasions(tigs, og);

    let mut cuts_by_tig: HashMap<u32, Vec<usize>> = HashMap::new();
    for inv in invasions {
        if is_spur(tigs, og, inv.invading_tig) {
            continue;
        }
        let (invading_len, invading_reads) = match tigs.get(inv.invading_tig) {
            Some(t) => (t.length, t.ufpath.len()),
            None => continue,
        };
        if invading_len < config.min_break_length {
            continue;
        }
        if invading_reads < config.min_break_frags {
            continue;
        }
        // Cut just before the read the invading edge targets, so the
        // read itself roots the new, invaded-into segment.
        if let Some(idx) = tigs.get(inv.tig_id).and_then(|t| t.path_position(inv.at_read)) {
            if idx > 0 {
                cuts_by_tig.entry(inv.tig_id).or_default().push(idx - 1);
            }
        }
    }

    let mut total_breaks = 0;
    for (tig_id, mut idxs) in cuts_by_tig {
        idxs.sort_unstable();
        idxs.dedup();
        if idxs.is_empty() {
            continue;
        }
        if verbose {
            debug!("breakUnitigs: splitting unitig {} at {} candidate read(s)", tig_id, idxs.len());
        }
        let new_ids = break_unitig_at(tigs, tig_id, &idxs);
        total_breaks += new_ids.len().saturating_sub(1);
    }

    if total_breaks == 0 {
        info!("breakUnitigs: no intersection breaks applied");
    }
    total_breaks
}
