//! Post-processing passes that restore the invariants of `spec.md` §3
//! after the initial best-overlap-graph layout is built externally
//! (`spec.md` §4.3).

pub mod contain;
pub mod discontinuity;
pub mod intersection;
pub mod layout;
pub mod parent_hang;
pub mod singleton;
pub mod zombie;

use crate::tig::TigVector;

/// Splits a unitig's `ufpath` after each index in `cuts` into separate
/// unitigs, re-basing every segment to start at offset 0 and forcing
/// the first node of each non-initial segment to be uncontained
/// (`spec.md` §4.3.3's "new unitig rooted at offset 0" rule, reused by
/// `breakUnitigs` per the shared `breakUnitigAt` interface of `spec.md`
/// §4.3.4).
///
/// The first segment keeps `tig_id`; later segments get fresh ids.
/// Returns every resulting tig id, first segment's id first.
pub fn break_unitig_at(tigs: &mut TigVector, tig_id: u32, cuts: &[usize]) -> Vec<u32> {
    let tig = match tigs.get(tig_id) {
        Some(t) => t.clone(),
        None => return Vec::new(),
    };

    let mut sorted_cuts = cuts.to_vec();
    sorted_cuts.sort_unstable();
    sorted_cuts.dedup();
    sorted_cuts.retain(|&c| c + 1 < tig.ufpath.len());

    let mut segments = Vec::new();
    let mut start = 0;
    for &cut in &sorted_cuts {
        segments.push(tig.ufpath[start..=cut].to_vec());
        start = cut + 1;
    }
    segments.push(tig.ufpath[start..].to_vec());

    let mut new_ids = Vec::new();
    for (i, mut seg) in segments.into_iter().enumerate() {
        if seg.is_empty() {
            continue;
        }
        let offset = seg.iter().map(|n| n.position.min()).min().unwrap_or(0);
        if offset != 0 {
            for n in seg.iter_mut() {
                n.position = n.position.shifted(-offset);
            }
        }
        seg[0].contained = 0;

        let id = if i == 0 { tig_id } else { tigs.new_unitig() };
        let t = tigs.get_mut(id).expect("tig id just allocated or verified to exist");
        t.ufpath.clear();
        t.length = 0;
        for n in seg {
            t.add_read(n, 0, false);
        }
        tigs.register_read(id);
        new_ids.push(id);
    }
    new_ids
}
