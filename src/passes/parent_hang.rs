//! `setParentAndHang` (`spec.md` §4.3.6).

use log::debug;

use crate::overlap::{Overlap, OverlapCache};
use crate::read_info::ReadInfo;
use crate::tig::TigVector;

pub fn set_parent_and_hang(tigs: &mut TigVector, reads: &ReadInfo, overlaps: &OverlapCache, verbose: bool) {
    for tig in tigs.iter_mut() {
        if tig.ufpath.is_empty() {
            continue;
        }

        tig.ufpath[0].parent = 0;
        tig.ufpath[0].ahang = 0;
        tig.ufpath[0].bhang = 0;

        let snapshot = tig.ufpath.clone();
        for idx in 1..snapshot.len() {
            let node_ident = snapshot[idx].ident;
            let mut best: Option<(Overlap, i64)> = None;

            for ovl in overlaps.overlaps_from(node_ident) {
                let peer_idx = match snapshot[..idx].iter().position(|n| n.ident == ovl.b) {
                    Some(i) => i,
                    None => continue,
                };
                let parent_reverse = !snapshot[peer_idx].position.is_forward();
                let (ahang, bhang) = if parent_reverse {
                    (-ovl.b_hang, -ovl.a_hang)
                } else {
                    (ovl.a_hang, ovl.b_hang)
                };
                if ahang < 0 {
                    continue;
                }
                let len = ovl.length(reads.length(node_ident));
                let candidate = Overlap { a_hang: ahang, b_hang: bhang, ..*ovl };
                let is_better = match &best {
                    None => true,
                    Some((prev, prev_len)) => len > *prev_len || (len == *prev_len && candidate.erate < prev.erate),
                };
                if is_better {
                    best = Some((candidate, len));
                }
            }

            if let Some((ovl, _)) = best {
                tig.ufpath[idx].parent = ovl.b;
                tig.ufpath[idx].ahang = ovl.a_hang;
                tig.ufpath[idx].bhang = ovl.b_hang;
            }
        }
    }

    if verbose {
        debug!("setParentAndHang: recomputed parent/ahang/bhang for all unitigs");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tig::node::{Position, UfNode};

    fn ovl(a: u32, b: u32, a_hang: i32, b_hang: i32) -> Overlap {
        Overlap { a, b, a_hang, b_hang, flipped: false, erate: 0.02 }
    }

    #[test]
    fn picks_thickest_non_negative_ahang_predecessor() {
        let reads = ReadInfo::default();
        let cache = OverlapCache::new(vec![ovl(2, 1, 200, -200)]);

        let mut tigs = TigVector::new(2);
        let id = tigs.new_unitig();
        let t = tigs.get_mut(id).unwrap();
        t.add_read(UfNode::new(1, Position::new(0, 1000)), 0, false);
        t.add_read(UfNode::new(2, Position::new(200, 800)), 0, false);
        tigs.register_read(id);

        set_parent_and_hang(&mut tigs, &reads, &cache, false);

        let tig = tigs.get(id).unwrap();
        assert_eq!(tig.ufpath[0].parent, 0);
        let node2 = tig.ufpath.iter().find(|n| n.ident == 2).unwrap();
        assert_eq!(node2.parent, 1);
        assert!(node2.ahang >= 0);
    }
}
